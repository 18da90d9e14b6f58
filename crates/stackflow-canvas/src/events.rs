//! Inbound pointer input and outbound change notifications.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use stackflow_catalog::NodeId;

use crate::drag::{HitTarget, PointerId};
use crate::layout::ContainerSize;
use crate::playback::{PlaybackStatus, StepTicket};
use crate::view::ViewTransform;

/// A pointer event in container-relative screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub pointer: PointerId,
    pub x: f64,
    pub y: f64,
    /// Explicit hit target; when absent the controller hit-tests.
    #[serde(default)]
    pub target: Option<HitTarget>,
}

impl PointerInput {
    pub fn new(pointer: PointerId, x: f64, y: f64) -> Self {
        Self {
            pointer,
            x,
            y,
            target: None,
        }
    }

    pub fn on(mut self, target: HitTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Notifications sent to controller listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CanvasEvent {
    /// Base positions were recomputed
    LayoutChanged { container: ContainerSize },

    /// A node's offset changed
    NodeMoved { node: NodeId, position: DVec2 },

    /// All offsets were cleared
    OffsetsReset,

    /// Pan or zoom changed
    ViewChanged { view: ViewTransform },

    /// A gesture ended without moving
    Clicked { target: HitTarget },

    /// A different simulation was selected
    SimulationSelected { id: String },

    /// Index, playing flag or speed changed
    PlaybackChanged { status: PlaybackStatus },

    /// A packet started moving
    PacketArmed { ticket: StepTicket, from: NodeId, to: NodeId },

    /// A packet arrived (or was skipped because an endpoint is unresolved)
    PacketCompleted { ticket: StepTicket },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_input_parses_without_target() {
        let input: PointerInput = serde_json::from_str(r#"{"pointer":1,"x":4.0,"y":2.5}"#).unwrap();
        assert_eq!(input.position(), DVec2::new(4.0, 2.5));
        assert_eq!(input.target, None);
    }

    #[test]
    fn pointer_input_parses_node_target() {
        let input: PointerInput = serde_json::from_str(
            r#"{"pointer":1,"x":0,"y":0,"target":{"kind":"node","node":"backend"}}"#,
        )
        .unwrap();
        assert_eq!(input.target, Some(HitTarget::Node("backend".into())));
    }

    #[test]
    fn event_serialization() {
        let event = CanvasEvent::PacketCompleted {
            ticket: StepTicket { epoch: 3, index: 1 },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("PacketCompleted"));
        assert!(json.contains("\"epoch\":3"));
    }
}
