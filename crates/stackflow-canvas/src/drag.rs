//! Pointer gesture state machine: canvas pan, node drag, click.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use stackflow_catalog::NodeId;

use crate::layout::LayoutEngine;
use crate::view::ViewController;

/// Pointer identifier as reported by the host (one per finger / mouse).
pub type PointerId = u32;

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "node", rename_all = "snake_case")]
pub enum HitTarget {
    Background,
    Node(NodeId),
}

/// Whether the host should let the pointer-down reach the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Propagation {
    Continue,
    /// The node claimed the gesture; canvas panning must not see it.
    Stop,
}

/// The single active gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    PanningCanvas {
        pointer: PointerId,
        start: DVec2,
        last: DVec2,
    },
    DraggingNode {
        node: NodeId,
        pointer: PointerId,
        start_screen: DVec2,
        start_offset: DVec2,
    },
}

/// Change requested by a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum DragEffect {
    /// Add a screen-space delta to the global pan.
    Pan { delta: DVec2 },
    /// Set a node's offset (world space, absolute).
    MoveNode { node: NodeId, offset: DVec2 },
    /// Gesture ended without leaving the click slop.
    Click { target: HitTarget },
    /// Gesture ended after moving.
    Released,
}

/// Interprets pointer events. At most one gesture is active at a time.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    click_slop: f64,
    /// Furthest distance from the gesture start, in screen px
    travel: f64,
}

impl DragController {
    pub fn new(click_slop: f64) -> Self {
        Self {
            state: DragState::Idle,
            click_slop,
            travel: 0.0,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    /// Node currently being dragged, if any.
    pub fn dragging_node(&self) -> Option<&NodeId> {
        match &self.state {
            DragState::DraggingNode { node, .. } => Some(node),
            _ => None,
        }
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.state, DragState::PanningCanvas { .. })
    }

    /// Start a gesture. Ignored while another gesture is active.
    pub fn pointer_down(
        &mut self,
        pointer: PointerId,
        position: DVec2,
        target: HitTarget,
        layout: &LayoutEngine,
    ) -> Propagation {
        if !self.is_idle() {
            tracing::trace!(pointer, "pointer down ignored, gesture already active");
            return match target {
                HitTarget::Node(_) => Propagation::Stop,
                HitTarget::Background => Propagation::Continue,
            };
        }

        self.travel = 0.0;
        match target {
            HitTarget::Node(node) => {
                let Some(start_offset) = layout.offset(node.as_str()) else {
                    tracing::debug!(%node, "pointer down on unknown node");
                    return Propagation::Continue;
                };
                tracing::debug!(%node, pointer, "node drag started");
                self.state = DragState::DraggingNode {
                    node,
                    pointer,
                    start_screen: position,
                    start_offset,
                };
                Propagation::Stop
            }
            HitTarget::Background => {
                tracing::debug!(pointer, "canvas pan started");
                self.state = DragState::PanningCanvas {
                    pointer,
                    start: position,
                    last: position,
                };
                Propagation::Continue
            }
        }
    }

    /// Continue the gesture. Moves from other pointers are ignored.
    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        position: DVec2,
        view: &ViewController,
    ) -> Option<DragEffect> {
        match &mut self.state {
            DragState::Idle => None,
            DragState::PanningCanvas {
                pointer: tracked,
                start,
                last,
            } => {
                if *tracked != pointer {
                    return None;
                }
                let delta = position - *last;
                *last = position;
                self.travel = self.travel.max(position.distance(*start));
                Some(DragEffect::Pan { delta })
            }
            DragState::DraggingNode {
                node,
                pointer: tracked,
                start_screen,
                start_offset,
            } => {
                if *tracked != pointer {
                    return None;
                }
                let screen_delta = position - *start_screen;
                self.travel = self.travel.max(screen_delta.length());
                let offset = *start_offset + view.screen_delta_to_world_delta(screen_delta);
                Some(DragEffect::MoveNode {
                    node: node.clone(),
                    offset,
                })
            }
        }
    }

    /// End the gesture for the tracked pointer.
    pub fn pointer_up(&mut self, pointer: PointerId) -> Option<DragEffect> {
        let target = match &self.state {
            DragState::Idle => return None,
            DragState::PanningCanvas { pointer: tracked, .. } if *tracked == pointer => {
                HitTarget::Background
            }
            DragState::DraggingNode {
                node,
                pointer: tracked,
                ..
            } if *tracked == pointer => HitTarget::Node(node.clone()),
            _ => return None,
        };

        self.state = DragState::Idle;
        if self.travel <= self.click_slop {
            Some(DragEffect::Click { target })
        } else {
            Some(DragEffect::Released)
        }
    }

    /// Abort the gesture for the tracked pointer. Returns whether anything ended.
    pub fn pointer_cancel(&mut self, pointer: PointerId) -> bool {
        let tracked = match &self.state {
            DragState::Idle => return false,
            DragState::PanningCanvas { pointer, .. } => *pointer,
            DragState::DraggingNode { pointer, .. } => *pointer,
        };
        if tracked != pointer {
            return false;
        }
        self.state = DragState::Idle;
        true
    }

    /// Drop any gesture, e.g. on teardown.
    pub fn clear(&mut self) {
        self.state = DragState::Idle;
        self.travel = 0.0;
    }
}
