//! Render snapshot handed to the presentation layer.

use glam::DVec2;
use serde::Serialize;
use stackflow_catalog::{NodeId, NodeKind, StepKind};

use crate::layout::ContainerSize;
use crate::playback::{PlaybackStatus, StepTicket, TimelineEntry};
use crate::view::ViewTransform;

/// Everything needed to draw one frame of the canvas.
///
/// Positions are world space; the renderer applies `view` on top.
/// Unresolved nodes, and edges touching them, are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanvasFrame {
    pub container: Option<ContainerSize>,
    pub view: ViewTransform,
    pub zoom_percent: u32,
    pub nodes: Vec<NodeFrame>,
    pub edges: Vec<EdgeFrame>,
    pub packet: Option<PacketFrame>,
    pub step: Option<StepFrame>,
    pub playback: PlaybackStatus,
    pub timeline: Vec<TimelineEntry>,
    pub panning: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFrame {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub icon: String,
    pub position: DVec2,
    /// Endpoint of the current step
    pub active: bool,
    pub dragging: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeFrame {
    pub from: NodeId,
    pub to: NodeId,
    pub from_position: DVec2,
    pub to_position: DVec2,
    /// Joins the current step's endpoints, in either direction
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketFrame {
    pub ticket: StepTicket,
    pub label: String,
    pub kind: StepKind,
    pub position: DVec2,
    pub progress: f64,
    pub opacity: f64,
    pub scale: f64,
}

/// The step on display, for the explanation panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepFrame {
    pub index: usize,
    /// 1-based position for "Step n/m"
    pub number: usize,
    pub total: usize,
    pub from: NodeId,
    pub to: NodeId,
    pub payload_label: String,
    pub description: String,
    pub kind: StepKind,
}
