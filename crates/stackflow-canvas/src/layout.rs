//! Node layout: base positions from container size plus user drag offsets.

use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use stackflow_catalog::{ArchitectureNode, LayoutRatio, NodeId};

use crate::error::{CanvasError, Result};

/// Measured size of the canvas container, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    /// Validate and build a container size.
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if usable(width) && usable(height) {
            Ok(Self { width, height })
        } else {
            Err(CanvasError::InvalidContainer { width, height })
        }
    }

    /// Centre point, used as the zoom origin.
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Apply the fractional layout table to a container.
pub fn compute_base_positions(
    nodes: &[ArchitectureNode],
    size: ContainerSize,
) -> HashMap<NodeId, DVec2> {
    nodes
        .iter()
        .map(|n| (n.id.clone(), ratio_to_world(n.layout, size)))
        .collect()
}

#[inline]
fn ratio_to_world(ratio: LayoutRatio, size: ContainerSize) -> DVec2 {
    DVec2::new(size.width * ratio.x, size.height * ratio.y)
}

/// Tracks base positions and per-node drag offsets.
///
/// Base positions exist only after the first [`resize`](Self::resize).
/// Until then every node is unresolved and must not be drawn.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    nodes: Vec<ArchitectureNode>,
    container: Option<ContainerSize>,
    base: HashMap<NodeId, DVec2>,
    offsets: HashMap<NodeId, DVec2>,
}

impl LayoutEngine {
    /// Create an unmeasured layout with zero offsets for every node.
    pub fn new(nodes: &[ArchitectureNode]) -> Self {
        let offsets = nodes.iter().map(|n| (n.id.clone(), DVec2::ZERO)).collect();
        Self {
            nodes: nodes.to_vec(),
            container: None,
            base: HashMap::new(),
            offsets,
        }
    }

    pub fn container(&self) -> Option<ContainerSize> {
        self.container
    }

    pub fn is_measured(&self) -> bool {
        self.container.is_some()
    }

    /// Zoom origin: container centre, or the world origin before measurement.
    pub fn center(&self) -> DVec2 {
        self.container.map(|c| c.center()).unwrap_or(DVec2::ZERO)
    }

    /// Recompute base positions for a new container size.
    ///
    /// Offsets are kept. Returns `Ok(false)` if the size did not change.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<bool> {
        let size = ContainerSize::new(width, height)?;
        if self.container == Some(size) {
            return Ok(false);
        }
        self.base = compute_base_positions(&self.nodes, size);
        self.container = Some(size);
        tracing::debug!(width, height, "recomputed base positions");
        Ok(true)
    }

    pub fn base_position(&self, id: &str) -> Option<DVec2> {
        self.base.get(id).copied()
    }

    pub fn offset(&self, id: &str) -> Option<DVec2> {
        self.offsets.get(id).copied()
    }

    /// `base + offset`, or `None` while the node is unresolved.
    pub fn resolved_position(&self, id: &str) -> Option<DVec2> {
        let base = self.base.get(id)?;
        let offset = self.offsets.get(id).copied().unwrap_or(DVec2::ZERO);
        Some(*base + offset)
    }

    /// Resolved positions in catalog order, skipping unresolved nodes.
    pub fn resolved_positions(&self) -> impl Iterator<Item = (&ArchitectureNode, DVec2)> + '_ {
        self.nodes
            .iter()
            .filter_map(|n| self.resolved_position(n.id.as_str()).map(|p| (n, p)))
    }

    /// Add a world-space delta to a node's offset. Returns the new offset.
    pub fn apply_offset_delta(&mut self, id: &str, delta: DVec2) -> Result<DVec2> {
        let offset = self
            .offsets
            .get_mut(id)
            .ok_or_else(|| CanvasError::UnknownNode(id.to_owned()))?;
        *offset += delta;
        Ok(*offset)
    }

    /// Replace a node's offset.
    pub fn set_offset(&mut self, id: &str, offset: DVec2) -> Result<()> {
        let slot = self
            .offsets
            .get_mut(id)
            .ok_or_else(|| CanvasError::UnknownNode(id.to_owned()))?;
        *slot = offset;
        Ok(())
    }

    pub fn reset_all_offsets(&mut self) {
        for offset in self.offsets.values_mut() {
            *offset = DVec2::ZERO;
        }
    }

    pub fn nodes(&self) -> &[ArchitectureNode] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackflow_catalog::builtin_nodes;

    fn measured() -> LayoutEngine {
        let mut layout = LayoutEngine::new(&builtin_nodes());
        layout.resize(1000.0, 600.0).unwrap();
        layout
    }

    #[test]
    fn unmeasured_nodes_are_unresolved() {
        let layout = LayoutEngine::new(&builtin_nodes());
        assert!(!layout.is_measured());
        assert_eq!(layout.resolved_position("browser"), None);
        assert_eq!(layout.resolved_positions().count(), 0);
    }

    #[test]
    fn base_positions_follow_ratio_table() {
        let layout = measured();
        assert_eq!(layout.base_position("browser"), Some(DVec2::new(100.0, 330.0)));
        assert_eq!(layout.base_position("auth"), Some(DVec2::new(450.0, 120.0)));
        assert_eq!(layout.base_position("websocket"), Some(DVec2::new(520.0, 510.0)));
    }

    #[test]
    fn compute_is_deterministic() {
        let nodes = builtin_nodes();
        let size = ContainerSize::new(800.0, 400.0).unwrap();
        assert_eq!(compute_base_positions(&nodes, size), compute_base_positions(&nodes, size));
    }

    #[test]
    fn offset_is_added_to_base() {
        let mut layout = measured();
        layout.apply_offset_delta("backend", DVec2::new(10.0, -5.0)).unwrap();
        layout.apply_offset_delta("backend", DVec2::new(1.0, 1.0)).unwrap();
        let base = layout.base_position("backend").unwrap();
        assert_eq!(layout.resolved_position("backend"), Some(base + DVec2::new(11.0, -4.0)));
    }

    #[test]
    fn resize_keeps_offsets() {
        let mut layout = measured();
        layout.set_offset("database", DVec2::new(20.0, 20.0)).unwrap();
        assert!(layout.resize(500.0, 300.0).unwrap());
        assert_eq!(layout.base_position("database"), Some(DVec2::new(380.0, 165.0)));
        assert_eq!(layout.offset("database"), Some(DVec2::new(20.0, 20.0)));
    }

    #[test]
    fn same_size_is_not_a_change() {
        let mut layout = measured();
        assert!(!layout.resize(1000.0, 600.0).unwrap());
    }

    #[test]
    fn rejects_degenerate_container() {
        let mut layout = measured();
        assert!(layout.resize(0.0, 600.0).is_err());
        assert!(layout.resize(f64::NAN, 600.0).is_err());
        assert_eq!(layout.container(), Some(ContainerSize { width: 1000.0, height: 600.0 }));
    }

    #[test]
    fn unknown_node_offset_is_an_error() {
        let mut layout = measured();
        assert_eq!(
            layout.set_offset("mainframe", DVec2::ONE),
            Err(CanvasError::UnknownNode("mainframe".into()))
        );
    }

    #[test]
    fn reset_restores_base_positions() {
        let mut layout = measured();
        for node in builtin_nodes() {
            layout.apply_offset_delta(node.id.as_str(), DVec2::new(7.0, 3.0)).unwrap();
        }
        layout.reset_all_offsets();
        for node in builtin_nodes() {
            let id = node.id.as_str();
            assert_eq!(layout.resolved_position(id), layout.base_position(id));
        }
    }
}
