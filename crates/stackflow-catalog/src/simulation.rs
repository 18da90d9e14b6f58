//! Simulations and their step scripts.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// Semantics of a step; drives packet color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Request,
    Response,
    Error,
}

/// One labeled transition between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStep {
    /// Sequence identity, 1-based in the bundled scripts
    pub id: u32,
    pub from: NodeId,
    pub to: NodeId,
    /// Short payload shown on the packet
    #[serde(rename = "data")]
    pub payload_label: String,
    /// One-sentence explanation shown next to the canvas
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
}

impl SimulationStep {
    /// True if `node` is either endpoint of this step.
    pub fn touches(&self, node: &NodeId) -> bool {
        self.from == *node || self.to == *node
    }
}

/// Grouping used by the simulation picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Base,
    Crud,
    Errors,
    Payments,
    Files,
    Auth,
    Performance,
    Realtime,
}

impl Category {
    /// Human-readable group label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Base => "Basics",
            Category::Crud => "CRUD",
            Category::Errors => "Error Handling",
            Category::Payments => "Payments",
            Category::Files => "File Upload",
            Category::Auth => "Authentication",
            Category::Performance => "Performance",
            Category::Realtime => "Real-Time",
        }
    }
}

/// A named, ordered step script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    pub steps: Vec<SimulationStep>,
}

impl Simulation {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Index of the final step, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    pub fn step(&self, index: usize) -> Option<&SimulationStep> {
        self.steps.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_uses_wire_field_names() {
        let json = r#"{"id":1,"from":"browser","to":"frontend","data":"POST /login","type":"request"}"#;
        let step: SimulationStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.payload_label, "POST /login");
        assert_eq!(step.kind, StepKind::Request);
        assert!(step.description.is_empty());
    }

    #[test]
    fn category_defaults_to_base() {
        let json = r#"{"id":"x","name":"X","steps":[]}"#;
        let sim: Simulation = serde_json::from_str(json).unwrap();
        assert_eq!(sim.category, Category::Base);
        assert_eq!(sim.last_index(), None);
    }

    #[test]
    fn touches_either_endpoint() {
        let step = SimulationStep {
            id: 1,
            from: "backend".into(),
            to: "database".into(),
            payload_label: "SELECT".into(),
            description: String::new(),
            kind: StepKind::Request,
        };
        assert!(step.touches(&"backend".into()));
        assert!(step.touches(&"database".into()));
        assert!(!step.touches(&"cache".into()));
    }
}
