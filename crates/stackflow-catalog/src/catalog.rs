//! Read-only store of nodes, connections and simulations.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use crate::error::{CatalogError, Result};
use crate::node::{builtin_connections, builtin_nodes, ArchitectureNode, Connection, NodeId};
use crate::simulation::{Category, Simulation};

const BUILTIN_SCRIPTS: &str = include_str!("../data/simulations.json");

/// Everything the canvas needs that never changes at runtime.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    nodes: Vec<ArchitectureNode>,
    connections: Vec<Connection>,
    simulations: Vec<Simulation>,
}

impl Catalog {
    /// Build and validate a catalog from parts.
    pub fn new(
        nodes: Vec<ArchitectureNode>,
        connections: Vec<Connection>,
        simulations: Vec<Simulation>,
    ) -> Result<Self> {
        let catalog = Self {
            nodes,
            connections,
            simulations,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The bundled node table and step scripts.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_SCRIPTS)
    }

    /// Parse a JSON array of simulations against the built-in node table.
    pub fn from_json(json: &str) -> Result<Self> {
        let simulations: Vec<Simulation> = serde_json::from_str(json)?;
        Self::new(builtin_nodes(), builtin_connections(), simulations)
    }

    /// Load step scripts from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            simulations = catalog.simulations.len(),
            "loaded step scripts"
        );
        Ok(catalog)
    }

    /// Check that every simulation is non-empty, uniquely named, and only
    /// references nodes in the catalog.
    pub fn validate(&self) -> Result<()> {
        let known: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut seen = HashSet::new();

        for sim in &self.simulations {
            if !seen.insert(sim.id.as_str()) {
                return Err(CatalogError::DuplicateSimulation(sim.id.clone()));
            }
            if sim.is_empty() {
                return Err(CatalogError::EmptySimulation(sim.id.clone()));
            }
            for step in &sim.steps {
                for node in [&step.from, &step.to] {
                    if !known.contains(node.as_str()) {
                        return Err(CatalogError::UnknownNode {
                            simulation: sim.id.clone(),
                            step: step.id,
                            node: node.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[ArchitectureNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&ArchitectureNode> {
        self.nodes.iter().find(|n| n.id.as_str() == id)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn simulations(&self) -> &[Simulation] {
        &self.simulations
    }

    pub fn simulation(&self, id: &str) -> Option<&Simulation> {
        self.simulations.iter().find(|s| s.id == id)
    }

    /// Simulations grouped by category, groups in first-seen order.
    pub fn by_category(&self) -> Vec<(Category, Vec<&Simulation>)> {
        let mut groups: Vec<(Category, Vec<&Simulation>)> = Vec::new();
        for sim in &self.simulations {
            match groups.iter_mut().find(|(c, _)| *c == sim.category) {
                Some((_, sims)) => sims.push(sim),
                None => groups.push((sim.category, vec![sim])),
            }
        }
        groups
    }

    /// Node ids in display order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.iter().map(|n| &n.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{SimulationStep, StepKind};
    use std::io::Write;

    fn step(id: u32, from: &str, to: &str) -> SimulationStep {
        SimulationStep {
            id,
            from: from.into(),
            to: to.into(),
            payload_label: "payload".into(),
            description: String::new(),
            kind: StepKind::Request,
        }
    }

    fn sim(id: &str, steps: Vec<SimulationStep>) -> Simulation {
        Simulation {
            id: id.into(),
            name: id.into(),
            description: String::new(),
            category: Category::Base,
            steps,
        }
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.nodes().len(), 10);
        assert_eq!(catalog.connections().len(), 11);
        assert_eq!(catalog.simulations().len(), 20);
    }

    #[test]
    fn login_and_register_have_eight_steps() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.simulation("login").unwrap().len(), 8);
        assert_eq!(catalog.simulation("register").unwrap().len(), 8);
    }

    #[test]
    fn rejects_unknown_node() {
        let result = Catalog::new(
            builtin_nodes(),
            builtin_connections(),
            vec![sim("bad", vec![step(1, "browser", "mainframe")])],
        );
        match result {
            Err(CatalogError::UnknownNode { node, step, .. }) => {
                assert_eq!(node, "mainframe");
                assert_eq!(step, 1);
            }
            other => panic!("expected UnknownNode, got {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_simulation() {
        let result = Catalog::new(builtin_nodes(), builtin_connections(), vec![sim("empty", vec![])]);
        assert!(matches!(result, Err(CatalogError::EmptySimulation(id)) if id == "empty"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = Catalog::new(
            builtin_nodes(),
            builtin_connections(),
            vec![
                sim("dup", vec![step(1, "browser", "frontend")]),
                sim("dup", vec![step(1, "frontend", "backend")]),
            ],
        );
        assert!(matches!(result, Err(CatalogError::DuplicateSimulation(_))));
    }

    #[test]
    fn groups_preserve_first_seen_order() {
        let catalog = Catalog::builtin().unwrap();
        let groups = catalog.by_category();
        assert_eq!(groups[0].0, Category::Base);
        let total: usize = groups.iter().map(|(_, sims)| sims.len()).sum();
        assert_eq!(total, catalog.simulations().len());
    }

    #[test]
    fn load_reads_script_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"ping","name":"Ping","steps":[{{"id":1,"from":"browser","to":"backend","data":"GET /ping","type":"request"}}]}}]"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.simulations().len(), 1);
        assert!(catalog.simulation("ping").is_some());
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(Catalog::load(file.path()), Err(CatalogError::Parse(_))));
    }
}
