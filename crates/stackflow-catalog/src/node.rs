//! Architecture nodes, connections and the fixed layout table.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable key of an architecture node (`"browser"`, `"backend"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Category of an architecture element. Purely descriptive; drives styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Browser,
    Frontend,
    Backend,
    Database,
    /// Auxiliary services: auth, email, payment, storage, cache, websocket
    External,
}

/// Fractional position of a node inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutRatio {
    /// Fraction of container width (0.0 - 1.0)
    pub x: f64,
    /// Fraction of container height (0.0 - 1.0)
    pub y: f64,
}

impl LayoutRatio {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One element of the architecture diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    pub description: String,
    /// Icon name understood by the presentation layer
    pub icon: String,
    pub layout: LayoutRatio,
}

/// A static edge between two nodes, used for line rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
}

impl Connection {
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// True if this edge joins `a` and `b`, in either direction.
    pub fn joins(&self, a: &NodeId, b: &NodeId) -> bool {
        (self.from == *a && self.to == *b) || (self.from == *b && self.to == *a)
    }
}

const MAIN_ROW: f64 = 0.55;
const TOP_ROW: f64 = 0.2;
const BOTTOM_ROW: f64 = 0.85;

/// (id, kind, name, description, icon, x ratio, y ratio)
type NodeRow = (&'static str, NodeKind, &'static str, &'static str, &'static str, f64, f64);

const NODE_TABLE: [NodeRow; 10] = [
    ("browser", NodeKind::Browser, "Browser", "The user's browser sends requests and renders pages", "Monitor", 0.10, MAIN_ROW),
    ("frontend", NodeKind::Frontend, "Frontend", "Single-page app: validation, state and UI", "Layout", 0.32, MAIN_ROW),
    ("backend", NodeKind::Backend, "Backend", "API server: business logic and authorization", "Server", 0.54, MAIN_ROW),
    ("database", NodeKind::Database, "Database", "Persistent storage for users and records", "Database", 0.76, MAIN_ROW),
    ("auth", NodeKind::External, "Auth", "Identity provider issuing and verifying tokens", "Shield", 0.45, TOP_ROW),
    ("email", NodeKind::External, "Email", "Transactional email delivery", "Mail", 0.58, TOP_ROW),
    ("payment", NodeKind::External, "Payment", "Payment gateway processing charges", "CreditCard", 0.71, TOP_ROW),
    ("storage", NodeKind::External, "Storage", "Object storage for uploaded files", "HardDrive", 0.12, BOTTOM_ROW),
    ("cache", NodeKind::External, "Cache", "In-memory cache for hot data", "Zap", 0.32, BOTTOM_ROW),
    ("websocket", NodeKind::External, "WebSocket", "Real-time channel pushing events to clients", "Radio", 0.52, BOTTOM_ROW),
];

const CONNECTION_TABLE: [(&str, &str); 11] = [
    ("browser", "frontend"),
    ("frontend", "backend"),
    ("backend", "database"),
    ("backend", "auth"),
    ("backend", "email"),
    ("backend", "payment"),
    ("backend", "storage"),
    ("backend", "cache"),
    ("backend", "websocket"),
    ("frontend", "websocket"),
    ("frontend", "payment"),
];

/// The built-in node catalog, in display order.
pub fn builtin_nodes() -> Vec<ArchitectureNode> {
    NODE_TABLE
        .iter()
        .map(|&(id, kind, name, description, icon, x, y)| ArchitectureNode {
            id: NodeId::from(id),
            kind,
            name: name.to_owned(),
            description: description.to_owned(),
            icon: icon.to_owned(),
            layout: LayoutRatio::new(x, y),
        })
        .collect()
}

/// The built-in edge list.
pub fn builtin_connections() -> Vec<Connection> {
    CONNECTION_TABLE
        .iter()
        .map(|&(from, to)| Connection::new(from, to))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn node_ids_are_unique() {
        let nodes = builtin_nodes();
        let ids: HashSet<_> = nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids.len(), nodes.len());
    }

    #[test]
    fn ratios_stay_inside_container() {
        for node in builtin_nodes() {
            assert!((0.0..=1.0).contains(&node.layout.x), "{}", node.id);
            assert!((0.0..=1.0).contains(&node.layout.y), "{}", node.id);
        }
    }

    #[test]
    fn connections_reference_known_nodes() {
        let ids: HashSet<_> = builtin_nodes().into_iter().map(|n| n.id).collect();
        for conn in builtin_connections() {
            assert!(ids.contains(&conn.from));
            assert!(ids.contains(&conn.to));
        }
    }

    #[test]
    fn connection_matches_either_direction() {
        let conn = Connection::new("browser", "frontend");
        assert!(conn.joins(&"browser".into(), &"frontend".into()));
        assert!(conn.joins(&"frontend".into(), &"browser".into()));
        assert!(!conn.joins(&"browser".into(), &"backend".into()));
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&NodeKind::External).unwrap();
        assert_eq!(json, "\"external\"");
    }
}
