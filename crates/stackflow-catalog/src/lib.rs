//! Stackflow Step Script Store
//!
//! Static data behind the Stackflow canvas: the architecture node catalog
//! with its fractional layout table, the edge list, and the bundled
//! simulations (login, file upload, payment flow, ...).
//!
//! Everything here is read-only once loaded. The canvas crate shares a
//! [`Catalog`] behind an `Arc` and never mutates it.
//!
//! # Usage
//!
//! ```ignore
//! let catalog = Catalog::builtin()?;
//! let login = catalog.simulation("login").unwrap();
//! assert_eq!(login.len(), 8);
//! ```

mod catalog;
mod error;
mod node;
mod simulation;

pub use catalog::Catalog;
pub use error::{CatalogError, Result};
pub use node::{
    builtin_connections, builtin_nodes, ArchitectureNode, Connection, LayoutRatio, NodeId, NodeKind,
};
pub use simulation::{Category, Simulation, SimulationStep, StepKind};
