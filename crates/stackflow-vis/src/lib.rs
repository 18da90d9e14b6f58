//! Stackflow Canvas Host
//!
//! Serves the architecture canvas to a browser and drives its clock.
//!
//! # Architecture
//!
//! - **Driver**: Fixed-interval tokio clock calling `CanvasController::tick`
//! - **REST API**: Select simulations, control playback, pan/zoom, forward pointer input
//! - **WebSocket**: Pushes a `CanvasFrame` whenever the canvas changed and accepts the same commands
//!
//! # Usage
//!
//! ```ignore
//! let config = VisConfig::from_env();
//! let server = VisServer::from_config(config)?;
//! server.serve().await?;
//! ```

mod command;
mod config;
mod driver;
mod error;
mod server;

pub use command::{Command, PointerPhase, Reply};
pub use config::VisConfig;
pub use driver::run as run_driver;
pub use error::{Result, VisError};
pub use server::{AppState, SimulationSummary, VisServer};
