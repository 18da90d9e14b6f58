//! Stackflow Canvas Controller
//!
//! Headless state behind the interactive architecture diagram: node layout,
//! pan and zoom, pointer gestures, and step-by-step playback of a
//! simulation with a packet travelling along each step.
//!
//! # Architecture
//!
//! - **Layout**: Base positions from the container size plus per-node drag offsets
//! - **View**: Global pan/zoom, clamped and rounded to two decimals
//! - **Drag**: Pointer gestures; a node drag never pans the canvas
//! - **Playback**: Step sequencer with epoch-stamped timer tickets
//! - **Controller**: Owns all of the above, emits [`CanvasEvent`]s and builds [`CanvasFrame`]s
//!
//! # Usage
//!
//! ```ignore
//! let catalog = Arc::new(Catalog::builtin()?);
//! let mut canvas = CanvasController::new(catalog, CanvasConfig::default())?;
//! canvas.resize(1200.0, 700.0)?;
//! canvas.select_simulation("login")?;
//! canvas.play();
//!
//! loop {
//!     canvas.tick(Duration::from_millis(16));
//!     render(&canvas.frame());
//! }
//! ```

mod config;
mod controller;
mod drag;
mod error;
mod events;
mod frame;
mod layout;
mod packet;
mod playback;
mod view;

pub use config::CanvasConfig;
pub use controller::{CanvasController, ListenerId};
pub use drag::{DragController, DragEffect, DragState, HitTarget, PointerId, Propagation};
pub use error::{CanvasError, Result};
pub use events::{CanvasEvent, PointerInput};
pub use frame::{CanvasFrame, EdgeFrame, NodeFrame, PacketFrame, StepFrame};
pub use layout::{compute_base_positions, ContainerSize, LayoutEngine};
pub use packet::PacketAnimation;
pub use playback::{
    ArmedStep, Completion, Playback, PlaybackSpeed, PlaybackState, PlaybackStatus, StepStatus,
    StepTicket, TimelineEntry,
};
pub use view::{ViewController, ViewTransform, WheelInput, WheelOutcome};

pub use glam::DVec2;
