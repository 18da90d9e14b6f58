//! Command vocabulary shared by the REST routes and the WebSocket.

use serde::{Deserialize, Serialize};
use stackflow_canvas::{
    CanvasController, CanvasFrame, PlaybackSpeed, PlaybackStatus, PointerInput, Propagation,
    Result, ViewTransform, WheelInput, WheelOutcome,
};

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A single command against the canvas.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    GetFrame,
    GetStatus,
    SelectSimulation { id: String },
    Play,
    Pause,
    Next,
    Reset,
    SetSpeed { speed: PlaybackSpeed },
    ZoomIn,
    ZoomOut,
    ResetView,
    Resize { width: f64, height: f64 },
    Pointer {
        phase: PointerPhase,
        #[serde(flatten)]
        input: PointerInput,
    },
    Wheel(WheelInput),
}

/// Response to a [`Command`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    Frame(Box<CanvasFrame>),
    Status(PlaybackStatus),
    View(ViewTransform),
    Pointer { propagation: Option<Propagation> },
    Wheel { outcome: WheelOutcome, prevent_default: bool },
    Error { message: String },
}

impl Command {
    /// Run against the controller.
    pub fn apply(self, canvas: &mut CanvasController) -> Result<Reply> {
        let reply = match self {
            Command::GetFrame => Reply::Frame(Box::new(canvas.frame())),
            Command::GetStatus => Reply::Status(canvas.status()),
            Command::SelectSimulation { id } => {
                canvas.select_simulation(&id)?;
                Reply::Status(canvas.status())
            }
            Command::Play => {
                canvas.play();
                Reply::Status(canvas.status())
            }
            Command::Pause => {
                canvas.pause();
                Reply::Status(canvas.status())
            }
            Command::Next => {
                canvas.next();
                Reply::Status(canvas.status())
            }
            Command::Reset => {
                canvas.reset();
                Reply::Status(canvas.status())
            }
            Command::SetSpeed { speed } => {
                canvas.set_speed(speed);
                Reply::Status(canvas.status())
            }
            Command::ZoomIn => {
                canvas.zoom_in();
                Reply::View(canvas.view().transform())
            }
            Command::ZoomOut => {
                canvas.zoom_out();
                Reply::View(canvas.view().transform())
            }
            Command::ResetView => {
                canvas.reset_view();
                Reply::View(canvas.view().transform())
            }
            Command::Resize { width, height } => {
                canvas.resize(width, height)?;
                Reply::Frame(Box::new(canvas.frame()))
            }
            Command::Pointer { phase, input } => {
                let propagation = match phase {
                    PointerPhase::Down => Some(canvas.pointer_down(&input)),
                    PointerPhase::Move => {
                        canvas.pointer_move(&input);
                        None
                    }
                    PointerPhase::Up => {
                        canvas.pointer_up(&input);
                        None
                    }
                    PointerPhase::Cancel => {
                        canvas.pointer_cancel(input.pointer);
                        None
                    }
                };
                Reply::Pointer { propagation }
            }
            Command::Wheel(input) => {
                let outcome = canvas.wheel(input);
                Reply::Wheel {
                    outcome,
                    prevent_default: outcome.prevent_default(),
                }
            }
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackflow_canvas::{CanvasConfig, CanvasError};
    use stackflow_catalog::Catalog;
    use std::sync::Arc;

    fn canvas() -> CanvasController {
        let catalog = Arc::new(Catalog::builtin().unwrap());
        let mut canvas = CanvasController::new(catalog, CanvasConfig::default()).unwrap();
        canvas.resize(1000.0, 600.0).unwrap();
        canvas
    }

    #[test]
    fn parses_tagged_commands() {
        let cmd: Command = serde_json::from_str(r#"{"type":"select_simulation","id":"login"}"#).unwrap();
        assert_eq!(cmd, Command::SelectSimulation { id: "login".into() });

        let cmd: Command = serde_json::from_str(r#"{"type":"set_speed","speed":"fast"}"#).unwrap();
        assert_eq!(cmd, Command::SetSpeed { speed: PlaybackSpeed::Fast });

        let cmd: Command =
            serde_json::from_str(r#"{"type":"pointer","phase":"down","pointer":1,"x":3,"y":4}"#)
                .unwrap();
        assert!(matches!(cmd, Command::Pointer { phase: PointerPhase::Down, .. }));

        let cmd: Command =
            serde_json::from_str(r#"{"type":"wheel","delta_y":-120,"ctrl":true}"#).unwrap();
        assert!(matches!(cmd, Command::Wheel(WheelInput { ctrl: true, .. })));
    }

    #[test]
    fn playback_commands_reply_with_status() {
        let mut canvas = canvas();
        Command::SelectSimulation { id: "login".into() }
            .apply(&mut canvas)
            .unwrap();
        let reply = Command::Play.apply(&mut canvas).unwrap();
        match reply {
            Reply::Status(status) => {
                assert!(status.is_playing);
                assert_eq!(status.current_step_index, 0);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[test]
    fn unknown_simulation_is_rejected() {
        let mut canvas = canvas();
        let err = Command::SelectSimulation { id: "nope".into() }
            .apply(&mut canvas)
            .unwrap_err();
        assert_eq!(err, CanvasError::UnknownSimulation("nope".into()));
    }

    #[test]
    fn wheel_reply_carries_prevent_default() {
        let mut canvas = canvas();
        let reply = Command::Wheel(WheelInput {
            delta_y: 1.0,
            ctrl: false,
            meta: true,
        })
        .apply(&mut canvas)
        .unwrap();
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "wheel");
        assert_eq!(json["prevent_default"], true);
        assert_eq!(canvas.view().scale(), 0.9);
    }

    #[test]
    fn pointer_down_on_node_stops_propagation() {
        let mut canvas = canvas();
        // browser at (100, 330)
        let reply = Command::Pointer {
            phase: PointerPhase::Down,
            input: PointerInput::new(1, 100.0, 330.0),
        }
        .apply(&mut canvas)
        .unwrap();
        assert!(matches!(
            reply,
            Reply::Pointer {
                propagation: Some(Propagation::Stop)
            }
        ));
    }
}
