//! Axum web server with WebSocket frame streaming.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stackflow_canvas::{
    CanvasController, CanvasFrame, PlaybackSpeed, PlaybackStatus, PointerInput, WheelInput,
};
use stackflow_catalog::{Catalog, Category};
use tokio::sync::{broadcast, Mutex};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::command::{Command, PointerPhase, Reply};
use crate::config::VisConfig;
use crate::driver;
use crate::error::{status_for, Result};

const FRAME_CHANNEL_CAPACITY: usize = 64;

/// Shared application state.
pub struct AppState {
    canvas: Mutex<CanvasController>,
    catalog: Arc<Catalog>,
    frames: broadcast::Sender<Arc<CanvasFrame>>,
    dirty: Arc<AtomicBool>,
}

impl AppState {
    /// Wrap a fresh controller. The controller's listener marks the state
    /// dirty so the next tick pushes a frame.
    pub fn new(catalog: Arc<Catalog>, config: &VisConfig) -> Result<Arc<Self>> {
        let mut canvas = CanvasController::new(catalog.clone(), config.canvas.clone())?;
        canvas.set_speed(config.speed);

        let dirty = Arc::new(AtomicBool::new(true));
        let flag = dirty.clone();
        canvas.subscribe(move |_| flag.store(true, Ordering::Relaxed));

        let (frames, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        Ok(Arc::new(Self {
            canvas: Mutex::new(canvas),
            catalog,
            frames,
            dirty,
        }))
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Run a command under the controller lock.
    pub async fn execute(&self, command: Command) -> stackflow_canvas::Result<Reply> {
        let mut canvas = self.canvas.lock().await;
        command.apply(&mut canvas)
    }

    pub async fn frame(&self) -> CanvasFrame {
        self.canvas.lock().await.frame()
    }

    pub async fn status(&self) -> PlaybackStatus {
        self.canvas.lock().await.status()
    }

    /// Advance the controller and push a frame if anything changed.
    pub async fn tick(&self, dt: Duration) -> bool {
        let mut canvas = self.canvas.lock().await;
        canvas.tick(dt);

        let changed = self.dirty.swap(false, Ordering::Relaxed) || canvas.packet().is_some();
        if changed && self.frames.receiver_count() > 0 {
            // lagging receivers just skip frames
            let _ = self.frames.send(Arc::new(canvas.frame()));
        }
        changed
    }

    /// Receive every frame pushed after this call.
    pub fn subscribe_frames(&self) -> broadcast::Receiver<Arc<CanvasFrame>> {
        self.frames.subscribe()
    }

    /// Drop controller listeners and in-flight work.
    pub async fn shutdown(&self) {
        self.canvas.lock().await.teardown();
    }
}

/// Host server for the canvas.
pub struct VisServer {
    state: Arc<AppState>,
    config: VisConfig,
}

impl VisServer {
    /// Create a server around an already loaded catalog.
    pub fn new(catalog: Arc<Catalog>, config: VisConfig) -> Result<Self> {
        Ok(Self {
            state: AppState::new(catalog, &config)?,
            config,
        })
    }

    /// Load the catalog named by the config, or the bundled one.
    pub fn from_config(config: VisConfig) -> Result<Self> {
        let catalog = match &config.scripts {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin()?,
        };
        tracing::info!(
            simulations = catalog.simulations().len(),
            nodes = catalog.nodes().len(),
            "catalog loaded"
        );
        Self::new(Arc::new(catalog), config)
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/", get(index_handler))
            // API routes
            .route("/api/status", get(status_handler))
            .route("/api/simulations", get(simulations_handler))
            .route("/api/frame", get(frame_handler))
            .route("/api/simulation", post(select_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/next", post(next_handler))
            .route("/api/playback/reset", post(reset_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/api/view/zoom-in", post(zoom_in_handler))
            .route("/api/view/zoom-out", post(zoom_out_handler))
            .route("/api/view/reset", post(reset_view_handler))
            .route("/api/resize", post(resize_handler))
            .route("/api/input/pointer", post(pointer_handler))
            .route("/api/input/wheel", post(wheel_handler))
            // WebSocket for frames and commands
            .route("/ws", get(ws_handler));

        let router = match &self.config.static_dir {
            Some(dir) => router.nest_service("/static", ServeDir::new(dir)),
            None => router,
        };

        router
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Bind, start the tick driver and serve until the listener fails.
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.config.addr).await?;
        tracing::info!("Stackflow canvas running on http://{}", listener.local_addr()?);

        let driver = tokio::spawn(driver::run(self.state.clone(), self.config.tick));
        let result = axum::serve(listener, self.router()).await;

        driver.abort();
        self.state.shutdown().await;
        result.map_err(Into::into)
    }
}

type ApiResult = std::result::Result<Json<Reply>, (StatusCode, Json<Reply>)>;

async fn run(state: &AppState, command: Command) -> ApiResult {
    state.execute(command).await.map(Json).map_err(|err| {
        tracing::debug!(%err, "command rejected");
        (
            status_for(&err),
            Json(Reply::Error {
                message: err.to_string(),
            }),
        )
    })
}

/// Serve the SVG canvas page.
async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    simulations: usize,
    nodes: usize,
    playback: PlaybackStatus,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        simulations: state.catalog().simulations().len(),
        nodes: state.catalog().nodes().len(),
        playback: state.status().await,
    })
}

/// One entry of the simulation picker.
#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub category_label: String,
    pub steps: usize,
}

async fn simulations_handler(State(state): State<Arc<AppState>>) -> Json<Vec<SimulationSummary>> {
    let summaries = state
        .catalog()
        .by_category()
        .into_iter()
        .flat_map(|(category, sims)| {
            sims.into_iter().map(move |sim| SimulationSummary {
                id: sim.id.clone(),
                name: sim.name.clone(),
                description: sim.description.clone(),
                category,
                category_label: category.label().to_owned(),
                steps: sim.len(),
            })
        })
        .collect();
    Json(summaries)
}

async fn frame_handler(State(state): State<Arc<AppState>>) -> Json<CanvasFrame> {
    Json(state.frame().await)
}

#[derive(Deserialize)]
struct SelectRequest {
    id: String,
}

async fn select_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectRequest>,
) -> ApiResult {
    run(&state, Command::SelectSimulation { id: req.id }).await
}

async fn play_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run(&state, Command::Play).await
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run(&state, Command::Pause).await
}

async fn next_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run(&state, Command::Next).await
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run(&state, Command::Reset).await
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed: PlaybackSpeed,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> ApiResult {
    run(&state, Command::SetSpeed { speed: req.speed }).await
}

async fn zoom_in_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run(&state, Command::ZoomIn).await
}

async fn zoom_out_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run(&state, Command::ZoomOut).await
}

async fn reset_view_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    run(&state, Command::ResetView).await
}

#[derive(Deserialize)]
struct ResizeRequest {
    width: f64,
    height: f64,
}

async fn resize_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResizeRequest>,
) -> ApiResult {
    run(
        &state,
        Command::Resize {
            width: req.width,
            height: req.height,
        },
    )
    .await
}

#[derive(Deserialize)]
struct PointerRequest {
    phase: PointerPhase,
    #[serde(flatten)]
    input: PointerInput,
}

async fn pointer_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PointerRequest>,
) -> ApiResult {
    run(
        &state,
        Command::Pointer {
            phase: req.phase,
            input: req.input,
        },
    )
    .await
}

async fn wheel_handler(
    State(state): State<Arc<AppState>>,
    Json(input): Json<WheelInput>,
) -> ApiResult {
    run(&state, Command::Wheel(input)).await
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    tracing::info!("canvas client connected");
    let mut frames = state.subscribe_frames();

    let initial = Reply::Frame(Box::new(state.frame().await));
    if send_reply(&mut socket, &initial).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<Command>(&text) {
                            Ok(command) => state.execute(command).await.unwrap_or_else(|err| Reply::Error {
                                message: err.to_string(),
                            }),
                            Err(err) => Reply::Error {
                                message: format!("bad command: {err}"),
                            },
                        };
                        if send_reply(&mut socket, &reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::warn!(%err, "websocket error");
                        break;
                    }
                    _ => {}
                }
            }
            frame = frames.recv() => {
                match frame {
                    Ok(frame) => {
                        let reply = Reply::Frame(Box::new(CanvasFrame::clone(&frame)));
                        if send_reply(&mut socket, &reply).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "client lagging, frames dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
    tracing::info!("canvas client disconnected");
}

async fn send_reply(socket: &mut WebSocket, reply: &Reply) -> std::result::Result<(), axum::Error> {
    match serde_json::to_string(reply) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(err) => {
            tracing::warn!(%err, "failed to encode reply");
            Ok(())
        }
    }
}
