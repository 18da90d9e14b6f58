//! Fixed-interval clock feeding `CanvasController::tick`.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::server::AppState;

/// Tick the canvas forever at `period`, passing the real elapsed time.
pub async fn run(state: Arc<AppState>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last = Instant::now();
    tracing::debug!(?period, "tick driver started");
    loop {
        let now = interval.tick().await;
        let dt = now.saturating_duration_since(last);
        last = now;
        state.tick(dt).await;
    }
}
