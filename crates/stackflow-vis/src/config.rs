//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use stackflow_canvas::{CanvasConfig, PlaybackSpeed};

const DEFAULT_TICK_MS: u64 = 16;

/// Configuration for the host server.
#[derive(Debug, Clone)]
pub struct VisConfig {
    /// HTTP listen address
    pub addr: SocketAddr,

    /// JSON file replacing the bundled simulations
    pub scripts: Option<PathBuf>,

    /// Directory served under `/static`
    pub static_dir: Option<PathBuf>,

    /// Driver tick interval
    pub tick: Duration,

    /// Initial playback speed
    pub speed: PlaybackSpeed,

    /// Canvas tunables
    pub canvas: CanvasConfig,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            scripts: None,
            static_dir: None,
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            speed: PlaybackSpeed::Normal,
            canvas: CanvasConfig::default(),
        }
    }
}

impl VisConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable values are
    /// logged and replaced by their default.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let addr = parse_or(get("STACKFLOW_ADDR"), "STACKFLOW_ADDR", defaults.addr);

        let scripts = get("STACKFLOW_SCRIPTS")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let static_dir = get("STACKFLOW_STATIC")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let tick_ms = parse_or(get("STACKFLOW_TICK_MS"), "STACKFLOW_TICK_MS", DEFAULT_TICK_MS);
        let tick = if tick_ms == 0 {
            tracing::warn!("STACKFLOW_TICK_MS must be positive, using {DEFAULT_TICK_MS}");
            defaults.tick
        } else {
            Duration::from_millis(tick_ms)
        };

        let speed = parse_or(get("STACKFLOW_SPEED"), "STACKFLOW_SPEED", defaults.speed);

        Self {
            addr,
            scripts,
            static_dir,
            tick,
            speed,
            canvas: defaults.canvas,
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Debug,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(key, value = %raw, ?default, "invalid setting, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> VisConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        VisConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_env() {
        let config = lookup(&[]);
        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert_eq!(config.tick, Duration::from_millis(16));
        assert_eq!(config.speed, PlaybackSpeed::Normal);
        assert!(config.scripts.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = lookup(&[
            ("STACKFLOW_ADDR", "127.0.0.1:8088"),
            ("STACKFLOW_SCRIPTS", "/tmp/sims.json"),
            ("STACKFLOW_TICK_MS", "33"),
            ("STACKFLOW_SPEED", "Fast"),
        ]);
        assert_eq!(config.addr.port(), 8088);
        assert_eq!(config.scripts, Some(PathBuf::from("/tmp/sims.json")));
        assert_eq!(config.tick, Duration::from_millis(33));
        assert_eq!(config.speed, PlaybackSpeed::Fast);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = lookup(&[
            ("STACKFLOW_ADDR", "not an addr"),
            ("STACKFLOW_TICK_MS", "0"),
            ("STACKFLOW_SPEED", "warp"),
        ]);
        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 3000)));
        assert_eq!(config.tick, Duration::from_millis(16));
        assert_eq!(config.speed, PlaybackSpeed::Normal);
    }
}
