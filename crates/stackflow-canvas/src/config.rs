//! Tunables for the canvas controller.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};

/// Configuration for a [`CanvasController`](crate::CanvasController).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Smallest allowed zoom scale
    pub min_scale: f64,
    /// Largest allowed zoom scale
    pub max_scale: f64,
    /// Scale change for the zoom-in/zoom-out controls
    pub zoom_step: f64,
    /// Scale change per modifier+wheel notch
    pub wheel_zoom_step: f64,
    /// Pause between an arrived packet and the next automatic step
    pub pacing_delay_ms: u64,
    /// Pointer travel (screen px) below which a gesture counts as a click
    pub click_slop: f64,
    /// World-space radius used when hit-testing nodes
    pub node_hit_radius: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.5,
            max_scale: 2.0,
            zoom_step: 0.2,
            wheel_zoom_step: 0.1,
            pacing_delay_ms: 300,
            click_slop: 3.0,
            node_hit_radius: 40.0,
        }
    }
}

impl CanvasConfig {
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    /// Reject bounds and steps the view controller cannot work with.
    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(CanvasError::InvalidConfig(format!("{name} must be positive, got {value}")))
            }
        };
        positive("min_scale", self.min_scale)?;
        positive("max_scale", self.max_scale)?;
        positive("zoom_step", self.zoom_step)?;
        positive("wheel_zoom_step", self.wheel_zoom_step)?;
        if self.min_scale > self.max_scale {
            return Err(CanvasError::InvalidConfig(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.click_slop.is_finite() && self.click_slop >= 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "click_slop must be non-negative, got {}",
                self.click_slop
            )));
        }
        if !(self.node_hit_radius.is_finite() && self.node_hit_radius >= 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "node_hit_radius must be non-negative, got {}",
                self.node_hit_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_canvas_controls() {
        let config = CanvasConfig::default();
        assert_eq!(config.min_scale, 0.5);
        assert_eq!(config.max_scale, 2.0);
        assert_eq!(config.pacing_delay(), Duration::from_millis(300));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: CanvasConfig = serde_json::from_str(r#"{"pacing_delay_ms": 50}"#).unwrap();
        assert_eq!(config.pacing_delay_ms, 50);
        assert_eq!(config.zoom_step, 0.2);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(CanvasConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_scale_bounds_are_rejected() {
        let config: CanvasConfig =
            serde_json::from_str(r#"{"min_scale": 2.0, "max_scale": 0.5}"#).unwrap();
        assert!(matches!(config.validate(), Err(CanvasError::InvalidConfig(_))));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let config = CanvasConfig {
            max_scale: f64::NAN,
            ..CanvasConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CanvasConfig {
            zoom_step: f64::INFINITY,
            ..CanvasConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CanvasConfig {
            node_hit_radius: -1.0,
            ..CanvasConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
