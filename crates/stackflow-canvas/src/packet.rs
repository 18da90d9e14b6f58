//! Packet transit animation between two nodes.

use std::time::Duration;

use glam::DVec2;
use stackflow_catalog::{NodeId, StepKind};

use crate::playback::{ArmedStep, StepTicket};

/// Keyframe times shared by opacity and scale.
const KEYFRAME_TIMES: [f64; 4] = [0.0, 0.1, 0.9, 1.0];
const OPACITY_FRAMES: [f64; 4] = [0.0, 1.0, 1.0, 0.0];
const SCALE_FRAMES: [f64; 4] = [0.5, 1.0, 1.0, 0.5];

/// A packet travelling along one step.
///
/// Endpoints are node ids, not positions, so a node dragged mid-flight
/// pulls the packet with it.
#[derive(Debug, Clone)]
pub struct PacketAnimation {
    pub ticket: StepTicket,
    pub from: NodeId,
    pub to: NodeId,
    pub label: String,
    pub kind: StepKind,
    duration: Duration,
    elapsed: Duration,
}

impl PacketAnimation {
    pub fn new(armed: &ArmedStep) -> Self {
        Self {
            ticket: armed.ticket,
            from: armed.step.from.clone(),
            to: armed.step.to.clone(),
            label: armed.step.payload_label.clone(),
            kind: armed.step.kind,
            duration: armed.duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Advance by `dt`. Returns true once the packet has arrived.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.arrived()
    }

    pub fn arrived(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Progress after ease-in-out.
    pub fn eased_progress(&self) -> f64 {
        ease_in_out(self.progress())
    }

    /// Interpolated position between the resolved endpoints.
    pub fn position(&self, from: DVec2, to: DVec2) -> DVec2 {
        from.lerp(to, self.eased_progress())
    }

    /// Fades in over the first 10% and out over the last 10%.
    pub fn opacity(&self) -> f64 {
        keyframe(self.progress(), &OPACITY_FRAMES)
    }

    pub fn scale(&self) -> f64 {
        keyframe(self.progress(), &SCALE_FRAMES)
    }
}

fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Piecewise-linear interpolation over [`KEYFRAME_TIMES`].
fn keyframe(t: f64, values: &[f64; 4]) -> f64 {
    for i in 0..KEYFRAME_TIMES.len() - 1 {
        let (t0, t1) = (KEYFRAME_TIMES[i], KEYFRAME_TIMES[i + 1]);
        if t <= t1 {
            let local = if t1 > t0 { (t - t0) / (t1 - t0) } else { 1.0 };
            return values[i] + (values[i + 1] - values[i]) * local.clamp(0.0, 1.0);
        }
    }
    values[values.len() - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackflow_catalog::SimulationStep;

    fn packet(duration_ms: u64) -> PacketAnimation {
        let armed = ArmedStep {
            ticket: StepTicket { epoch: 1, index: 0 },
            step: SimulationStep {
                id: 1,
                from: "browser".into(),
                to: "frontend".into(),
                payload_label: "GET /".into(),
                description: String::new(),
                kind: StepKind::Request,
            },
            duration: Duration::from_millis(duration_ms),
        };
        PacketAnimation::new(&armed)
    }

    #[test]
    fn packet_interpolation() {
        let mut packet = packet(1000);
        packet.advance(Duration::from_millis(500));
        let pos = packet.position(DVec2::ZERO, DVec2::new(10.0, 0.0));
        assert!((pos.x - 5.0).abs() < 0.001);
    }

    #[test]
    fn advance_reports_arrival() {
        let mut packet = packet(1000);
        assert!(!packet.advance(Duration::from_millis(600)));
        assert!(packet.advance(Duration::from_millis(600)));
        assert_eq!(packet.progress(), 1.0);
    }

    #[test]
    fn zero_duration_arrives_immediately() {
        let packet = packet(0);
        assert!(packet.arrived());
        assert_eq!(packet.progress(), 1.0);
    }

    #[test]
    fn easing_is_symmetric() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.25) + ease_in_out(0.75) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn opacity_keyframes() {
        let mut packet = packet(1000);
        assert_eq!(packet.opacity(), 0.0);
        assert_eq!(packet.scale(), 0.5);
        packet.advance(Duration::from_millis(50));
        assert!((packet.opacity() - 0.5).abs() < 1e-9);
        packet.advance(Duration::from_millis(450));
        assert_eq!(packet.opacity(), 1.0);
        assert_eq!(packet.scale(), 1.0);
        packet.advance(Duration::from_millis(500));
        assert_eq!(packet.opacity(), 0.0);
    }
}
