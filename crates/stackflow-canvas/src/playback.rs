//! Playback sequencer for simulation step scripts.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stackflow_catalog::{Catalog, Simulation, SimulationStep};

use crate::error::{CanvasError, Result};

/// Per-step packet speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackSpeed {
    /// 2 s per step
    Slow,
    /// 1 s per step
    #[default]
    Normal,
    /// 0.5 s per step
    Fast,
}

impl PlaybackSpeed {
    /// Transit time of one packet at this speed.
    pub fn step_duration(&self) -> Duration {
        match self {
            PlaybackSpeed::Slow => Duration::from_secs(2),
            PlaybackSpeed::Normal => Duration::from_secs(1),
            PlaybackSpeed::Fast => Duration::from_millis(500),
        }
    }
}

impl std::str::FromStr for PlaybackSpeed {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slow" => Ok(PlaybackSpeed::Slow),
            "normal" => Ok(PlaybackSpeed::Normal),
            "fast" => Ok(PlaybackSpeed::Fast),
            other => Err(format!("unknown speed {other:?}")),
        }
    }
}

/// Coarse playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No step displayed
    Stopped,
    /// A step is displayed and its packet is (about to be) in flight
    Playing,
    /// A step is displayed, nothing moves
    Paused,
}

/// Identifies one armed step. Timer callbacks carry a ticket and are
/// ignored once the ticket no longer matches the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepTicket {
    pub epoch: u64,
    pub index: usize,
}

/// A step whose packet should start moving now.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmedStep {
    pub ticket: StepTicket,
    pub step: SimulationStep,
    /// Read from the speed setting at arm time
    pub duration: Duration,
}

/// Result of a packet-arrival notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Call [`Playback::fire_advance`] with `ticket` after `delay`.
    AdvanceAfter { ticket: StepTicket, delay: Duration },
    /// The last step arrived; playback stopped on it.
    Finished,
    /// Stale or irrelevant notification.
    Ignored,
}

/// Display status of one step in the timeline list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Completed,
    Current,
    Upcoming,
}

/// One row of the step timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub index: usize,
    pub step_id: u32,
    pub from: String,
    pub to: String,
    pub status: StepStatus,
}

/// Walks the selected simulation's steps.
///
/// Every transition that changes the displayed step, the playing flag or
/// the simulation bumps `epoch`, which invalidates outstanding tickets.
pub struct Playback {
    catalog: Arc<Catalog>,
    selected: Option<usize>,
    current: Option<usize>,
    playing: bool,
    speed: PlaybackSpeed,
    epoch: u64,
    pacing_delay: Duration,
}

impl Playback {
    /// Create a sequencer with nothing selected.
    pub fn new(catalog: Arc<Catalog>, pacing_delay: Duration) -> Self {
        Self {
            catalog,
            selected: None,
            current: None,
            playing: false,
            speed: PlaybackSpeed::Normal,
            epoch: 0,
            pacing_delay,
        }
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.selected.map(|i| &self.catalog.simulations()[i])
    }

    /// Current step index; `None` means not started.
    pub fn current_step_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_step(&self) -> Option<&SimulationStep> {
        self.simulation()?.step(self.current?)
    }

    pub fn total_steps(&self) -> usize {
        self.simulation().map_or(0, Simulation::len)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn state(&self) -> PlaybackState {
        match (self.current, self.playing) {
            (None, _) => PlaybackState::Stopped,
            (Some(_), true) => PlaybackState::Playing,
            (Some(_), false) => PlaybackState::Paused,
        }
    }

    /// Takes effect from the next armed step.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    /// Switch simulation. Always resets first.
    pub fn select(&mut self, id: &str) -> Result<()> {
        let index = self
            .catalog
            .simulations()
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| CanvasError::UnknownSimulation(id.to_owned()))?;
        self.reset();
        self.selected = Some(index);
        tracing::debug!(simulation = id, "simulation selected");
        Ok(())
    }

    /// Start or resume. Returns false if nothing is selected.
    pub fn play(&mut self) -> bool {
        if self.selected.is_none() {
            return false;
        }
        if self.current.is_none() {
            self.current = Some(0);
        }
        self.playing = true;
        self.bump();
        true
    }

    pub fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.bump();
        }
    }

    /// Step forward one step. Returns whether the index moved.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.current = Some(self.current.map_or(0, |i| i + 1));
        self.bump();
        true
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.playing = false;
        self.bump();
    }

    /// True if [`next`](Self::next) would move.
    pub fn can_next(&self) -> bool {
        match (self.simulation(), self.current) {
            (Some(sim), None) => !sim.is_empty(),
            (Some(sim), Some(i)) => i + 1 < sim.len(),
            (None, _) => false,
        }
    }

    /// Ticket for the step on display, if it should animate.
    pub fn arm(&self) -> Option<ArmedStep> {
        if !self.playing {
            return None;
        }
        let index = self.current?;
        let step = self.simulation()?.step(index)?.clone();
        Some(ArmedStep {
            ticket: StepTicket {
                epoch: self.epoch,
                index,
            },
            step,
            duration: self.speed.step_duration(),
        })
    }

    /// Whether `ticket` still describes the playing step.
    pub fn is_current(&self, ticket: StepTicket) -> bool {
        self.playing && ticket.epoch == self.epoch && self.current == Some(ticket.index)
    }

    /// The packet for `ticket` arrived.
    pub fn on_step_animation_complete(&mut self, ticket: StepTicket) -> Completion {
        if !self.is_current(ticket) {
            tracing::trace!(?ticket, epoch = self.epoch, "stale packet completion");
            return Completion::Ignored;
        }
        if self.can_next() {
            Completion::AdvanceAfter {
                ticket,
                delay: self.pacing_delay,
            }
        } else {
            self.playing = false;
            self.bump();
            tracing::debug!("simulation finished");
            Completion::Finished
        }
    }

    /// Deferred advance. No-op unless `ticket` is still current.
    pub fn fire_advance(&mut self, ticket: StepTicket) -> bool {
        if !self.is_current(ticket) {
            tracing::trace!(?ticket, epoch = self.epoch, "stale advance dropped");
            return false;
        }
        self.next()
    }

    /// Fraction of steps reached, `0.0` when stopped.
    pub fn progress(&self) -> f64 {
        match (self.current, self.total_steps()) {
            (Some(i), total) if total > 0 => (i + 1) as f64 / total as f64,
            _ => 0.0,
        }
    }

    pub fn timeline(&self) -> Vec<TimelineEntry> {
        let Some(sim) = self.simulation() else {
            return Vec::new();
        };
        sim.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let status = match self.current {
                    Some(current) if index < current => StepStatus::Completed,
                    Some(current) if index == current => StepStatus::Current,
                    _ => StepStatus::Upcoming,
                };
                TimelineEntry {
                    index,
                    step_id: step.id,
                    from: step.from.to_string(),
                    to: step.to.to_string(),
                    status,
                }
            })
            .collect()
    }

    fn bump(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}

/// Playback status for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackStatus {
    pub simulation: Option<String>,
    /// `-1` before the first step
    pub current_step_index: i64,
    pub total_steps: usize,
    pub state: PlaybackState,
    pub is_playing: bool,
    pub speed: PlaybackSpeed,
    pub can_next: bool,
    pub progress: f64,
}

impl From<&Playback> for PlaybackStatus {
    fn from(playback: &Playback) -> Self {
        Self {
            simulation: playback.simulation().map(|s| s.id.clone()),
            current_step_index: playback.current.map_or(-1, |i| i as i64),
            total_steps: playback.total_steps(),
            state: playback.state(),
            is_playing: playback.playing,
            speed: playback.speed,
            can_next: playback.can_next(),
            progress: playback.progress(),
        }
    }
}
