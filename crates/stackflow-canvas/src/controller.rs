//! Single owner of canvas state: layout, view, gestures and playback.

use std::sync::Arc;
use std::time::Duration;

use glam::DVec2;
use stackflow_catalog::Catalog;

use crate::config::CanvasConfig;
use crate::drag::{DragController, DragEffect, HitTarget, PointerId, Propagation};
use crate::error::Result;
use crate::events::{CanvasEvent, PointerInput};
use crate::frame::{CanvasFrame, EdgeFrame, NodeFrame, PacketFrame, StepFrame};
use crate::layout::LayoutEngine;
use crate::packet::PacketAnimation;
use crate::playback::{Completion, Playback, PlaybackSpeed, PlaybackStatus, StepTicket};
use crate::view::{ViewController, WheelInput, WheelOutcome};

/// Handle returned by [`CanvasController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&CanvasEvent) + Send>;

#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    ticket: StepTicket,
    remaining: Duration,
}

/// The canvas coordinate and playback controller.
///
/// All mutation goes through `&mut self`; every change is announced to
/// subscribed listeners as a [`CanvasEvent`]. Time only moves through
/// [`tick`](Self::tick), or through [`complete_packet`](Self::complete_packet)
/// and [`fire_advance`](Self::fire_advance) for hosts running their own timers.
pub struct CanvasController {
    catalog: Arc<Catalog>,
    config: CanvasConfig,
    layout: LayoutEngine,
    view: ViewController,
    drag: DragController,
    playback: Playback,
    packet: Option<PacketAnimation>,
    pending: Option<PendingAdvance>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl CanvasController {
    /// Build a controller. Fails if `config` does not validate.
    pub fn new(catalog: Arc<Catalog>, config: CanvasConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            layout: LayoutEngine::new(catalog.nodes()),
            view: ViewController::new(&config),
            drag: DragController::new(config.click_slop),
            playback: Playback::new(catalog.clone(), config.pacing_delay()),
            catalog,
            config,
            packet: None,
            pending: None,
            listeners: Vec::new(),
            next_listener: 0,
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn view(&self) -> &ViewController {
        &self.view
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn packet(&self) -> Option<&PacketAnimation> {
        self.packet.as_ref()
    }

    /// Ticket of the deferred advance waiting out the pacing delay.
    pub fn pending_advance(&self) -> Option<StepTicket> {
        self.pending.map(|p| p.ticket)
    }

    pub fn status(&self) -> PlaybackStatus {
        PlaybackStatus::from(&self.playback)
    }

    // ---- listeners ----

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&CanvasEvent) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drop all listeners and in-flight work. Call when the canvas goes away.
    pub fn teardown(&mut self) {
        tracing::debug!(listeners = self.listeners.len(), "canvas teardown");
        self.listeners.clear();
        self.drag.clear();
        self.playback.pause();
        self.packet = None;
        self.pending = None;
    }

    fn emit(&mut self, event: CanvasEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    fn emit_playback(&mut self) {
        let status = self.status();
        self.emit(CanvasEvent::PlaybackChanged { status });
    }

    fn emit_view(&mut self) {
        let view = self.view.transform();
        self.emit(CanvasEvent::ViewChanged { view });
    }

    // ---- layout ----

    /// Container size changed.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<()> {
        if self.layout.resize(width, height)? {
            if let Some(container) = self.layout.container() {
                self.emit(CanvasEvent::LayoutChanged { container });
            }
        }
        Ok(())
    }

    pub fn resolved_position(&self, id: &str) -> Option<DVec2> {
        self.layout.resolved_position(id)
    }

    /// Nudge a node by a world-space delta.
    pub fn move_node_by(&mut self, id: &str, delta: DVec2) -> Result<()> {
        self.layout.apply_offset_delta(id, delta)?;
        self.emit_node_moved(id);
        Ok(())
    }

    /// Announce a node's new resolved position. Nodes without one yet
    /// (no container measured) stay silent.
    fn emit_node_moved(&mut self, id: &str) {
        let Some(node) = self.catalog.node(id).map(|n| n.id.clone()) else {
            return;
        };
        let Some(position) = self.layout.resolved_position(id) else {
            return;
        };
        self.emit(CanvasEvent::NodeMoved { node, position });
    }

    // ---- view ----

    pub fn zoom_in(&mut self) -> f64 {
        let scale = self.view.zoom_in();
        self.emit_view();
        scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        let scale = self.view.zoom_out();
        self.emit_view();
        scale
    }

    pub fn zoom_by(&mut self, delta: f64) -> f64 {
        let scale = self.view.zoom_by(delta);
        self.emit_view();
        scale
    }

    pub fn pan_by(&mut self, delta: DVec2) {
        self.view.pan_by(delta);
        self.emit_view();
    }

    /// Identity transform and zero offsets for every node. Ends any
    /// gesture in progress, since it was anchored to the old offsets.
    pub fn reset_view(&mut self) {
        self.drag.clear();
        self.view.reset();
        self.layout.reset_all_offsets();
        self.emit_view();
        self.emit(CanvasEvent::OffsetsReset);
    }

    pub fn wheel(&mut self, input: WheelInput) -> WheelOutcome {
        let outcome = self.view.wheel(input);
        if outcome.prevent_default() {
            self.emit_view();
        }
        outcome
    }

    // ---- pointer input ----

    /// Topmost node under a screen point, or the background.
    pub fn hit_test(&self, screen: DVec2) -> HitTarget {
        let world = self
            .view
            .transform()
            .screen_to_world(screen, self.layout.center());
        let radius = self.config.node_hit_radius;
        // later nodes draw on top
        self.layout
            .nodes()
            .iter()
            .rev()
            .find(|node| {
                self.layout
                    .resolved_position(node.id.as_str())
                    .is_some_and(|pos| pos.distance(world) <= radius)
            })
            .map(|node| HitTarget::Node(node.id.clone()))
            .unwrap_or(HitTarget::Background)
    }

    pub fn pointer_down(&mut self, input: &PointerInput) -> Propagation {
        let position = input.position();
        let target = input
            .target
            .clone()
            .unwrap_or_else(|| self.hit_test(position));
        self.drag
            .pointer_down(input.pointer, position, target, &self.layout)
    }

    pub fn pointer_move(&mut self, input: &PointerInput) {
        let Some(effect) = self
            .drag
            .pointer_move(input.pointer, input.position(), &self.view)
        else {
            return;
        };
        self.apply_drag_effect(effect);
    }

    pub fn pointer_up(&mut self, input: &PointerInput) {
        if let Some(effect) = self.drag.pointer_up(input.pointer) {
            self.apply_drag_effect(effect);
        }
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        if self.drag.pointer_cancel(pointer) {
            tracing::debug!(pointer, "gesture cancelled");
        }
    }

    fn apply_drag_effect(&mut self, effect: DragEffect) {
        match effect {
            DragEffect::Pan { delta } => self.pan_by(delta),
            DragEffect::MoveNode { node, offset } => {
                match self.layout.set_offset(node.as_str(), offset) {
                    Ok(()) => self.emit_node_moved(node.as_str()),
                    Err(err) => tracing::warn!(%err, "drag on node without offset"),
                }
            }
            DragEffect::Click { target } => self.emit(CanvasEvent::Clicked { target }),
            DragEffect::Released => {}
        }
    }

    // ---- playback ----

    /// Switch simulation; playback resets before the new one is accepted.
    pub fn select_simulation(&mut self, id: &str) -> Result<()> {
        self.playback.select(id)?;
        self.packet = None;
        self.pending = None;
        self.emit(CanvasEvent::SimulationSelected { id: id.to_owned() });
        self.emit_playback();
        Ok(())
    }

    pub fn play(&mut self) {
        if self.playback.play() {
            self.arm();
            self.emit_playback();
        }
    }

    /// Stop moving. The packet restarts from its source on resume.
    pub fn pause(&mut self) {
        self.playback.pause();
        self.packet = None;
        self.pending = None;
        self.emit_playback();
    }

    pub fn next(&mut self) {
        if self.playback.next() {
            self.arm();
            self.emit_playback();
        }
    }

    pub fn reset(&mut self) {
        self.playback.reset();
        self.packet = None;
        self.pending = None;
        self.emit_playback();
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.playback.set_speed(speed);
        self.emit_playback();
    }

    /// Start the packet for the displayed step, if playing.
    ///
    /// A step whose endpoint is unresolved completes at once without a
    /// visible packet, so a missing node never stalls the sequence.
    fn arm(&mut self) {
        self.packet = None;
        self.pending = None;
        let Some(armed) = self.playback.arm() else {
            return;
        };

        let from = armed.step.from.as_str();
        let to = armed.step.to.as_str();
        if self.layout.resolved_position(from).is_none()
            || self.layout.resolved_position(to).is_none()
        {
            tracing::warn!(
                from,
                to,
                index = armed.ticket.index,
                "packet endpoint unresolved, skipping transit"
            );
            self.complete_packet(armed.ticket);
            return;
        }

        tracing::debug!(
            from,
            to,
            index = armed.ticket.index,
            duration = ?armed.duration,
            "packet armed"
        );
        self.emit(CanvasEvent::PacketArmed {
            ticket: armed.ticket,
            from: armed.step.from.clone(),
            to: armed.step.to.clone(),
        });
        self.packet = Some(PacketAnimation::new(&armed));
    }

    /// Advance the cooperative timeline by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(pending) = &mut self.pending {
            pending.remaining = pending.remaining.saturating_sub(dt);
            if pending.remaining.is_zero() {
                let ticket = pending.ticket;
                self.fire_advance(ticket);
            }
            return;
        }

        let arrived = match &mut self.packet {
            Some(packet) => packet.advance(dt).then_some(packet.ticket),
            None => None,
        };
        if let Some(ticket) = arrived {
            self.complete_packet(ticket);
        }
    }

    /// The packet for `ticket` finished its transit.
    pub fn complete_packet(&mut self, ticket: StepTicket) -> Completion {
        if self.packet.as_ref().is_some_and(|p| p.ticket == ticket) {
            self.packet = None;
        }

        let completion = self.playback.on_step_animation_complete(ticket);
        match completion {
            Completion::AdvanceAfter { ticket, delay } => {
                self.pending = Some(PendingAdvance {
                    ticket,
                    remaining: delay,
                });
                self.emit(CanvasEvent::PacketCompleted { ticket });
            }
            Completion::Finished => {
                self.emit(CanvasEvent::PacketCompleted { ticket });
                self.emit_playback();
            }
            Completion::Ignored => {}
        }
        completion
    }

    /// The pacing delay for `ticket` elapsed. Stale tickets are ignored.
    pub fn fire_advance(&mut self, ticket: StepTicket) -> bool {
        if self.pending.is_some_and(|p| p.ticket == ticket) {
            self.pending = None;
        }
        if !self.playback.fire_advance(ticket) {
            return false;
        }
        self.arm();
        self.emit_playback();
        true
    }

    // ---- output ----

    /// Snapshot for rendering.
    pub fn frame(&self) -> CanvasFrame {
        let current = self.playback.current_step();
        let dragging = self.drag.dragging_node();

        let nodes = self
            .layout
            .resolved_positions()
            .map(|(node, position)| NodeFrame {
                id: node.id.clone(),
                kind: node.kind,
                name: node.name.clone(),
                icon: node.icon.clone(),
                position,
                active: current.is_some_and(|s| s.touches(&node.id)),
                dragging: dragging == Some(&node.id),
            })
            .collect();

        let edges = self
            .catalog
            .connections()
            .iter()
            .filter_map(|conn| {
                let from_position = self.layout.resolved_position(conn.from.as_str())?;
                let to_position = self.layout.resolved_position(conn.to.as_str())?;
                Some(EdgeFrame {
                    from: conn.from.clone(),
                    to: conn.to.clone(),
                    from_position,
                    to_position,
                    active: current.is_some_and(|s| conn.joins(&s.from, &s.to)),
                })
            })
            .collect();

        let packet = self.packet.as_ref().and_then(|p| {
            let from = self.layout.resolved_position(p.from.as_str())?;
            let to = self.layout.resolved_position(p.to.as_str())?;
            Some(PacketFrame {
                ticket: p.ticket,
                label: p.label.clone(),
                kind: p.kind,
                position: p.position(from, to),
                progress: p.progress(),
                opacity: p.opacity(),
                scale: p.scale(),
            })
        });

        let total = self.playback.total_steps();
        let step = self
            .playback
            .current_step_index()
            .zip(current)
            .map(|(index, s)| StepFrame {
                index,
                number: index + 1,
                total,
                from: s.from.clone(),
                to: s.to.clone(),
                payload_label: s.payload_label.clone(),
                description: s.description.clone(),
                kind: s.kind,
            });

        CanvasFrame {
            container: self.layout.container(),
            view: self.view.transform(),
            zoom_percent: self.view.zoom_percent(),
            nodes,
            edges,
            packet,
            step,
            playback: self.status(),
            timeline: self.playback.timeline(),
            panning: self.drag.is_panning(),
        }
    }
}
