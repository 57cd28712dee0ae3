use std::time::Duration;

use crate::{
    animation::transition::{TransitionState, resolve_transition},
    foundation::{config::PreviewConfig, core::Canvas},
    render::{
        compositor::{Compositor, FrameReport, RenderError},
        surface::Surface,
    },
    scene::graph::{SceneGraph, SceneLocation},
    timeline::{
        audio::{AudioDirector, AudioMix},
        clock::{TickHandle, TickScheduler},
        events::{Observers, Subscription},
        markers::{Marker, Markers},
    },
};

pub const MIN_SPEED: f64 = 0.25;
pub const MAX_SPEED: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

/// Playhead position after a tick, seek or stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeUpdate {
    /// Absolute time in seconds.
    pub time: f64,
    pub scene_index: usize,
    pub scene_time: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneChange {
    pub from: usize,
    pub to: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub from: PlaybackState,
    pub to: PlaybackState,
}

/// Playback controller: owns the clock, maps it onto the scene graph and drives the compositor.
///
/// The player never mutates the graph; every call that renders borrows it, so each frame reads
/// whatever the editor last committed.
pub struct Player<F: Surface, S: TickScheduler> {
    compositor: Compositor,
    surface: F,
    scheduler: S,
    tick: Option<TickHandle>,
    interval: Duration,

    state: PlaybackState,
    current_time: f64,
    scene_index: usize,
    scene_time: f64,
    speed: f64,
    volume: f64,
    muted: bool,
    loop_playback: bool,

    markers: Markers,
    audio: AudioDirector,
    last_report: FrameReport,

    time_observers: Observers<TimeUpdate>,
    scene_observers: Observers<SceneChange>,
    state_observers: Observers<StateChange>,
    error_observers: Observers<RenderError>,
}

impl<F: Surface, S: TickScheduler> Player<F, S> {
    pub fn new(compositor: Compositor, surface: F, scheduler: S, config: &PreviewConfig) -> Self {
        Self {
            compositor,
            surface,
            scheduler,
            tick: None,
            interval: config.tick_interval,
            state: PlaybackState::Idle,
            current_time: 0.0,
            scene_index: 0,
            scene_time: 0.0,
            speed: clamp_speed(config.speed),
            volume: clamp_volume(config.volume),
            muted: false,
            loop_playback: config.loop_playback,
            markers: Markers::new(),
            audio: AudioDirector::new(),
            last_report: FrameReport::default(),
            time_observers: Observers::new(),
            scene_observers: Observers::new(),
            state_observers: Observers::new(),
            error_observers: Observers::new(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn scene_index(&self) -> usize {
        self.scene_index
    }

    pub fn scene_time(&self) -> f64 {
        self.scene_time
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_looping(&self) -> bool {
        self.loop_playback
    }

    pub fn set_loop(&mut self, enabled: bool) {
        self.loop_playback = enabled;
    }

    pub fn tick_interval(&self) -> Duration {
        self.interval
    }

    pub fn surface(&self) -> &F {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut F {
        &mut self.surface
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Report of the most recently composited frame.
    pub fn last_report(&self) -> &FrameReport {
        &self.last_report
    }

    /// Start or resume playback. Playing from the end of the timeline restarts at 0.
    pub fn play(&mut self, graph: &SceneGraph) {
        if self.state == PlaybackState::Playing {
            return;
        }
        if graph.is_empty() {
            tracing::debug!("play ignored: empty timeline");
            return;
        }
        if self.current_time >= graph.total_duration() {
            self.current_time = 0.0;
        }
        self.reschedule();
        self.set_state(PlaybackState::Playing);
        self.refresh(graph, true);
    }

    /// Pause playback, keeping the playhead.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.cancel_tick();
        self.compositor.cache_mut().pause_all();
        self.set_state(PlaybackState::Paused);
    }

    /// Return to idle at time 0, releasing every media stream.
    pub fn stop(&mut self, graph: &SceneGraph) {
        self.cancel_tick();
        self.compositor.cache_mut().release_streams();
        self.audio.reset();
        self.current_time = 0.0;
        self.set_state(PlaybackState::Idle);
        self.refresh(graph, false);
        // An emptied graph renders nothing, so the playhead is reset here too.
        self.scene_index = 0;
        self.scene_time = 0.0;
    }

    /// Jump to `t`, clamped to the timeline. A pending tick is rescheduled so the next advance is
    /// measured from the seek.
    ///
    /// While playing, landing on the end wraps to 0 when looping and otherwise ends playback.
    /// Paused and idle seeks stay on the end so the last frame can be scrubbed.
    pub fn seek(&mut self, graph: &SceneGraph, t: f64) {
        let total = graph.total_duration().max(0.0);
        self.current_time = if t.is_nan() { 0.0 } else { t.clamp(0.0, total) };
        tracing::debug!(t = self.current_time, "seek");
        if self.state == PlaybackState::Playing {
            if total > 0.0 && self.current_time >= total {
                if !self.loop_playback {
                    self.finish(graph, total, true);
                    return;
                }
                tracing::debug!("seek wrapped to start");
                self.current_time = 0.0;
            }
            self.reschedule();
        }
        self.refresh(graph, true);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = clamp_speed(speed);
    }

    /// Master volume, clamped to `[0, 1]`. Applied to streams on the next frame.
    pub fn set_volume(&mut self, volume: f64) {
        self.volume = clamp_volume(volume);
    }

    /// Flip the mute flag and return the new value.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn next_scene(&mut self, graph: &SceneGraph) {
        self.go_to_scene(graph, self.scene_index + 1);
    }

    pub fn previous_scene(&mut self, graph: &SceneGraph) {
        if let Some(index) = self.scene_index.checked_sub(1) {
            self.go_to_scene(graph, index);
        }
    }

    /// Seek to the start of scene `index`. Out-of-range indices are ignored.
    pub fn go_to_scene(&mut self, graph: &SceneGraph, index: usize) {
        if let Some(start) = graph.scene_start(index) {
            self.seek(graph, start);
        }
    }

    pub fn add_marker(&mut self, t: f64, label: impl Into<String>) -> String {
        self.markers.add(t, label)
    }

    pub fn remove_marker(&mut self, id: &str) -> bool {
        self.markers.remove(id)
    }

    /// Scene and custom markers ordered by time.
    pub fn markers(&self, graph: &SceneGraph) -> Vec<Marker> {
        self.markers.all(graph)
    }

    /// `t` snapped to the nearest marker or scene boundary within `tolerance` seconds.
    pub fn snap_time(&self, graph: &SceneGraph, t: f64, tolerance: f64) -> f64 {
        self.markers.snap(graph, t, tolerance)
    }

    pub fn on_time_update(&mut self, f: impl FnMut(&TimeUpdate) + 'static) -> Subscription {
        self.time_observers.subscribe(f)
    }

    pub fn on_scene_change(&mut self, f: impl FnMut(&SceneChange) + 'static) -> Subscription {
        self.scene_observers.subscribe(f)
    }

    pub fn on_state_change(&mut self, f: impl FnMut(&StateChange) + 'static) -> Subscription {
        self.state_observers.subscribe(f)
    }

    pub fn on_error(&mut self, f: impl FnMut(&RenderError) + 'static) -> Subscription {
        self.error_observers.subscribe(f)
    }

    /// Remove a subscription made through any `on_*` method.
    pub fn unsubscribe(&mut self, token: Subscription) -> bool {
        self.time_observers.unsubscribe(token)
            || self.scene_observers.unsubscribe(token)
            || self.state_observers.unsubscribe(token)
            || self.error_observers.unsubscribe(token)
    }

    /// Run every tick the scheduler reports due. Returns the number of ticks processed.
    pub fn pump(&mut self, graph: &SceneGraph) -> u32 {
        let mut ran = 0;
        while self.state == PlaybackState::Playing {
            let Some(handle) = self.tick else { break };
            let due = self.scheduler.take_due(handle);
            if due == 0 {
                break;
            }
            for _ in 0..due {
                if self.state != PlaybackState::Playing {
                    break;
                }
                self.advance(graph);
                ran += 1;
            }
        }
        ran
    }

    /// Advance the clock by one tick and render.
    fn advance(&mut self, graph: &SceneGraph) {
        let total = graph.total_duration().max(0.0);
        self.current_time += self.interval.as_secs_f64() * self.speed;
        if self.current_time >= total {
            if self.loop_playback && total > 0.0 {
                tracing::debug!("playback looped");
                self.current_time = 0.0;
                self.refresh(graph, true);
                return;
            }
            self.finish(graph, total, false);
            return;
        }
        self.refresh(graph, false);
    }

    /// Park the playhead on the last frame and go idle.
    fn finish(&mut self, graph: &SceneGraph, total: f64, seeked: bool) {
        self.current_time = total;
        self.cancel_tick();
        self.set_state(PlaybackState::Idle);
        self.refresh(graph, seeked);
        self.compositor.cache_mut().pause_all();
    }

    fn refresh(&mut self, graph: &SceneGraph, seeked: bool) {
        let Some(loc) = self.render_frame(graph, seeked) else {
            return;
        };
        self.time_observers.notify(&TimeUpdate {
            time: self.current_time,
            scene_index: loc.index,
            scene_time: loc.scene_time,
        });
    }

    /// Composite the frame at the current time, update the playhead and fire scene and error
    /// notifications. Time observers are left to the caller.
    fn render_frame(&mut self, graph: &SceneGraph, seeked: bool) -> Option<SceneLocation> {
        let loc = graph.locate(self.current_time)?;
        let scene = &graph.scenes[loc.index];

        let previous = self.scene_index;
        self.scene_index = loc.index;
        self.scene_time = loc.scene_time;
        if previous != loc.index {
            tracing::debug!(from = previous, to = loc.index, "scene changed");
            self.scene_observers.notify(&SceneChange {
                from: previous,
                to: loc.index,
            });
        }

        let report = match transition_into(graph, loc) {
            Some(state) => {
                let outgoing = &graph.scenes[loc.index - 1];
                self.compositor.render_transition(
                    outgoing,
                    scene,
                    loc.scene_time,
                    &state,
                    &mut self.surface,
                )
            }
            None => self
                .compositor
                .render(scene, loc.scene_time, &mut self.surface),
        };
        for err in &report.errors {
            self.error_observers.notify(err);
        }
        self.last_report = report;

        if self.state != PlaybackState::Idle || self.compositor.cache().open_streams() > 0 {
            let mix = AudioMix {
                playing: self.state == PlaybackState::Playing,
                volume: self.volume,
                muted: self.muted,
                seeked,
            };
            let failures = self
                .audio
                .sync(self.compositor.cache_mut(), scene, loc.scene_time, mix);
            for error in failures {
                tracing::warn!(scene = %scene.id, error = %error, "audio stream failed");
                self.error_observers.notify(&RenderError {
                    scene_id: scene.id.clone(),
                    element_id: None,
                    error,
                });
            }
        }
        Some(loc)
    }

    fn set_state(&mut self, to: PlaybackState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(?from, ?to, "playback state");
        self.state_observers.notify(&StateChange { from, to });
    }

    fn reschedule(&mut self) {
        self.cancel_tick();
        self.tick = Some(self.scheduler.schedule_tick(self.interval));
    }

    fn cancel_tick(&mut self) {
        if let Some(handle) = self.tick.take() {
            self.scheduler.cancel(handle);
        }
    }
}

impl<F: Surface, S: TickScheduler> Drop for Player<F, S> {
    fn drop(&mut self) {
        self.cancel_tick();
        self.compositor.cache_mut().release_streams();
    }
}

/// Transition state when `loc` falls inside the window opened by the previous scene's
/// transition spec.
fn transition_into(graph: &SceneGraph, loc: SceneLocation) -> Option<TransitionState> {
    let prev = graph.scenes.get(loc.index.checked_sub(1)?)?;
    let spec = prev.transition.as_ref()?;
    let incoming = &graph.scenes[loc.index];
    resolve_transition(spec, loc.scene_time, incoming.duration, Canvas::DESIGN)
}

fn clamp_speed(speed: f64) -> f64 {
    if speed.is_nan() {
        1.0
    } else {
        speed.clamp(MIN_SPEED, MAX_SPEED)
    }
}

fn clamp_volume(volume: f64) -> f64 {
    if volume.is_nan() {
        1.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/player.rs"]
mod tests;
