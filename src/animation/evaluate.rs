use std::f64::consts::{PI, TAU};

use crate::{
    foundation::core::{Transform2D, Vec2},
    foundation::math::clamp01,
    scene::model::{AnimationKind, AnimationSpec, Direction, Element},
};

/// Vertical travel of a bounce, in logical pixels.
pub const BOUNCE_AMPLITUDE_PX: f64 = 20.0;
/// Horizontal travel of a shake, in logical pixels.
pub const SHAKE_AMPLITUDE_PX: f64 = 10.0;
/// Peak relative growth of a pulse.
pub const PULSE_AMPLITUDE: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Visual state of one element at one instant.
pub struct ElementState {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Transform about the element centre.
    pub transform: Transform2D,
    /// Whether anything should be drawn.
    pub visible: bool,
}

impl ElementState {
    /// Nothing is drawn.
    pub fn hidden() -> Self {
        Self {
            opacity: 0.0,
            transform: Transform2D::default(),
            visible: false,
        }
    }

    /// Fully opaque and untransformed, pivoting around `anchor`.
    pub fn resting(anchor: Vec2) -> Self {
        Self {
            opacity: 1.0,
            transform: Transform2D::identity_at(anchor),
            visible: true,
        }
    }
}

/// Where `t` falls relative to an animation's window.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    /// Inside the window (or before it, clamped to 0), with the directed, eased progress.
    Running(f64),
    /// Past the effective end.
    Finished,
}

/// Evaluate `element` at scene-relative time `t`.
///
/// Pure: the same `(element, t)` always yields the same state.
pub fn evaluate(element: &Element, t: f64) -> ElementState {
    if !element.visible || !element.is_active(t) {
        return ElementState::hidden();
    }

    let anchor = element.center();
    let Some(spec) = element.animation.as_ref() else {
        return ElementState::resting(anchor);
    };
    if spec.kind == AnimationKind::None || spec.validate().is_err() {
        return ElementState::resting(anchor);
    }

    let width = element.bounds.width;
    match phase(spec, element.start, element.end, t) {
        Phase::Running(p) => apply_kind(spec.kind, p, width, anchor),
        Phase::Finished => terminal_state(spec.kind, spec.direction, width, anchor),
    }
}

/// Seconds the animation actually runs: its duration, capped by the element window.
pub fn effective_duration(spec: &AnimationSpec, start: f64, end: f64) -> f64 {
    spec.duration.min(end - start)
}

fn phase(spec: &AnimationSpec, start: f64, end: f64, t: f64) -> Phase {
    let dur = effective_duration(spec, start, end);
    if dur <= 0.0 {
        return Phase::Finished;
    }
    let raw = (t - start - spec.delay) / dur;
    if raw >= 1.0 {
        return Phase::Finished;
    }
    let eased = spec.easing.apply(clamp01(raw));
    let directed = match spec.direction {
        Direction::Forward => eased,
        Direction::Reverse => 1.0 - eased,
    };
    Phase::Running(directed)
}

/// Per-kind formula at directed progress `p`.
fn apply_kind(kind: AnimationKind, p: f64, width: f64, anchor: Vec2) -> ElementState {
    let mut state = ElementState::resting(anchor);
    match kind {
        AnimationKind::None => {}
        AnimationKind::FadeIn => state.opacity = p,
        AnimationKind::FadeOut => state.opacity = 1.0 - p,
        AnimationKind::SlideIn => state.transform.translate.x = (1.0 - p) * -width,
        AnimationKind::SlideOut => state.transform.translate.x = p * width,
        AnimationKind::Bounce => {
            state.transform.translate.y = (p * 4.0 * PI).sin() * (1.0 - p) * BOUNCE_AMPLITUDE_PX;
        }
        AnimationKind::Shake => {
            state.transform.translate.x = (p * 8.0 * PI).sin() * (1.0 - p) * SHAKE_AMPLITUDE_PX;
        }
        AnimationKind::Pulse => {
            let s = 1.0 + (p * TAU).sin() * PULSE_AMPLITUDE;
            state.transform.scale = Vec2::new(s, s);
        }
        AnimationKind::Rotate => state.transform.rotation_rad = p * TAU,
        AnimationKind::Scale => state.transform.scale = Vec2::new(p, p),
    }
    state.opacity = clamp01(state.opacity);
    state
}

/// Explicit resting state held after the animation's effective end.
///
/// Forward animations rest in their end pose; reversed ones rest in the pose the forward
/// animation starts from.
pub fn terminal_state(
    kind: AnimationKind,
    direction: Direction,
    width: f64,
    anchor: Vec2,
) -> ElementState {
    let mut state = ElementState::resting(anchor);
    let forward = direction == Direction::Forward;
    match kind {
        AnimationKind::None
        | AnimationKind::Bounce
        | AnimationKind::Shake
        | AnimationKind::Pulse
        | AnimationKind::Rotate => {}
        AnimationKind::FadeIn => state.opacity = if forward { 1.0 } else { 0.0 },
        AnimationKind::FadeOut => state.opacity = if forward { 0.0 } else { 1.0 },
        AnimationKind::SlideIn => {
            state.transform.translate.x = if forward { 0.0 } else { -width };
        }
        AnimationKind::SlideOut => {
            state.transform.translate.x = if forward { width } else { 0.0 };
        }
        AnimationKind::Scale => {
            let s = if forward { 1.0 } else { 0.0 };
            state.transform.scale = Vec2::new(s, s);
        }
    }
    state
}

#[cfg(test)]
#[path = "../../tests/unit/animation/evaluate.rs"]
mod tests;
