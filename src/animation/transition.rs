use crate::{
    foundation::core::{Canvas, Transform2D, Vec2},
    foundation::math::{clamp01, lerp},
    scene::model::{TransitionKind, TransitionSpec},
};

#[derive(Clone, Copy, Debug, PartialEq)]
/// Opacity and transform applied to a whole scene during a transition.
pub struct SceneLayer {
    pub opacity: f64,
    pub transform: Transform2D,
}

impl SceneLayer {
    fn opaque(anchor: Vec2) -> Self {
        Self {
            opacity: 1.0,
            transform: Transform2D::identity_at(anchor),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Layers for the outgoing and incoming scene at one instant of a transition.
pub struct TransitionState {
    pub kind: TransitionKind,
    /// Eased progress in `[0, 1]`.
    pub progress: f64,
    pub outgoing: SceneLayer,
    pub incoming: SceneLayer,
}

/// Seconds of the incoming scene the transition occupies.
pub fn transition_window(spec: &TransitionSpec, incoming_duration: f64) -> f64 {
    if spec.kind == TransitionKind::None || spec.validate().is_err() {
        return 0.0;
    }
    spec.duration.min(incoming_duration).max(0.0)
}

/// Resolve a transition at `elapsed` seconds into the incoming scene.
///
/// Returns `None` outside the transition window or for hard cuts.
pub fn resolve_transition(
    spec: &TransitionSpec,
    elapsed: f64,
    incoming_duration: f64,
    canvas: Canvas,
) -> Option<TransitionState> {
    let window = transition_window(spec, incoming_duration);
    if window <= 0.0 || !(0.0..window).contains(&elapsed) {
        return None;
    }
    let progress = spec.easing.apply(clamp01(elapsed / window));
    Some(evaluate_transition(spec.kind, progress, canvas))
}

/// Layers for `kind` at eased `progress`.
pub fn evaluate_transition(kind: TransitionKind, progress: f64, canvas: Canvas) -> TransitionState {
    let p = clamp01(progress);
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    let center = Vec2::new(w / 2.0, h / 2.0);
    let mut outgoing = SceneLayer::opaque(center);
    let mut incoming = SceneLayer::opaque(center);

    match kind {
        TransitionKind::None => {
            outgoing.opacity = 0.0;
        }
        TransitionKind::Fade => {
            outgoing.opacity = 1.0 - p;
            incoming.opacity = p;
        }
        TransitionKind::SlideLeft => {
            outgoing.transform.translate.x = -p * w;
            incoming.transform.translate.x = (1.0 - p) * w;
        }
        TransitionKind::SlideRight => {
            outgoing.transform.translate.x = p * w;
            incoming.transform.translate.x = -(1.0 - p) * w;
        }
        TransitionKind::SlideUp => {
            outgoing.transform.translate.y = -p * h;
            incoming.transform.translate.y = (1.0 - p) * h;
        }
        TransitionKind::SlideDown => {
            outgoing.transform.translate.y = p * h;
            incoming.transform.translate.y = -(1.0 - p) * h;
        }
        TransitionKind::Zoom => {
            let so = lerp(1.0, 1.5, p);
            let si = lerp(0.5, 1.0, p);
            outgoing.transform.scale = Vec2::new(so, so);
            outgoing.opacity = 1.0 - p;
            incoming.transform.scale = Vec2::new(si, si);
            incoming.opacity = p;
        }
    }

    TransitionState {
        kind,
        progress: p,
        outgoing,
        incoming,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transition.rs"]
mod tests;
