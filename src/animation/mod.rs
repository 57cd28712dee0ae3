//! Pure evaluation of element animations, easing curves and scene transitions.

pub mod ease;
pub mod evaluate;
pub mod transition;
