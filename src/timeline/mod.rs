//! Playback clock, scene mapping and the observers hosts subscribe to.

pub mod audio;
pub mod clock;
pub mod events;
pub mod markers;
pub mod player;
