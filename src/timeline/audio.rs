use std::collections::HashSet;

use crate::{
    assets::{cache::MediaCache, resolver::StreamKind},
    foundation::error::ResourceLoadError,
    scene::model::{AudioTrack, ElementKind, Scene},
};

/// Playback conditions the streams are synced to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AudioMix {
    pub playing: bool,
    /// Master volume in `[0, 1]`.
    pub volume: f64,
    pub muted: bool,
    /// The playhead jumped; streams must be repositioned.
    pub seeked: bool,
}

impl AudioMix {
    fn master(&self) -> f64 {
        if self.muted { 0.0 } else { self.volume.clamp(0.0, 1.0) }
    }
}

/// Linear fade envelope for a track spanning `[0, duration]`, evaluated at `t`.
pub fn fade_gain(t: f64, duration: f64, fade_in: f64, fade_out: f64) -> f64 {
    let mut gain = 1.0;
    if fade_in > 0.0 {
        gain *= (t / fade_in).clamp(0.0, 1.0);
    }
    if fade_out > 0.0 {
        let rem = (duration - t).max(0.0);
        gain *= (rem / fade_out).clamp(0.0, 1.0);
    }
    gain
}

/// Gain of `track` at `scene_time` before the master volume is applied.
pub fn track_gain(track: &AudioTrack, scene_time: f64, scene_duration: f64) -> f64 {
    track.volume.clamp(0.0, 1.0)
        * fade_gain(scene_time, scene_duration, track.fade_in, track.fade_out)
}

/// Keeps the current scene's narration, music and video streams in step with the playhead.
#[derive(Debug, Default)]
pub struct AudioDirector {
    scene_id: Option<String>,
    active: Vec<(String, StreamKind)>,
    reported: HashSet<(String, StreamKind)>,
}

impl AudioDirector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring every stream of `scene` to `scene_time` under `mix`. Streams of the previously
    /// synced scene are paused when the scene changes.
    ///
    /// Returns stream failures not reported by an earlier sync.
    pub fn sync(
        &mut self,
        cache: &mut MediaCache,
        scene: &Scene,
        scene_time: f64,
        mix: AudioMix,
    ) -> Vec<ResourceLoadError> {
        let changed = self.scene_id.as_deref() != Some(scene.id.as_str());
        if changed {
            self.pause_active(cache);
            self.scene_id = Some(scene.id.clone());
        }

        let master = mix.master();
        let mut wanted: Vec<(&str, StreamKind, f64, f64)> = Vec::new();
        if let Some(audio) = &scene.audio {
            for (track, kind) in [
                (&audio.narration, StreamKind::Narration),
                (&audio.music, StreamKind::Music),
            ] {
                if let Some(track) = track {
                    let gain = track_gain(track, scene_time, scene.duration) * master;
                    wanted.push((track.source.as_str(), kind, gain, scene_time));
                }
            }
        }
        for el in &scene.elements {
            if let ElementKind::Video(video) = &el.kind
                && el.visible
                && el.is_active(scene_time)
            {
                let gain = if video.muted {
                    0.0
                } else {
                    video.volume.clamp(0.0, 1.0) * master
                };
                wanted.push((
                    video.source.as_str(),
                    StreamKind::Video,
                    gain,
                    scene_time - el.start,
                ));
            }
        }

        let mut failures = Vec::new();
        let mut next_active = Vec::with_capacity(wanted.len());
        for (source, kind, gain, position) in wanted {
            let key = (source.to_string(), kind);
            let fresh = !self.active.contains(&key);
            match cache.stream(source, kind) {
                Ok(stream) => {
                    stream.set_volume(gain);
                    if changed || fresh || mix.seeked {
                        stream.seek(position.max(0.0));
                    }
                    if mix.playing && !stream.is_playing() {
                        stream.play();
                    } else if !mix.playing && stream.is_playing() {
                        stream.pause();
                    }
                }
                // Video failures surface through the compositor; a resolver without a
                // playback backend is not an error.
                Err(ResourceLoadError::Unsupported { .. }) => {}
                Err(err) => {
                    if kind != StreamKind::Video && self.reported.insert(key.clone()) {
                        failures.push(err);
                    }
                }
            }
            next_active.push(key);
        }

        for (source, kind) in &self.active {
            if !next_active.iter().any(|(s, k)| s == source && k == kind)
                && let Ok(stream) = cache.stream(source, *kind)
            {
                stream.pause();
            }
        }
        self.active = next_active;
        failures
    }

    fn pause_active(&mut self, cache: &mut MediaCache) {
        for (source, kind) in self.active.drain(..) {
            if let Ok(stream) = cache.stream(&source, kind) {
                stream.pause();
            }
        }
    }

    /// Forget synced state after the cache released its streams.
    pub fn reset(&mut self) {
        self.scene_id = None;
        self.active.clear();
        self.reported.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/audio.rs"]
mod tests;
