use std::time::Duration;

use crate::foundation::{
    core::{Canvas, Rgba8},
    error::{ReelError, ReelResult},
};

/// Preview output quality.
///
/// Every level renders the same 1920x1080 logical canvas; the level picks the physical surface
/// resolution and the scale applied to logical coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// 960x540, half scale.
    Low,
    /// 1280x720.
    Medium,
    /// 1920x1080, 1:1 with the logical canvas.
    #[default]
    High,
    /// 3840x2160, double scale.
    Ultra,
}

impl Quality {
    /// Physical surface size for this level.
    pub fn resolution(self) -> Canvas {
        let (width, height) = match self {
            Self::Low => (960, 540),
            Self::Medium => (1280, 720),
            Self::High => (1920, 1080),
            Self::Ultra => (3840, 2160),
        };
        Canvas { width, height }
    }

    /// Factor mapping logical canvas units to surface pixels.
    pub fn scale_factor(self) -> f64 {
        match self {
            Self::Low => 0.5,
            Self::Medium => 2.0 / 3.0,
            Self::High => 1.0,
            Self::Ultra => 2.0,
        }
    }

    /// Parse a level name (`low`, `medium`, `high`, `ultra`), case-insensitive.
    pub fn parse(s: &str) -> ReelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "ultra" => Ok(Self::Ultra),
            other => Err(ReelError::validation(format!("unknown quality '{other}'"))),
        }
    }
}

/// Playback and preview settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Wall-clock interval between playback ticks.
    #[serde(with = "duration_ms")]
    pub tick_interval: Duration,
    /// Surface resolution and scale.
    pub quality: Quality,
    /// Wrap to the start when playback reaches the end.
    pub loop_playback: bool,
    /// Initial playback speed, clamped to `[0.25, 4]`.
    pub speed: f64,
    /// Initial master volume, clamped to `[0, 1]`.
    pub volume: f64,
    /// Maximum number of retained undo entries.
    pub history_capacity: usize,
    /// Color the surface is cleared to before the background is drawn.
    pub clear_color: [u8; 4],
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(100),
            quality: Quality::High,
            loop_playback: false,
            speed: 1.0,
            volume: 1.0,
            history_capacity: 100,
            clear_color: Rgba8::BLACK.to_array(),
        }
    }
}

impl PreviewConfig {
    /// Defaults overlaid with `SCENEREEL_TICK_MS`, `SCENEREEL_HISTORY_CAPACITY` and
    /// `SCENEREEL_QUALITY` when set. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(ms) = std::env::var("SCENEREEL_TICK_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&n| n > 0)
        {
            cfg.tick_interval = Duration::from_millis(ms);
        }
        if let Some(cap) = std::env::var("SCENEREEL_HISTORY_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            cfg.history_capacity = cap;
        }
        if let Some(q) = std::env::var("SCENEREEL_QUALITY")
            .ok()
            .and_then(|v| Quality::parse(&v).ok())
        {
            cfg.quality = q;
        }
        cfg
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.tick_interval.is_zero() {
            return Err(ReelError::validation("tick_interval must be > 0"));
        }
        if self.history_capacity == 0 {
            return Err(ReelError::validation("history_capacity must be > 0"));
        }
        if !self.speed.is_finite() || !self.volume.is_finite() {
            return Err(ReelError::validation("speed and volume must be finite"));
        }
        Ok(())
    }

    pub fn clear_rgba(&self) -> Rgba8 {
        let [r, g, b, a] = self.clear_color;
        Rgba8::new(r, g, b, a)
    }
}

mod duration_ms {
    use std::time::Duration;

    pub(super) fn serialize<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: serde::Deserializer<'de>>(
        d: D,
    ) -> Result<Duration, D::Error> {
        let ms = <u64 as serde::Deserialize>::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
