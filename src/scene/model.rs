use crate::{
    animation::ease::Ease,
    foundation::core::{Point, Rect, Rgba8, Vec2},
    foundation::error::{ReelError, ReelResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A timed, self-contained segment of the video.
pub struct Scene {
    /// Scene identifier (unique within the graph).
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Duration in seconds; must be finite and > 0.
    pub duration: f64,
    /// Elements in authoring order. Draw order is decided by [`Element::z_order`].
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Scene background.
    #[serde(default)]
    pub background: Background,
    /// Optional narration and background music.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<SceneAudio>,
    /// Transition played when this scene hands over to the next one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<TransitionSpec>,
}

impl Scene {
    /// Scene with no elements and a black background.
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration,
            elements: Vec::new(),
            background: Background::default(),
            audio: None,
            transition: None,
        }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_index(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.id.trim().is_empty() {
            return Err(ReelError::validation("scene id must be non-empty"));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ReelError::validation(format!(
                "scene '{}' duration must be finite and > 0",
                self.id
            )));
        }
        for (i, el) in self.elements.iter().enumerate() {
            if self.elements[..i].iter().any(|other| other.id == el.id) {
                return Err(ReelError::validation(format!(
                    "scene '{}' has duplicate element id '{}'",
                    self.id, el.id
                )));
            }
            el.validate(self.duration)?;
        }
        if let Some(audio) = &self.audio {
            for track in [&audio.narration, &audio.music].into_iter().flatten() {
                track.validate()?;
            }
        }
        if let Some(tr) = &self.transition {
            tr.validate()?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// How the scene area is filled before elements are drawn.
pub enum Background {
    /// Flat color.
    Color {
        /// Fill color.
        color: Rgba8,
    },
    /// Two-stop linear gradient.
    Gradient {
        /// Color at the gradient start.
        from: Rgba8,
        /// Color at the gradient end.
        to: Rgba8,
        /// Direction in degrees; 0 runs top to bottom, 90 left to right.
        #[serde(default)]
        angle_deg: f64,
    },
    /// Image stretched over the whole canvas.
    Image {
        /// Media source identifier.
        source: String,
    },
}

impl Default for Background {
    fn default() -> Self {
        Self::Color {
            color: Rgba8::BLACK,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Narration and background music attached to a scene.
pub struct SceneAudio {
    /// Voice-over track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<AudioTrack>,
    /// Background music track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<AudioTrack>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A single audio reference with simple level controls.
pub struct AudioTrack {
    /// Media source identifier.
    pub source: String,
    /// Linear gain in `[0, 1]`.
    #[serde(default = "default_volume")]
    pub volume: f64,
    /// Fade-in length in seconds from the scene start.
    #[serde(default)]
    pub fade_in: f64,
    /// Fade-out length in seconds before the scene end.
    #[serde(default)]
    pub fade_out: f64,
}

impl AudioTrack {
    fn validate(&self) -> ReelResult<()> {
        if self.source.trim().is_empty() {
            return Err(ReelError::validation("audio source must be non-empty"));
        }
        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            return Err(ReelError::validation(format!(
                "audio '{}' volume must be in [0, 1]",
                self.source
            )));
        }
        if !(self.fade_in.is_finite() && self.fade_in >= 0.0)
            || !(self.fade_out.is_finite() && self.fade_out >= 0.0)
        {
            return Err(ReelError::validation(format!(
                "audio '{}' fades must be finite and >= 0",
                self.source
            )));
        }
        Ok(())
    }
}

fn default_volume() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Element placement in logical canvas pixels.
pub struct ElementBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A positioned, timed visual item inside a scene.
pub struct Element {
    /// Identifier, unique within its scene.
    pub id: String,
    /// Placement box.
    #[serde(rename = "box")]
    pub bounds: ElementBox,
    /// Scene-relative start time in seconds.
    pub start: f64,
    /// Scene-relative end time in seconds.
    pub end: f64,
    /// Stacking order; higher draws later.
    #[serde(default)]
    pub z_order: i32,
    /// Hidden elements are never drawn.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Optional entrance/emphasis/exit animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<AnimationSpec>,
    /// Variant payload.
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub fn new(
        id: impl Into<String>,
        bounds: ElementBox,
        start: f64,
        end: f64,
        kind: ElementKind,
    ) -> Self {
        Self {
            id: id.into(),
            bounds,
            start,
            end,
            z_order: 0,
            visible: true,
            animation: None,
            kind,
        }
    }

    pub fn with_z(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    pub fn with_animation(mut self, animation: AnimationSpec) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Whether `t` falls inside the inclusive `[start, end]` window.
    pub fn is_active(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Media source the element needs from the cache, if any.
    pub fn source(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Image(m) => Some(&m.source),
            ElementKind::Video(v) => Some(&v.source),
            ElementKind::Text(_) | ElementKind::Shape(_) | ElementKind::Avatar(_) => None,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.bounds.center().to_vec2()
    }

    pub fn validate(&self, scene_duration: f64) -> ReelResult<()> {
        if self.id.trim().is_empty() {
            return Err(ReelError::validation("element id must be non-empty"));
        }
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(ReelError::validation(format!(
                "element '{}' start/end must be finite",
                self.id
            )));
        }
        if !(0.0 <= self.start && self.start < self.end && self.end <= scene_duration) {
            return Err(ReelError::validation(format!(
                "element '{}' must satisfy 0 <= start < end <= {scene_duration}",
                self.id
            )));
        }
        let b = self.bounds;
        if ![b.x, b.y, b.width, b.height].iter().all(|v| v.is_finite())
            || b.width < 0.0
            || b.height < 0.0
        {
            return Err(ReelError::validation(format!(
                "element '{}' box must be finite with non-negative size",
                self.id
            )));
        }
        if let Some(src) = self.source()
            && src.trim().is_empty()
        {
            return Err(ReelError::validation(format!(
                "element '{}' source must be non-empty",
                self.id
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
/// Variant payload of an [`Element`].
pub enum ElementKind {
    /// Text block.
    Text(TextPayload),
    /// Still image.
    Image(ImagePayload),
    /// Video clip.
    Video(VideoPayload),
    /// Vector shape.
    Shape(ShapePayload),
    /// Presenter avatar.
    Avatar(AvatarPayload),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextPayload {
    pub content: String,
    #[serde(default)]
    pub font: FontSpec,
    #[serde(default = "default_text_color")]
    pub color: Rgba8,
    #[serde(default)]
    pub align: TextAlign,
}

fn default_text_color() -> Rgba8 {
    Rgba8::WHITE
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    #[serde(default = "default_family")]
    pub family: String,
    #[serde(default = "default_font_size")]
    pub size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

fn default_family() -> String {
    "sans-serif".to_string()
}

fn default_font_size() -> f64 {
    32.0
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: default_family(),
            size: default_font_size(),
            bold: false,
            italic: false,
        }
    }
}

impl FontSpec {
    /// Baseline-to-baseline distance used when stacking wrapped lines.
    pub fn line_height(&self) -> f64 {
        self.size * 1.2
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImagePayload {
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoPayload {
    pub source: String,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "default_volume")]
    pub volume: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShapePayload {
    pub shape: ShapeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Rgba8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeSpec>,
    /// Corner radius for rectangles.
    #[serde(default)]
    pub corner_radius: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Star,
    Line,
    Arrow,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeSpec {
    pub color: Rgba8,
    #[serde(default = "default_stroke_width")]
    pub width: f64,
}

fn default_stroke_width() -> f64 {
    2.0
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AvatarPayload {
    pub avatar: AvatarKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_bubble: Option<SpeechBubble>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarKind {
    Presenter,
    Narrator,
    Robot,
    Mascot,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SpeechBubble {
    pub text: String,
    #[serde(default = "default_bubble_color")]
    pub fill: Rgba8,
    #[serde(default = "default_bubble_text")]
    pub text_color: Rgba8,
}

fn default_bubble_color() -> Rgba8 {
    Rgba8::WHITE
}

fn default_bubble_text() -> Rgba8 {
    Rgba8::rgb(20, 20, 20)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Animation preset applied to an element.
pub enum AnimationKind {
    #[default]
    None,
    FadeIn,
    FadeOut,
    SlideIn,
    SlideOut,
    Bounce,
    Shake,
    Pulse,
    Rotate,
    Scale,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Per-element animation: what, how long, when and with which easing.
pub struct AnimationSpec {
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    /// Seconds; must be finite and > 0.
    pub duration: f64,
    /// Seconds after the element start; must be finite and >= 0.
    #[serde(default)]
    pub delay: f64,
    #[serde(default)]
    pub easing: Ease,
    #[serde(default)]
    pub direction: Direction,
}

impl AnimationSpec {
    pub fn new(kind: AnimationKind, duration: f64) -> Self {
        Self {
            kind,
            duration,
            delay: 0.0,
            easing: Ease::Linear,
            direction: Direction::Forward,
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(ReelError::animation(format!(
                "{:?} duration must be finite and > 0 (got {})",
                self.kind, self.duration
            )));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(ReelError::animation(format!(
                "{:?} delay must be finite and >= 0 (got {})",
                self.kind, self.delay
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Visual hand-over between two consecutive scenes.
pub enum TransitionKind {
    #[default]
    None,
    Fade,
    SlideLeft,
    SlideRight,
    SlideUp,
    SlideDown,
    Zoom,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionSpec {
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    /// Seconds; must be finite and >= 0.
    pub duration: f64,
    #[serde(default)]
    pub easing: Ease,
}

impl TransitionSpec {
    pub fn validate(&self) -> ReelResult<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(ReelError::animation(
                "transition duration must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
