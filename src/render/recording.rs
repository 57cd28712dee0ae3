use kurbo::Shape;

use crate::{
    assets::decode::Bitmap,
    foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8},
    render::surface::{Paint, Surface},
    scene::model::FontSpec,
};

/// Advance of one character in a [`RecordingSurface`], as a fraction of the font size.
pub const RECORDING_CHAR_ADVANCE: f64 = 0.5;

/// One recorded drawing call.
///
/// Content calls carry the absolute transform and opacity in effect when they were issued.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Clear(Rgba8),
    PushLayer {
        transform: Affine,
        opacity: f64,
    },
    PopLayer,
    FillRect {
        rect: Rect,
        paint: Paint,
        transform: Affine,
        opacity: f64,
    },
    FillPath {
        bounds: Rect,
        color: Rgba8,
        transform: Affine,
        opacity: f64,
    },
    StrokePath {
        bounds: Rect,
        color: Rgba8,
        width: f64,
        transform: Affine,
        opacity: f64,
    },
    Image {
        key: u64,
        dest: Rect,
        transform: Affine,
        opacity: f64,
    },
    Text {
        text: String,
        origin: Point,
        size: f64,
        color: Rgba8,
        transform: Affine,
        opacity: f64,
    },
    Present,
}

/// Display-list surface: records calls instead of rasterizing.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    size: Canvas,
    stack: Vec<(Affine, f64)>,
    calls: Vec<DrawCall>,
    presented: usize,
}

impl RecordingSurface {
    pub fn new(size: Canvas) -> Self {
        Self {
            size,
            stack: Vec::new(),
            calls: Vec::new(),
            presented: 0,
        }
    }

    /// Calls recorded since the last [`Surface::clear`].
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Number of frames presented over the surface's lifetime.
    pub fn frames_presented(&self) -> usize {
        self.presented
    }

    /// Text drawn in the current frame, in draw order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Keys of bitmaps drawn in the current frame, in draw order.
    pub fn image_keys(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Image { key, .. } => Some(*key),
                _ => None,
            })
            .collect()
    }

    /// Open layers; zero between balanced frames.
    pub fn layer_depth(&self) -> usize {
        self.stack.len()
    }

    fn current(&self) -> (Affine, f64) {
        self.stack.last().copied().unwrap_or((Affine::IDENTITY, 1.0))
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Canvas {
        self.size
    }

    fn clear(&mut self, color: Rgba8) {
        self.stack.clear();
        self.calls.clear();
        self.calls.push(DrawCall::Clear(color));
    }

    fn push_layer(&mut self, transform: Affine, opacity: f64) {
        let (t, o) = self.current();
        self.stack.push((t * transform, o * opacity));
        self.calls.push(DrawCall::PushLayer { transform, opacity });
    }

    fn pop_layer(&mut self) {
        if self.stack.pop().is_some() {
            self.calls.push(DrawCall::PopLayer);
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        let (transform, opacity) = self.current();
        self.calls.push(DrawCall::FillRect {
            rect,
            paint: *paint,
            transform,
            opacity,
        });
    }

    fn fill_path(&mut self, path: &BezPath, color: Rgba8) {
        let (transform, opacity) = self.current();
        self.calls.push(DrawCall::FillPath {
            bounds: path.bounding_box(),
            color,
            transform,
            opacity,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, color: Rgba8, width: f64) {
        let (transform, opacity) = self.current();
        self.calls.push(DrawCall::StrokePath {
            bounds: path.bounding_box(),
            color,
            width,
            transform,
            opacity,
        });
    }

    fn draw_image(&mut self, image: &Bitmap, dest: Rect) {
        let (transform, opacity) = self.current();
        self.calls.push(DrawCall::Image {
            key: image.key,
            dest,
            transform,
            opacity,
        });
    }

    fn measure_text(&mut self, text: &str, font: &FontSpec) -> f64 {
        text.chars().count() as f64 * font.size * RECORDING_CHAR_ADVANCE
    }

    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Rgba8) {
        let (transform, opacity) = self.current();
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            origin,
            size: font.size,
            color,
            transform,
            opacity,
        });
    }

    fn present(&mut self) {
        self.presented += 1;
        self.calls.push(DrawCall::Present);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
