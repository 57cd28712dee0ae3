use crate::{
    assets::decode::Bitmap,
    foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8},
    scene::model::FontSpec,
};

/// How a filled area is colored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Paint {
    Solid(Rgba8),
    /// Two-stop linear gradient across the filled rectangle.
    LinearGradient {
        from: Rgba8,
        to: Rgba8,
        /// 0 runs top to bottom, 90 left to right.
        angle_deg: f64,
    },
}

/// Abstract drawing target the compositor renders a frame onto.
///
/// Coordinates passed to drawing calls are in the space of the innermost pushed layer. Layers
/// nest: each one composes its transform onto the enclosing one and multiplies its opacity in.
pub trait Surface {
    /// Physical size in pixels.
    fn size(&self) -> Canvas;

    /// Discard all content and layers, filling the surface with `color`.
    fn clear(&mut self, color: Rgba8);

    fn push_layer(&mut self, transform: Affine, opacity: f64);

    /// Pop the innermost layer. Popping with no open layer is ignored.
    fn pop_layer(&mut self);

    fn fill_rect(&mut self, rect: Rect, paint: &Paint);

    fn fill_path(&mut self, path: &BezPath, color: Rgba8);

    fn stroke_path(&mut self, path: &BezPath, color: Rgba8, width: f64);

    /// Draw `image` stretched to `dest`.
    fn draw_image(&mut self, image: &Bitmap, dest: Rect);

    /// Advance width of `text` set in `font`, in layer units.
    fn measure_text(&mut self, text: &str, font: &FontSpec) -> f64;

    /// Draw a single line of text whose line box starts at `origin` (top-left).
    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Rgba8);

    /// Finish the frame. Backends that rasterize lazily do their work here.
    fn present(&mut self) {}
}
