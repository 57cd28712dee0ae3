use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::decode::Bitmap,
    foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8},
    foundation::error::{ReelError, ReelResult},
    foundation::math::lerp_u8,
    render::{
        FrameRGBA,
        surface::{Paint, Surface},
    },
    scene::model::FontSpec,
};

const MAX_TEXT_LAYOUTS: usize = 512;
const MAX_IMAGE_PAINTS: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TextBrushRgba8 {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    size_bits: u64,
    bold: bool,
    italic: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    from: [u8; 4],
    to: [u8; 4],
    angle_bits: u64,
    w: u32,
    h: u32,
}

struct LoadedFont {
    data: vello_cpu::peniko::FontData,
    family: String,
}

#[derive(Clone, Copy, Debug)]
struct Layer {
    transform: Affine,
    opacity_layer: bool,
}

/// Software raster surface backed by `vello_cpu`, with `parley` text shaping.
///
/// Drawing calls are recorded into the render context and rasterized on
/// [`Surface::present`]; [`CpuSurface::frame`] reads the last presented pixels.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
    clear: Rgba8,
    layers: Vec<Layer>,

    font: Option<LoadedFont>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    layouts: HashMap<TextKey, Arc<parley::Layout<TextBrushRgba8>>>,
    missing_font_warned: bool,

    image_paints: HashMap<u64, vello_cpu::Image>,
    gradient_paints: HashMap<GradientKey, vello_cpu::Image>,
}

impl CpuSurface {
    pub fn new(size: Canvas) -> ReelResult<Self> {
        let width: u16 = size
            .width
            .try_into()
            .map_err(|_| ReelError::evaluation("surface width exceeds u16"))?;
        let height: u16 = size
            .height
            .try_into()
            .map_err(|_| ReelError::evaluation("surface height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(ReelError::validation("surface size must be non-zero"));
        }
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            clear: Rgba8::TRANSPARENT,
            layers: Vec::new(),
            font: None,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            layouts: HashMap::new(),
            missing_font_warned: false,
            image_paints: HashMap::new(),
            gradient_paints: HashMap::new(),
        })
    }

    /// Register the font used for every text draw. Without a font, text is measured
    /// approximately and not drawn.
    pub fn with_font(mut self, font_bytes: Vec<u8>) -> ReelResult<Self> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ReelError::validation("no font families registered from font bytes"))?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::validation("registered font family has no name"))?
            .to_string();
        tracing::debug!(family = %family, "surface font registered");

        self.font = Some(LoadedFont {
            data: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0),
            family,
        });
        self.layouts.clear();
        Ok(self)
    }

    /// Pixels of the last presented frame, premultiplied.
    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    fn current(&self) -> Affine {
        self.layers
            .last()
            .map(|l| l.transform)
            .unwrap_or(Affine::IDENTITY)
    }

    fn begin_draw(&mut self) {
        self.ctx.set_transform(affine_to_cpu(self.current()));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    fn set_color(&mut self, c: Rgba8) {
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
    }

    fn text_layout(
        &mut self,
        text: &str,
        font: &FontSpec,
    ) -> Option<Arc<parley::Layout<TextBrushRgba8>>> {
        let family = self.font.as_ref()?.family.clone();
        let key = TextKey {
            text: text.to_string(),
            size_bits: font.size.to_bits(),
            bold: font.bold,
            italic: font.italic,
        };
        if let Some(layout) = self.layouts.get(&key) {
            return Some(Arc::clone(layout));
        }
        if self.layouts.len() >= MAX_TEXT_LAYOUTS {
            self.layouts.clear();
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size as f32));
        if font.bold {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }
        if font.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8::default()));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        let layout = Arc::new(layout);
        self.layouts.insert(key, Arc::clone(&layout));
        Some(layout)
    }

    fn image_paint(&mut self, image: &Bitmap) -> Option<vello_cpu::Image> {
        if let Some(p) = self.image_paints.get(&image.key) {
            return Some(p.clone());
        }
        let pixmap = premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        if self.image_paints.len() >= MAX_IMAGE_PAINTS {
            self.image_paints.clear();
        }
        self.image_paints.insert(image.key, paint.clone());
        Some(paint)
    }

    fn gradient_paint(
        &mut self,
        from: Rgba8,
        to: Rgba8,
        angle_deg: f64,
        w: u32,
        h: u32,
    ) -> Option<vello_cpu::Image> {
        let key = GradientKey {
            from: from.to_array(),
            to: to.to_array(),
            angle_bits: angle_deg.to_bits(),
            w,
            h,
        };
        if let Some(img) = self.gradient_paints.get(&key).cloned() {
            return Some(img);
        }

        // Project each pixel onto the gradient axis; 0 deg runs top to bottom.
        let theta = angle_deg.to_radians();
        let (dx, dy) = (theta.sin(), theta.cos());
        let (wf, hf) = (f64::from(w.max(1) - 1), f64::from(h.max(1) - 1));
        let corners = [0.0, wf * dx, hf * dy, wf * dx + hf * dy];
        let lo = corners.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = corners.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = hi - lo;

        let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
        for y in 0..h {
            for x in 0..w {
                let proj = f64::from(x) * dx + f64::from(y) * dy;
                let t = if span <= 0.0 { 0.0 } else { (proj - lo) / span };
                let c = Rgba8::new(
                    lerp_u8(from.r, to.r, t),
                    lerp_u8(from.g, to.g, t),
                    lerp_u8(from.b, to.b, t),
                    lerp_u8(from.a, to.a, t),
                )
                .premultiplied()
                .to_array();
                let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&c);
            }
        }
        let pixmap = premul_bytes_to_pixmap(&bytes, w, h)?;
        let img = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.gradient_paints.insert(key, img.clone());
        Some(img)
    }

    /// Fill `dest` with `paint`, an image of `w` x `h` pixels stretched to the rectangle.
    fn fill_with_image(&mut self, paint: vello_cpu::Image, w: u32, h: u32, dest: Rect) {
        if w == 0 || h == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return;
        }
        let local = Affine::translate((dest.x0, dest.y0))
            * Affine::scale_non_uniform(dest.width() / f64::from(w), dest.height() / f64::from(h));
        self.ctx
            .set_transform(affine_to_cpu(self.current() * local));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));
    }
}

impl Surface for CpuSurface {
    fn size(&self) -> Canvas {
        Canvas {
            width: u32::from(self.width),
            height: u32::from(self.height),
        }
    }

    fn clear(&mut self, color: Rgba8) {
        self.ctx.reset();
        self.layers.clear();
        self.clear = color;
        self.begin_draw();
        self.set_color(color);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    fn push_layer(&mut self, transform: Affine, opacity: f64) {
        let opacity_layer = opacity < 1.0;
        if opacity_layer {
            self.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0) as f32);
        }
        let transform = self.current() * transform;
        self.layers.push(Layer {
            transform,
            opacity_layer,
        });
    }

    fn pop_layer(&mut self) {
        if let Some(layer) = self.layers.pop()
            && layer.opacity_layer
        {
            self.ctx.pop_layer();
        }
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint) {
        match *paint {
            Paint::Solid(c) => {
                self.begin_draw();
                self.set_color(c);
                self.ctx.fill_rect(&rect_to_cpu(rect));
            }
            Paint::LinearGradient {
                from,
                to,
                angle_deg,
            } => {
                let w = rect.width().ceil().clamp(1.0, 4096.0) as u32;
                let h = rect.height().ceil().clamp(1.0, 4096.0) as u32;
                if let Some(img) = self.gradient_paint(from, to, angle_deg, w, h) {
                    self.fill_with_image(img, w, h, rect);
                }
            }
        }
    }

    fn fill_path(&mut self, path: &BezPath, color: Rgba8) {
        self.begin_draw();
        self.set_color(color);
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn stroke_path(&mut self, path: &BezPath, color: Rgba8, width: f64) {
        if width <= 0.0 {
            return;
        }
        let outline = kurbo::stroke(
            path.iter(),
            &kurbo::Stroke::new(width),
            &kurbo::StrokeOpts::default(),
            0.25,
        );
        self.fill_path(&outline, color);
    }

    fn draw_image(&mut self, image: &Bitmap, dest: Rect) {
        match self.image_paint(image) {
            Some(paint) => self.fill_with_image(paint, image.width, image.height, dest),
            None => tracing::warn!(
                width = image.width,
                height = image.height,
                "bitmap too large for cpu surface"
            ),
        }
    }

    fn measure_text(&mut self, text: &str, font: &FontSpec) -> f64 {
        match self.text_layout(text, font) {
            Some(layout) => f64::from(layout.width()),
            None => text.chars().count() as f64 * font.size * 0.5,
        }
    }

    fn draw_text(&mut self, text: &str, origin: Point, font: &FontSpec, color: Rgba8) {
        let Some(layout) = self.text_layout(text, font) else {
            if !self.missing_font_warned {
                tracing::warn!("no font registered on cpu surface; text is not drawn");
                self.missing_font_warned = true;
            }
            return;
        };
        let Some(font_data) = self.font.as_ref().map(|f| f.data.clone()) else {
            return;
        };

        self.ctx.set_transform(affine_to_cpu(
            self.current() * Affine::translate(origin.to_vec2()),
        ));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.set_color(color);
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    fn present(&mut self) {
        while let Some(layer) = self.layers.pop() {
            if layer.opacity_layer {
                self.ctx.pop_layer();
            }
        }
        clear_pixmap(&mut self.pixmap, self.clear.premultiplied().to_array());
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
    }
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, premul: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&premul);
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> Option<vello_cpu::Pixmap> {
    let w: u16 = width.try_into().ok()?;
    let h: u16 = height.try_into().ok()?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return None;
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Some(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
