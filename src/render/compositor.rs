use std::f64::consts::PI;

use kurbo::Shape;

use crate::{
    animation::{
        evaluate::evaluate,
        transition::{SceneLayer, TransitionState},
    },
    assets::{cache::MediaCache, decode::Bitmap},
    foundation::{
        config::Quality,
        core::{Affine, BezPath, Canvas, Point, Rect, Rgba8},
        error::ResourceLoadError,
    },
    render::{
        surface::{Paint, Surface},
        text,
    },
    scene::model::{
        AvatarKind, AvatarPayload, Background, Element, ElementKind, FontSpec, Scene, ShapeKind,
        ShapePayload, SpeechBubble, TextAlign,
    },
};

const DEFAULT_SHAPE_FILL: Rgba8 = Rgba8::WHITE;
const VIDEO_PLACEHOLDER: Rgba8 = Rgba8::rgb(32, 32, 36);
const VIDEO_PLACEHOLDER_ICON: Rgba8 = Rgba8::new(255, 255, 255, 180);
const PATH_TOLERANCE: f64 = 0.1;

/// A media failure recovered while compositing a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderError {
    pub scene_id: String,
    /// Element that was skipped; `None` when the scene background failed.
    pub element_id: Option<String>,
    pub error: ResourceLoadError,
}

/// What one composited frame contained.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Element ids in draw order.
    pub drawn: Vec<String>,
    /// Media failures; the affected elements were skipped.
    pub errors: Vec<RenderError>,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Draws scenes onto a [`Surface`], pulling media from a [`MediaCache`].
///
/// Scenes are authored against [`Canvas::DESIGN`]; the quality level's scale factor maps those
/// logical units onto the surface.
pub struct Compositor {
    cache: MediaCache,
    quality: Quality,
    clear: Rgba8,
    on_error: Option<Box<dyn FnMut(&RenderError)>>,
}

impl Compositor {
    pub fn new(cache: MediaCache, quality: Quality) -> Self {
        Self {
            cache,
            quality,
            clear: Rgba8::BLACK,
            on_error: None,
        }
    }

    pub fn with_clear_color(mut self, clear: Rgba8) -> Self {
        self.clear = clear;
        self
    }

    /// Route every recovered media failure to `sink` as it happens.
    pub fn set_error_sink(&mut self, sink: impl FnMut(&RenderError) + 'static) {
        self.on_error = Some(Box::new(sink));
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    pub fn cache(&self) -> &MediaCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut MediaCache {
        &mut self.cache
    }

    /// Composite `scene` at scene-relative time `t` and present it.
    ///
    /// Background first, then elements in ascending z-order (ties keep list order). A media
    /// failure skips only the affected element.
    #[tracing::instrument(level = "debug", skip_all, fields(scene = %scene.id, t))]
    pub fn render<S: Surface + ?Sized>(
        &mut self,
        scene: &Scene,
        t: f64,
        surface: &mut S,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        surface.clear(self.clear);
        self.draw_scene(scene, t, None, surface, &mut report);
        surface.present();
        report
    }

    /// Composite a scene transition: `outgoing` frozen at its final instant beneath `incoming` at
    /// `incoming_t`, each through its transition layer.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(from = %outgoing.id, to = %incoming.id, p = state.progress)
    )]
    pub fn render_transition<S: Surface + ?Sized>(
        &mut self,
        outgoing: &Scene,
        incoming: &Scene,
        incoming_t: f64,
        state: &TransitionState,
        surface: &mut S,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        surface.clear(self.clear);
        if state.outgoing.opacity > 0.0 {
            self.draw_scene(
                outgoing,
                outgoing.duration,
                Some(state.outgoing),
                surface,
                &mut report,
            );
        }
        if state.incoming.opacity > 0.0 {
            self.draw_scene(incoming, incoming_t, Some(state.incoming), surface, &mut report);
        }
        surface.present();
        report
    }

    fn draw_scene<S: Surface + ?Sized>(
        &mut self,
        scene: &Scene,
        t: f64,
        layer: Option<SceneLayer>,
        surface: &mut S,
        report: &mut FrameReport,
    ) {
        let (layer_tr, layer_opacity) = layer
            .map(|l| (l.transform.to_affine(), l.opacity))
            .unwrap_or((Affine::IDENTITY, 1.0));
        surface.push_layer(Affine::scale(self.quality.scale_factor()) * layer_tr, layer_opacity);

        self.draw_background(scene, surface, report);

        let mut order: Vec<&Element> = scene.elements.iter().collect();
        order.sort_by_key(|el| el.z_order);

        for el in order {
            let state = evaluate(el, t);
            if !state.visible {
                continue;
            }
            let media = match self.fetch_media(el, t) {
                Ok(media) => media,
                Err(error) => {
                    self.report(
                        report,
                        RenderError {
                            scene_id: scene.id.clone(),
                            element_id: Some(el.id.clone()),
                            error,
                        },
                    );
                    continue;
                }
            };

            surface.push_layer(state.transform.to_affine(), state.opacity);
            draw_payload(el, media.as_ref(), surface);
            surface.pop_layer();
            report.drawn.push(el.id.clone());
        }

        surface.pop_layer();
    }

    fn draw_background<S: Surface + ?Sized>(
        &mut self,
        scene: &Scene,
        surface: &mut S,
        report: &mut FrameReport,
    ) {
        let area = Canvas::DESIGN.rect();
        match &scene.background {
            Background::Color { color } => surface.fill_rect(area, &Paint::Solid(*color)),
            Background::Gradient {
                from,
                to,
                angle_deg,
            } => surface.fill_rect(
                area,
                &Paint::LinearGradient {
                    from: *from,
                    to: *to,
                    angle_deg: *angle_deg,
                },
            ),
            Background::Image { source } => match self.cache.load(source) {
                Ok(bmp) => surface.draw_image(&bmp, area),
                Err(error) => {
                    surface.fill_rect(area, &Paint::Solid(Rgba8::BLACK));
                    self.report(
                        report,
                        RenderError {
                            scene_id: scene.id.clone(),
                            element_id: None,
                            error,
                        },
                    );
                }
            },
        }
    }

    /// Bitmap an element needs, if any. Video elements without a decodable frame fall back to a
    /// placeholder (`Ok(None)`); missing or broken media is an error.
    fn fetch_media(&mut self, el: &Element, t: f64) -> Result<Option<Bitmap>, ResourceLoadError> {
        match &el.kind {
            ElementKind::Image(img) => self.cache.load(&img.source).map(Some),
            ElementKind::Video(video) => match self.cache.video_frame(&video.source, t - el.start) {
                Ok(frame) => Ok(frame),
                Err(ResourceLoadError::Unsupported { .. }) => Ok(None),
                Err(err) => Err(err),
            },
            ElementKind::Text(_) | ElementKind::Shape(_) | ElementKind::Avatar(_) => Ok(None),
        }
    }

    fn report(&mut self, report: &mut FrameReport, err: RenderError) {
        tracing::warn!(
            scene = %err.scene_id,
            element = err.element_id.as_deref().unwrap_or("<background>"),
            error = %err.error,
            "skipped media"
        );
        if let Some(sink) = self.on_error.as_mut() {
            sink(&err);
        }
        report.errors.push(err);
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("cache", &self.cache)
            .field("quality", &self.quality)
            .field("clear", &self.clear)
            .finish()
    }
}

fn draw_payload<S: Surface + ?Sized>(el: &Element, media: Option<&Bitmap>, surface: &mut S) {
    let rect = el.bounds.rect();
    match &el.kind {
        ElementKind::Text(t) => {
            text::draw_block(surface, &t.content, &t.font, t.align, t.color, rect)
        }
        ElementKind::Image(_) => {
            if let Some(bmp) = media {
                surface.draw_image(bmp, rect);
            }
        }
        ElementKind::Video(_) => match media {
            Some(frame) => surface.draw_image(frame, rect),
            None => draw_video_placeholder(surface, rect),
        },
        ElementKind::Shape(shape) => draw_shape(surface, shape, rect),
        ElementKind::Avatar(avatar) => draw_avatar(surface, avatar, rect),
    }
}

fn draw_video_placeholder<S: Surface + ?Sized>(surface: &mut S, rect: Rect) {
    surface.fill_rect(rect, &Paint::Solid(VIDEO_PLACEHOLDER));
    let r = rect.width().min(rect.height()) * 0.15;
    let c = rect.center();
    let mut play = BezPath::new();
    play.move_to((c.x - r * 0.6, c.y - r));
    play.line_to((c.x + r, c.y));
    play.line_to((c.x - r * 0.6, c.y + r));
    play.close_path();
    surface.fill_path(&play, VIDEO_PLACEHOLDER_ICON);
}

/// Outline of a shape kind inside `rect`.
pub fn shape_path(kind: ShapeKind, rect: Rect, corner_radius: f64) -> BezPath {
    let c = rect.center();
    match kind {
        ShapeKind::Rectangle if corner_radius > 0.0 => {
            let r = corner_radius.min(rect.width().min(rect.height()) / 2.0);
            kurbo::RoundedRect::from_rect(rect, r).to_path(PATH_TOLERANCE)
        }
        ShapeKind::Rectangle => rect.to_path(PATH_TOLERANCE),
        ShapeKind::Circle => kurbo::Ellipse::from_rect(rect).to_path(PATH_TOLERANCE),
        ShapeKind::Triangle => {
            let mut p = BezPath::new();
            p.move_to((c.x, rect.y0));
            p.line_to((rect.x1, rect.y1));
            p.line_to((rect.x0, rect.y1));
            p.close_path();
            p
        }
        ShapeKind::Star => {
            let outer = rect.width().min(rect.height()) / 2.0;
            let inner = outer * 0.4;
            let mut p = BezPath::new();
            for i in 0..10 {
                let r = if i % 2 == 0 { outer } else { inner };
                let a = -PI / 2.0 + f64::from(i) * PI / 5.0;
                let pt = Point::new(c.x + r * a.cos(), c.y + r * a.sin());
                if i == 0 {
                    p.move_to(pt);
                } else {
                    p.line_to(pt);
                }
            }
            p.close_path();
            p
        }
        ShapeKind::Line | ShapeKind::Arrow => {
            let mut p = BezPath::new();
            p.move_to((rect.x0, c.y));
            p.line_to((rect.x1, c.y));
            p
        }
    }
}

fn draw_shape<S: Surface + ?Sized>(surface: &mut S, shape: &ShapePayload, rect: Rect) {
    let path = shape_path(shape.shape, rect, shape.corner_radius);
    let fill = shape
        .fill
        .or(shape.stroke.is_none().then_some(DEFAULT_SHAPE_FILL));

    match shape.shape {
        ShapeKind::Line | ShapeKind::Arrow => {
            // Open paths only stroke; the fill color doubles as the line color.
            let (color, width) = match shape.stroke {
                Some(s) => (s.color, s.width),
                None => (fill.unwrap_or(DEFAULT_SHAPE_FILL), 2.0),
            };
            surface.stroke_path(&path, color, width);
            if shape.shape == ShapeKind::Arrow {
                let head = (rect.height() / 2.0).max(width * 3.0).min(rect.width() / 2.0);
                let cy = rect.center().y;
                let mut tip = BezPath::new();
                tip.move_to((rect.x1, cy));
                tip.line_to((rect.x1 - head, cy - head / 2.0));
                tip.line_to((rect.x1 - head, cy + head / 2.0));
                tip.close_path();
                surface.fill_path(&tip, color);
            }
        }
        _ => {
            if let Some(fill) = fill {
                surface.fill_path(&path, fill);
            }
            if let Some(stroke) = shape.stroke {
                surface.stroke_path(&path, stroke.color, stroke.width);
            }
        }
    }
}

fn avatar_color(kind: AvatarKind) -> Rgba8 {
    match kind {
        AvatarKind::Presenter => Rgba8::rgb(66, 133, 244),
        AvatarKind::Narrator => Rgba8::rgb(52, 168, 83),
        AvatarKind::Robot => Rgba8::rgb(154, 160, 166),
        AvatarKind::Mascot => Rgba8::rgb(251, 188, 5),
    }
}

fn draw_avatar<S: Surface + ?Sized>(surface: &mut S, avatar: &AvatarPayload, rect: Rect) {
    let figure = match &avatar.speech_bubble {
        Some(bubble) => {
            let split = rect.y0 + rect.height() * 0.4;
            draw_speech_bubble(surface, bubble, Rect::new(rect.x0, rect.y0, rect.x1, split));
            Rect::new(rect.x0, split, rect.x1, rect.y1)
        }
        None => rect,
    };

    let color = avatar_color(avatar.avatar);
    let c = figure.center();
    let unit = figure.width().min(figure.height());
    let head_r = unit * 0.2;
    let head_c = Point::new(c.x, figure.y0 + head_r + unit * 0.05);

    let head = match avatar.avatar {
        AvatarKind::Robot => Rect::from_center_size(head_c, (head_r * 2.0, head_r * 1.8))
            .to_rounded_rect(head_r * 0.25)
            .to_path(PATH_TOLERANCE),
        _ => kurbo::Circle::new(head_c, head_r).to_path(PATH_TOLERANCE),
    };
    let body = Rect::new(
        c.x - unit * 0.3,
        head_c.y + head_r + unit * 0.05,
        c.x + unit * 0.3,
        figure.y1,
    )
    .to_rounded_rect(unit * 0.12)
    .to_path(PATH_TOLERANCE);

    surface.fill_path(&body, color);
    surface.fill_path(&head, color);

    let eye_r = head_r * 0.12;
    for dx in [-0.35, 0.35] {
        let eye = kurbo::Circle::new(
            Point::new(head_c.x + dx * head_r, head_c.y - head_r * 0.1),
            eye_r,
        );
        surface.fill_path(&eye.to_path(PATH_TOLERANCE), Rgba8::WHITE);
    }
}

fn draw_speech_bubble<S: Surface + ?Sized>(surface: &mut S, bubble: &SpeechBubble, area: Rect) {
    let body = Rect::new(area.x0, area.y0, area.x1, area.y1 - area.height() * 0.15);
    let mut path = body
        .to_rounded_rect(body.height().min(body.width()) * 0.2)
        .to_path(PATH_TOLERANCE);
    let cx = body.center().x;
    path.move_to((cx - body.width() * 0.06, body.y1));
    path.line_to((cx, area.y1));
    path.line_to((cx + body.width() * 0.06, body.y1));
    path.close_path();
    surface.fill_path(&path, bubble.fill);

    let font = FontSpec {
        size: (body.height() / 3.0).clamp(8.0, 28.0),
        ..FontSpec::default()
    };
    let pad = font.size * 0.5;
    text::draw_block(
        surface,
        &bubble.text,
        &font,
        TextAlign::Center,
        bubble.text_color,
        body.inset(-pad),
    );
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
