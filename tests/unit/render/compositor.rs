use std::{cell::RefCell, io::Cursor, rc::Rc};

use super::*;
use crate::{
    animation::transition::evaluate_transition,
    assets::resolver::MemoryResolver,
    render::recording::{DrawCall, RecordingSurface},
    scene::model::{
        ElementBox, ImagePayload, StrokeSpec, TextPayload, TransitionKind, VideoPayload,
    },
};

fn text_el(id: &str, z: i32) -> Element {
    Element::new(
        id,
        ElementBox::new(0.0, 0.0, 400.0, 100.0),
        0.0,
        5.0,
        ElementKind::Text(TextPayload {
            content: id.to_string(),
            font: FontSpec::default(),
            color: Rgba8::WHITE,
            align: TextAlign::Center,
        }),
    )
    .with_z(z)
}

fn image_el(id: &str, source: &str) -> Element {
    Element::new(
        id,
        ElementBox::new(10.0, 10.0, 100.0, 100.0),
        0.0,
        5.0,
        ElementKind::Image(ImagePayload {
            source: source.to_string(),
        }),
    )
}

fn png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 10, 10, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn compositor(r: &MemoryResolver, quality: Quality) -> Compositor {
    Compositor::new(MediaCache::new(r.clone()), quality)
}

fn surface() -> RecordingSurface {
    RecordingSurface::new(Canvas::DESIGN)
}

#[test]
fn elements_draw_in_ascending_z_order() {
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements = vec![text_el("z2", 2), text_el("z0", 0), text_el("z1", 1)];
    let mut c = compositor(&MemoryResolver::new(), Quality::High);
    let mut s = surface();

    let report = c.render(&scene, 1.0, &mut s);
    assert_eq!(report.drawn, ["z0", "z1", "z2"]);
    assert_eq!(s.texts(), ["z0", "z1", "z2"]);
    assert!(report.is_clean());
}

#[test]
fn z_ties_keep_list_order() {
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements = vec![text_el("b", 1), text_el("a", 1), text_el("c", 0)];
    let mut c = compositor(&MemoryResolver::new(), Quality::High);
    let report = c.render(&scene, 1.0, &mut surface());
    assert_eq!(report.drawn, ["c", "b", "a"]);
}

#[test]
fn frame_starts_with_clear_and_background_and_is_balanced() {
    let mut scene = Scene::new("s", "S", 5.0);
    scene.background = Background::Color {
        color: Rgba8::rgb(1, 2, 3),
    };
    let mut c =
        compositor(&MemoryResolver::new(), Quality::Low).with_clear_color(Rgba8::rgb(9, 9, 9));
    let mut s = surface();
    c.render(&scene, 0.0, &mut s);

    let calls = s.calls();
    assert_eq!(calls[0], DrawCall::Clear(Rgba8::rgb(9, 9, 9)));
    assert_eq!(
        calls[1],
        DrawCall::PushLayer {
            transform: Affine::scale(0.5),
            opacity: 1.0
        }
    );
    assert!(matches!(
        calls[2],
        DrawCall::FillRect {
            paint: Paint::Solid(color),
            ..
        } if color == Rgba8::rgb(1, 2, 3)
    ));
    assert_eq!(calls.last(), Some(&DrawCall::Present));
    assert_eq!(s.layer_depth(), 0);
    assert_eq!(s.frames_presented(), 1);
}

#[test]
fn inactive_and_hidden_elements_are_skipped() {
    let mut scene = Scene::new("s", "S", 5.0);
    let mut late = text_el("late", 0);
    late.start = 3.0;
    let mut hidden = text_el("hidden", 0);
    hidden.visible = false;
    scene.elements = vec![late, hidden, text_el("shown", 0)];
    let mut c = compositor(&MemoryResolver::new(), Quality::High);
    let report = c.render(&scene, 1.0, &mut surface());
    assert_eq!(report.drawn, ["shown"]);
}

#[test]
fn failed_media_skips_only_that_element() {
    let r = MemoryResolver::new();
    r.insert("ok.png", png());
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements = vec![
        image_el("missing", "nope.png"),
        image_el("good", "ok.png"),
        text_el("caption", 3),
    ];

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut c = compositor(&r, Quality::High);
    c.set_error_sink(move |e| sink.borrow_mut().push(e.element_id.clone()));

    let mut s = surface();
    let report = c.render(&scene, 1.0, &mut s);
    assert_eq!(report.drawn, ["good", "caption"]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].error.source_id(), "nope.png");
    assert_eq!(*seen.borrow(), vec![Some("missing".to_string())]);
    assert_eq!(s.image_keys().len(), 1);
}

#[test]
fn each_source_is_fetched_once_across_frames() {
    let r = MemoryResolver::new();
    r.insert("ok.png", png());
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements = vec![image_el("a", "ok.png"), image_el("b", "ok.png")];
    let mut c = compositor(&r, Quality::High);
    let mut s = surface();
    for i in 0..5 {
        c.render(&scene, f64::from(i) * 0.5, &mut s);
    }
    assert_eq!(r.fetch_count("ok.png"), 1);
}

#[test]
fn broken_background_image_falls_back_to_black() {
    let mut scene = Scene::new("s", "S", 5.0);
    scene.background = Background::Image {
        source: "bg.png".to_string(),
    };
    scene.elements = vec![text_el("t", 0)];
    let mut c = compositor(&MemoryResolver::new(), Quality::High);
    let mut s = surface();
    let report = c.render(&scene, 1.0, &mut s);

    assert_eq!(report.drawn, ["t"]);
    assert_eq!(report.errors[0].element_id, None);
    assert!(s.calls().iter().any(|c| matches!(
        c,
        DrawCall::FillRect { paint: Paint::Solid(Rgba8::BLACK), .. }
    )));
}

#[test]
fn element_layer_carries_animation_state() {
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements = vec![text_el("t", 0).with_animation(crate::scene::model::AnimationSpec::new(
        crate::scene::model::AnimationKind::FadeIn,
        2.0,
    ))];
    let mut c = compositor(&MemoryResolver::new(), Quality::High);
    let mut s = surface();
    c.render(&scene, 1.0, &mut s);
    let text_opacity = s.calls().iter().find_map(|c| match c {
        DrawCall::Text { opacity, .. } => Some(*opacity),
        _ => None,
    });
    assert_eq!(text_opacity, Some(0.5));
}

#[test]
fn video_without_backend_draws_placeholder() {
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements = vec![Element::new(
        "clip",
        ElementBox::new(0.0, 0.0, 320.0, 180.0),
        0.0,
        5.0,
        ElementKind::Video(VideoPayload {
            source: "clip.mp4".to_string(),
            muted: false,
            volume: 1.0,
        }),
    )];
    let mut c = Compositor::new(
        MediaCache::new(crate::assets::resolver::FsResolver::new(std::env::temp_dir())),
        Quality::High,
    );
    let mut s = surface();
    let report = c.render(&scene, 1.0, &mut s);
    assert_eq!(report.drawn, ["clip"]);
    assert!(report.is_clean());
    assert!(s.calls().iter().any(|c| matches!(
        c,
        DrawCall::FillRect { paint: Paint::Solid(VIDEO_PLACEHOLDER), .. }
    )));
}

#[test]
fn video_frames_are_drawn_from_stream() {
    let r = MemoryResolver::new();
    let frame = Bitmap::solid(4, 4, [0, 0, 200, 255]);
    r.insert_stream("clip.mp4", Some(frame.clone()));
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements = vec![Element::new(
        "clip",
        ElementBox::new(0.0, 0.0, 320.0, 180.0),
        1.0,
        5.0,
        ElementKind::Video(VideoPayload {
            source: "clip.mp4".to_string(),
            muted: true,
            volume: 1.0,
        }),
    )];
    let mut c = compositor(&r, Quality::High);
    let mut s = surface();
    c.render(&scene, 3.0, &mut s);
    assert_eq!(s.image_keys(), vec![frame.key]);
    let status = r
        .stream_status("clip.mp4", crate::assets::resolver::StreamKind::Video)
        .unwrap();
    assert_eq!(status.position, 2.0);
}

#[test]
fn shapes_fill_and_stroke() {
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements = vec![Element::new(
        "box",
        ElementBox::new(0.0, 0.0, 100.0, 50.0),
        0.0,
        5.0,
        ElementKind::Shape(ShapePayload {
            shape: ShapeKind::Rectangle,
            fill: Some(Rgba8::rgb(255, 0, 0)),
            stroke: Some(StrokeSpec {
                color: Rgba8::WHITE,
                width: 4.0,
            }),
            corner_radius: 0.0,
        }),
    )];
    let mut c = compositor(&MemoryResolver::new(), Quality::High);
    let mut s = surface();
    c.render(&scene, 0.0, &mut s);
    let kinds: Vec<_> = s
        .calls()
        .iter()
        .filter_map(|c| match c {
            DrawCall::FillPath { bounds, .. } => Some(("fill", *bounds)),
            DrawCall::StrokePath { bounds, .. } => Some(("stroke", *bounds)),
            _ => None,
        })
        .collect();
    assert_eq!(kinds.len(), 2);
    assert_eq!(kinds[0].0, "fill");
    assert_eq!(kinds[1].0, "stroke");
    assert_eq!(kinds[0].1, Rect::new(0.0, 0.0, 100.0, 50.0));
}

#[test]
fn shape_paths_fit_their_box() {
    let rect = Rect::new(10.0, 20.0, 110.0, 120.0);
    for kind in [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Triangle,
        ShapeKind::Star,
        ShapeKind::Line,
        ShapeKind::Arrow,
    ] {
        let b = shape_path(kind, rect, 8.0).bounding_box();
        assert!(b.x0 >= rect.x0 - 0.5 && b.x1 <= rect.x1 + 0.5, "{kind:?}");
        assert!(b.y0 >= rect.y0 - 0.5 && b.y1 <= rect.y1 + 0.5, "{kind:?}");
    }
}

#[test]
fn avatar_with_bubble_draws_text() {
    let mut scene = Scene::new("s", "S", 5.0);
    scene.elements = vec![Element::new(
        "host",
        ElementBox::new(100.0, 100.0, 300.0, 500.0),
        0.0,
        5.0,
        ElementKind::Avatar(AvatarPayload {
            avatar: AvatarKind::Robot,
            speech_bubble: Some(SpeechBubble {
                text: "hi".to_string(),
                fill: Rgba8::WHITE,
                text_color: Rgba8::BLACK,
            }),
        }),
    )];
    let mut c = compositor(&MemoryResolver::new(), Quality::High);
    let mut s = surface();
    let report = c.render(&scene, 0.5, &mut s);
    assert_eq!(report.drawn, ["host"]);
    assert_eq!(s.texts(), ["hi"]);
}

#[test]
fn transition_draws_both_scenes_through_their_layers() {
    let mut a = Scene::new("a", "A", 2.0);
    a.elements = vec![text_el("from", 0)];
    a.elements[0].end = 2.0;
    let mut b = Scene::new("b", "B", 5.0);
    b.elements = vec![text_el("to", 0)];

    let state = evaluate_transition(TransitionKind::Fade, 0.25, Canvas::DESIGN);
    let mut c = compositor(&MemoryResolver::new(), Quality::High);
    let mut s = surface();
    let report = c.render_transition(&a, &b, 0.1, &state, &mut s);

    assert_eq!(report.drawn, ["from", "to"]);
    let opacities: Vec<_> = s
        .calls()
        .iter()
        .filter_map(|c| match c {
            DrawCall::Text { opacity, .. } => Some(*opacity),
            _ => None,
        })
        .collect();
    assert_eq!(opacities, [0.75, 0.25]);
}
