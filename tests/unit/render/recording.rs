use super::*;

#[test]
fn layers_compose_transform_and_opacity() {
    let mut s = RecordingSurface::new(Canvas::DESIGN);
    s.clear(Rgba8::BLACK);
    s.push_layer(Affine::scale(2.0), 0.5);
    s.push_layer(Affine::translate((10.0, 0.0)), 0.5);
    s.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), &Paint::Solid(Rgba8::WHITE));
    let DrawCall::FillRect {
        transform, opacity, ..
    } = s.calls()[3]
    else {
        panic!("expected a fill");
    };
    assert_eq!(opacity, 0.25);
    assert_eq!(transform * Point::new(0.0, 0.0), Point::new(20.0, 0.0));
    s.pop_layer();
    s.pop_layer();
    s.pop_layer();
    assert_eq!(s.layer_depth(), 0);
    assert_eq!(
        s.calls().iter().filter(|c| **c == DrawCall::PopLayer).count(),
        2
    );
}

#[test]
fn clear_resets_display_list() {
    let mut s = RecordingSurface::new(Canvas::DESIGN);
    s.clear(Rgba8::BLACK);
    s.draw_text("a", Point::ZERO, &FontSpec::default(), Rgba8::WHITE);
    s.present();
    s.clear(Rgba8::WHITE);
    assert_eq!(s.calls(), &[DrawCall::Clear(Rgba8::WHITE)]);
    assert_eq!(s.frames_presented(), 1);
    assert!(s.texts().is_empty());
}

#[test]
fn measures_by_char_count() {
    let mut s = RecordingSurface::new(Canvas::DESIGN);
    let font = FontSpec {
        size: 20.0,
        ..FontSpec::default()
    };
    assert_eq!(s.measure_text("héllo", &font), 50.0);
}
