use super::*;

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(&x, y)| x.abs_diff(y) <= 2)
}

fn surface() -> CpuSurface {
    CpuSurface::new(Canvas {
        width: 32,
        height: 32,
    })
    .unwrap()
}

#[test]
fn rejects_degenerate_sizes() {
    assert!(CpuSurface::new(Canvas { width: 0, height: 4 }).is_err());
    assert!(CpuSurface::new(Canvas { width: 70_000, height: 4 }).is_err());
}

#[test]
fn clear_and_solid_fill() {
    let mut s = surface();
    s.clear(Rgba8::rgb(0, 0, 255));
    s.fill_rect(Rect::new(0.0, 0.0, 16.0, 16.0), &Paint::Solid(Rgba8::rgb(255, 0, 0)));
    s.present();
    let f = s.frame();
    assert_eq!((f.width, f.height), (32, 32));
    assert!(close(px(&f, 4, 4), [255, 0, 0, 255]));
    assert!(close(px(&f, 24, 24), [0, 0, 255, 255]));
}

#[test]
fn layers_translate_and_fade() {
    let mut s = surface();
    s.clear(Rgba8::BLACK);
    s.push_layer(Affine::translate((16.0, 16.0)), 0.5);
    s.fill_rect(Rect::new(0.0, 0.0, 16.0, 16.0), &Paint::Solid(Rgba8::WHITE));
    s.pop_layer();
    s.present();
    let f = s.frame();
    assert!(close(px(&f, 4, 4), [0, 0, 0, 255]));
    assert!(close(px(&f, 24, 24), [128, 128, 128, 255]));
}

#[test]
fn bitmap_is_stretched_to_destination() {
    let mut s = surface();
    s.clear(Rgba8::BLACK);
    let bmp = Bitmap::solid(2, 2, [0, 255, 0, 255]);
    s.draw_image(&bmp, Rect::new(0.0, 0.0, 32.0, 16.0));
    s.present();
    let f = s.frame();
    assert!(close(px(&f, 20, 8), [0, 255, 0, 255]));
    assert!(close(px(&f, 20, 24), [0, 0, 0, 255]));
}

#[test]
fn vertical_gradient_runs_top_to_bottom() {
    let mut s = surface();
    s.clear(Rgba8::BLACK);
    s.fill_rect(
        Rect::new(0.0, 0.0, 32.0, 32.0),
        &Paint::LinearGradient {
            from: Rgba8::rgb(0, 0, 0),
            to: Rgba8::rgb(255, 255, 255),
            angle_deg: 0.0,
        },
    );
    s.present();
    let f = s.frame();
    let top = px(&f, 16, 1)[0];
    let bottom = px(&f, 16, 30)[0];
    assert!(top < 30, "top={top}");
    assert!(bottom > 225, "bottom={bottom}");
}

#[test]
fn text_without_font_is_measured_but_not_drawn() {
    let mut s = surface();
    s.clear(Rgba8::BLACK);
    let font = FontSpec::default();
    assert_eq!(s.measure_text("abcd", &font), 64.0);
    s.draw_text("abcd", Point::new(0.0, 0.0), &font, Rgba8::WHITE);
    s.present();
    assert!(s.frame().data.chunks_exact(4).all(|p| p == [0, 0, 0, 255]));
}

#[test]
fn unbalanced_pops_are_ignored() {
    let mut s = surface();
    s.clear(Rgba8::BLACK);
    s.pop_layer();
    s.push_layer(Affine::IDENTITY, 0.25);
    s.present();
    assert!(close(px(&s.frame(), 0, 0), [0, 0, 0, 255]));
}
