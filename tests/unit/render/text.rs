use super::*;
use crate::{foundation::core::Canvas, render::recording::RecordingSurface};

fn font(size: f64) -> FontSpec {
    FontSpec {
        size,
        ..FontSpec::default()
    }
}

// RecordingSurface advances 0.5 * size per char, so size 10 gives 5 px per char.

#[test]
fn wraps_greedily_on_words() {
    let mut s = RecordingSurface::new(Canvas::DESIGN);
    let lines = wrap_lines(&mut s, "aaa bbb ccc", &font(10.0), 40.0);
    let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, ["aaa bbb", "ccc"]);
    assert_eq!(lines[0].width, 35.0);
    assert_eq!(lines[1].width, 15.0);
}

#[test]
fn long_words_and_newlines() {
    let mut s = RecordingSurface::new(Canvas::DESIGN);
    let lines = wrap_lines(&mut s, "abcdefghij x\n\nend", &font(10.0), 20.0);
    let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, ["abcdefghij", "x", "", "end"]);
}

#[test]
fn block_is_vertically_centred_and_aligned() {
    let mut s = RecordingSurface::new(Canvas::DESIGN);
    let bounds = Rect::new(100.0, 100.0, 200.0, 200.0);
    let f = font(10.0);

    let centre = layout_block(&mut s, "ab cd", &f, TextAlign::Center, bounds);
    assert_eq!(centre.len(), 1);
    // 5 chars -> 25 px wide; one 12 px line in a 100 px box.
    assert_eq!(centre[0].origin, Point::new(137.5, 144.0));

    let left = layout_block(&mut s, "ab", &f, TextAlign::Left, bounds);
    assert_eq!(left[0].origin.x, 100.0);
    let right = layout_block(&mut s, "ab", &f, TextAlign::Right, bounds);
    assert_eq!(right[0].origin.x, 190.0);

    let two = layout_block(&mut s, "a\nb", &f, TextAlign::Left, bounds);
    assert_eq!(two[0].origin.y, 138.0);
    assert_eq!(two[1].origin.y, 150.0);
}

#[test]
fn draw_block_skips_blank_lines() {
    let mut s = RecordingSurface::new(Canvas::DESIGN);
    draw_block(
        &mut s,
        "top\n\nbottom",
        &font(10.0),
        TextAlign::Center,
        Rgba8::WHITE,
        Rect::new(0.0, 0.0, 500.0, 100.0),
    );
    assert_eq!(s.texts(), ["top", "bottom"]);
}
