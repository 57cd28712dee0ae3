use crate::{
    foundation::core::{Point, Rect, Rgba8},
    render::surface::Surface,
    scene::model::{FontSpec, TextAlign},
};

#[derive(Clone, Debug, PartialEq)]
/// One wrapped line with its measured advance.
pub struct TextLine {
    pub text: String,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
/// A wrapped line placed inside a text box.
pub struct PlacedLine {
    pub text: String,
    /// Top-left of the line box.
    pub origin: Point,
}

/// Greedy word wrap of `text` to `max_width`.
///
/// Explicit `\n` always breaks. Words are never split, so a word wider than `max_width` gets a
/// line of its own. Runs of whitespace collapse to a single space.
pub fn wrap_lines<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    font: &FontSpec,
    max_width: f64,
) -> Vec<TextLine> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut words = paragraph.split_whitespace();
        let Some(first) = words.next() else {
            lines.push(TextLine {
                text: String::new(),
                width: 0.0,
            });
            continue;
        };

        let mut line = first.to_string();
        let mut width = surface.measure_text(&line, font);
        for word in words {
            let candidate = format!("{line} {word}");
            let candidate_width = surface.measure_text(&candidate, font);
            if candidate_width <= max_width {
                line = candidate;
                width = candidate_width;
            } else {
                lines.push(TextLine {
                    text: std::mem::replace(&mut line, word.to_string()),
                    width,
                });
                width = surface.measure_text(&line, font);
            }
        }
        lines.push(TextLine { text: line, width });
    }
    lines
}

/// Wrap `text` to `bounds` and place the lines: horizontally per `align`, and vertically centred
/// as a block.
pub fn layout_block<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    font: &FontSpec,
    align: TextAlign,
    bounds: Rect,
) -> Vec<PlacedLine> {
    let lines = wrap_lines(surface, text, font, bounds.width());
    let line_height = font.line_height();
    let block_height = line_height * lines.len() as f64;
    let top = bounds.y0 + (bounds.height() - block_height) / 2.0;

    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let x = match align {
                TextAlign::Left => bounds.x0,
                TextAlign::Center => bounds.x0 + (bounds.width() - line.width) / 2.0,
                TextAlign::Right => bounds.x1 - line.width,
            };
            PlacedLine {
                text: line.text,
                origin: Point::new(x, top + line_height * i as f64),
            }
        })
        .collect()
}

/// Draw a wrapped, aligned, vertically centred text block.
pub fn draw_block<S: Surface + ?Sized>(
    surface: &mut S,
    text: &str,
    font: &FontSpec,
    align: TextAlign,
    color: Rgba8,
    bounds: Rect,
) {
    for line in layout_block(surface, text, font, align, bounds) {
        if !line.text.is_empty() {
            surface.draw_text(&line.text, line.origin, font, color);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
