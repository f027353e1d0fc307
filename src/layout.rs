//! Layout-preserving page text.
//!
//! Walks the text operators of a page content stream, places every shown
//! string at its position on the page, then rebuilds rows top to bottom with
//! each run padded out to its character column. Columns drawn apart on the
//! page come out separated by a run of spaces, and each rendered row is one
//! line of output.

use std::iter;

use lopdf::content::Content;
use lopdf::Object;

/// Points per character column when turning x offsets into padding.
pub const X_DENSITY: f32 = 7.25;
/// Rough glyph advance as a fraction of the font size; no font metrics are read.
const GLYPH_WIDTH: f32 = 0.5;
/// Runs whose baselines differ by less than this share of the font size sit on one row.
const Y_TOLERANCE: f32 = 0.3;
const LINE_HEIGHT: f32 = 1.2;
/// TJ adjustments (thousandths of an em) wider than this count as a word gap.
const TJ_SPACE: f32 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn from_operands(operands: &[Object]) -> Option<Self> {
        match operands.iter().map(number).collect::<Option<Vec<_>>>()?.as_slice() {
            &[a, b, c, d, e, f] => Some(Matrix { a, b, c, d, e, f }),
            _ => None,
        }
    }

    /// `self × other` in PDF row-vector order.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn translate(&self, tx: f32, ty: f32) -> Matrix {
        Matrix {
            e: tx * self.a + ty * self.c + self.e,
            f: tx * self.b + ty * self.d + self.f,
            ..*self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Run {
    x: f32,
    y: f32,
    size: f32,
    text: String,
}

#[derive(Debug)]
struct TextWalker {
    ctm: Matrix,
    saved: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    font_size: f32,
    leading: f32,
    runs: Vec<Run>,
}

impl TextWalker {
    fn new() -> Self {
        TextWalker {
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            font_size: 12.0,
            leading: 0.0,
            runs: Vec::new(),
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = self.tlm.translate(tx, ty);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Record `text` at the current text position, then advance by `width`
    /// unscaled text-space units.
    fn show(&mut self, text: String, width: f32) {
        let device = self.tm.multiply(&self.ctm);
        if !text.trim().is_empty() {
            self.runs.push(Run {
                x: device.e,
                y: device.f,
                size: self.font_size * device.c.hypot(device.d),
                text,
            });
        }
        self.tm = self.tm.translate(width, 0.0);
    }

    fn show_string(&mut self, operand: Option<&Object>) {
        if let Some(Object::String(bytes, _)) = operand {
            let text = decode(bytes);
            let width = advance(&text, self.font_size);
            self.show(text, width);
        }
    }

    fn show_array(&mut self, operand: Option<&Object>) {
        let Some(Object::Array(items)) = operand else {
            return;
        };
        let mut text = String::new();
        let mut width = 0.0;
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let piece = decode(bytes);
                    width += advance(&piece, self.font_size);
                    text.push_str(&piece);
                }
                other => {
                    if let Some(adjust) = number(other) {
                        width -= adjust / 1000.0 * self.font_size;
                        if adjust < -TJ_SPACE && !text.is_empty() && !text.ends_with(' ') {
                            text.push(' ');
                        }
                    }
                }
            }
        }
        self.show(text, width);
    }

    fn walk(&mut self, content: &Content) {
        for op in &content.operations {
            let operands = &op.operands;
            let num = |i: usize| operands.get(i).and_then(number);
            match op.operator.as_str() {
                "q" => self.saved.push(self.ctm),
                "Q" => {
                    if let Some(m) = self.saved.pop() {
                        self.ctm = m;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.ctm = m.multiply(&self.ctm);
                    }
                }
                "BT" => {
                    self.tm = Matrix::IDENTITY;
                    self.tlm = Matrix::IDENTITY;
                }
                "Tf" => {
                    if let Some(size) = num(1) {
                        self.font_size = size;
                    }
                }
                "TL" => {
                    if let Some(leading) = num(0) {
                        self.leading = leading;
                    }
                }
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (num(0), num(1)) {
                        if op.operator == "TD" {
                            self.leading = -ty;
                        }
                        self.move_line(tx, ty);
                    }
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.tm = m;
                        self.tlm = m;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => self.show_string(operands.first()),
                "TJ" => self.show_array(operands.first()),
                "'" => {
                    self.next_line();
                    self.show_string(operands.first());
                }
                "\"" => {
                    self.next_line();
                    self.show_string(operands.get(2));
                }
                _ => {}
            }
        }
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn advance(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * GLYPH_WIDTH * font_size
}

/// UTF-16BE when the string carries a byte-order mark, otherwise one byte
/// per char (WinAnsi and Latin-1 agree on letters).
fn decode(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().copied().map(char::from).collect(),
    }
}

struct Row {
    y: f32,
    size: f32,
    runs: Vec<Run>,
}

fn render(mut runs: Vec<Run>) -> String {
    if runs.is_empty() {
        return String::new();
    }
    runs.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));
    let min_x = runs.iter().map(|r| r.x).fold(f32::INFINITY, f32::min);

    let mut rows: Vec<Row> = Vec::new();
    for run in runs {
        match rows.last_mut() {
            Some(row) if (row.y - run.y).abs() <= row.size.max(run.size) * Y_TOLERANCE => {
                row.runs.push(run)
            }
            _ => rows.push(Row {
                y: run.y,
                size: run.size,
                runs: vec![run],
            }),
        }
    }

    let mut out = String::new();
    let mut prev: Option<(f32, f32)> = None;
    for mut row in rows {
        // a gap of more than two lines is a paragraph break
        if let Some((y, size)) = prev {
            if y - row.y > size.max(row.size) * LINE_HEIGHT * 2.0 {
                out.push('\n');
            }
        }
        row.runs.sort_by(|a, b| a.x.total_cmp(&b.x));

        let mut line = String::new();
        let mut col = 0usize;
        for run in &row.runs {
            let target = ((run.x - min_x) / X_DENSITY).round().max(0.0) as usize;
            if target > col {
                line.extend(iter::repeat(' ').take(target - col));
                col = target;
            } else if col > 0 && !line.ends_with(' ') && !run.text.starts_with(' ') {
                line.push(' ');
                col += 1;
            }
            line.push_str(&run.text);
            col += run.text.chars().count();
        }
        out.push_str(line.trim_end());
        out.push('\n');
        prev = Some((row.y, row.size));
    }
    out
}

/// Render a page's content stream as text, one line per row on the page.
pub fn render_page(content: &Content) -> String {
    let mut walker = TextWalker::new();
    walker.walk(content);
    render(walker.runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::pipeline_lines;
    use crate::parser::table::VocabRow;
    use crate::parser::tokens::DEFAULT_FIELD_SEPARATOR;
    use lopdf::content::Operation;

    fn op(operator: &str, operands: Vec<Object>) -> Operation {
        Operation::new(operator, operands)
    }

    fn text(s: &str) -> Object {
        Object::string_literal(s)
    }

    fn page(operations: Vec<Operation>) -> String {
        render_page(&Content { operations })
    }

    #[test]
    fn td_columns_become_rows_and_gaps() {
        let out = page(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 12.into()]),
            op("Td", vec![50.into(), 700.into()]),
            op("Tj", vec![text("1")]),
            op("Td", vec![20.into(), 0.into()]),
            op("Tj", vec![text("kat")]),
            op("Td", vec![130.into(), 0.into()]),
            op("Tj", vec![text("cat")]),
            op("Td", vec![(-150).into(), (-15).into()]),
            op("Tj", vec![text("2")]),
            op("Td", vec![20.into(), 0.into()]),
            op("Tj", vec![text("hond")]),
            op("Td", vec![130.into(), 0.into()]),
            op("Tj", vec![text("dog")]),
            op("ET", vec![]),
        ]);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1  kat  "));
        assert!(lines[0].ends_with("  cat"));

        let table = pipeline_lines(&out, DEFAULT_FIELD_SEPARATOR).unwrap();
        assert_eq!(
            table.rows(),
            &[VocabRow::new("kat", "cat"), VocabRow::new("hond", "dog")]
        );
    }

    #[test]
    fn rows_sorted_top_to_bottom() {
        let out = page(vec![
            op("BT", vec![]),
            op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 50.into(), 600.into()]),
            op("Tj", vec![text("2 laag")]),
            op("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 50.into(), 612.into()]),
            op("Tj", vec![text("1 hoog")]),
            op("ET", vec![]),
        ]);
        assert_eq!(out, "1 hoog\n2 laag\n");
    }

    #[test]
    fn leading_and_next_line() {
        let out = page(vec![
            op("BT", vec![]),
            op("TL", vec![14.into()]),
            op("Td", vec![50.into(), 700.into()]),
            op("Tj", vec![text("1 kat  cat")]),
            op("T*", vec![]),
            op("Tj", vec![text("wrapped")]),
            op("'", vec![text("2 hond  dog")]),
            op("ET", vec![]),
        ]);
        assert_eq!(out, "1 kat  cat\nwrapped\n2 hond  dog\n");
    }

    #[test]
    fn td_uppercase_sets_leading() {
        let out = page(vec![
            op("BT", vec![]),
            op("TD", vec![50.into(), 700.into()]),
            op("TD", vec![0.into(), (-14).into()]),
            op("Tj", vec![text("1 a  b")]),
            op("T*", vec![]),
            op("Tj", vec![text("2 c  d")]),
            op("ET", vec![]),
        ]);
        assert_eq!(out, "1 a  b\n2 c  d\n");
    }

    #[test]
    fn tj_kerning_gap_is_space() {
        let out = page(vec![
            op("BT", vec![]),
            op("Td", vec![50.into(), 700.into()]),
            op(
                "TJ",
                vec![Object::Array(vec![text("de"), (-300).into(), text("kat"), (-20).into(), text("je")])],
            ),
            op("ET", vec![]),
        ]);
        assert_eq!(out, "de katje\n");
    }

    #[test]
    fn ctm_translation_applies() {
        let out = page(vec![
            op("q", vec![]),
            op("cm", vec![1.into(), 0.into(), 0.into(), 1.into(), 0.into(), 100.into()]),
            op("BT", vec![]),
            op("Td", vec![50.into(), 500.into()]),
            op("Tj", vec![text("1 boven")]),
            op("ET", vec![]),
            op("Q", vec![]),
            op("BT", vec![]),
            op("Td", vec![50.into(), 590.into()]),
            op("Tj", vec![text("2 onder")]),
            op("ET", vec![]),
        ]);
        assert_eq!(out, "1 boven\n2 onder\n");
    }

    #[test]
    fn wide_vertical_gap_leaves_blank_line() {
        let out = page(vec![
            op("BT", vec![]),
            op("Tf", vec!["F1".into(), 10.into()]),
            op("Td", vec![50.into(), 700.into()]),
            op("Tj", vec![text("1 kat  cat")]),
            op("Td", vec![0.into(), (-100).into()]),
            op("Tj", vec![text("Derde Ronde")]),
            op("ET", vec![]),
        ]);
        assert_eq!(out, "1 kat  cat\n\nDerde Ronde\n");
    }

    #[test]
    fn utf16_strings() {
        assert_eq!(decode(&[0xFE, 0xFF, 0x00, 0xE9, 0x00, 0x6E]), "én");
        assert_eq!(decode(&[0x63, 0x61, 0x66, 0xE9]), "café");
    }

    #[test]
    fn empty_content() {
        assert_eq!(page(vec![]), "");
    }
}
