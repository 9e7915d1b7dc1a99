//! Removing text under redaction areas from a page content stream.
//!
//! Text-showing operators whose origin falls inside a redaction rectangle
//! are dropped, then the rectangles are painted black on top of the page.
//! Origins are tracked through the text matrix and the current
//! transformation matrix; glyph widths are not, so a string that starts
//! outside an area is kept even if it runs into it.

use lopdf::content::{Content, Operation};
use lopdf::Object;

/// PDF user-space rectangle `[x0, y0, x1, y1]` with `x0 <= x1`, `y0 <= y1`.
pub(crate) type PdfRect = [f64; 4];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`, PDF row-vector convention.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() != 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, obj) in m.iter_mut().zip(operands) {
            *slot = number(obj)?;
        }
        Some(Matrix(m))
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

struct TextState {
    ctm: Matrix,
    saved: Vec<Matrix>,
    tm: Matrix,
    tlm: Matrix,
    leading: f64,
}

impl TextState {
    fn new() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            saved: Vec::new(),
            tm: Matrix::IDENTITY,
            tlm: Matrix::IDENTITY,
            leading: 0.0,
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Matrix::translate(tx, ty).then(&self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// Where the next glyph is drawn, in user space.
    fn origin(&self) -> (f64, f64) {
        let m = self.tm.then(&self.ctm);
        (m.0[4], m.0[5])
    }
}

fn inside(rects: &[PdfRect], (x, y): (f64, f64)) -> bool {
    rects
        .iter()
        .any(|r| x >= r[0] && x <= r[2] && y >= r[1] && y <= r[3])
}

/// Filter `content` for the given areas and append black boxes over them.
///
/// Returns the rewritten content and the number of text operators dropped.
pub(crate) fn redact_content(content: Content, rects: &[PdfRect]) -> (Content, usize) {
    let mut state = TextState::new();
    let mut dropped = 0;
    let mut out = Vec::with_capacity(content.operations.len() + 4 + rects.len() * 3);
    out.push(Operation::new("q", vec![]));

    for op in content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => state.saved.push(state.ctm),
            "Q" => {
                if let Some(ctm) = state.saved.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    state.ctm = m.then(&state.ctm);
                }
            }
            "BT" => {
                state.tm = Matrix::IDENTITY;
                state.tlm = Matrix::IDENTITY;
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    state.tm = m;
                    state.tlm = m;
                }
            }
            "TL" => {
                if let Some(l) = operands.first().and_then(number) {
                    state.leading = l;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(number),
                    operands.get(1).and_then(number),
                ) {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "Tj" | "TJ" => {
                if inside(rects, state.origin()) {
                    dropped += 1;
                    continue;
                }
            }
            "'" => {
                state.next_line();
                if inside(rects, state.origin()) {
                    dropped += 1;
                    out.push(Operation::new("T*", vec![]));
                    continue;
                }
            }
            "\"" => {
                state.next_line();
                if inside(rects, state.origin()) {
                    dropped += 1;
                    if let [aw, ac, ..] = operands.as_slice() {
                        out.push(Operation::new("Tw", vec![aw.clone()]));
                        out.push(Operation::new("Tc", vec![ac.clone()]));
                    }
                    out.push(Operation::new("T*", vec![]));
                    continue;
                }
            }
            _ => {}
        }
        out.push(op);
    }

    out.push(Operation::new("Q", vec![]));
    out.push(Operation::new("q", vec![]));
    out.push(Operation::new("rg", vec![0.into(), 0.into(), 0.into()]));
    for r in rects {
        out.push(Operation::new(
            "re",
            vec![
                Object::Real(r[0] as f32),
                Object::Real(r[1] as f32),
                Object::Real((r[2] - r[0]) as f32),
                Object::Real((r[3] - r[1]) as f32),
            ],
        ));
        out.push(Operation::new("f", vec![]));
    }
    out.push(Operation::new("Q", vec![]));

    (Content { operations: out }, dropped)
}
