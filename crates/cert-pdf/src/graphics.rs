//! Vector graphics operators (shapes, lines, transforms)
//!
//! Every function takes PDF coordinates (points, bottom-left origin) and
//! returns a self-contained operator sequence wrapped in `q`/`Q`, except
//! [`rotation_operators`] which opens a graphics state the caller closes.

use crate::document::Color;

/// Bezier control-point factor for approximating a quarter ellipse
const KAPPA: f64 = 0.552_284_749_8;

/// Stroke and fill settings for a closed shape
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Paint {
    /// Stroke color and line width in points
    pub stroke: Option<(Color, f64)>,
    /// Fill color
    pub fill: Option<Color>,
}

impl Paint {
    fn paint_operator(&self) -> Option<&'static str> {
        let stroked = matches!(self.stroke, Some((_, w)) if w > 0.0);
        match (self.fill.is_some(), stroked) {
            (true, true) => Some("B"),
            (true, false) => Some("f"),
            (false, true) => Some("S"),
            (false, false) => None,
        }
    }

    fn state_operators(&self, ops: &mut String) {
        if let Some(fill) = self.fill {
            ops.push_str(&format!("{} {} {} rg\n", fill.r, fill.g, fill.b));
        }
        if let Some((stroke, width)) = self.stroke {
            ops.push_str(&format!("{} {} {} RG\n", stroke.r, stroke.g, stroke.b));
            ops.push_str(&format!("{width} w\n"));
        }
    }
}

/// Generate operators for an axis-aligned rectangle
///
/// `(x, y)` is the bottom-left corner.
pub fn rect_operators(x: f64, y: f64, width: f64, height: f64, paint: &Paint) -> Vec<u8> {
    let Some(op) = paint.paint_operator() else {
        return Vec::new();
    };

    let mut ops = String::from("q\n");
    paint.state_operators(&mut ops);
    ops.push_str(&format!("{x} {y} {width} {height} re\n{op}\nQ\n"));
    ops.into_bytes()
}

/// Generate operators for an ellipse centred on `(cx, cy)`
pub fn ellipse_operators(cx: f64, cy: f64, rx: f64, ry: f64, paint: &Paint) -> Vec<u8> {
    let Some(op) = paint.paint_operator() else {
        return Vec::new();
    };

    let ox = rx * KAPPA;
    let oy = ry * KAPPA;

    let mut ops = String::from("q\n");
    paint.state_operators(&mut ops);
    ops.push_str(&format!("{} {} m\n", cx + rx, cy));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        cx + rx,
        cy + oy,
        cx + ox,
        cy + ry,
        cx,
        cy + ry
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        cx - ox,
        cy + ry,
        cx - rx,
        cy + oy,
        cx - rx,
        cy
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        cx - rx,
        cy - oy,
        cx - ox,
        cy - ry,
        cx,
        cy - ry
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        cx + ox,
        cy - ry,
        cx + rx,
        cy - oy,
        cx + rx,
        cy
    ));
    ops.push_str(&format!("h\n{op}\nQ\n"));
    ops.into_bytes()
}

/// Generate operators for a straight stroked line
pub fn line_operators(x1: f64, y1: f64, x2: f64, y2: f64, color: Color, width: f64) -> Vec<u8> {
    if width <= 0.0 {
        return Vec::new();
    }

    format!(
        "q\n{} {} {} RG\n{width} w\n{x1} {y1} m\n{x2} {y2} l\nS\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}

/// Open a graphics state rotated clockwise (as seen on the page) by
/// `degrees` around the pivot `(px, py)`
///
/// The caller must emit a matching `Q` after drawing.
pub fn rotation_operators(px: f64, py: f64, degrees: f64) -> Vec<u8> {
    // Clockwise on a top-left page is counter-clockwise negated in PDF space.
    let radians = (-degrees).to_radians();
    let (sin, cos) = radians.sin_cos();

    let e = px - cos * px + sin * py;
    let f = py - sin * px - cos * py;

    format!("q\n{cos} {sin} {} {cos} {e} {f} cm\n", -sin).into_bytes()
}
