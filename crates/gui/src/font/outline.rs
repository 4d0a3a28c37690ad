//! Glyph outline commands to flattened contours.
//!
//! Command string tokens: `m x y` (move), `l x y` (line),
//! `q x y cx cy` (quadratic, end point first), `b x y c1x c1y c2x c2y`
//! (cubic, end point first), `z` (close).

use std::str::SplitWhitespace;

use kurbo::{BezPath, CubicBez, ParamCurve, PathEl, Point, QuadBez, Vec2};

use super::{FontError, Typeface};

/// Closed polygon without a repeated end point
pub type Contour = Vec<Point>;

/// Build the path of one glyph, scaled and moved to `offset`
pub fn glyph_path(outline: &str, scale: f64, offset: Vec2) -> Result<BezPath, FontError> {
    let mut tokens = outline.split_whitespace();
    let mut path = BezPath::new();

    while let Some(action) = tokens.next() {
        match action {
            "m" => path.move_to(read_point(&mut tokens, scale, offset)?),
            "l" => path.line_to(read_point(&mut tokens, scale, offset)?),
            "q" => {
                let end = read_point(&mut tokens, scale, offset)?;
                let ctrl = read_point(&mut tokens, scale, offset)?;
                path.quad_to(ctrl, end);
            }
            "b" => {
                let end = read_point(&mut tokens, scale, offset)?;
                let c1 = read_point(&mut tokens, scale, offset)?;
                let c2 = read_point(&mut tokens, scale, offset)?;
                path.curve_to(c1, c2, end);
            }
            "z" => path.close_path(),
            other => {
                return Err(FontError::InvalidTypeface(format!(
                    "unknown outline command '{other}'"
                )))
            }
        }
    }

    Ok(path)
}

fn read_point(
    tokens: &mut SplitWhitespace<'_>,
    scale: f64,
    offset: Vec2,
) -> Result<Point, FontError> {
    let mut coord = || {
        let token = tokens.next().unwrap_or_default();
        token
            .parse::<f64>()
            .map_err(|_| FontError::InvalidTypeface(format!("bad outline number '{token}'")))
    };
    let x = coord()?;
    let y = coord()?;
    Ok(Point::new(x * scale, y * scale) + offset)
}

/// Flatten a path into polygons; each curve becomes `curve_segments` lines
pub fn flatten(path: &BezPath, curve_segments: usize) -> Vec<Contour> {
    let segments = curve_segments.max(1);
    let mut contours = Vec::new();
    let mut current: Contour = Vec::new();

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                finish_contour(&mut contours, std::mem::take(&mut current));
                current.push(p);
            }
            PathEl::LineTo(p) => current.push(p),
            PathEl::QuadTo(c, p) => {
                let start = current.last().copied().unwrap_or(p);
                let quad = QuadBez::new(start, c, p);
                current.extend((1..=segments).map(|i| quad.eval(i as f64 / segments as f64)));
            }
            PathEl::CurveTo(c1, c2, p) => {
                let start = current.last().copied().unwrap_or(p);
                let cubic = CubicBez::new(start, c1, c2, p);
                current.extend((1..=segments).map(|i| cubic.eval(i as f64 / segments as f64)));
            }
            PathEl::ClosePath => finish_contour(&mut contours, std::mem::take(&mut current)),
        }
    }
    finish_contour(&mut contours, current);

    contours
}

fn finish_contour(contours: &mut Vec<Contour>, mut contour: Contour) {
    contour.dedup_by(|a, b| a.distance(*b) < 1e-9);
    if contour.len() > 1 && contour[0].distance(contour[contour.len() - 1]) < 1e-9 {
        contour.pop();
    }
    if contour.len() >= 3 {
        contours.push(contour);
    }
}

/// Lay out `text` left to right from the origin. Returns the flattened
/// contours of each visible glyph; `\n` starts a new line below.
pub fn layout_text(
    typeface: &Typeface,
    text: &str,
    size: f64,
    curve_segments: usize,
) -> Vec<Vec<Contour>> {
    let scale = size / typeface.resolution;
    let line_height = typeface.line_height(size);
    let mut offset = Vec2::ZERO;
    let mut glyphs = Vec::new();

    for c in text.chars() {
        if c == '\n' {
            offset = Vec2::new(0.0, offset.y - line_height);
            continue;
        }
        let Some(glyph) = typeface.glyph(c) else {
            continue;
        };
        if let Some(outline) = glyph.o.as_deref() {
            match glyph_path(outline, scale, offset) {
                Ok(path) => glyphs.push(flatten(&path, curve_segments)),
                Err(e) => tracing::warn!("Skipping glyph '{c}': {e}"),
            }
        }
        offset.x += glyph.ha * scale;
    }

    glyphs
}

/// Signed shoelace area; positive for counter-clockwise (y up)
pub fn signed_area(contour: &[Point]) -> f64 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let p = contour[i];
            let q = contour[(i + 1) % n];
            p.x * q.y - q.x * p.y
        })
        .sum::<f64>()
        * 0.5
}

/// Even-odd point-in-polygon test
pub fn contains(contour: &[Point], p: Point) -> bool {
    let n = contour.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (contour[i], contour[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
