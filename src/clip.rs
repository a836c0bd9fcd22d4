//! Clipping of stroke geometry to a window around the canvas.
//!
//! The rasterizer keeps edge positions in 16.16 fixed point, so geometry far outside the canvas
//! has to be cut down before it reaches it. Everything here clips exactly: points inside the
//! window are covered by the clipped outline precisely when they are covered by the original.

pub(crate) type Point = (f64, f64);

// Largest error allowed between a cubic and its flattened polyline, in pixels.
const FLATNESS: f64 = 0.1;

const MAX_FLATTEN_DEPTH: u32 = 16;

#[derive(Debug, Copy, Clone)]
enum Boundary {
    MinX(f64),
    MaxX(f64),
    MinY(f64),
    MaxY(f64),
}

impl Boundary {
    fn inside(self, (x, y): Point) -> bool {
        match self {
            Boundary::MinX(v) => x >= v,
            Boundary::MaxX(v) => x <= v,
            Boundary::MinY(v) => y >= v,
            Boundary::MaxY(v) => y <= v,
        }
    }

    /// Where segment `a`-`b` crosses this boundary. Only valid when exactly one of the two is
    /// inside.
    fn intersect(self, (ax, ay): Point, (bx, by): Point) -> Point {
        match self {
            Boundary::MinX(v) | Boundary::MaxX(v) => {
                let t = (v - ax) / (bx - ax);
                (v, ay + t * (by - ay))
            }
            Boundary::MinY(v) | Boundary::MaxY(v) => {
                let t = (v - ay) / (by - ay);
                (ax + t * (bx - ax), v)
            }
        }
    }

    /// One Sutherland-Hodgman pass: the part of the closed polygon `points` on the inside.
    fn clip_polygon(self, points: &[Point]) -> Vec<Point> {
        let mut out = Vec::with_capacity(points.len() + 2);
        let Some(&last) = points.last() else {
            return out;
        };
        let mut prev = last;
        for &cur in points {
            match (self.inside(prev), self.inside(cur)) {
                (true, true) => out.push(cur),
                (true, false) => out.push(self.intersect(prev, cur)),
                (false, true) => {
                    out.push(self.intersect(prev, cur));
                    out.push(cur);
                }
                (false, false) => {}
            }
            prev = cur;
        }
        out
    }
}

/// Axis-aligned rectangle that geometry is clipped to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Window {
    pub min: Point,
    pub max: Point,
}

impl Window {
    /// The canvas rectangle grown by `margin` pixels on every side.
    pub fn around(width: u32, height: u32, margin: f64) -> Self {
        Window {
            min: (-margin, -margin),
            max: (f64::from(width) + margin, f64::from(height) + margin),
        }
    }

    fn boundaries(&self) -> [Boundary; 4] {
        [
            Boundary::MinX(self.min.0),
            Boundary::MaxX(self.max.0),
            Boundary::MinY(self.min.1),
            Boundary::MaxY(self.max.1),
        ]
    }

    pub fn contains(&self, p: Point) -> bool {
        self.boundaries().iter().all(|b| b.inside(p))
    }

    /// Clips the closed polygon `points` (last point joined back to the first). The result may
    /// run along the window edges; fewer than three points means nothing is left.
    pub fn clip_polygon(&self, points: &[Point]) -> Vec<Point> {
        let mut out = points.to_vec();
        for boundary in self.boundaries() {
            if out.is_empty() {
                break;
            }
            out = boundary.clip_polygon(&out);
        }
        out
    }

    /// Clips the segment `a`-`b`, returning the visible part if there is one.
    pub fn clip_segment(&self, mut a: Point, mut b: Point) -> Option<(Point, Point)> {
        for boundary in self.boundaries() {
            match (boundary.inside(a), boundary.inside(b)) {
                (true, true) => {}
                (false, false) => return None,
                (true, false) => b = boundary.intersect(a, b),
                (false, true) => a = boundary.intersect(a, b),
            }
        }
        Some((a, b))
    }

    /// Clips an axis-aligned rectangle given by two opposite corners. Returns the top-left
    /// corner and size of what is left, if it has any area.
    pub fn clip_rect(&self, a: Point, b: Point) -> Option<(Point, Point)> {
        if ![a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
            return None;
        }
        let x0 = a.0.min(b.0).max(self.min.0);
        let x1 = a.0.max(b.0).min(self.max.0);
        let y0 = a.1.min(b.1).max(self.min.1);
        let y1 = a.1.max(b.1).min(self.max.1);
        (x1 - x0 > 0.0 && y1 - y0 > 0.0).then_some(((x0, y0), (x1 - x0, y1 - y0)))
    }

    /// Flattens the cubic `p0`-`p3` into line segments, pushing every point after `p0` onto
    /// `out`. Pieces whose control hull lies wholly outside the window are replaced by their
    /// chord, which changes nothing inside the window.
    pub fn flatten_cubic(&self, curve: [Point; 4], out: &mut Vec<Point>) {
        self.flatten_cubic_at(curve, out, 0);
    }

    fn flatten_cubic_at(&self, curve: [Point; 4], out: &mut Vec<Point>, depth: u32) {
        let [p0, p1, p2, p3] = curve;
        let hull_outside = self
            .boundaries()
            .iter()
            .any(|b| curve.iter().all(|&p| !b.inside(p)));
        if depth >= MAX_FLATTEN_DEPTH || hull_outside || is_flat(curve) {
            out.push(p3);
            return;
        }
        // De Casteljau split at t = 0.5.
        let m01 = midpoint(p0, p1);
        let m12 = midpoint(p1, p2);
        let m23 = midpoint(p2, p3);
        let m012 = midpoint(m01, m12);
        let m123 = midpoint(m12, m23);
        let mid = midpoint(m012, m123);
        self.flatten_cubic_at([p0, m01, m012, mid], out, depth + 1);
        self.flatten_cubic_at([mid, m123, m23, p3], out, depth + 1);
    }
}

fn midpoint(a: Point, b: Point) -> Point {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

// A cubic deviates from its chord by at most 3/4 of its largest second difference.
fn is_flat([p0, p1, p2, p3]: [Point; 4]) -> bool {
    let dd = |a: Point, b: Point, c: Point| (a.0 - 2.0 * b.0 + c.0).hypot(a.1 - 2.0 * b.1 + c.1);
    0.75 * dd(p0, p1, p2).max(dd(p1, p2, p3)) <= FLATNESS
}
