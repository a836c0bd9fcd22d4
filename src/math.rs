use std::f64::consts::PI;

#[inline(always)]
pub fn pi(v: f64) -> f64 {
    PI * v
}

pub fn add_polar_offset((x, y): (f64, f64), theta: f64, r: f64) -> (f64, f64) {
    (x + r * theta.cos(), y + r * theta.sin())
}

/// Vertices of a regular polygon with `edges` corners on a circle of radius `radius`.
///
/// With zero rotation an odd polygon points straight up and an even polygon has a flat top
/// edge. `rotation` (radians) is added on top of that.
pub fn regular_polygon_vertices(
    edges: u32,
    center: (f64, f64),
    radius: f64,
    rotation: f64,
) -> impl Iterator<Item = (f64, f64)> {
    let angle = if edges == 0 {
        0.0
    } else {
        pi(2.0) / f64::from(edges)
    };
    let mut start = rotation - pi(0.5);
    if edges % 2 == 0 {
        start += angle / 2.0;
    }
    (0..edges).map(move |i| add_polar_offset(center, start + angle * f64::from(i), radius))
}
