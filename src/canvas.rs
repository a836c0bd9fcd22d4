//! The persistent drawing surface a sketch accumulates strokes on.
//!
//! Shapes are built with a [`ShapeBuilder`] and committed to a [`Canvas`] together with an
//! explicit [`Pen`]; the canvas keeps no current path or current color between calls.

use raqote::{DrawOptions, DrawTarget, Path, PathBuilder, SolidSource, Source, StrokeStyle};

use crate::clip::{Point, Window};
use crate::error::{Result, SketchError};
use crate::math::regular_polygon_vertices;
use crate::raster::Raster;
use crate::source::Rgb;

// Geometry is clipped this many pixels outside the canvas, so edges introduced by clipping
// never show up under a one pixel stroke.
const CLIP_MARGIN: u32 = 16;

/// Largest width or height a canvas may have. The rasterizer holds edge positions in 16.16
/// fixed point, so clipped coordinates, stroke spill included, must stay below 32768.
pub const MAX_DIMENSION: u32 = 32_768 - 4 * CLIP_MARGIN;

// Shapes whose bounding box is smaller than this in both axes draw nothing.
const DEGENERATE_EXTENT: f64 = 1e-6;

// Bezier handle length for a quarter circle.
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// Checks one canvas dimension. `field` names it in the error.
pub(crate) fn check_dimension(field: &'static str, value: u32) -> Result<()> {
    if value == 0 || value > MAX_DIMENSION {
        return Err(SketchError::invalid(
            field,
            format!("must be in 1..={}, got {}", MAX_DIMENSION, value),
        ));
    }
    Ok(())
}

/// Color and opacity for a single fill or stroke.
///
/// `alpha` is on the 0-255 channel scale. Values outside that range are clamped, and the
/// fractional part is dropped, so anything below `1.0` is fully transparent.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pen {
    pub color: Rgb,
    pub alpha: f64,
}

impl Pen {
    pub fn new(color: Rgb, alpha: f64) -> Self {
        Pen { color, alpha }
    }

    pub fn alpha_byte(self) -> u8 {
        if self.alpha.is_nan() {
            0
        } else {
            self.alpha.clamp(0.0, 255.0) as u8
        }
    }

    fn source(self) -> Source<'static> {
        let Rgb { r, g, b } = self.color;
        Source::Solid(SolidSource::from_unpremultiplied_argb(
            self.alpha_byte(),
            r,
            g,
            b,
        ))
    }
}

#[derive(Debug, Copy, Clone)]
struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    fn include(bounds: &mut Option<Bounds>, (x, y): Point) {
        match bounds {
            None => {
                *bounds = Some(Bounds {
                    min: (x, y),
                    max: (x, y),
                })
            }
            Some(b) => {
                b.min = (b.min.0.min(x), b.min.1.min(y));
                b.max = (b.max.0.max(x), b.max.1.max(y));
            }
        }
    }

    fn is_degenerate(&self) -> bool {
        self.max.0 - self.min.0 < DEGENERATE_EXTENT && self.max.1 - self.min.1 < DEGENERATE_EXTENT
    }
}

#[derive(Debug, Copy, Clone)]
enum Segment {
    Line(Point),
    Cubic(Point, Point, Point),
}

impl Segment {
    fn end(self) -> Point {
        match self {
            Segment::Line(p) | Segment::Cubic(_, _, p) => p,
        }
    }
}

#[derive(Debug, Clone)]
struct Subpath {
    start: Point,
    segments: Vec<Segment>,
    closed: bool,
}

impl Subpath {
    /// The subpath as a polyline, with curves flattened against `window`.
    fn flatten(&self, window: &Window) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.segments.len() + 1);
        points.push(self.start);
        let mut at = self.start;
        for &segment in &self.segments {
            match segment {
                Segment::Line(p) => points.push(p),
                Segment::Cubic(c1, c2, end) => window.flatten_cubic([at, c1, c2, end], &mut points),
            }
            at = segment.end();
        }
        points
    }
}

/// Accumulates the subpaths of one stroke before it is committed.
#[derive(Debug)]
pub struct ShapeBuilder {
    subpaths: Vec<Subpath>,
    last: Option<Point>,
    bounds: Option<Bounds>,
    finite: bool,
}

impl Default for ShapeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeBuilder {
    pub fn new() -> Self {
        ShapeBuilder {
            subpaths: Vec::new(),
            last: None,
            bounds: None,
            finite: true,
        }
    }

    fn point(&mut self, p: Point) -> Point {
        if p.0.is_finite() && p.1.is_finite() {
            Bounds::include(&mut self.bounds, p);
        } else {
            self.finite = false;
        }
        p
    }

    fn move_to(&mut self, p: Point) {
        let start = self.point(p);
        self.subpaths.push(Subpath {
            start,
            segments: Vec::new(),
            closed: false,
        });
        self.last = Some(p);
    }

    fn push(&mut self, segment: Segment) {
        if let Some(subpath) = self.subpaths.last_mut().filter(|s| !s.closed) {
            subpath.segments.push(segment);
        } else {
            // A segment after `close` starts a new subpath at the closing point.
            let start = self.last.unwrap_or(segment.end());
            self.subpaths.push(Subpath {
                start,
                segments: vec![segment],
                closed: false,
            });
        }
        self.last = Some(segment.end());
    }

    fn line_to(&mut self, p: Point) {
        let p = self.point(p);
        self.push(Segment::Line(p));
    }

    fn cubic_to(&mut self, c1: Point, c2: Point, end: Point) {
        let (c1, c2, end) = (self.point(c1), self.point(c2), self.point(end));
        self.push(Segment::Cubic(c1, c2, end));
    }

    fn close(&mut self) {
        if let Some(subpath) = self.subpaths.last_mut() {
            subpath.closed = true;
            self.last = Some(subpath.start);
        }
    }

    /// Adds a closed regular polygon with the given circumradius as a new subpath.
    ///
    /// One edge yields a lone point and two edges a line segment; neither covers any area.
    pub fn regular_polygon(
        &mut self,
        edges: u32,
        center: (f64, f64),
        radius: f64,
        rotation: f64,
    ) -> &mut Self {
        let mut vertices = regular_polygon_vertices(edges, center, radius, rotation);
        let Some(first) = vertices.next() else {
            return self;
        };
        self.move_to(first);
        for v in vertices {
            self.line_to(v);
        }
        if edges > 1 {
            self.close();
        }
        self
    }

    /// Appends a cubic segment starting at the end of the previous subpath (or at `c1` if the
    /// shape is still empty).
    pub fn curve_to(&mut self, c1: (f64, f64), c2: (f64, f64), end: (f64, f64)) -> &mut Self {
        let start = self.last.unwrap_or(c1);
        self.move_to(start);
        self.cubic_to(c1, c2, end);
        self
    }

    /// Adds a rounded rectangle as a new subpath. Negative sizes extend left or up from
    /// `origin`; the corner radius is clamped to half the shorter side.
    pub fn rounded_rect(
        &mut self,
        origin: (f64, f64),
        (w, h): (f64, f64),
        corner_radius: f64,
    ) -> &mut Self {
        let (x0, x1) = (origin.0.min(origin.0 + w), origin.0.max(origin.0 + w));
        let (y0, y1) = (origin.1.min(origin.1 + h), origin.1.max(origin.1 + h));
        let r = corner_radius.clamp(0.0, (x1 - x0).min(y1 - y0) / 2.0);
        if r.is_nan() {
            self.finite = false;
            return self;
        }
        let k = r * KAPPA;
        let rounded = r > 0.0;
        self.move_to((x0 + r, y0));
        self.line_to((x1 - r, y0));
        if rounded {
            self.cubic_to((x1 - r + k, y0), (x1, y0 + r - k), (x1, y0 + r));
        }
        self.line_to((x1, y1 - r));
        if rounded {
            self.cubic_to((x1, y1 - r + k), (x1 - r + k, y1), (x1 - r, y1));
        }
        self.line_to((x0 + r, y1));
        if rounded {
            self.cubic_to((x0 + r - k, y1), (x0, y1 - r + k), (x0, y1 - r));
        }
        self.line_to((x0, y0 + r));
        if rounded {
            self.cubic_to((x0, y0 + r - k), (x0 + r - k, y0), (x0 + r, y0));
        }
        self.close();
        self
    }

    pub fn finish(self) -> Shape {
        let visible = self.finite && self.bounds.is_some_and(|b| !b.is_degenerate());
        Shape {
            subpaths: self.subpaths,
            visible,
        }
    }
}

/// A finished stroke outline, ready to be filled and/or stroked any number of times.
///
/// Coordinates are kept as given; each commit clips them to the target canvas.
#[derive(Debug, Clone)]
pub struct Shape {
    subpaths: Vec<Subpath>,
    visible: bool,
}

impl Shape {
    /// Whether committing this shape can change any pixel. Empty shapes, shapes collapsed to a
    /// single point and shapes with non-finite coordinates are invisible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The area to fill, with every subpath closed and clipped to `window`.
    fn fill_path(&self, window: &Window) -> Option<Path> {
        let mut pb = PathBuilder::new();
        let mut empty = true;
        for subpath in &self.subpaths {
            let clipped = window.clip_polygon(&subpath.flatten(window));
            if clipped.len() < 3 {
                continue;
            }
            trace_polyline(&mut pb, &clipped);
            pb.close();
            empty = false;
        }
        (!empty).then(|| pb.finish())
    }

    /// The outline to stroke. Only segments are clipped, so the window edges are never traced.
    fn outline_path(&self, window: &Window) -> Option<Path> {
        let mut pb = PathBuilder::new();
        let mut empty = true;
        for subpath in &self.subpaths {
            let points = subpath.flatten(window);
            if points.len() < 2 {
                continue;
            }
            if points.iter().all(|&p| window.contains(p)) {
                trace_polyline(&mut pb, &points);
                if subpath.closed {
                    pb.close();
                }
                empty = false;
                continue;
            }
            let closing = subpath.closed.then(|| (points[points.len() - 1], points[0]));
            let mut pen_at = None;
            for (a, b) in points.windows(2).map(|w| (w[0], w[1])).chain(closing) {
                let Some((a, b)) = window.clip_segment(a, b) else {
                    pen_at = None;
                    continue;
                };
                if pen_at != Some(a) {
                    pb.move_to(a.0 as f32, a.1 as f32);
                }
                pb.line_to(b.0 as f32, b.1 as f32);
                pen_at = Some(b);
                empty = false;
            }
        }
        (!empty).then(|| pb.finish())
    }
}

fn trace_polyline(pb: &mut PathBuilder, points: &[Point]) {
    let mut points = points.iter();
    if let Some(&(x, y)) = points.next() {
        pb.move_to(x as f32, y as f32);
    }
    for &(x, y) in points {
        pb.line_to(x as f32, y as f32);
    }
}

pub struct Canvas {
    dt: DrawTarget,
    width: u32,
    height: u32,
    window: Window,
    stroke_style: StrokeStyle,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Creates a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgb) -> Result<Self> {
        check_dimension("dest_width", width)?;
        check_dimension("dest_height", height)?;
        let mut canvas = Canvas {
            dt: DrawTarget::new(width as i32, height as i32),
            width,
            height,
            window: Window::around(width, height, f64::from(CLIP_MARGIN)),
            stroke_style: StrokeStyle {
                width: 1.0,
                ..StrokeStyle::default()
            },
        };
        canvas.fill_background(background);
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Overwrites every pixel with an opaque `color`.
    pub fn fill_background(&mut self, color: Rgb) {
        let Rgb { r, g, b } = color;
        self.dt
            .clear(SolidSource::from_unpremultiplied_argb(0xff, r, g, b));
    }

    /// Fills an axis-aligned rectangle. Negative sizes extend left or up from `origin`.
    pub fn fill_rect(&mut self, origin: (f64, f64), (w, h): (f64, f64), pen: Pen) {
        if pen.alpha_byte() == 0 {
            return;
        }
        let corner = (origin.0 + w, origin.1 + h);
        let Some(((x, y), (w, h))) = self.window.clip_rect(origin, corner) else {
            return;
        };
        self.dt.fill_rect(
            x as f32,
            y as f32,
            w as f32,
            h as f32,
            &pen.source(),
            &DrawOptions::new(),
        );
    }

    /// Fills the interior of `shape`. The shape is only borrowed, so it can be stroked after.
    pub fn fill(&mut self, shape: &Shape, pen: Pen) {
        if !shape.visible || pen.alpha_byte() == 0 {
            return;
        }
        if let Some(path) = shape.fill_path(&self.window) {
            self.dt.fill(&path, &pen.source(), &DrawOptions::new());
        }
    }

    /// Strokes the outline of `shape` with a one pixel wide line.
    pub fn stroke(&mut self, shape: &Shape, pen: Pen) {
        if !shape.visible || pen.alpha_byte() == 0 {
            return;
        }
        if let Some(path) = shape.outline_path(&self.window) {
            self.dt.stroke(
                &path,
                &pen.source(),
                &self.stroke_style,
                &DrawOptions::new(),
            );
        }
    }

    /// Snapshots the current contents. Drawing can continue afterwards.
    pub fn materialize(&self) -> Raster {
        Raster::from_premultiplied_argb(self.width, self.height, self.dt.get_data())
    }
}
