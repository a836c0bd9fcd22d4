use crate::canvas::{Canvas, Pen, ShapeBuilder};
use crate::config::SketchConfig;
use crate::error::{Result, SketchError};
use crate::mapper::map_point;
use crate::math::{add_polar_offset, pi};
use crate::rand::Rng;
use crate::raster::Raster;
use crate::source::{RasterSource, Rgb};
use crate::stroke::StrokeParameters;

/// One painting run: a source to sample from, a canvas to paint on, and the evolving stroke
/// parameters. Each call to [`run_cycle`](Sketch::run_cycle) lays down exactly one stroke.
#[derive(Debug)]
pub struct Sketch<S> {
    config: SketchConfig,
    source: S,
    source_dims: (u32, u32),
    canvas: Canvas,
    params: StrokeParameters,
    rng: Rng,
    accents_started: bool,
}

impl<S: RasterSource> Sketch<S> {
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidInput`] if `config` fails validation or `source` has no
    /// pixels.
    pub fn new(source: S, config: SketchConfig, rng: Rng) -> Result<Self> {
        config.validate()?;
        let source_dims = (source.width(), source.height());
        if source_dims.0 == 0 || source_dims.1 == 0 {
            return Err(SketchError::invalid(
                "source",
                format!("raster is {}x{}", source_dims.0, source_dims.1),
            ));
        }
        let canvas = Canvas::new(config.dest_width, config.dest_height, config.background)?;
        let params = StrokeParameters::new(&config);
        tracing::debug!(
            source = ?source_dims,
            dest = ?(config.dest_width, config.dest_height),
            initial_stroke_size = params.initial_stroke_size(),
            "sketch ready"
        );
        Ok(Sketch {
            config,
            source,
            source_dims,
            canvas,
            params,
            rng,
            accents_started: false,
        })
    }

    pub fn with_seed(source: S, config: SketchConfig, seed: &[u8]) -> Result<Self> {
        Self::new(source, config, Rng::from_seed(seed))
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn parameters(&self) -> &StrokeParameters {
        &self.params
    }

    pub fn source_dimensions(&self) -> (u32, u32) {
        self.source_dims
    }

    /// Samples one source color and paints one stroke with it.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::SourceUnavailable`] if the source has no color for a point inside
    /// its own bounds. The canvas is untouched in that case.
    pub fn run_cycle(&mut self) -> Result<()> {
        let (source_width, source_height) = self.source_dims;
        let sample = (
            self.rng.uniform(0.0, f64::from(source_width)),
            self.rng.uniform(0.0, f64::from(source_height)),
        );
        let x = (sample.0 as u32).min(source_width - 1);
        let y = (sample.1 as u32).min(source_height - 1);
        let color = self
            .source
            .color_at(x, y)
            .ok_or(SketchError::SourceUnavailable { x, y })?;

        let position = map_point(
            sample,
            self.source_dims,
            (self.config.dest_width, self.config.dest_height),
            self.config.stroke_jitter,
            &mut self.rng,
        );
        let edges = self.params.edge_count(&mut self.rng);
        let inverted = self.params.is_inverted();
        if inverted && !self.accents_started {
            self.accents_started = true;
            tracing::debug!(
                cycle = self.params.cycle(),
                stroke_size = self.params.stroke_size(),
                "switching to accent strokes"
            );
        }
        let pen = stroke_pen(color, self.params.alpha(), inverted);
        let size = self.params.stroke_size();
        let rotation = self.rng.uniform(0.0, pi(2.0));

        let mut shape = ShapeBuilder::new();
        shape.regular_polygon(edges, position, size, rotation);
        if self.config.curve_segment {
            // A loop leaving the polygon's first vertex and returning behind the center.
            shape.curve_to(
                add_polar_offset(position, rotation + pi(1.0 / 3.0), size),
                add_polar_offset(position, rotation - pi(1.0 / 3.0), size),
                add_polar_offset(position, rotation + pi(1.0), size * 0.5),
            );
        }
        if self.config.accent_rect {
            let height = size / 8.0;
            let width = self.rng.uniform(0.0, size);
            shape.rounded_rect(position, (width, height), height / 2.0);
        }
        let shape = shape.finish();
        self.canvas.fill(&shape, pen);
        self.canvas.stroke(&shape, pen);

        tracing::trace!(
            cycle = self.params.cycle(),
            edges,
            size,
            alpha = pen.alpha,
            "stroke"
        );
        self.params.advance();
        Ok(())
    }

    /// Runs `cycles` cycles in order. On error the canvas holds every stroke completed before
    /// the failing cycle.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn run(&mut self, cycles: u32) -> Result<()> {
        for _ in 0..cycles {
            self.run_cycle()?;
        }
        Ok(())
    }

    /// The painting so far. Does not end the run.
    pub fn output(&self) -> Raster {
        self.canvas.materialize()
    }
}

/// Pen for one stroke: the sampled color at the current alpha, or, once strokes are inverted,
/// white over dark samples and black over light ones at twice the alpha.
pub(crate) fn stroke_pen(sampled: Rgb, alpha: f64, inverted: bool) -> Pen {
    if !inverted {
        return Pen::new(sampled, alpha);
    }
    let accent = if sampled.brightness() < 128 {
        Rgb::WHITE
    } else {
        Rgb::BLACK
    };
    Pen::new(accent, alpha * 2.0)
}

#[cfg(test)]
mod test {
    use super::*;

    struct Flaky;

    impl RasterSource for Flaky {
        fn width(&self) -> u32 {
            4
        }
        fn height(&self) -> u32 {
            4
        }
        fn color_at(&self, _x: u32, _y: u32) -> Option<Rgb> {
            None
        }
    }

    fn small_config() -> SketchConfig {
        SketchConfig {
            dest_width: 32,
            dest_height: 32,
            total_cycles: 10,
            ..SketchConfig::default()
        }
    }

    #[test]
    fn test_stroke_pen() {
        let c = Rgb::new(10, 200, 30);
        assert_eq!(stroke_pen(c, 7.0, false), Pen::new(c, 7.0));
        assert_eq!(stroke_pen(c, 7.0, true), Pen::new(Rgb::WHITE, 14.0));
        assert_eq!(
            stroke_pen(Rgb::new(128, 128, 128), 7.0, true),
            Pen::new(Rgb::BLACK, 14.0)
        );
        assert_eq!(
            stroke_pen(Rgb::new(127, 128, 128), 7.0, true),
            Pen::new(Rgb::WHITE, 14.0)
        );
    }

    #[test]
    fn test_unreadable_source_fails_without_advancing() {
        let mut sketch = Sketch::with_seed(Flaky, small_config(), b"").unwrap();
        let before = sketch.output();
        match sketch.run(3) {
            Err(SketchError::SourceUnavailable { x, y }) => assert!(x < 4 && y < 4),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(sketch.parameters().cycle(), 0);
        assert_eq!(sketch.output(), before);
    }

    #[test]
    fn test_run_advances_parameters() {
        let source = image::RgbImage::from_pixel(5, 3, image::Rgb([200, 10, 10]));
        let mut sketch = Sketch::with_seed(source, small_config(), b"advance").unwrap();
        sketch.run(7).unwrap();
        let params = sketch.parameters();
        assert_eq!(params.cycle(), 7);
        let expected = 0.75 * 32.0 * (1.0f64 - 0.002).powi(7);
        assert!((params.stroke_size() - expected).abs() < 1e-9);
        assert_eq!(sketch.source_dimensions(), (5, 3));
    }
}
