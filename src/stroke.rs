use crate::config::SketchConfig;
use crate::rand::Rng;

/// The evolving size and opacity of strokes across the cycles of one sketch.
///
/// Size decays geometrically and alpha grows linearly; both change only in
/// [`advance`](StrokeParameters::advance).
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeParameters {
    initial_stroke_size: f64,
    stroke_size: f64,
    alpha: f64,
    cycle: u64,
    reduction: f64,
    alpha_increase: f64,
    inversion_size: f64,
    min_edges: u32,
    max_edges: u32,
}

impl StrokeParameters {
    pub fn new(config: &SketchConfig) -> Self {
        let initial_stroke_size = config.initial_stroke_size();
        StrokeParameters {
            initial_stroke_size,
            stroke_size: initial_stroke_size,
            alpha: config.initial_alpha,
            cycle: 0,
            reduction: config.stroke_reduction,
            alpha_increase: config.alpha_increase,
            inversion_size: config.stroke_inversion_threshold * initial_stroke_size,
            min_edges: config.min_edge_count,
            max_edges: config.max_edge_count,
        }
    }

    pub fn initial_stroke_size(&self) -> f64 {
        self.initial_stroke_size
    }

    pub fn stroke_size(&self) -> f64 {
        self.stroke_size
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Number of completed cycles.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Draws a fresh edge count in `[min_edge_count, max_edge_count]`.
    pub fn edge_count(&self, rng: &mut Rng) -> u32 {
        rng.uniform_int(i64::from(self.min_edges), i64::from(self.max_edges)) as u32
    }

    /// Whether strokes have shrunk to the accent threshold. Never reverts, since the size
    /// only ever decreases.
    pub fn is_inverted(&self) -> bool {
        self.stroke_size <= self.inversion_size
    }

    pub fn advance(&mut self) {
        self.stroke_size *= 1.0 - self.reduction;
        self.alpha += self.alpha_increase;
        self.cycle += 1;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn config(reduction: f64, threshold: f64) -> SketchConfig {
        SketchConfig {
            dest_width: 100,
            dest_height: 100,
            stroke_ratio: 1.0,
            stroke_reduction: reduction,
            stroke_inversion_threshold: threshold,
            initial_alpha: 10.0,
            alpha_increase: 5.0,
            min_edge_count: 2,
            max_edge_count: 5,
            ..SketchConfig::default()
        }
    }

    #[test]
    fn test_stroke_size_halves() {
        let mut params = StrokeParameters::new(&config(0.5, 0.1));
        let mut sizes = Vec::new();
        for _ in 0..4 {
            sizes.push(params.stroke_size());
            params.advance();
        }
        assert_eq!(sizes, [100.0, 50.0, 25.0, 12.5]);
        assert_eq!(params.initial_stroke_size(), 100.0);
    }

    #[test]
    fn test_alpha_grows_linearly() {
        let mut params = StrokeParameters::new(&config(0.5, 0.1));
        let mut alphas = Vec::new();
        for _ in 0..4 {
            alphas.push(params.alpha());
            params.advance();
        }
        assert_eq!(alphas, [10.0, 15.0, 20.0, 25.0]);
        assert_eq!(params.cycle(), 4);
    }

    #[test]
    fn test_decay_law_holds_over_many_cycles() {
        let mut params = StrokeParameters::new(&config(0.013, 0.1));
        for _ in 0..2000 {
            let (size, alpha) = (params.stroke_size(), params.alpha());
            params.advance();
            let expected = size * (1.0 - 0.013);
            assert!((params.stroke_size() - expected).abs() <= expected * 1e-12);
            assert!(params.stroke_size() < size || size == 0.0);
            assert_eq!(params.alpha(), alpha + 5.0);
        }
    }

    #[test]
    fn test_inversion_crosses_between_cycle_three_and_four() {
        let mut params = StrokeParameters::new(&config(0.5, 0.1));
        let flags: Vec<bool> = (0..8)
            .map(|_| {
                let inverted = params.is_inverted();
                params.advance();
                inverted
            })
            .collect();
        assert_eq!(
            flags,
            [false, false, false, false, true, true, true, true]
        );
    }

    #[test]
    fn test_inversion_never_reverts() {
        let mut params = StrokeParameters::new(&config(0.01, 0.37));
        let mut first_crossing = None;
        for cycle in 0..1000 {
            match (params.is_inverted(), first_crossing) {
                (true, None) => first_crossing = Some(cycle),
                (false, Some(c)) => panic!("reverted at {} after crossing at {}", cycle, c),
                _ => {}
            }
            params.advance();
        }
        // 0.99^n <= 0.37 first holds at n = 99.
        assert_eq!(first_crossing, Some(99));
    }

    #[test]
    fn test_edge_count_within_bounds() {
        let params = StrokeParameters::new(&config(0.5, 0.1));
        let mut rng = Rng::from_seed(b"edges");
        let mut seen = [false; 6];
        for _ in 0..1000 {
            let n = params.edge_count(&mut rng);
            assert!((2..=5).contains(&n), "edge count {}", n);
            seen[n as usize] = true;
        }
        assert_eq!(seen, [false, false, true, true, true, true]);
    }

    #[test]
    fn test_fixed_edge_count() {
        let mut cfg = config(0.5, 0.1);
        cfg.min_edge_count = 3;
        cfg.max_edge_count = 3;
        let params = StrokeParameters::new(&cfg);
        let mut rng = Rng::from_seed(b"");
        assert!((0..50).all(|_| params.edge_count(&mut rng) == 3));
    }
}
