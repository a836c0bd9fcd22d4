use std::collections::{hash_map::Entry::*, HashMap};

use serde::{Deserialize, Serialize};

use crate::canvas::check_dimension;
use crate::error::{Result, SketchError};
use crate::source::Rgb;

const PRESETS_JSON: &str = include_str!("presets.json");

/// Everything that shapes a sketch, fixed for the lifetime of one run.
///
/// Missing fields in a JSON document fall back to the `classic` preset values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SketchConfig {
    pub dest_width: u32,
    pub dest_height: u32,
    /// Initial stroke size as a fraction of `dest_width`.
    pub stroke_ratio: f64,
    /// Fraction by which the stroke size shrinks after every cycle.
    pub stroke_reduction: f64,
    /// Largest absolute pixel offset added to each mapped coordinate.
    pub stroke_jitter: u32,
    /// Once the stroke size falls to this fraction of its initial value, strokes switch to
    /// black or white accents.
    pub stroke_inversion_threshold: f64,
    /// Starting stroke opacity on the 0-255 channel scale.
    pub initial_alpha: f64,
    pub alpha_increase: f64,
    pub min_edge_count: u32,
    pub max_edge_count: u32,
    pub total_cycles: u32,
    pub background: Rgb,
    /// Append a cubic segment to each stroke.
    pub curve_segment: bool,
    /// Add a small rounded rectangle to each stroke.
    pub accent_rect: bool,
}

impl Default for SketchConfig {
    fn default() -> Self {
        SketchConfig {
            dest_width: 2000,
            dest_height: 2000,
            stroke_ratio: 0.75,
            stroke_reduction: 0.002,
            stroke_jitter: 200,
            stroke_inversion_threshold: 0.05,
            initial_alpha: 0.1,
            alpha_increase: 0.06,
            min_edge_count: 1,
            max_edge_count: 4,
            total_cycles: 5000,
            background: Rgb::BLACK,
            curve_segment: true,
            accent_rect: true,
        }
    }
}

impl SketchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SketchConfig = serde_json::from_str(json)
            .map_err(|e| SketchError::invalid("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Size of the first stroke in pixels.
    pub fn initial_stroke_size(&self) -> f64 {
        self.stroke_ratio * f64::from(self.dest_width)
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        check_dimension("dest_width", self.dest_width)?;
        check_dimension("dest_height", self.dest_height)?;
        if !(self.stroke_ratio.is_finite() && self.stroke_ratio > 0.0) {
            return Err(SketchError::invalid(
                "stroke_ratio",
                format!("must be positive, got {}", self.stroke_ratio),
            ));
        }
        for (field, value) in [
            ("stroke_reduction", self.stroke_reduction),
            ("stroke_inversion_threshold", self.stroke_inversion_threshold),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(SketchError::invalid(
                    field,
                    format!("must be in (0, 1), got {}", value),
                ));
            }
        }
        for (field, value) in [
            ("initial_alpha", self.initial_alpha),
            ("alpha_increase", self.alpha_increase),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SketchError::invalid(
                    field,
                    format!("must be finite and non-negative, got {}", value),
                ));
            }
        }
        if self.min_edge_count < 1 {
            return Err(SketchError::invalid("min_edge_count", "must be at least 1"));
        }
        if self.max_edge_count < self.min_edge_count {
            return Err(SketchError::invalid(
                "max_edge_count",
                format!(
                    "must be at least min_edge_count ({}), got {}",
                    self.min_edge_count, self.max_edge_count
                ),
            ));
        }
        if self.total_cycles == 0 {
            return Err(SketchError::invalid("total_cycles", "must be positive"));
        }
        Ok(())
    }
}

/// Command-line adjustments layered over a preset or config file.
#[derive(Debug, Default, Clone, clap::Args)]
pub struct Overrides {
    /// Output width in pixels.
    #[clap(long)]
    pub width: Option<u32>,

    /// Output height in pixels.
    #[clap(long)]
    pub height: Option<u32>,

    /// Initial stroke size as a fraction of the output width.
    #[clap(long)]
    pub stroke_ratio: Option<f64>,

    /// Fraction by which strokes shrink every cycle.
    #[clap(long)]
    pub stroke_reduction: Option<f64>,

    /// Maximum random offset, in pixels, applied to stroke positions.
    #[clap(long)]
    pub jitter: Option<u32>,

    /// Stroke size fraction below which accent strokes start.
    #[clap(long)]
    pub inversion_threshold: Option<f64>,

    /// Starting opacity (0-255).
    #[clap(long)]
    pub initial_alpha: Option<f64>,

    /// Opacity added every cycle.
    #[clap(long)]
    pub alpha_increase: Option<f64>,

    #[clap(long)]
    pub min_edges: Option<u32>,

    #[clap(long)]
    pub max_edges: Option<u32>,

    /// Number of strokes to paint.
    #[clap(short = 'n', long)]
    pub cycles: Option<u32>,

    /// Background color, e.g. `#000000`.
    #[clap(long)]
    pub background: Option<Rgb>,

    /// Leave out the cubic segment on each stroke.
    #[clap(long)]
    pub no_curve: bool,

    /// Leave out the rounded rectangle on each stroke.
    #[clap(long)]
    pub no_accent_rect: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut SketchConfig) {
        fn set<T: Copy>(slot: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *slot = v;
            }
        }
        set(&mut config.dest_width, self.width);
        set(&mut config.dest_height, self.height);
        set(&mut config.stroke_ratio, self.stroke_ratio);
        set(&mut config.stroke_reduction, self.stroke_reduction);
        set(&mut config.stroke_jitter, self.jitter);
        set(
            &mut config.stroke_inversion_threshold,
            self.inversion_threshold,
        );
        set(&mut config.initial_alpha, self.initial_alpha);
        set(&mut config.alpha_increase, self.alpha_increase);
        set(&mut config.min_edge_count, self.min_edges);
        set(&mut config.max_edge_count, self.max_edges);
        set(&mut config.total_cycles, self.cycles);
        set(&mut config.background, self.background);
        if self.no_curve {
            config.curve_segment = false;
        }
        if self.no_accent_rect {
            config.accent_rect = false;
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WirePresetDb {
    presets: Vec<WirePreset>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WirePreset {
    name: String,
    description: String,
    config: SketchConfig,
}

#[derive(Debug)]
pub struct Preset {
    pub name: String,
    pub description: String,
    pub config: SketchConfig,
}

/// Named configurations shipped with the crate.
#[derive(Debug)]
pub struct PresetDb {
    presets: Vec<Preset>,
    by_name: HashMap<String, usize>,
}

#[derive(Debug)]
pub enum WireFormatError {
    DuplicatePreset { name: String },
    InvalidPreset { name: String, error: SketchError },
}

impl PresetDb {
    pub fn from_bundle() -> Self {
        let wire: WirePresetDb =
            serde_json::from_str(PRESETS_JSON).expect("bundled presets are invalid JSON");
        PresetDb::from_wire(wire).expect("bundled presets are not a valid database")
    }

    pub fn from_wire(wire: WirePresetDb) -> std::result::Result<Self, WireFormatError> {
        let mut db = PresetDb {
            presets: Vec::with_capacity(wire.presets.len()),
            by_name: HashMap::with_capacity(wire.presets.len()),
        };
        for preset in wire.presets {
            if let Err(error) = preset.config.validate() {
                return Err(WireFormatError::InvalidPreset {
                    name: preset.name,
                    error,
                });
            }
            match db.by_name.entry(preset.name.clone()) {
                Occupied(o) => {
                    let name = o.remove_entry().0;
                    return Err(WireFormatError::DuplicatePreset { name });
                }
                Vacant(v) => v.insert(db.presets.len()),
            };
            db.presets.push(Preset {
                name: preset.name,
                description: preset.description,
                config: preset.config,
            });
        }
        Ok(db)
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(*self.by_name.get(name)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_preset_db_from_bundle() {
        let db = PresetDb::from_bundle();
        let names: Vec<&str> = db.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["classic", "mosaic", "postcard"]);
        assert!(db.get("nope").is_none());
    }

    #[test]
    fn test_classic_preset_matches_default() {
        let db = PresetDb::from_bundle();
        assert_eq!(db.get("classic").unwrap().config, SketchConfig::default());
    }

    #[test]
    fn test_postcard_preset_fields() {
        let db = PresetDb::from_bundle();
        let config = &db.get("postcard").unwrap().config;
        assert_eq!((config.dest_width, config.dest_height), (900, 600));
        assert_eq!(config.background, Rgb::new(245, 240, 230));
        assert!(config.curve_segment);
    }

    #[test]
    fn test_duplicate_preset_rejected() {
        let wire: WirePresetDb = serde_json::from_str(
            r#"{"presets": [
                {"name": "a", "description": "", "config": {}},
                {"name": "a", "description": "", "config": {}}
            ]}"#,
        )
        .unwrap();
        match PresetDb::from_wire(wire) {
            Err(WireFormatError::DuplicatePreset { name }) => assert_eq!(name, "a"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_preset_rejected() {
        let wire: WirePresetDb = serde_json::from_str(
            r#"{"presets": [{"name": "b", "description": "", "config": {"strokeReduction": 1.0}}]}"#,
        )
        .unwrap();
        assert!(matches!(
            PresetDb::from_wire(wire),
            Err(WireFormatError::InvalidPreset { .. })
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SketchConfig::from_json(r#"{"destWidth": 64, "curveSegment": false}"#).unwrap();
        assert_eq!(config.dest_width, 64);
        assert_eq!(config.dest_height, 2000);
        assert!(!config.curve_segment);
        assert!(config.accent_rect);
    }

    #[test]
    fn test_unknown_json_field_rejected() {
        assert!(SketchConfig::from_json(r#"{"destWdith": 64}"#).is_err());
    }

    #[test]
    fn test_validate_accepts_large_outputs() {
        let config = SketchConfig {
            dest_width: 5000,
            dest_height: 5000,
            stroke_ratio: 10_000.0,
            stroke_jitter: 1_000_000,
            ..SketchConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_values() {
        let cases: Vec<(&str, Box<dyn Fn(&mut SketchConfig)>)> = vec![
            ("dest_width", Box::new(|c: &mut SketchConfig| c.dest_width = 0)),
            ("dest_height", Box::new(|c: &mut SketchConfig| c.dest_height = crate::canvas::MAX_DIMENSION + 1)),
            ("stroke_ratio", Box::new(|c: &mut SketchConfig| c.stroke_ratio = 0.0)),
            ("stroke_ratio", Box::new(|c: &mut SketchConfig| c.stroke_ratio = f64::INFINITY)),
            ("stroke_reduction", Box::new(|c: &mut SketchConfig| c.stroke_reduction = 0.0)),
            ("stroke_reduction", Box::new(|c: &mut SketchConfig| c.stroke_reduction = 1.0)),
            (
                "stroke_inversion_threshold",
                Box::new(|c: &mut SketchConfig| c.stroke_inversion_threshold = f64::NAN),
            ),
            ("initial_alpha", Box::new(|c: &mut SketchConfig| c.initial_alpha = -1.0)),
            ("alpha_increase", Box::new(|c: &mut SketchConfig| c.alpha_increase = f64::NAN)),
            ("min_edge_count", Box::new(|c: &mut SketchConfig| c.min_edge_count = 0)),
            (
                "max_edge_count",
                Box::new(|c: &mut SketchConfig| {
                    c.min_edge_count = 5;
                    c.max_edge_count = 4;
                }),
            ),
            ("total_cycles", Box::new(|c: &mut SketchConfig| c.total_cycles = 0)),
        ];
        for (expected, mutate) in cases {
            let mut config = SketchConfig::default();
            mutate(&mut config);
            match config.validate() {
                Err(SketchError::InvalidInput { field, .. }) => assert_eq!(field, expected),
                other => panic!("{}: unexpected result {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = SketchConfig::default();
        let overrides = Overrides {
            width: Some(320),
            jitter: Some(0),
            background: Some(Rgb::WHITE),
            no_accent_rect: true,
            ..Overrides::default()
        };
        overrides.apply(&mut config);
        assert_eq!(config.dest_width, 320);
        assert_eq!(config.dest_height, 2000);
        assert_eq!(config.stroke_jitter, 0);
        assert_eq!(config.background, Rgb::WHITE);
        assert!(!config.accent_rect);
        assert!(config.curve_segment);
    }

    #[test]
    fn test_initial_stroke_size() {
        let config = SketchConfig {
            dest_width: 100,
            stroke_ratio: 1.0,
            ..SketchConfig::default()
        };
        assert_eq!(config.initial_stroke_size(), 100.0);
    }
}
