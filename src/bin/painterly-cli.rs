use core::fmt::Debug;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::Level;

use painterly::config::{Overrides, PresetDb, SketchConfig};
use painterly::io::{load_source, persist_raster};
use painterly::Sketch;

/// Paint a picture out of randomized strokes sampled from a source image.
#[derive(Parser)]
#[command(version)]
struct Opts {
    /// Image to sample stroke colors from.
    #[clap(required_unless_present = "list_presets")]
    source: Option<PathBuf>,

    /// Seed as hex bytes, e.g. `0x1f2e3d`. Drawn from the clock if omitted.
    #[clap(short, long)]
    seed: Option<Seed>,

    /// Bundled preset to start from.
    #[clap(short, long, default_value = "classic")]
    preset: String,

    /// JSON config file to start from instead of a preset.
    #[clap(short, long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Output PNG path. Defaults to `<seed>-painterly.png`.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Hide the progress bar and informational logs.
    #[clap(short, long)]
    quiet: bool,

    /// Log more; repeat for per-stroke tracing.
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the bundled presets and exit.
    #[clap(long)]
    list_presets: bool,

    #[clap(flatten)]
    overrides: Overrides,
}

#[derive(Clone)]
struct Seed(pub Vec<u8>);
impl Seed {
    fn from_clock() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Seed(nanos.to_le_bytes().to_vec())
    }
    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
impl FromStr for Seed {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).with_context(|| format!("seed `{}` is not hex", s))?;
        Ok(Seed(bytes))
    }
}
impl Debug for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}
impl Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

fn init_logging(opts: &Opts) {
    let level = match (opts.quiet, opts.verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn resolve_config(opts: &Opts, presets: &PresetDb) -> anyhow::Result<SketchConfig> {
    let mut config = match &opts.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config at {}", path.display()))?;
            SketchConfig::from_json(&json)
                .with_context(|| format!("Invalid config at {}", path.display()))?
        }
        None => presets
            .get(&opts.preset)
            .with_context(|| format!("No preset named `{}`", opts.preset))?
            .config
            .clone(),
    };
    opts.overrides.apply(&mut config);
    config.validate().context("Invalid command-line override")?;
    Ok(config)
}

fn progress_bar(total: u32, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(u64::from(total));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} strokes")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏ "),
    );
    pb
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    init_logging(&opts);

    let presets = PresetDb::from_bundle();
    if opts.list_presets {
        for preset in presets.iter() {
            println!("{:<10} {}", preset.name, preset.description);
        }
        return Ok(());
    }

    let config = resolve_config(&opts, &presets)?;
    let source_path = opts.source.as_ref().context("A source image is required")?;
    let source = load_source(source_path)
        .with_context(|| format!("Failed to load source image {}", source_path.display()))?;

    let seed = opts.seed.clone().unwrap_or_else(Seed::from_clock);
    tracing::info!(%seed, cycles = config.total_cycles, "painting");

    let mut sketch = Sketch::with_seed(source, config, seed.as_bytes())?;
    let total_cycles = sketch.config().total_cycles;
    let pb = progress_bar(total_cycles, opts.quiet);
    for _ in 0..total_cycles {
        sketch.run_cycle()?;
        pb.inc(1);
    }
    pb.finish_and_clear();

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}-painterly.png", seed)));
    persist_raster(&sketch.output(), &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), "wrote png");
    Ok(())
}
