use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use footscale::detection::{build_standard_pipeline, load_image};
use footscale::report::{render_frames, save_frames};
use footscale::{MeasureConfig, MeasurementReport};

#[derive(Parser)]
#[command(name = "footscale")]
#[command(about = "Estimate foot length and width from a photo with a reference coin")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE", default_value = "soleTestWithReference.png")]
    image_path: PathBuf,

    /// Known radius of the reference coin
    #[arg(long, value_name = "RADIUS")]
    coin_radius: Option<f64>,

    /// Unit of the coin radius (and of the reported foot size)
    #[arg(long, value_name = "LABEL")]
    unit: Option<String>,

    /// JSON file with detection parameters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Save every step's output to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Save the three report frames as PNG files
    #[arg(long, value_name = "DIR")]
    frames_out: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Do not open the frame viewer
    #[cfg(feature = "gui")]
    #[arg(long)]
    no_display: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match &args.config {
        Some(path) => MeasureConfig::from_file(path)?,
        None => MeasureConfig::default(),
    };
    if let Some(radius) = args.coin_radius {
        config.reference.radius = radius;
    }
    if let Some(unit) = &args.unit {
        config.reference.unit = unit.clone();
    }
    config.validate()?;

    let img = load_image(&args.image_path)
        .with_context(|| format!("Failed to load {}", args.image_path.display()))?;

    let mut pipeline = build_standard_pipeline(&config);
    if let Some(debug_dir) = args.debug_out {
        pipeline = pipeline.with_debug(debug_dir)?;
    }

    let data = pipeline.run(img).context("Measurement failed")?;
    let report = MeasurementReport::from_data(&data, &config.reference.unit)?;

    let output = if args.json {
        serde_json::to_string_pretty(&report)?
    } else {
        report.to_string()
    };

    let frames = render_frames(&data)?;
    if let Some(dir) = &args.frames_out {
        let written = save_frames(&frames, dir)?;
        info!(count = written.len(), dir = %dir.display(), "Frames saved");
    }

    // The viewer prints the report while the last frame is up
    #[cfg(feature = "gui")]
    {
        if !args.no_display {
            return footscale::gui::show_frames(&frames, output);
        }
    }

    println!("{output}");
    Ok(())
}
