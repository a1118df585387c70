use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ferrpanel_core::consts::INCLUSION_GAP;
use ferrpanel_core::layout::{
    Detections, LayoutConfigBuilder, LayoutOutput, pipeline::inclusive_panels,
};

#[derive(Parser)]
#[command(name = "inclusive-panels")]
#[command(about = "Grow detected panels over their associated speech bubbles")]
struct Args {
    #[arg(
        short,
        long,
        help = "Detections JSON with `panels`, `texts` and `associations`"
    )]
    input: PathBuf,

    #[arg(short, long, default_value = "panels.json", help = "Output JSON path")]
    output: PathBuf,

    #[arg(
        long,
        default_value_t = INCLUSION_GAP,
        help = "Pixel gap within which a bubble still touches a panel"
    )]
    gap: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Input detections: {}", args.input.display());

    let start_time = Instant::now();
    let associated = match Detections::from_path(&args.input)? {
        Detections::Associated(associated) => associated,
        Detections::Raw(raw) => {
            return Err(format!(
                "{} holds {} raw boxes without panel associations; use `reading-order` instead",
                args.input.display(),
                raw.boxes.len()
            )
            .into());
        }
    };
    info!(
        "Loaded {} panels, {} bubbles, {} associations in {:.2?}",
        associated.panels.len(),
        associated.contents.len(),
        associated.associations.len(),
        start_time.elapsed()
    );

    let config = LayoutConfigBuilder::default()
        .inclusion_gap(args.gap)
        .build()?;

    let start_time = Instant::now();
    let output = LayoutOutput::Inclusive(inclusive_panels(&associated, &config)?);
    info!("Expanded panels in {:.2?}", start_time.elapsed());

    if output.is_empty() {
        warn!("No panels detected, writing an empty list");
    }
    output.write_json(&args.output)?;
    info!("Saved {} panels to {}", output.len(), args.output.display());

    Ok(())
}
