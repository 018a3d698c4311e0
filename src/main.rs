use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use quake_map::feed::{FeedLocation, HttpFeedSource, PB2002_PLATES_URL, USGS_ALL_WEEK_URL};
use quake_map::output::MapDocument;
use quake_map::pipeline::{PipelineConfig, run};
use quake_map::style::RadiusPolicy;

#[derive(Parser)]
#[command(about = "Build an earthquake and tectonic plate map document from GeoJSON feeds")]
struct Cli {
    /// Earthquake feed URL or local GeoJSON file
    #[arg(long, default_value = USGS_ALL_WEEK_URL)]
    earthquakes: FeedLocation,

    /// Tectonic plate feed URL or local GeoJSON file
    #[arg(long, default_value = PB2002_PLATES_URL)]
    plates: FeedLocation,

    /// Output map document path
    #[arg(long, default_value = "quake_map.json")]
    output: PathBuf,

    /// Smallest marker radius; by default radius is exactly twice the magnitude
    #[arg(long)]
    min_radius: Option<f64>,

    /// Depth breakpoints (km) for the legend, ascending
    #[arg(long, value_delimiter = ',', default_value = "0,10,30,50,70,90")]
    breakpoints: Vec<f64>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    quake_map::logging::init();
    let cli = Cli::parse();

    let config = PipelineConfig {
        earthquakes: cli.earthquakes,
        plates: cli.plates,
        radius: RadiusPolicy {
            min_radius: cli.min_radius,
        },
        breakpoints: cli.breakpoints,
    };

    let source = HttpFeedSource::new().context("Failed to build HTTP client")?;

    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    let layers = run(&source, &config, Some(&pb));

    if !layers.failures.is_empty() {
        let empty: Vec<_> = layers.failures.iter().map(|f| f.layer).collect();
        warn!(layers = ?empty, "writing map with empty layers");
    }

    let document = MapDocument::new(&layers);
    let json = if cli.compact {
        serde_json::to_string(&document)?
    } else {
        serde_json::to_string_pretty(&document)?
    };
    std::fs::write(&cli.output, json)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    info!(
        earthquakes = layers.earthquakes.len(),
        plates = layers.plates.len(),
        "wrote {}",
        cli.output.display()
    );

    Ok(())
}
