use geojson::JsonValue;
use indicatif::ProgressBar;
use tracing::{error, info, warn};

use crate::assemble::{
    DEFAULT_BREAKPOINTS, EARTHQUAKES_LAYER, Layer, LegendEntry, PlateOutline, QuakeMarker,
    TECTONIC_PLATES_LAYER, assemble_earthquake_layer, assemble_plate_layer, build_legend,
};
use crate::error::FeedError;
use crate::feed::{
    FeedLocation, FeedSource, PB2002_PLATES_URL, USGS_ALL_WEEK_URL, fetch_feature_collection,
};
use crate::model::{EarthquakeFeature, PlateFeature};
use crate::style::RadiusPolicy;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub earthquakes: FeedLocation,
    pub plates: FeedLocation,
    pub radius: RadiusPolicy,
    pub breakpoints: Vec<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            earthquakes: FeedLocation::Remote(USGS_ALL_WEEK_URL.to_string()),
            plates: FeedLocation::Remote(PB2002_PLATES_URL.to_string()),
            radius: RadiusPolicy::default(),
            breakpoints: DEFAULT_BREAKPOINTS.to_vec(),
        }
    }
}

/// A feed that could not be used, and which layer it left empty.
#[derive(Debug)]
pub struct FeedFailure {
    pub layer: &'static str,
    pub error: FeedError,
}

/// Everything handed to the rendering surface for one build.
#[derive(Debug)]
pub struct MapLayers {
    pub earthquakes: Layer<QuakeMarker>,
    pub plates: Layer<PlateOutline>,
    pub legend: Vec<LegendEntry>,
    pub failures: Vec<FeedFailure>,
}

fn earthquakes_from(features: &[JsonValue]) -> (Vec<EarthquakeFeature>, usize) {
    let mut quakes = Vec::with_capacity(features.len());
    let mut rejected = 0;
    for feature in features {
        match EarthquakeFeature::from_json(feature) {
            Ok(quake) => quakes.push(quake),
            Err(e) => {
                warn!(id = ?feature.get("id"), error = %e, "skipping earthquake feature");
                rejected += 1;
            }
        }
    }
    (quakes, rejected)
}

fn plates_from(features: &[JsonValue]) -> (Vec<PlateFeature>, usize) {
    let mut plates = Vec::with_capacity(features.len());
    let mut rejected = 0;
    for feature in features {
        match PlateFeature::from_json(feature) {
            Ok(plate) => plates.push(plate),
            Err(e) => {
                warn!(id = ?feature.get("id"), error = %e, "skipping plate feature");
                rejected += 1;
            }
        }
    }
    (plates, rejected)
}

fn record_failure(layer: &'static str, error: FeedError, failures: &mut Vec<FeedFailure>) {
    if error.is_decode() {
        error!(layer, error = %error, "feed returned unusable data");
    } else {
        error!(layer, error = %error, "feed unreachable");
    }
    failures.push(FeedFailure { layer, error });
}

/// Fetch both feeds concurrently and assemble the layers.
///
/// A feed that fails leaves its layer empty and is recorded in
/// `MapLayers::failures`; it never stops the other layer from being built.
/// The progress bar is finished once both fetches return, before anything
/// is logged.
pub fn run(
    source: &dyn FeedSource,
    config: &PipelineConfig,
    progress: Option<&ProgressBar>,
) -> MapLayers {
    if let Some(pb) = progress {
        pb.set_message("Fetching earthquake and plate feeds...");
    }

    let (quake_result, plate_result) = rayon::join(
        || fetch_feature_collection(source, &config.earthquakes),
        || fetch_feature_collection(source, &config.plates),
    );

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let mut failures = Vec::new();

    let earthquakes = match quake_result {
        Ok(features) => {
            info!(count = features.len(), feed = %config.earthquakes, "earthquake feed loaded");
            let (quakes, rejected) = earthquakes_from(&features);
            let mut layer = assemble_earthquake_layer(&quakes, &config.radius);
            layer.skipped += rejected;
            layer
        }
        Err(e) => {
            record_failure(EARTHQUAKES_LAYER, e, &mut failures);
            Layer::empty(EARTHQUAKES_LAYER)
        }
    };

    let plates = match plate_result {
        Ok(features) => {
            info!(count = features.len(), feed = %config.plates, "plate feed loaded");
            let (plates, rejected) = plates_from(&features);
            let mut layer = assemble_plate_layer(&plates);
            layer.skipped += rejected;
            layer
        }
        Err(e) => {
            record_failure(TECTONIC_PLATES_LAYER, e, &mut failures);
            Layer::empty(TECTONIC_PLATES_LAYER)
        }
    };

    info!(
        earthquakes = earthquakes.len(),
        skipped = earthquakes.skipped,
        plates = plates.len(),
        "layers assembled"
    );

    MapLayers {
        earthquakes,
        plates,
        legend: build_legend(&config.breakpoints),
        failures,
    }
}
