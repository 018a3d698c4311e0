use geo::Point;
use geojson::Geometry;
use tracing::warn;

use crate::error::DataError;
use crate::model::{EarthquakeFeature, PlateFeature};
use crate::style::{Color, MarkerStyle, PLATE_STYLE, PlateStyle, RadiusPolicy, resolve_color};

pub const EARTHQUAKES_LAYER: &str = "Earthquakes";
pub const TECTONIC_PLATES_LAYER: &str = "TectonicPlates";

pub const DEFAULT_BREAKPOINTS: [f64; 6] = [0.0, 10.0, 30.0, 50.0, 70.0, 90.0];
pub const LEGEND_TITLE: &str = "Depth";

/// A named group of render descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer<D> {
    pub name: &'static str,
    pub descriptors: Vec<D>,
    /// Input features dropped because they could not be styled.
    pub skipped: usize,
}

impl<D> Layer<D> {
    pub fn empty(name: &'static str) -> Self {
        Self {
            name,
            descriptors: Vec::new(),
            skipped: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// A circle marker for one earthquake.
#[derive(Debug, Clone, PartialEq)]
pub struct QuakeMarker {
    pub position: Point<f64>,
    pub tooltip: String,
    pub style: MarkerStyle,
    pub place: String,
    pub magnitude: f64,
    pub depth_km: f64,
    pub time: Option<i64>,
}

/// An outlined plate boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateOutline {
    pub geometry: Option<Geometry>,
    pub popup: String,
    pub style: PlateStyle,
    pub code: String,
}

/// One legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub color: Color,
    pub label: String,
}

fn quake_marker(
    feature: &EarthquakeFeature,
    policy: &RadiusPolicy,
) -> Result<QuakeMarker, DataError> {
    let magnitude = feature.magnitude.ok_or(DataError::MissingMagnitude)?;
    let depth_km = feature.depth_km.ok_or(DataError::MissingDepth)?;
    let style = MarkerStyle::resolve(magnitude, depth_km, policy)?;

    Ok(QuakeMarker {
        position: feature.coordinates,
        tooltip: format!(
            "{}\nMagnitude: {}\nDepth: {}",
            feature.place, magnitude, depth_km
        ),
        style,
        place: feature.place.clone(),
        magnitude,
        depth_km,
        time: feature.time,
    })
}

/// Style every earthquake, in input order. Features that cannot be styled
/// are logged and left out; the rest of the layer is still built.
pub fn assemble_earthquake_layer(
    features: &[EarthquakeFeature],
    policy: &RadiusPolicy,
) -> Layer<QuakeMarker> {
    let mut layer = Layer::empty(EARTHQUAKES_LAYER);

    for feature in features {
        match quake_marker(feature, policy) {
            Ok(marker) => layer.descriptors.push(marker),
            Err(e) => {
                warn!(place = %feature.place, error = %e, "skipping earthquake");
                layer.skipped += 1;
            }
        }
    }

    layer
}

/// Outline every plate with the shared plate style.
pub fn assemble_plate_layer(features: &[PlateFeature]) -> Layer<PlateOutline> {
    let descriptors = features
        .iter()
        .map(|plate| PlateOutline {
            geometry: plate.geometry.clone(),
            popup: format!("{}\n{} Plate", plate.code, plate.plate_name),
            style: PLATE_STYLE,
            code: plate.code.clone(),
        })
        .collect();

    Layer {
        name: TECTONIC_PLATES_LAYER,
        descriptors,
        skipped: 0,
    }
}

/// Legend rows for ascending depth breakpoints: `a–b` for each consecutive
/// pair and `last+` for the final one.
pub fn build_legend(breakpoints: &[f64]) -> Vec<LegendEntry> {
    breakpoints
        .iter()
        .enumerate()
        .filter_map(|(i, &depth)| {
            let color = match resolve_color(depth) {
                Ok(color) => color,
                Err(e) => {
                    warn!(index = i, error = %e, "skipping legend breakpoint");
                    return None;
                }
            };
            let label = match breakpoints.get(i + 1) {
                Some(next) => format!("{depth}\u{2013}{next}"),
                None => format!("{depth}+"),
            };
            Some(LegendEntry { color, label })
        })
        .collect()
}
