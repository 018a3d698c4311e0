use serde::Serialize;
use std::fmt;

use crate::error::DataError;

/// A fixed hex fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(&'static str);

impl Color {
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Depth buckets as (inclusive lower bound in km, color), deepest first.
/// Anything shallower than the last bound falls through to `SHALLOW_COLOR`.
pub const DEPTH_BUCKETS: [(f64, Color); 5] = [
    (90.0, Color("#000000")),
    (70.0, Color("#472048")),
    (50.0, Color("#870014")),
    (30.0, Color("#F00024")),
    (10.0, Color("#FFC80D")),
];

pub const SHALLOW_COLOR: Color = Color("#f9f136");

/// Marker radius for a magnitude: twice the magnitude, unclamped.
pub fn resolve_radius(magnitude: f64) -> f64 {
    magnitude * 2.0
}

/// Fill color for a depth in km.
///
/// Buckets are closed below and open above, so a depth sitting exactly on a
/// threshold takes the deeper bucket's color.
pub fn resolve_color(depth_km: f64) -> Result<Color, DataError> {
    if depth_km.is_nan() {
        return Err(DataError::NonFiniteDepth);
    }

    Ok(DEPTH_BUCKETS
        .iter()
        .find(|(lower, _)| depth_km >= *lower)
        .map(|(_, color)| *color)
        .unwrap_or(SHALLOW_COLOR))
}

/// How small a marker is allowed to get.
///
/// The default leaves `resolve_radius` untouched, so zero and negative
/// magnitudes produce non-positive radii.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RadiusPolicy {
    pub min_radius: Option<f64>,
}

impl RadiusPolicy {
    pub fn clamped(min_radius: f64) -> Self {
        Self {
            min_radius: Some(min_radius),
        }
    }

    pub fn radius(&self, magnitude: f64) -> f64 {
        let radius = resolve_radius(magnitude);
        match self.min_radius {
            Some(min) => radius.max(min),
            None => radius,
        }
    }
}

/// Circle marker style for one earthquake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill_color: Color,
    #[serde(rename = "color")]
    pub stroke_color: &'static str,
    pub weight: u32,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    pub fn new(radius: f64, fill_color: Color) -> Self {
        Self {
            radius,
            fill_color,
            stroke_color: "#000",
            weight: 1,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }

    /// Style for a magnitude and depth pair.
    pub fn resolve(
        magnitude: f64,
        depth_km: f64,
        policy: &RadiusPolicy,
    ) -> Result<Self, DataError> {
        if !magnitude.is_finite() {
            return Err(DataError::NonFiniteMagnitude(magnitude));
        }
        let fill_color = resolve_color(depth_km)?;
        Ok(Self::new(policy.radius(magnitude), fill_color))
    }
}

/// Outline style shared by every plate boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateStyle {
    pub color: &'static str,
    pub weight: u32,
    pub fill_opacity: f64,
}

pub const PLATE_STYLE: PlateStyle = PlateStyle {
    color: "orange",
    weight: 2,
    fill_opacity: 0.0,
};
