use geo::Point;
use geojson::{Geometry, JsonValue};

use crate::error::DataError;

/// One event from the earthquake feed.
///
/// Magnitude and depth stay optional here; whether a feature is drawable is
/// decided when the layer is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct EarthquakeFeature {
    pub place: String,
    /// Epoch milliseconds.
    pub time: Option<i64>,
    pub magnitude: Option<f64>,
    pub depth_km: Option<f64>,
    /// x = longitude, y = latitude.
    pub coordinates: Point<f64>,
}

/// A numeric field that may be absent or null, but not some other type.
fn optional_number(value: Option<&JsonValue>) -> Result<Option<f64>, String> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(other) => Err(other.to_string()),
    }
}

fn text_property(feature: &JsonValue, key: &str) -> Option<String> {
    feature
        .get("properties")
        .and_then(|props| props.get(key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

impl EarthquakeFeature {
    /// Read one element of a feed's `features` array.
    pub fn from_json(feature: &JsonValue) -> Result<Self, DataError> {
        let geometry = match feature.get("geometry") {
            None | Some(JsonValue::Null) => return Err(DataError::MissingGeometry),
            Some(geometry) => geometry,
        };
        match geometry.get("type").and_then(|t| t.as_str()) {
            Some("Point") => {}
            Some(other) => return Err(DataError::NotAPoint(other.to_string())),
            None => return Err(DataError::InvalidGeometry("geometry has no type".to_string())),
        }

        let position = geometry
            .get("coordinates")
            .and_then(|c| c.as_array())
            .ok_or(DataError::BadCoordinates)?;
        let (Some(lon), Some(lat)) = (
            position.first().and_then(|v| v.as_f64()),
            position.get(1).and_then(|v| v.as_f64()),
        ) else {
            return Err(DataError::BadCoordinates);
        };
        let depth_km = optional_number(position.get(2)).map_err(DataError::NonNumericDepth)?;

        let properties = feature.get("properties");
        let magnitude = optional_number(properties.and_then(|p| p.get("mag")))
            .map_err(DataError::NonNumericMagnitude)?;

        Ok(Self {
            place: text_property(feature, "place").unwrap_or_else(|| "Unknown".to_string()),
            time: properties.and_then(|p| p.get("time")).and_then(|v| v.as_i64()),
            magnitude,
            depth_km,
            coordinates: Point::new(lon, lat),
        })
    }
}

/// One plate from the tectonic plate feed. Geometry is carried through as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateFeature {
    pub code: String,
    pub plate_name: String,
    pub geometry: Option<Geometry>,
}

impl PlateFeature {
    pub fn from_json(feature: &JsonValue) -> Result<Self, DataError> {
        let geometry = match feature.get("geometry") {
            None | Some(JsonValue::Null) => None,
            Some(value) => Some(
                serde_json::from_value::<Geometry>(value.clone())
                    .map_err(|e| DataError::InvalidGeometry(e.to_string()))?,
            ),
        };

        Ok(Self {
            code: text_property(feature, "Code").unwrap_or_else(|| "Unknown".to_string()),
            plate_name: text_property(feature, "PlateName")
                .unwrap_or_else(|| "Unknown".to_string()),
            geometry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn earthquake_from_usgs_feature() {
        let f = json!({
            "type": "Feature",
            "properties": {"mag": 4.5, "place": "10 km S of Somewhere", "time": 1700000000000_i64},
            "geometry": {"type": "Point", "coordinates": [-117.5, 35.2, 8.1]},
            "id": "us7000abcd"
        });

        let quake = EarthquakeFeature::from_json(&f).unwrap();
        assert_eq!(quake.place, "10 km S of Somewhere");
        assert_eq!(quake.time, Some(1_700_000_000_000));
        assert_eq!(quake.magnitude, Some(4.5));
        assert_eq!(quake.depth_km, Some(8.1));
        assert_eq!(quake.coordinates.x(), -117.5);
        assert_eq!(quake.coordinates.y(), 35.2);
    }

    #[test]
    fn earthquake_null_magnitude_and_depth() {
        let f = json!({
            "type": "Feature",
            "properties": {"mag": null},
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0, null]}
        });

        let quake = EarthquakeFeature::from_json(&f).unwrap();
        assert_eq!(quake.place, "Unknown");
        assert_eq!(quake.magnitude, None);
        assert_eq!(quake.depth_km, None);
        assert_eq!(quake.time, None);

        let short = json!({
            "type": "Feature",
            "properties": {"mag": 1.0},
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
        });
        assert_eq!(EarthquakeFeature::from_json(&short).unwrap().depth_km, None);
    }

    #[test]
    fn non_numeric_values_are_reported_as_such() {
        let deep = json!({
            "type": "Feature",
            "properties": {"mag": 3.0},
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0, "deep"]}
        });
        assert_eq!(
            EarthquakeFeature::from_json(&deep),
            Err(DataError::NonNumericDepth("\"deep\"".to_string()))
        );

        let text_mag = json!({
            "type": "Feature",
            "properties": {"mag": "4.5"},
            "geometry": {"type": "Point", "coordinates": [1.0, 2.0, 10.0]}
        });
        assert_eq!(
            EarthquakeFeature::from_json(&text_mag),
            Err(DataError::NonNumericMagnitude("\"4.5\"".to_string()))
        );
    }

    #[test]
    fn earthquake_requires_point_geometry() {
        let line = json!({
            "type": "Feature",
            "properties": {"mag": 2.0},
            "geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 1.0]]}
        });
        assert_eq!(
            EarthquakeFeature::from_json(&line),
            Err(DataError::NotAPoint("LineString".to_string()))
        );

        let null_geometry = json!({"type": "Feature", "properties": {}, "geometry": null});
        assert_eq!(
            EarthquakeFeature::from_json(&null_geometry),
            Err(DataError::MissingGeometry)
        );

        let no_geometry = json!({"type": "Feature", "properties": {"mag": 1.0}});
        assert_eq!(
            EarthquakeFeature::from_json(&no_geometry),
            Err(DataError::MissingGeometry)
        );

        let lonely = json!({
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "Point", "coordinates": [1.0]}
        });
        assert_eq!(
            EarthquakeFeature::from_json(&lonely),
            Err(DataError::BadCoordinates)
        );
    }

    #[test]
    fn plate_reads_code_and_name() {
        let f = json!({
            "type": "Feature",
            "properties": {"LAYER": "plate", "Code": "AF", "PlateName": "Africa"},
            "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]}
        });

        let plate = PlateFeature::from_json(&f).unwrap();
        assert_eq!(plate.code, "AF");
        assert_eq!(plate.plate_name, "Africa");
        let geometry = plate.geometry.unwrap();
        assert!(matches!(geometry.value, geojson::Value::Polygon(_)));
    }

    #[test]
    fn plate_missing_properties_fall_back() {
        let f = json!({"type": "Feature", "properties": null, "geometry": null});
        let plate = PlateFeature::from_json(&f).unwrap();
        assert_eq!(plate.code, "Unknown");
        assert_eq!(plate.plate_name, "Unknown");
        assert!(plate.geometry.is_none());
    }

    #[test]
    fn plate_with_broken_geometry_is_rejected() {
        let f = json!({
            "type": "Feature",
            "properties": {"Code": "XX"},
            "geometry": {"type": "Polygon", "coordinates": "nope"}
        });
        assert!(matches!(
            PlateFeature::from_json(&f),
            Err(DataError::InvalidGeometry(_))
        ));
    }
}
