use geojson::JsonValue;
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

use crate::error::FeedError;

pub const USGS_ALL_WEEK_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_week.geojson";
pub const PB2002_PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_plates.json";

/// Where a feed lives: a remote URL or a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    Remote(String),
    File(PathBuf),
}

impl FromStr for FeedLocation {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(FeedLocation::Remote(s.to_string()))
        } else {
            Ok(FeedLocation::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for FeedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedLocation::Remote(url) => f.write_str(url),
            FeedLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Retrieves the raw body of a feed.
///
/// Implementations must be `Sync` so both feeds can be fetched at once.
pub trait FeedSource: Sync {
    fn fetch(&self, location: &FeedLocation) -> Result<String, FeedError>;
}

/// Blocking HTTP source. File locations are read straight from disk.
pub struct HttpFeedSource {
    client: reqwest::blocking::Client,
}

impl HttpFeedSource {
    pub fn new() -> Result<Self, FeedError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("quake-map/0.1 (earthquake and plate map builder)")
            .build()
            .map_err(|e| FeedError::fetch("http client", e))?;
        Ok(Self { client })
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch(&self, location: &FeedLocation) -> Result<String, FeedError> {
        match location {
            FeedLocation::Remote(url) => {
                debug!(%url, "GET");
                self.client
                    .get(url)
                    .send()
                    .and_then(|response| response.error_for_status())
                    .and_then(|response| response.text())
                    .map_err(|e| FeedError::fetch(location, e))
            }
            FeedLocation::File(path) => {
                debug!(path = %path.display(), "reading feed file");
                std::fs::read_to_string(path).map_err(|e| FeedError::fetch(location, e))
            }
        }
    }
}

/// Decode a feed body into its raw features, in document order.
///
/// Only the envelope is checked here. Each feature is validated on its own
/// later, so one bad record cannot take down the rest of the feed.
pub fn parse_feature_collection(
    location: &FeedLocation,
    body: &str,
) -> Result<Vec<JsonValue>, FeedError> {
    let document: JsonValue = serde_json::from_str(body).map_err(|source| FeedError::Decode {
        location: location.to_string(),
        source,
    })?;

    match document.get("type").and_then(|t| t.as_str()) {
        Some("FeatureCollection") => {}
        other => {
            return Err(FeedError::NotFeatureCollection {
                location: location.to_string(),
                found: other.unwrap_or("a document without a type").to_string(),
            });
        }
    }

    match document {
        JsonValue::Object(mut map) => match map.remove("features") {
            Some(JsonValue::Array(features)) => Ok(features),
            _ => Err(FeedError::MissingFeatures {
                location: location.to_string(),
            }),
        },
        _ => Err(FeedError::MissingFeatures {
            location: location.to_string(),
        }),
    }
}

/// One best-effort fetch of a feature collection. No retries.
pub fn fetch_feature_collection(
    source: &dyn FeedSource,
    location: &FeedLocation,
) -> Result<Vec<JsonValue>, FeedError> {
    let body = source.fetch(location)?;
    parse_feature_collection(location, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn here() -> FeedLocation {
        FeedLocation::Remote("https://example.test/feed.geojson".to_string())
    }

    #[test]
    fn location_parsing() {
        assert_eq!(
            "https://earthquake.usgs.gov/x.geojson".parse::<FeedLocation>().unwrap(),
            FeedLocation::Remote("https://earthquake.usgs.gov/x.geojson".to_string())
        );
        assert_eq!(
            "data/plates.json".parse::<FeedLocation>().unwrap(),
            FeedLocation::File(PathBuf::from("data/plates.json"))
        );
    }

    #[test]
    fn parse_collection_keeps_order() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"place": "a"}, "geometry": null},
                {"type": "Feature", "properties": {"place": "b"}, "geometry": null},
                {"type": "Feature", "properties": {"place": "c"}, "geometry": null}
            ]
        }"#;

        let features = parse_feature_collection(&here(), body).unwrap();
        let places: Vec<_> = features
            .iter()
            .map(|f| f["properties"]["place"].as_str().unwrap())
            .collect();
        assert_eq!(places, ["a", "b", "c"]);
    }

    #[test]
    fn parse_empty_collection() {
        let body = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(parse_feature_collection(&here(), body).unwrap().is_empty());
    }

    #[test]
    fn malformed_body_is_decode_error() {
        let err = parse_feature_collection(&here(), "<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FeedError::Decode { .. }));
        assert!(err.is_decode());

        let err = parse_feature_collection(&here(), r#"{"type": "Nope"}"#).unwrap_err();
        assert!(err.is_decode());

        let err = parse_feature_collection(&here(), "[1, 2, 3]").unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn lone_feature_is_not_a_collection() {
        let body = r#"{"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}"#;
        let err = parse_feature_collection(&here(), body).unwrap_err();
        match err {
            FeedError::NotFeatureCollection { found, .. } => assert_eq!(found, "Feature"),
            other => panic!("expected NotFeatureCollection, got {other:?}"),
        }
    }

    #[test]
    fn collection_without_features_array() {
        let body = r#"{"type": "FeatureCollection", "features": {"not": "an array"}}"#;
        let err = parse_feature_collection(&here(), body).unwrap_err();
        assert!(matches!(err, FeedError::MissingFeatures { .. }));
        assert!(err.is_decode());
    }

    #[test]
    fn bad_features_do_not_fail_the_collection() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"mag": 1.0}, "geometry": {"type": "Point", "coordinates": [0.0, 0.0, 5.0]}},
                {"type": "Feature", "properties": {"mag": 2.0}, "geometry": {"type": "Point", "coordinates": [0.0, 0.0, null]}},
                {"type": "Feature", "properties": {"mag": 3.0}, "geometry": {"type": "Point", "coordinates": [0.0, 0.0, "deep"]}},
                {"type": "Feature", "properties": {"mag": 4.0}}
            ]
        }"#;

        let features = parse_feature_collection(&here(), body).unwrap();
        assert_eq!(features.len(), 4);
    }

    #[test]
    fn file_source_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type": "FeatureCollection", "features": [{{"type": "Feature", "properties": {{}}, "geometry": null}}]}}"#
        )
        .unwrap();

        let source = HttpFeedSource::new().unwrap();
        let location = FeedLocation::File(file.path().to_path_buf());
        let features = fetch_feature_collection(&source, &location).unwrap();
        assert_eq!(features.len(), 1);
    }

    #[test]
    fn missing_file_is_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = HttpFeedSource::new().unwrap();
        let location = FeedLocation::File(dir.path().join("missing.json"));

        let err = fetch_feature_collection(&source, &location).unwrap_err();
        assert!(matches!(err, FeedError::Fetch { .. }));
        assert!(!err.is_decode());
    }
}
