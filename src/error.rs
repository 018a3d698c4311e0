use thiserror::Error;

/// Failure to obtain a whole feature collection from a feed.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("failed to fetch {location}: {source}")]
    Fetch {
        location: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to decode JSON from {location}: {source}")]
    Decode {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected a FeatureCollection from {location}, got {found}")]
    NotFeatureCollection { location: String, found: String },

    #[error("FeatureCollection from {location} has no features array")]
    MissingFeatures { location: String },
}

impl FeedError {
    pub fn fetch(
        location: impl ToString,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        FeedError::Fetch {
            location: location.to_string(),
            source: source.into(),
        }
    }

    /// True for payloads that arrived but were not a usable feature collection.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            FeedError::Decode { .. }
                | FeedError::NotFeatureCollection { .. }
                | FeedError::MissingFeatures { .. }
        )
    }
}

/// A single feature that cannot be turned into a marker or outline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("feature has no geometry")]
    MissingGeometry,

    #[error("expected a Point geometry, got {0}")]
    NotAPoint(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("point needs numeric longitude and latitude")]
    BadCoordinates,

    #[error("magnitude is missing")]
    MissingMagnitude,

    #[error("magnitude {0} is not a number")]
    NonNumericMagnitude(String),

    #[error("magnitude {0} is not finite")]
    NonFiniteMagnitude(f64),

    #[error("depth is missing")]
    MissingDepth,

    #[error("depth {0} is not a number")]
    NonNumericDepth(String),

    #[error("depth is not a number")]
    NonFiniteDepth,
}
