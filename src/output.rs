use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;
use serde_json::json;

use crate::assemble::{
    EARTHQUAKES_LAYER, LEGEND_TITLE, Layer, LegendEntry, PlateOutline, QuakeMarker,
};
use crate::pipeline::MapLayers;

/// Initial map view, as latitude/longitude plus zoom level.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: [27.09, 10.71],
            zoom: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BaseMap {
    pub name: &'static str,
    pub url_template: &'static str,
    pub attribution: &'static str,
}

pub fn default_base_maps() -> Vec<BaseMap> {
    vec![
        BaseMap {
            name: "Street Map",
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors",
        },
        BaseMap {
            name: "Topographic Map",
            url_template: "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
            attribution: "Map data: &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors, <a href=\"http://viewfinderpanoramas.org\">SRTM</a> | Map style: &copy; <a href=\"https://opentopomap.org\">OpenTopoMap</a> (<a href=\"https://creativecommons.org/licenses/by-sa/3.0/\">CC-BY-SA</a>)",
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct Overlay {
    pub name: &'static str,
    pub data: FeatureCollection,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendRow {
    pub color: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub title: &'static str,
    pub entries: Vec<LegendRow>,
}

/// Render-ready description of the whole map.
#[derive(Debug, Clone, Serialize)]
pub struct MapDocument {
    pub view: MapView,
    pub base_maps: Vec<BaseMap>,
    pub overlays: Vec<Overlay>,
    /// Overlays switched on when the map first loads.
    pub default_overlays: Vec<&'static str>,
    pub legend: Legend,
}

impl MapDocument {
    pub fn new(layers: &MapLayers) -> Self {
        Self {
            view: MapView::default(),
            base_maps: default_base_maps(),
            overlays: vec![
                Overlay {
                    name: layers.earthquakes.name,
                    data: earthquakes_to_geojson(&layers.earthquakes),
                },
                Overlay {
                    name: layers.plates.name,
                    data: plates_to_geojson(&layers.plates),
                },
            ],
            default_overlays: vec![EARTHQUAKES_LAYER],
            legend: legend(&layers.legend),
        }
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn properties(value: serde_json::Value) -> Option<JsonObject> {
    match value {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Earthquake markers as Point features carrying their circle style.
pub fn earthquakes_to_geojson(layer: &Layer<QuakeMarker>) -> FeatureCollection {
    collection(layer.descriptors.iter().map(marker_to_feature).collect())
}

fn marker_to_feature(marker: &QuakeMarker) -> Feature {
    let style = &marker.style;
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![
            marker.position.x(),
            marker.position.y(),
            marker.depth_km,
        ]))),
        id: None,
        properties: properties(json!({
            "place": marker.place,
            "mag": marker.magnitude,
            "depth": marker.depth_km,
            "time": marker.time,
            "popup": marker.tooltip,
            "radius": style.radius,
            "fillColor": style.fill_color,
            "color": style.stroke_color,
            "weight": style.weight,
            "opacity": style.opacity,
            "fillOpacity": style.fill_opacity,
        })),
        foreign_members: None,
    }
}

/// Plate outlines with their geometry untouched.
pub fn plates_to_geojson(layer: &Layer<PlateOutline>) -> FeatureCollection {
    collection(layer.descriptors.iter().map(outline_to_feature).collect())
}

fn outline_to_feature(outline: &PlateOutline) -> Feature {
    Feature {
        bbox: None,
        geometry: outline.geometry.clone(),
        id: None,
        properties: properties(json!({
            "code": outline.code,
            "popup": outline.popup,
            "color": outline.style.color,
            "weight": outline.style.weight,
            "fillOpacity": outline.style.fill_opacity,
        })),
        foreign_members: None,
    }
}

fn legend(entries: &[LegendEntry]) -> Legend {
    Legend {
        title: LEGEND_TITLE,
        entries: entries
            .iter()
            .map(|entry| LegendRow {
                color: entry.color.to_string(),
                label: entry.label.clone(),
            })
            .collect(),
    }
}
