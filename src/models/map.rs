use crate::models::geometry::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Drawing instructions for one challenge's map. Keyed by challenge id in the
/// catalog rather than embedded in the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    pub center: LatLng,
    pub zoom: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<MarkerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_json: Option<FeatureCollection>,
    /// Replaces the default OSM base tile URL when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile_layer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_tiles: Vec<TileLayerSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geofence: Option<GeofenceSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points_of_interest: Vec<PointOfInterest>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<OverlaySpec>,
}

impl MapConfig {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        MapConfig {
            center,
            zoom,
            markers: Vec::new(),
            geo_json: None,
            tile_layer: None,
            custom_tiles: Vec::new(),
            geofence: None,
            points_of_interest: Vec::new(),
            layers: Vec::new(),
        }
    }

    /// Short human-readable list of what the map draws, for summaries.
    pub fn feature_labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::new();
        if !self.markers.is_empty() {
            labels.push("markers");
        }
        if self.geo_json.is_some() {
            labels.push("geojson");
        }
        if !self.custom_tiles.is_empty() || self.tile_layer.is_some() {
            labels.push("tiles");
        }
        if self.geofence.is_some() {
            labels.push("geofence");
        }
        if !self.points_of_interest.is_empty() {
            labels.push("poi");
        }
        if !self.layers.is_empty() {
            labels.push("overlays");
        }
        labels
    }

    /// Every CSS color string the config mentions, with a field path for
    /// error messages.
    pub fn colors(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        for (i, m) in self.markers.iter().enumerate() {
            if let Some(c) = &m.color {
                out.push((format!("markers[{i}].color"), c.as_str()));
            }
        }
        if let Some(g) = &self.geofence {
            if let Some(c) = &g.color {
                out.push(("geofence.color".to_string(), c.as_str()));
            }
            if let Some(c) = &g.fill_color {
                out.push(("geofence.fillColor".to_string(), c.as_str()));
            }
        }
        for (i, layer) in self.layers.iter().enumerate() {
            match layer {
                OverlaySpec::Circle(circle) => {
                    if let Some(c) = &circle.color {
                        out.push((format!("layers[{i}].color"), c.as_str()));
                    }
                    if let Some(c) = &circle.fill_color {
                        out.push((format!("layers[{i}].fillColor"), c.as_str()));
                    }
                }
                OverlaySpec::Marker(marker) => {
                    if let Some(c) = &marker.color {
                        out.push((format!("layers[{i}].color"), c.as_str()));
                    }
                }
                OverlaySpec::Unknown(_) => {}
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub position: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popup: Option<String>,
    /// Font Awesome glyph name without the `fa-` prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayerSpec {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceSpec {
    pub bounds: LatLngBounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    #[serde(default)]
    pub fit_bounds: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub position: LatLng,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleSpec {
    pub center: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
}

/// Generic overlay entry, dispatched on its `type` field. Entries of any other
/// type are kept as raw JSON so a config round-trips, and are skipped when
/// drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlaySpec {
    Circle(CircleSpec),
    Marker(MarkerSpec),
    Unknown(Value),
}

impl OverlaySpec {
    pub fn kind(&self) -> &str {
        match self {
            OverlaySpec::Circle(_) => "circle",
            OverlaySpec::Marker(_) => "marker",
            OverlaySpec::Unknown(raw) => raw.get("type").and_then(Value::as_str).unwrap_or(""),
        }
    }
}

impl<'de> Deserialize<'de> for OverlaySpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match kind.as_str() {
            "circle" => serde_json::from_value(raw)
                .map(OverlaySpec::Circle)
                .map_err(serde::de::Error::custom),
            "marker" => serde_json::from_value(raw)
                .map(OverlaySpec::Marker)
                .map_err(serde::de::Error::custom),
            _ => Ok(OverlaySpec::Unknown(raw)),
        }
    }
}

impl Serialize for OverlaySpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::Error;

        let mut value = match self {
            OverlaySpec::Circle(c) => serde_json::to_value(c).map_err(S::Error::custom)?,
            OverlaySpec::Marker(m) => serde_json::to_value(m).map_err(S::Error::custom)?,
            OverlaySpec::Unknown(raw) => return raw.serialize(serializer),
        };
        if let Value::Object(map) = &mut value {
            map.insert("type".to_string(), Value::String(self.kind().to_string()));
        }
        value.serialize(serializer)
    }
}

/// GeoJSON `FeatureCollection`. Geometry stays opaque; only feature
/// properties are inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    pub geometry: Value,
}

impl Feature {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }
}
