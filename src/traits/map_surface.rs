use crate::error::RenderError;
use crate::models::geometry::{LatLng, LatLngBounds};
use crate::models::map::{Feature, FeatureCollection};
use serde::Serialize;

/// A raster tile source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<u8>,
}

/// A pin drawn as a glyph (Font Awesome name) in a color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSpec {
    pub glyph: String,
    pub color: String,
}

/// Stroke and fill for vector shapes. Field names follow Leaflet path options
/// so the struct serializes straight into them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStyle {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    pub fill_color: String,
    pub fill_opacity: f64,
}

/// Per-feature popup text for GeoJSON layers.
pub type FeaturePopup<'a> = &'a dyn Fn(&Feature) -> Option<String>;

/// The drawing operations the renderer needs from a mapping library. Every
/// call mutates the surface; errors propagate to the caller unchanged.
pub trait MapSurface {
    fn add_tile_layer(&mut self, layer: &TileLayer) -> Result<(), RenderError>;

    /// Attach a layer switcher offering `base` layers (exclusive) and
    /// `overlays` (toggleable), each keyed by display name.
    fn add_layer_control(
        &mut self,
        base: &[(String, TileLayer)],
        overlays: &[(String, TileLayer)],
    ) -> Result<(), RenderError>;

    fn add_marker(
        &mut self,
        position: LatLng,
        icon: &IconSpec,
        popup: &str,
    ) -> Result<(), RenderError>;

    fn add_geojson(
        &mut self,
        collection: &FeatureCollection,
        style: &PathStyle,
        popup: FeaturePopup<'_>,
    ) -> Result<(), RenderError>;

    fn add_rectangle(
        &mut self,
        bounds: LatLngBounds,
        style: &PathStyle,
        popup: Option<&str>,
    ) -> Result<(), RenderError>;

    fn add_circle(
        &mut self,
        center: LatLng,
        radius: f64,
        style: &PathStyle,
    ) -> Result<(), RenderError>;

    /// Move the viewport so `bounds` is fully visible.
    fn fit_bounds(&mut self, bounds: LatLngBounds) -> Result<(), RenderError>;
}

/// Creates fresh drawing surfaces bound to a display container.
pub trait MapBackend {
    type Surface: MapSurface;

    fn create_surface(
        &self,
        container: &str,
        center: LatLng,
        zoom: u8,
    ) -> Result<Self::Surface, RenderError>;
}
