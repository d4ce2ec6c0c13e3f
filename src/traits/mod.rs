pub mod map_surface;
pub mod verifier;

pub use map_surface::{FeaturePopup, IconSpec, MapBackend, MapSurface, PathStyle, TileLayer};
pub use verifier::FlagVerifier;
