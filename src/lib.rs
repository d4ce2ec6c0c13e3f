pub mod catalog;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod geometry;
pub mod ledger;
pub mod models;
pub mod navigator;
pub mod render;
pub mod traits;
pub mod utils;

pub use catalog::{Catalog, load_challenges};
pub use config::{Args, Config, Source};
pub use endpoints::GeoCtfServer;
pub use navigator::Navigator;
