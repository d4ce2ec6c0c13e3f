pub mod handlers;
pub mod page;
pub mod server;
pub mod state;

pub use server::{GeoCtfServer, router};
pub use state::AppState;
