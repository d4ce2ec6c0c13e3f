use super::handlers::{
    flag_handler, get_challenge, health_handler, history_handler, index_handler, list_challenges,
    map_script_handler, next_handler, prev_handler, scoreboard_handler, select_handler,
    submit_handler, tab_handler,
};
use super::state::AppState;
use crate::catalog::loader::load_catalog_dir;
use crate::catalog::{Catalog, load_challenges};
use crate::config::{Config, Source};
use crate::ledger::SubmissionLedger;
use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Load the catalog the config points at.
pub fn load_catalog(source: &Source) -> anyhow::Result<Catalog> {
    match source {
        Source::Builtin => Ok(load_challenges()),
        Source::Directory(path) => load_catalog_dir(path)
            .with_context(|| format!("loading challenges from {}", path.display())),
    }
}

pub fn router(state: Arc<AppState>, config: &Config) -> Router {
    let mut app = Router::new()
        .route("/", get(index_handler))
        .route("/select/{id}", post(select_handler))
        .route("/next", post(next_handler))
        .route("/prev", post(prev_handler))
        .route("/tab/{tab}", post(tab_handler))
        .route("/flag", post(flag_handler))
        .route("/health", get(health_handler))
        .route("/api/v1/challenges", get(list_challenges))
        .route("/api/v1/challenges/{id}", get(get_challenge))
        .route("/api/v1/challenges/{id}/map.js", get(map_script_handler))
        .route(
            "/api/v1/submissions",
            get(history_handler).post(submit_handler),
        )
        .route("/api/v1/scoreboard", get(scoreboard_handler));
    if let Some(assets) = &config.assets {
        app = app.nest_service("/assets", ServeDir::new(assets));
    }
    app.layer(TraceLayer::new_for_http()).with_state(state)
}

pub struct GeoCtfServer {
    config: Config,
    state: Arc<AppState>,
}

impl GeoCtfServer {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let catalog = Arc::new(load_catalog(&config.source)?);
        let ledger = match &config.ledger {
            Some(path) => SubmissionLedger::open(catalog.clone(), path)
                .with_context(|| format!("opening ledger {}", path.display()))?,
            None => SubmissionLedger::in_memory(catalog.clone()),
        };
        let state = Arc::new(AppState::new(catalog, Arc::new(ledger), &config));
        Ok(Self { config, state })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let app = router(self.state.clone(), &self.config);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {addr}"))?;

        let catalog = &self.state.catalog;
        if catalog.is_empty() {
            println!(
                "⚠️ No challenges found.\n\n\
                Point --catalog at a folder of challenge JSON files, or omit \
                it to serve the built-in set. See README for the file format."
            );
        }
        let ledger = match self.state.ledger.path() {
            Some(path) => path.display().to_string(),
            None => "in memory".to_string(),
        };

        println!(
            r#"
    🚀 GIS CTF serving on {}

    🗺️ Play in the browser ({} challenges, {} points)
       → http://{}/

    📚 Challenge list (JSON)
       → http://{}/api/v1/challenges

    🏆 Scoreboard
       → http://{}/api/v1/scoreboard

    📝 Submission ledger: {}
            "#,
            addr,
            catalog.len(),
            catalog.total_points(),
            addr,
            addr,
            addr,
            ledger
        );
        info!(%addr, "server listening");

        axum::serve(listener, app).await.context("server error")?;
        Ok(())
    }
}
