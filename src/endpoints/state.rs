use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::RenderError;
use crate::ledger::SubmissionLedger;
use crate::navigator::{Navigator, NavigatorSettings};
use crate::render::leaflet::LeafletBackend;
use crate::render::render_map;
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use moka::future::Cache;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

pub const SESSION_COOKIE: &str = "geoctf_session";

pub type SharedNavigator = Arc<Mutex<Navigator<LeafletBackend>>>;

pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub ledger: Arc<SubmissionLedger>,
    pub settings: NavigatorSettings,
    pub backend: LeafletBackend,
    pub sessions: Cache<String, SharedNavigator>,
    /// Rendered Leaflet programs keyed by challenge id and container.
    pub scripts: Cache<(String, String), Arc<String>>,
}

impl AppState {
    pub fn new(catalog: Arc<Catalog>, ledger: Arc<SubmissionLedger>, config: &Config) -> Self {
        let settings = NavigatorSettings {
            render_delay: config.render_delay,
            feedback_timeout: config.feedback_timeout,
            ..NavigatorSettings::default()
        };
        AppState {
            catalog,
            ledger,
            settings,
            backend: LeafletBackend,
            sessions: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(config.session_idle)
                .build(),
            scripts: Cache::builder().max_capacity(1_000).build(),
        }
    }

    /// The visitor's navigator. A cookie whose session has idled out gets a
    /// fresh navigator under the same id, with progress restored from the
    /// ledger. Without a cookie a new id is minted; the bool is true then.
    pub async fn session(&self, headers: &HeaderMap) -> (String, SharedNavigator, bool) {
        let (id, created) = match session_id(headers) {
            Some(id) => {
                if let Some(nav) = self.sessions.get(&id).await {
                    return (id, nav, false);
                }
                (id, false)
            }
            None => (new_session_id(), true),
        };

        let mut navigator = Navigator::new(self.catalog.clone(), id.clone(), self.settings.clone());
        for solved in self.ledger.solved_by(&id).await {
            navigator.mark_completed(&solved);
        }
        let nav = Arc::new(Mutex::new(navigator));
        self.sessions.insert(id.clone(), nav.clone()).await;
        debug!(session = %id, created, "session started");
        (id, nav, created)
    }

    /// The Leaflet program for a challenge's map, rendered once per
    /// container. `Ok(None)` when the challenge has no map config.
    pub async fn map_script(
        &self,
        challenge_id: &str,
        container: &str,
    ) -> Result<Option<Arc<String>>, Arc<RenderError>> {
        if self.catalog.map_config(challenge_id).is_none() {
            return Ok(None);
        }
        let key = (challenge_id.to_string(), container.to_string());
        self.scripts
            .try_get_with(key, async {
                let surface = render_map(&self.catalog, challenge_id, &self.backend, container)?;
                Ok::<_, RenderError>(Arc::new(
                    surface.map(|s| s.into_script()).unwrap_or_default(),
                ))
            })
            .await
            .map(Some)
    }
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn new_session_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
