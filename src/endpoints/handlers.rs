use super::page::{PageAssets, render_page};
use super::state::{AppState, session_cookie, session_id};
use crate::error::VerifyError;
use crate::models::challenge::ChallengeSummary;
use crate::models::feedback::{
    ALREADY_SOLVED_MESSAGE, CHALLENGE_NOT_FOUND_MESSAGE, CORRECT_FLAG_MESSAGE, EMPTY_FLAG_MESSAGE,
    INCORRECT_FLAG_MESSAGE, VERIFIER_UNAVAILABLE_MESSAGE,
};
use crate::models::map::MapConfig;
use crate::models::submission::SubmissionRecord;
use crate::navigator::{Navigator, Tab};
use crate::render::leaflet::{LeafletBackend, LeafletSurface};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

fn with_session_cookie(mut response: Response, id: &str, created: bool) -> Response {
    if created {
        if let Ok(value) = HeaderValue::from_str(&session_cookie(id)) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

pub async fn index_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (id, nav, created) = state.session(&headers).await;
    let now = Instant::now();
    let mut nav = nav.lock().await;
    nav.load(now);
    if let Err(e) = nav.poll(now, &state.backend) {
        warn!(session = %id, error = %e, "scheduled map rebuild failed");
    }
    if let Err(e) = nav.flush_render(&state.backend) {
        warn!(session = %id, error = %e, "map rebuild failed");
    }

    let assets = PageAssets {
        container: state.settings.container.clone(),
        render_delay_ms: state.settings.render_delay.as_millis() as u64,
        map_script: nav.surface().cloned().map(LeafletSurface::into_script),
        feedback_hide_ms: nav
            .feedback_remaining(now)
            .map(|d| d.as_millis() as u64),
    };
    let body = render_page(&nav.page(now), &assets);
    with_session_cookie(Html(body).into_response(), &id, created)
}

/// Apply a navigation to the visitor's navigator and send them back to the
/// page.
async fn navigate<F>(state: &AppState, headers: &HeaderMap, action: F) -> Response
where
    F: FnOnce(&mut Navigator<LeafletBackend>, Instant),
{
    let (id, nav, created) = state.session(headers).await;
    let now = Instant::now();
    {
        let mut nav = nav.lock().await;
        nav.load(now);
        action(&mut *nav, now);
    }
    with_session_cookie(Redirect::to("/").into_response(), &id, created)
}

pub async fn select_handler(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    navigate(&state, &headers, |nav, now| {
        nav.select(&challenge_id, now);
    })
    .await
}

pub async fn next_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    navigate(&state, &headers, |nav, now| {
        nav.next(now);
    })
    .await
}

pub async fn prev_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    navigate(&state, &headers, |nav, now| {
        nav.prev(now);
    })
    .await
}

pub async fn tab_handler(
    State(state): State<Arc<AppState>>,
    Path(tab): Path<String>,
    headers: HeaderMap,
) -> Response {
    navigate(&state, &headers, |nav, _| match tab.parse::<Tab>() {
        Ok(tab) => nav.select_tab(tab),
        Err(e) => debug!(error = %e, "ignoring tab switch"),
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct FlagForm {
    #[serde(default)]
    pub flag: String,
}

pub async fn flag_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<FlagForm>,
) -> Response {
    let (id, nav, created) = state.session(&headers).await;
    let now = Instant::now();
    {
        let mut nav = nav.lock().await;
        nav.load(now);
        let feedback = nav
            .submit_flag(&form.flag, state.ledger.as_ref(), now)
            .await;
        debug!(session = %id, success = feedback.is_success(), "flag submitted");
    }
    with_session_cookie(Redirect::to("/").into_response(), &id, created)
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn list_challenges(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.catalog.summaries()))
}

#[derive(Serialize)]
struct ChallengeDetail<'a> {
    #[serde(flatten)]
    summary: ChallengeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    map: Option<&'a MapConfig>,
}

pub async fn get_challenge(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<String>,
) -> Response {
    match state.catalog.lookup_by_id(&challenge_id) {
        Some(record) => Json(ChallengeDetail {
            summary: ChallengeSummary::from(record),
            map: state.catalog.map_config(&challenge_id),
        })
        .into_response(),
        None => not_found(CHALLENGE_NOT_FOUND_MESSAGE),
    }
}

#[derive(Debug, Deserialize)]
pub struct MapScriptQuery {
    pub container: Option<String>,
}

pub async fn map_script_handler(
    State(state): State<Arc<AppState>>,
    Path(challenge_id): Path<String>,
    Query(query): Query<MapScriptQuery>,
) -> Response {
    if state.catalog.lookup_by_id(&challenge_id).is_none() {
        return not_found(CHALLENGE_NOT_FOUND_MESSAGE);
    }
    let container = query
        .container
        .unwrap_or_else(|| state.settings.container.clone());
    match state.map_script(&challenge_id, &container).await {
        Ok(Some(script)) => (
            [(header::CONTENT_TYPE, "application/javascript")],
            script.as_str().to_owned(),
        )
            .into_response(),
        Ok(None) => not_found("Map not found"),
        Err(e) => {
            warn!(challenge_id = %challenge_id, error = %e, "could not render map script");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub challenge_id: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub player: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SubmissionResponse {
    pub correct: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
}

fn submission_response(status: StatusCode, correct: bool, message: &str, points: Option<u32>) -> Response {
    (
        status,
        Json(SubmissionResponse {
            correct,
            message: message.to_string(),
            points,
        }),
    )
        .into_response()
}

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<SubmissionRequest>,
) -> Response {
    let player = request
        .player
        .filter(|p| !p.trim().is_empty())
        .or_else(|| session_id(&headers))
        .unwrap_or_else(|| "anonymous".to_string());

    match state
        .ledger
        .record(&player, &request.challenge_id, &request.flag, crate::ledger::unix_now())
        .await
    {
        Ok(verdict) if verdict.correct && verdict.already_solved => {
            submission_response(StatusCode::OK, true, ALREADY_SOLVED_MESSAGE, None)
        }
        Ok(verdict) if verdict.correct => {
            info!(player = %player, challenge_id = %request.challenge_id, "challenge solved via api");
            submission_response(StatusCode::OK, true, CORRECT_FLAG_MESSAGE, Some(verdict.points))
        }
        Ok(_) => submission_response(StatusCode::BAD_REQUEST, false, INCORRECT_FLAG_MESSAGE, None),
        Err(VerifyError::EmptyInput) => {
            submission_response(StatusCode::BAD_REQUEST, false, EMPTY_FLAG_MESSAGE, None)
        }
        Err(VerifyError::NotFound(_)) => not_found(CHALLENGE_NOT_FOUND_MESSAGE),
        Err(VerifyError::Unavailable(reason)) => {
            warn!(reason = %reason, "submission could not be recorded");
            submission_response(
                StatusCode::SERVICE_UNAVAILABLE,
                false,
                VERIFIER_UNAVAILABLE_MESSAGE,
                None,
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub player: Option<String>,
}

/// A player's own submission history. Without `?player=` the session
/// cookie names the player; with neither there is nothing to show.
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Json<Vec<SubmissionRecord>> {
    let player = query
        .player
        .filter(|p| !p.trim().is_empty())
        .or_else(|| session_id(&headers));
    let rows = match player {
        Some(player) => state.ledger.submissions_by(&player).await,
        None => Vec::new(),
    };
    Json(rows.into_iter().map(SubmissionRecord::from).collect())
}

pub async fn scoreboard_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.ledger.scoreboard().await)
}
