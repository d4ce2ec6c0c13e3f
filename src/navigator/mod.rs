//! Per-visitor UI state: which challenge is shown, sidebar completion, the
//! flag input, transient feedback, and the pending map rebuild.
//!
//! Time is always passed in, so the whole machine is deterministic under
//! test. Scheduled work lives in [`Timer`] slots that are replaced, never
//! stacked.

use crate::catalog::Catalog;
use crate::error::{RenderError, VerifyError};
use crate::models::challenge::{ChallengeRecord, ChallengeSummary};
use crate::models::feedback::{
    ALREADY_SOLVED_MESSAGE, CHALLENGE_NOT_FOUND_MESSAGE, CORRECT_FLAG_MESSAGE, EMPTY_FLAG_MESSAGE,
    Feedback, INCORRECT_FLAG_MESSAGE, VERIFIER_UNAVAILABLE_MESSAGE,
};
use crate::render::render_map;
use crate::traits::{FlagVerifier, MapBackend};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod timer;
pub mod view;

pub use timer::Timer;
pub use view::{MapView, PageView, SidebarItem, Tab};

pub const DEFAULT_MAP_CONTAINER: &str = "challenge-map";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    NoSelection,
    Showing { id: String, index: usize },
}

#[derive(Debug, Clone)]
pub struct NavigatorSettings {
    pub render_delay: Duration,
    pub feedback_timeout: Duration,
    pub container: String,
}

impl Default for NavigatorSettings {
    fn default() -> Self {
        NavigatorSettings {
            render_delay: Duration::from_millis(100),
            feedback_timeout: Duration::from_secs(5),
            container: DEFAULT_MAP_CONTAINER.to_string(),
        }
    }
}

pub struct Navigator<B: MapBackend> {
    catalog: Arc<Catalog>,
    player: String,
    settings: NavigatorSettings,
    selection: Selection,
    tab: Tab,
    completed: HashSet<String>,
    flag_input: String,
    feedback: Option<Feedback>,
    feedback_timer: Timer,
    render_timer: Timer,
    surface: Option<B::Surface>,
}

impl<B: MapBackend> Navigator<B> {
    pub fn new(catalog: Arc<Catalog>, player: impl Into<String>, settings: NavigatorSettings) -> Self {
        Navigator {
            catalog,
            player: player.into(),
            settings,
            selection: Selection::NoSelection,
            tab: Tab::default(),
            completed: HashSet::new(),
            flag_input: String::new(),
            feedback: None,
            feedback_timer: Timer::new(),
            render_timer: Timer::new(),
            surface: None,
        }
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn current(&self) -> Option<&ChallengeRecord> {
        match &self.selection {
            Selection::Showing { index, .. } => self.catalog.get(*index),
            Selection::NoSelection => None,
        }
    }

    fn current_index(&self) -> Option<usize> {
        match &self.selection {
            Selection::Showing { index, .. } => Some(*index),
            Selection::NoSelection => None,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn flag_input(&self) -> &str {
        &self.flag_input
    }

    pub fn set_flag_input(&mut self, value: impl Into<String>) {
        self.flag_input = value.into();
    }

    pub fn is_completed(&self, id: &str) -> bool {
        self.completed.contains(id)
    }

    /// Mark a challenge solved without a submission, e.g. when restoring a
    /// returning player's progress.
    pub fn mark_completed(&mut self, id: &str) {
        if self.catalog.lookup_by_id(id).is_some() {
            self.completed.insert(id.to_string());
        }
    }

    pub fn surface(&self) -> Option<&B::Surface> {
        self.surface.as_ref()
    }

    pub fn render_pending(&self) -> bool {
        self.render_timer.is_pending()
    }

    pub fn prev_enabled(&self) -> bool {
        self.current_index().is_some_and(|i| i > 0)
    }

    pub fn next_enabled(&self) -> bool {
        self.current_index()
            .is_some_and(|i| i + 1 < self.catalog.len())
    }

    /// Show the first challenge. Only acts from `NoSelection`; an empty
    /// catalog leaves the navigator there.
    pub fn load(&mut self, now: Instant) -> bool {
        if self.selection != Selection::NoSelection {
            return false;
        }
        let Some(first) = self.catalog.first() else {
            debug!("catalog is empty, nothing to show");
            return false;
        };
        debug!(challenge_id = %first.id, "showing first challenge");
        self.enter(0, now);
        true
    }

    pub fn select(&mut self, id: &str, now: Instant) -> bool {
        match self.catalog.index_of(id) {
            Some(index) => {
                self.enter(index, now);
                true
            }
            None => {
                debug!(challenge_id = id, "ignoring selection of unknown challenge");
                false
            }
        }
    }

    pub fn next(&mut self, now: Instant) -> bool {
        if !self.next_enabled() {
            return false;
        }
        let index = self.current_index().map_or(0, |i| i + 1);
        self.enter(index, now);
        true
    }

    pub fn prev(&mut self, now: Instant) -> bool {
        let Some(index) = self.current_index().filter(|&i| i > 0) else {
            return false;
        };
        self.enter(index - 1, now);
        true
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    fn enter(&mut self, index: usize, now: Instant) {
        let Some(record) = self.catalog.get(index) else {
            return;
        };
        debug!(challenge_id = %record.id, index, player = %self.player, "showing challenge");
        self.selection = Selection::Showing {
            id: record.id.clone(),
            index,
        };
        self.tab = Tab::default();
        self.surface = None;
        self.render_timer.schedule(now, self.settings.render_delay);
        self.flag_input.clear();
        self.feedback = None;
        self.feedback_timer.cancel();
    }

    /// Run whatever scheduled work is due at `now`: hide expired feedback and
    /// rebuild the map once its delay has passed.
    pub fn poll(&mut self, now: Instant, backend: &B) -> Result<(), RenderError> {
        if self.feedback_timer.take_due(now) {
            self.feedback = None;
        }
        if self.render_timer.take_due(now) {
            self.rebuild(backend)?;
        }
        Ok(())
    }

    /// Rebuild the map now if a rebuild is pending.
    pub fn flush_render(&mut self, backend: &B) -> Result<(), RenderError> {
        if self.render_timer.take_pending() {
            self.rebuild(backend)?;
        }
        Ok(())
    }

    fn rebuild(&mut self, backend: &B) -> Result<(), RenderError> {
        let Selection::Showing { id, .. } = &self.selection else {
            return Ok(());
        };
        match render_map(&self.catalog, id, backend, &self.settings.container) {
            Ok(surface) => {
                self.surface = surface;
                Ok(())
            }
            Err(e) => {
                warn!(challenge_id = %id, error = %e, "map rebuild failed");
                self.surface = None;
                Err(e)
            }
        }
    }

    /// Check `candidate` against the shown challenge and show the outcome.
    pub async fn submit_flag(
        &mut self,
        candidate: &str,
        verifier: &dyn FlagVerifier,
        now: Instant,
    ) -> Feedback {
        self.flag_input = candidate.to_string();
        let trimmed = candidate.trim();

        let feedback = if trimmed.is_empty() {
            Feedback::error(EMPTY_FLAG_MESSAGE)
        } else if let Some(id) = self.current().map(|c| c.id.clone()) {
            match verifier.verify(&self.player, &id, trimmed).await {
                Ok(verdict) if verdict.correct => {
                    info!(challenge_id = %id, player = %self.player, "challenge solved");
                    self.completed.insert(id);
                    self.flag_input.clear();
                    if verdict.already_solved {
                        Feedback::success(ALREADY_SOLVED_MESSAGE)
                    } else {
                        Feedback::success(CORRECT_FLAG_MESSAGE)
                    }
                }
                Ok(_) => Feedback::error(INCORRECT_FLAG_MESSAGE),
                Err(VerifyError::EmptyInput) => Feedback::error(EMPTY_FLAG_MESSAGE),
                Err(VerifyError::NotFound(missing)) => {
                    debug!(challenge_id = %missing, "verifier does not know challenge");
                    Feedback::error(CHALLENGE_NOT_FOUND_MESSAGE)
                }
                Err(e @ VerifyError::Unavailable(_)) => {
                    warn!(error = %e, "flag verification failed");
                    Feedback::error(VERIFIER_UNAVAILABLE_MESSAGE)
                }
            }
        } else {
            Feedback::error(CHALLENGE_NOT_FOUND_MESSAGE)
        };

        self.feedback_timer.schedule(now, self.settings.feedback_timeout);
        self.feedback = Some(feedback.clone());
        feedback
    }

    /// Feedback as displayed at `now`; hidden once its deadline is reached.
    pub fn visible_feedback(&self, now: Instant) -> Option<&Feedback> {
        if self.feedback_timer.is_due(now) {
            return None;
        }
        self.feedback.as_ref()
    }

    /// Time until the visible feedback hides.
    pub fn feedback_remaining(&self, now: Instant) -> Option<Duration> {
        self.visible_feedback(now)?;
        self.feedback_timer.remaining(now)
    }

    pub fn page(&self, now: Instant) -> PageView {
        let active = self.current().map(|c| c.id.as_str());
        let sidebar = self
            .catalog
            .challenges()
            .iter()
            .map(|c| SidebarItem {
                id: c.id.clone(),
                title: c.title.clone(),
                points: c.points,
                active: Some(c.id.as_str()) == active,
                completed: self.completed.contains(&c.id),
            })
            .collect();

        let map = if let Some(remaining) = self.render_timer.remaining(now) {
            MapView::Loading {
                remaining_ms: remaining.as_millis() as u64,
            }
        } else if self.surface.is_some() {
            MapView::Ready
        } else {
            MapView::Empty
        };

        let solved_points = self
            .catalog
            .challenges()
            .iter()
            .filter(|c| self.completed.contains(&c.id))
            .map(|c| u64::from(c.points))
            .sum();

        PageView {
            sidebar,
            current: self.current().map(ChallengeSummary::from),
            position: self.current_index(),
            tab: self.tab,
            prev_enabled: self.prev_enabled(),
            next_enabled: self.next_enabled(),
            flag_input: self.flag_input.clone(),
            feedback: self.visible_feedback(now).cloned(),
            map,
            solved_points,
            total_points: self.catalog.total_points(),
        }
    }
}
