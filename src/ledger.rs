//! Server-side record of flag submissions, backed by an optional CSV file.
//!
//! The ledger is also the production [`FlagVerifier`]: every check is
//! appended, a repeated correct answer is reported as already solved, and
//! only the first correct answer per player and challenge scores.

use crate::catalog::Catalog;
use crate::error::{LedgerError, VerifyError};
use crate::models::submission::{ScoreboardEntry, Submission, Verdict};
use crate::traits::FlagVerifier;
use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

pub struct SubmissionLedger {
    catalog: Arc<Catalog>,
    path: Option<PathBuf>,
    entries: RwLock<Vec<Submission>>,
}

impl SubmissionLedger {
    /// A ledger that forgets everything on restart.
    pub fn in_memory(catalog: Arc<Catalog>) -> Self {
        SubmissionLedger {
            catalog,
            path: None,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Open (or start) a CSV-backed ledger, replaying any rows already on
    /// disk.
    pub fn open(catalog: Arc<Catalog>, path: &Path) -> Result<Self, LedgerError> {
        let mut entries = Vec::new();
        if path.exists() {
            let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
            for row in rdr.deserialize::<Submission>() {
                entries.push(row?);
            }
            info!(path = %path.display(), submissions = entries.len(), "ledger replayed");
        }
        Ok(SubmissionLedger {
            catalog,
            path: Some(path.to_path_buf()),
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check and record one submission stamped with `submitted_at` (unix
    /// seconds).
    pub async fn record(
        &self,
        player: &str,
        challenge_id: &str,
        candidate: &str,
        submitted_at: u64,
    ) -> Result<Verdict, VerifyError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(VerifyError::EmptyInput);
        }
        let challenge = self
            .catalog
            .lookup_by_id(challenge_id)
            .ok_or_else(|| VerifyError::NotFound(challenge_id.to_string()))?;
        let correct = challenge.accepts(candidate);

        let mut entries = self.entries.write().await;
        let already_solved = correct
            && entries
                .iter()
                .any(|s| s.correct && s.player == player && s.challenge_id == challenge_id);
        let submission = Submission {
            player: player.to_string(),
            challenge_id: challenge_id.to_string(),
            flag: candidate.to_string(),
            correct,
            points_awarded: if correct && !already_solved {
                challenge.points
            } else {
                0
            },
            submitted_at,
        };

        if let Some(path) = &self.path {
            append_row(path, &submission).map_err(|e| {
                error!(path = %path.display(), error = %e, "could not append to ledger");
                VerifyError::Unavailable(e.to_string())
            })?;
        }
        debug!(player, challenge_id, correct, already_solved, "submission recorded");
        entries.push(submission);

        Ok(Verdict {
            correct,
            already_solved,
            points: challenge.points,
        })
    }

    /// Every submission `player` has made, oldest first.
    pub async fn submissions_by(&self, player: &str) -> Vec<Submission> {
        self.entries
            .read()
            .await
            .iter()
            .filter(|s| s.player == player)
            .cloned()
            .collect()
    }

    /// Ids of the challenges `player` has solved, in catalog order.
    pub async fn solved_by(&self, player: &str) -> Vec<String> {
        let entries = self.entries.read().await;
        self.catalog
            .challenges()
            .iter()
            .filter(|c| {
                entries
                    .iter()
                    .any(|s| s.correct && s.player == player && s.challenge_id == c.id)
            })
            .map(|c| c.id.clone())
            .collect()
    }

    /// Players with at least one solve, highest score first. Ties go to
    /// whoever reached the score earlier.
    pub async fn scoreboard(&self) -> Vec<ScoreboardEntry> {
        let entries = self.entries.read().await;
        let mut totals: HashMap<&str, (u64, usize, u64)> = HashMap::new();
        for s in entries.iter().filter(|s| s.points_awarded > 0) {
            let entry = totals.entry(s.player.as_str()).or_insert((0, 0, 0));
            entry.0 += u64::from(s.points_awarded);
            entry.1 += 1;
            entry.2 = entry.2.max(s.submitted_at);
        }

        let mut rows: Vec<(&str, (u64, usize, u64))> = totals.into_iter().collect();
        rows.sort_by(|(pa, a), (pb, b)| {
            b.0.cmp(&a.0)
                .then(a.2.cmp(&b.2))
                .then_with(|| pa.cmp(pb))
        });

        rows.into_iter()
            .enumerate()
            .map(|(i, (player, (score, solves, last)))| ScoreboardEntry {
                rank: i + 1,
                player: player.to_string(),
                score,
                solves,
                last_solve: Some(last),
            })
            .collect()
    }
}

#[async_trait]
impl FlagVerifier for SubmissionLedger {
    async fn verify(
        &self,
        player: &str,
        challenge_id: &str,
        candidate: &str,
    ) -> Result<Verdict, VerifyError> {
        self.record(player, challenge_id, candidate, unix_now()).await
    }
}

fn append_row(path: &Path, submission: &Submission) -> Result<(), LedgerError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let is_empty = file
        .metadata()
        .map(|m| m.len() == 0)
        .map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let mut wtr = WriterBuilder::new().has_headers(is_empty).from_writer(file);
    wtr.serialize(submission)?;
    wtr.flush().map_err(|source| LedgerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
