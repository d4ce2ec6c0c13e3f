use serde::{Deserialize, Serialize};

/// One flag submission as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub player: String,
    pub challenge_id: String,
    pub flag: String,
    pub correct: bool,
    pub points_awarded: u32,
    /// Seconds since the unix epoch.
    pub submitted_at: u64,
}

/// A ledger row as shown back to its player. The submitted flag stays on the
/// server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub challenge_id: String,
    pub correct: bool,
    pub points_awarded: u32,
    pub submitted_at: u64,
}

impl From<Submission> for SubmissionRecord {
    fn from(s: Submission) -> Self {
        SubmissionRecord {
            challenge_id: s.challenge_id,
            correct: s.correct,
            points_awarded: s.points_awarded,
            submitted_at: s.submitted_at,
        }
    }
}

/// Outcome of a server-side flag check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub correct: bool,
    pub already_solved: bool,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreboardEntry {
    pub rank: usize,
    pub player: String,
    pub score: u64,
    pub solves: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_solve: Option<u64>,
}
