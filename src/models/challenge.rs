use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Difficulty implied by a point value when a challenge does not state one.
    pub fn from_points(points: u32) -> Self {
        match points {
            0..150 => Difficulty::Easy,
            150..250 => Difficulty::Medium,
            250..300 => Difficulty::Hard,
            _ => Difficulty::Expert,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Expert => "Expert",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub text: String,
    #[serde(default)]
    pub points_penalty: u32,
}

fn default_category() -> String {
    "GIS".to_string()
}

/// One scored challenge, including the expected flag. Never sent to clients
/// as-is; see [`ChallengeSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRecord {
    pub id: String,
    pub title: String,
    pub points: u32,
    pub description: String,
    pub instructions: String,
    pub setup: String,
    pub challenge: String,
    pub techniques: String,
    pub flag: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
}

impl ChallengeRecord {
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
            .unwrap_or_else(|| Difficulty::from_points(self.points))
    }

    /// Case-sensitive exact comparison against the expected flag.
    pub fn accepts(&self, candidate: &str) -> bool {
        candidate == self.flag
    }
}

/// Client-visible view of a challenge: everything but the flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChallengeSummary {
    pub id: String,
    pub title: String,
    pub points: u32,
    pub category: String,
    pub difficulty: Difficulty,
    pub description: String,
    pub instructions: String,
    pub setup: String,
    pub challenge: String,
    pub techniques: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
}

impl From<&ChallengeRecord> for ChallengeSummary {
    fn from(record: &ChallengeRecord) -> Self {
        ChallengeSummary {
            id: record.id.clone(),
            title: record.title.clone(),
            points: record.points,
            category: record.category.clone(),
            difficulty: record.difficulty(),
            description: record.description.clone(),
            instructions: record.instructions.clone(),
            setup: record.setup.clone(),
            challenge: record.challenge.clone(),
            techniques: record.techniques.clone(),
            hints: record.hints.clone(),
        }
    }
}
