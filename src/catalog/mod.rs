//! The ordered challenge list and the id -> map config association.

use crate::error::{CatalogError, VerifyError};
use crate::models::challenge::{ChallengeRecord, ChallengeSummary};
use crate::models::map::MapConfig;
use crate::models::submission::Verdict;
use crate::traits::FlagVerifier;
use crate::utils::style::parse_css_color;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub mod builtin;
pub mod loader;

#[derive(Debug, Clone)]
pub struct Catalog {
    challenges: Vec<ChallengeRecord>,
    index: HashMap<String, usize>,
    maps: HashMap<String, MapConfig>,
}

/// The compiled-in catalog. Always succeeds; every call builds an equal,
/// independent copy.
pub fn load_challenges() -> Catalog {
    Catalog::from_parts(builtin::challenges(), builtin::map_configs())
        .unwrap_or_else(|e| panic!("built-in catalog is invalid: {e}"))
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids, map configs without a
    /// challenge, and unparseable colors.
    pub fn from_parts(
        challenges: Vec<ChallengeRecord>,
        maps: impl IntoIterator<Item = (String, MapConfig)>,
    ) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(challenges.len());
        for (i, challenge) in challenges.iter().enumerate() {
            if index.insert(challenge.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(challenge.id.clone()));
            }
        }

        let mut map_configs = HashMap::new();
        for (id, config) in maps {
            if !index.contains_key(&id) {
                return Err(CatalogError::OrphanMapConfig(id));
            }
            for (path, value) in config.colors() {
                if parse_css_color(value).is_none() {
                    return Err(CatalogError::InvalidColor {
                        id: id.clone(),
                        path,
                        value: value.to_string(),
                    });
                }
            }
            map_configs.insert(id, config);
        }

        Ok(Catalog {
            challenges,
            index,
            maps: map_configs,
        })
    }

    pub fn challenges(&self) -> &[ChallengeRecord] {
        &self.challenges
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChallengeRecord> {
        self.challenges.get(index)
    }

    pub fn first(&self) -> Option<&ChallengeRecord> {
        self.challenges.first()
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&ChallengeRecord> {
        self.index_of(id).map(|i| &self.challenges[i])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn map_config(&self, id: &str) -> Option<&MapConfig> {
        self.maps.get(id)
    }

    pub fn summaries(&self) -> Vec<ChallengeSummary> {
        self.challenges.iter().map(ChallengeSummary::from).collect()
    }

    pub fn total_points(&self) -> u64 {
        self.challenges.iter().map(|c| u64::from(c.points)).sum()
    }
}

/// Checks flags against the catalog only, with no submission history.
pub struct CatalogVerifier {
    catalog: Arc<Catalog>,
}

impl CatalogVerifier {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl FlagVerifier for CatalogVerifier {
    async fn verify(
        &self,
        _player: &str,
        challenge_id: &str,
        candidate: &str,
    ) -> Result<Verdict, VerifyError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(VerifyError::EmptyInput);
        }
        let challenge = self
            .catalog
            .lookup_by_id(challenge_id)
            .ok_or_else(|| VerifyError::NotFound(challenge_id.to_string()))?;
        Ok(Verdict {
            correct: challenge.accepts(candidate),
            already_solved: false,
            points: challenge.points,
        })
    }
}
