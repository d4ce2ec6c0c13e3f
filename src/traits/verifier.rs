use crate::error::VerifyError;
use crate::models::submission::Verdict;
use async_trait::async_trait;

/// Authoritative flag check. Implementations live server-side; the expected
/// flag never reaches the client.
#[async_trait]
pub trait FlagVerifier: Send + Sync {
    async fn verify(
        &self,
        player: &str,
        challenge_id: &str,
        candidate: &str,
    ) -> Result<Verdict, VerifyError>;
}
