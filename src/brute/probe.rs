use super::credential::{AttemptOutcome, Credential};
use async_trait::async_trait;

/// One login attempt against a target. Implementations must turn every
/// failure into an `AttemptOutcome` instead of returning early.
#[async_trait]
pub trait CredentialProbe: Send + Sync {
    fn name(&self) -> &str;

    async fn attempt(&self, target: &str, credential: &Credential) -> AttemptOutcome;
}
