use async_trait::async_trait;
use shared::domain::IntentEnvelope;

use crate::error::ClassifierError;

/// Turns operator text into an intent envelope. Implemented outside the core.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<IntentEnvelope, ClassifierError>;
}
