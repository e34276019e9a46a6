use async_trait::async_trait;

use crate::models::{email::OutboundEmail, error::RelayError};

/// Delivery provider seam. Implementations submit exactly one send request
/// and return the provider-assigned message id.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, email: &OutboundEmail) -> Result<String, RelayError>;
}
