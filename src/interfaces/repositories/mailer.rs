use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{entities::email::{EmailReceipt, OutgoingEmail}, errors::DispatchError};

/// Hands a composed message to a transactional-email provider.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    async fn dispatch(&self, email: &OutgoingEmail) -> Result<EmailReceipt, DispatchError>;
}
