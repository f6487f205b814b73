use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{entities::sheet_row::SheetRow, errors::RecorderError};

/// Appends accepted submissions to an external log.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SubmissionRecorder: Send + Sync {
    async fn record(&self, row: &SheetRow) -> Result<(), RecorderError>;
}
