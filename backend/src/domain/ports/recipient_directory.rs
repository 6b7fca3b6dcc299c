//! Driven port listing the phone numbers that receive custody notifications.

use async_trait::async_trait;

use crate::domain::Recipient;

use super::define_port_error;

define_port_error! {
    /// Errors raised while loading notification recipients.
    pub enum RecipientDirectoryError {
        /// Directory connection could not be established.
        Connection { message: String } => "recipient directory connection failed: {message}",
        /// Lookup failed during execution.
        Query { message: String } => "recipient directory query failed: {message}",
    }
}

/// Port for reading the current recipient list.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    /// All registered recipients.
    async fn list_recipients(&self) -> Result<Vec<Recipient>, RecipientDirectoryError>;
}

/// Fixture directory with no recipients.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRecipientDirectory;

#[async_trait]
impl RecipientDirectory for FixtureRecipientDirectory {
    async fn list_recipients(&self) -> Result<Vec<Recipient>, RecipientDirectoryError> {
        Ok(Vec::new())
    }
}
