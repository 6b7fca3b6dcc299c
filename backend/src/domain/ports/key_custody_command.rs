//! Driving port for the borrow and receive custody actions.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Claims, CustodyAction, CustodyEvent, Error, KeyId, LoanReason};

/// Domain use-case port for custody transitions.
#[async_trait]
pub trait KeyCustodyCommand: Send + Sync {
    /// Take `key_id` out on behalf of `actor`.
    async fn borrow(
        &self,
        actor: &Claims,
        key_id: KeyId,
        reason: LoanReason,
    ) -> Result<CustodyEvent, Error>;

    /// Accept `key_id` back, recording `actor` as the receiver.
    async fn receive(&self, actor: &Claims, key_id: KeyId) -> Result<CustodyEvent, Error>;
}

/// Fixture command that reports success without any storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureKeyCustodyCommand;

#[async_trait]
impl KeyCustodyCommand for FixtureKeyCustodyCommand {
    async fn borrow(
        &self,
        actor: &Claims,
        key_id: KeyId,
        _reason: LoanReason,
    ) -> Result<CustodyEvent, Error> {
        Ok(CustodyEvent {
            actor_name: actor.full_name(),
            key_name: key_id.to_string(),
            key_id,
            action: CustodyAction::Take,
            at: Utc::now(),
        })
    }

    async fn receive(&self, actor: &Claims, key_id: KeyId) -> Result<CustodyEvent, Error> {
        Ok(CustodyEvent {
            actor_name: actor.full_name(),
            key_name: key_id.to_string(),
            key_id,
            action: CustodyAction::Return,
            at: Utc::now(),
        })
    }
}
