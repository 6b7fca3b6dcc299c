//! Driven port fired after a custody transition commits.
//!
//! `notify` returns immediately. Implementations run delivery in the
//! background and never report failures back to the caller.

use crate::domain::CustodyEvent;

/// Port receiving committed custody events.
#[cfg_attr(test, mockall::automock)]
pub trait CustodyNotifier: Send + Sync {
    /// Hand off a committed event for best-effort delivery.
    fn notify(&self, event: CustodyEvent);
}

/// Notifier that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCustodyNotifier;

impl CustodyNotifier for FixtureCustodyNotifier {
    fn notify(&self, _event: CustodyEvent) {}
}
