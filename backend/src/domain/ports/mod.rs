//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`LoginService`, `KeyCustodyCommand`) are called by inbound
//! adapters. Driven ports are implemented by outbound adapters and each
//! exposes a typed error so failures map into predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod custody_notifier;
mod key_custody_command;
mod key_custody_repository;
mod login_service;
mod recipient_directory;
mod sms_gateway;
mod user_repository;

#[cfg(test)]
pub use custody_notifier::MockCustodyNotifier;
pub use custody_notifier::{CustodyNotifier, FixtureCustodyNotifier};
pub use key_custody_command::{FixtureKeyCustodyCommand, KeyCustodyCommand};
#[cfg(test)]
pub use key_custody_repository::MockKeyCustodyRepository;
pub use key_custody_repository::{
    FixtureKeyCustodyRepository, KeyCustodyPersistenceError, KeyCustodyRepository,
};
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use recipient_directory::MockRecipientDirectory;
pub use recipient_directory::{
    FixtureRecipientDirectory, RecipientDirectory, RecipientDirectoryError,
};
#[cfg(test)]
pub use sms_gateway::MockSmsGateway;
pub use sms_gateway::{FixtureSmsGateway, SmsGateway, SmsGatewayError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
