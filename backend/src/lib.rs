//! Key ledger service: custody of physical site keys with SMS notification.
//!
//! Layout follows ports and adapters:
//! - [`domain`] holds the policies, services, and port traits.
//! - [`inbound`] maps HTTP requests onto the driving ports.
//! - [`outbound`] implements the driven ports for PostgreSQL, memory, and SMS.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(test)]
pub(crate) mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::trace_request;
