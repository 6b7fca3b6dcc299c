//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use keyledger::domain::ports::{FixtureSmsGateway, SmsGateway};
use keyledger::domain::{MessageFormat, TokenCodec};
use keyledger::outbound::memory::InMemoryStore;
use keyledger::outbound::persistence::DbPool;

/// Backing store for users, keys, loans, and recipients.
#[derive(Clone)]
pub enum Storage {
    /// PostgreSQL through the Diesel adapters.
    Postgres(DbPool),
    /// Process-local store; state is lost on restart.
    Memory(InMemoryStore),
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Storage,
    pub(crate) tokens: TokenCodec,
    pub(crate) gateway: Arc<dyn SmsGateway>,
    pub(crate) message_format: MessageFormat,
}

impl ServerConfig {
    /// Configuration with a log-only SMS gateway and default message format.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, storage: Storage, tokens: TokenCodec) -> Self {
        Self {
            bind_addr,
            storage,
            tokens,
            gateway: Arc::new(FixtureSmsGateway),
            message_format: MessageFormat::default(),
        }
    }

    /// Deliver notifications through `gateway`.
    #[must_use]
    pub fn with_gateway(mut self, gateway: Arc<dyn SmsGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    /// Render notifications with `format`.
    #[must_use]
    pub fn with_message_format(mut self, format: MessageFormat) -> Self {
        self.message_format = format;
        self
    }
}
