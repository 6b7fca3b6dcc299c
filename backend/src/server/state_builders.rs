//! Builders wiring domain services onto the configured storage.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::warn;

use keyledger::domain::ports::{KeyCustodyRepository, RecipientDirectory, UserRepository};
use keyledger::domain::{
    AdminSeedError, AdminSeedOutcome, CredentialService, KeyCustodyService, KeyRecord,
    NotificationDispatcher, ensure_default_admin,
};
use keyledger::inbound::http::state::HttpState;
use keyledger::outbound::memory::InMemoryStore;
use keyledger::outbound::persistence::{
    DieselKeyCustodyRepository, DieselRecipientDirectory, DieselUserRepository,
};

use super::{ServerConfig, Storage};

fn wire<U, R>(
    users: Arc<U>,
    custody: Arc<R>,
    directory: Arc<dyn RecipientDirectory>,
    config: &ServerConfig,
) -> HttpState
where
    U: UserRepository + 'static,
    R: KeyCustodyRepository + 'static,
{
    let notifier = NotificationDispatcher::new(
        directory,
        Arc::clone(&config.gateway),
        config.message_format,
    );
    HttpState::new(
        Arc::new(CredentialService::new(users, config.tokens.clone())),
        Arc::new(KeyCustodyService::new(custody, Arc::new(notifier))),
        config.tokens.clone(),
    )
}

/// Build the handler state for the configured storage.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.storage {
        Storage::Postgres(pool) => wire(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselKeyCustodyRepository::new(
                pool.clone(),
                Arc::new(DefaultClock),
            )),
            Arc::new(DieselRecipientDirectory::new(pool.clone())),
            config,
        ),
        Storage::Memory(store) => {
            let store = Arc::new(store.clone());
            wire(Arc::clone(&store), Arc::clone(&store), store, config)
        }
    }
}

/// Ensure the default administrator exists in `storage`.
pub(crate) async fn seed_admin(
    storage: &Storage,
    password: &str,
) -> Result<AdminSeedOutcome, AdminSeedError> {
    match storage {
        Storage::Postgres(pool) => {
            ensure_default_admin(&DieselUserRepository::new(pool.clone()), password).await
        }
        Storage::Memory(store) => ensure_default_admin(store, password).await,
    }
}

/// Build an in-memory store holding the configured catalog and recipients.
///
/// With an empty catalog every borrow and receive reports `key-not-found`.
pub(crate) async fn seeded_memory_store(
    keys: Vec<KeyRecord>,
    phones: &[String],
) -> InMemoryStore {
    let store = InMemoryStore::new();
    if keys.is_empty() {
        warn!("in-memory storage has no keys; borrow and receive will report key-not-found");
    }
    for key in keys {
        store.insert_key(key).await;
    }
    if phones.is_empty() {
        warn!("in-memory storage has no notification recipients");
    }
    for phone in phones {
        store.add_recipient(phone).await;
    }
    store
}
