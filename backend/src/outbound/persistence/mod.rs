//! PostgreSQL persistence adapters using Diesel.
//!
//! Adapters translate between Diesel rows (`models.rs`, `schema.rs`) and
//! domain types; neither rows nor schema leak out of this module. Connections
//! come from a `bb8` pool through `diesel-async`, and every database failure
//! is mapped into the relevant port error.
//!
//! ```ignore
//! use keyledger::outbound::persistence::{DbPool, DieselKeyCustodyRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/keyledger")).await?;
//! let custody = DieselKeyCustodyRepository::new(pool, Arc::new(DefaultClock));
//! ```

mod diesel_key_custody_repository;
mod diesel_recipient_directory;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_key_custody_repository::DieselKeyCustodyRepository;
pub use diesel_recipient_directory::DieselRecipientDirectory;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
