//! Domain primitives, policies, and services.
//!
//! Purpose: hold the transport-agnostic core of the key ledger. Inbound
//! adapters talk to it through the driving ports; storage and messaging live
//! behind the driven ports in [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: error payload shared by every adapter.
//! - Claims / Session / TokenCodec: identity issued at login.
//! - authorize / Operation: the role policy.
//! - KeyCustodyService: borrow and receive transitions.
//! - NotificationDispatcher: post-commit fan-out.

pub mod admin_seed;
pub mod auth;
pub mod authorization;
pub mod custody;
pub mod custody_service;
pub mod error;
pub mod login_service;
pub mod notification;
pub mod password;
pub mod ports;
pub mod token;
pub mod trace_id;
pub mod user;

pub use self::admin_seed::{
    AdminSeedError, AdminSeedOutcome, DEFAULT_ADMIN_LOGIN, ensure_default_admin,
};
pub use self::auth::{AuthenticationError, Claims, LoginCredentials, LoginValidationError, Session};
pub use self::authorization::{AuthorizationError, Operation, allowed_roles, authorize};
pub use self::custody::{
    BorrowRequest, CustodyAction, CustodyConflict, CustodyEvent, CustodyValidationError, KeyId,
    KeyRecord, LoanReason, LoanRecord, ReceiveRequest, TransitionOutcome,
};
pub use self::custody_service::{CustodyError, KeyCustodyService};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::login_service::{CredentialService, LoginError};
pub use self::notification::{
    DispatchReport, MessageFormat, MessageLocale, NotificationDispatcher, Recipient,
    UnknownLocaleError,
};
pub use self::password::PasswordError;
pub use self::token::{SigningKey, TokenCodec, TokenError};
pub use self::trace_id::TraceId;
pub use self::user::{
    NewUserAccount, PersonName, Role, StaffProfile, StoredPassword, UserAccount, UserId,
    UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use keyledger::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("unauthorized"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
