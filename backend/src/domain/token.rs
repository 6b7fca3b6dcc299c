//! Signed, time-limited session tokens.
//!
//! Tokens are HS512 JWTs carrying the [`Claims`] plus `iat` and `exp` in
//! Unix seconds. Expiry is judged against the injected clock with no leeway.
//! There is no refresh: an expired token requires logging in again.

use std::fmt;
use std::sync::Arc;

use chrono::TimeDelta;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::auth::Claims;

/// Signing algorithm written to, and required in, the token header.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS512;
/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;
/// Longest accepted token lifetime (seven days).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

const GENERATED_KEY_LEN: usize = 64;

/// Reasons a token cannot be issued or accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// No token was presented.
    #[error("token is missing")]
    Missing,
    /// The token is not a well-formed HS512 JWT.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the header and payload.
    #[error("token signature is invalid")]
    BadSignature,
    /// The token's expiry has passed.
    #[error("token has expired")]
    Expired,
    /// The claims could not be serialised.
    #[error("token could not be encoded")]
    Encoding,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

/// Symmetric key used to sign and verify tokens.
#[derive(Clone)]
pub struct SigningKey(Zeroizing<Vec<u8>>);

impl SigningKey {
    /// Use a configured secret.
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        Self(Zeroizing::new(secret.as_bytes().to_vec()))
    }

    /// Generate a random key that lives only as long as the process.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = vec![0_u8; GENERATED_KEY_LEN];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(Zeroizing::new(bytes))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    #[serde(flatten)]
    claims: Claims,
    iat: i64,
    exp: i64,
}

/// Issues and validates session tokens.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use keyledger::domain::{Claims, Role, SigningKey, TokenCodec, UserId};
/// use mockable::DefaultClock;
///
/// let codec = TokenCodec::new(SigningKey::from_secret("secret"), 30, Arc::new(DefaultClock));
/// let claims = Claims {
///     id: UserId::new(1),
///     login: "admin".into(),
///     role: Role::Admin,
///     first_name: "Admin".into(),
///     last_name: "User".into(),
/// };
/// let token = codec.issue(&claims).expect("issue");
/// assert_eq!(codec.validate(&token).expect("validate"), claims);
/// ```
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Build a codec signing with `key` and issuing tokens valid for
    /// `ttl_minutes`, clamped to `1..=MAX_TOKEN_TTL_MINUTES`.
    pub fn new(key: SigningKey, ttl_minutes: i64, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // Expiry is checked against the injected clock instead.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(&key.0),
            decoding: DecodingKey::from_secret(&key.0),
            validation,
            ttl: TimeDelta::minutes(ttl_minutes.clamp(1, MAX_TOKEN_TTL_MINUTES)),
            clock,
        }
    }

    /// Sign `claims` with an expiry `ttl` from now.
    pub fn issue(&self, claims: &Claims) -> Result<String, TokenError> {
        let now = self.clock.utc();
        let payload = TokenPayload {
            claims: claims.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(TOKEN_ALGORITHM), &payload, &self.encoding)
            .map_err(|_| TokenError::Encoding)
    }

    /// Verify the signature and expiry of `token` and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Missing);
        }
        let payload = decode::<TokenPayload>(token, &self.decoding, &self.validation)?.claims;
        if self.clock.utc().timestamp() > payload.exp {
            return Err(TokenError::Expired);
        }
        Ok(payload.claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, UserId};
    use crate::test_support::MutableClock;
    use chrono::{DateTime, Utc};
    use jsonwebtoken::decode_header;
    use rstest::{fixture, rstest};

    /// `{"alg":"none","typ":"JWT"}` in base64url.
    const NONE_HEADER: &str = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0";

    fn start() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T08:00:00Z")
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    #[fixture]
    fn claims() -> Claims {
        Claims {
            id: UserId::new(1),
            login: "admin".to_owned(),
            role: Role::Admin,
            first_name: "Admin".to_owned(),
            last_name: "User".to_owned(),
        }
    }

    #[fixture]
    fn clock() -> Arc<MutableClock> {
        Arc::new(MutableClock::new(start()))
    }

    fn codec(clock: &Arc<MutableClock>) -> TokenCodec {
        TokenCodec::new(
            SigningKey::from_secret("test-secret"),
            DEFAULT_TOKEN_TTL_MINUTES,
            clock.clone(),
        )
    }

    #[rstest]
    fn issued_token_round_trips(claims: Claims, clock: Arc<MutableClock>) {
        let codec = codec(&clock);
        let token = codec.issue(&claims).expect("issue");
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec.validate(&token).expect("validate"), claims);
    }

    #[rstest]
    fn header_names_hs512(claims: Claims, clock: Arc<MutableClock>) {
        let token = codec(&clock).issue(&claims).expect("issue");
        let header = decode_header(&token).expect("decode header");
        assert_eq!(header.alg, Algorithm::HS512);
        assert_eq!(header.typ.as_deref(), Some("JWT"));
    }

    #[rstest]
    fn token_is_valid_up_to_thirty_minutes(claims: Claims, clock: Arc<MutableClock>) {
        let codec = codec(&clock);
        let token = codec.issue(&claims).expect("issue");
        clock.advance_seconds(30 * 60);
        assert!(codec.validate(&token).is_ok());
    }

    #[rstest]
    fn token_expires_after_thirty_minutes(claims: Claims, clock: Arc<MutableClock>) {
        let codec = codec(&clock);
        let token = codec.issue(&claims).expect("issue");
        clock.advance_seconds(30 * 60 + 1);
        assert_eq!(codec.validate(&token), Err(TokenError::Expired));
    }

    #[rstest]
    fn token_from_another_key_is_rejected(claims: Claims, clock: Arc<MutableClock>) {
        let other = TokenCodec::new(
            SigningKey::from_secret("other-secret"),
            DEFAULT_TOKEN_TTL_MINUTES,
            clock.clone(),
        );
        let token = other.issue(&claims).expect("issue");
        assert_eq!(codec(&clock).validate(&token), Err(TokenError::BadSignature));
    }

    #[rstest]
    fn tampered_payload_is_rejected(claims: Claims, clock: Arc<MutableClock>) {
        let codec = codec(&clock);
        let token = codec.issue(&claims).expect("issue");
        let forged = codec
            .issue(&Claims {
                login: "mallory".to_owned(),
                ..claims
            })
            .expect("issue");
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = forged.split('.').nth(1).expect("payload part");
        assert_eq!(codec.validate(&parts.join(".")), Err(TokenError::BadSignature));
    }

    #[rstest]
    fn unsigned_algorithms_are_rejected(claims: Claims, clock: Arc<MutableClock>) {
        let codec = codec(&clock);
        let token = codec.issue(&claims).expect("issue");
        let rest = token.split_once('.').expect("dot").1;
        let forged = format!("{NONE_HEADER}.{rest}");
        assert_eq!(codec.validate(&forged), Err(TokenError::Malformed));
    }

    #[rstest]
    #[case("", TokenError::Missing)]
    #[case("   ", TokenError::Missing)]
    #[case("abc", TokenError::Malformed)]
    #[case("a.b", TokenError::Malformed)]
    #[case("a.b.c.d", TokenError::Malformed)]
    #[case("!!.??.**", TokenError::Malformed)]
    fn malformed_tokens_are_rejected(
        clock: Arc<MutableClock>,
        #[case] token: &str,
        #[case] expected: TokenError,
    ) {
        assert_eq!(codec(&clock).validate(token), Err(expected));
    }

    #[rstest]
    #[case(i64::MAX)]
    #[case(MAX_TOKEN_TTL_MINUTES + 1)]
    fn oversized_lifetimes_are_clamped(
        claims: Claims,
        clock: Arc<MutableClock>,
        #[case] ttl_minutes: i64,
    ) {
        let codec = TokenCodec::new(SigningKey::from_secret("k"), ttl_minutes, clock.clone());
        let token = codec.issue(&claims).expect("issue");
        clock.advance_seconds(MAX_TOKEN_TTL_MINUTES * 60 + 1);
        assert_eq!(codec.validate(&token), Err(TokenError::Expired));
    }

    #[rstest]
    fn signing_key_debug_hides_material() {
        let rendered = format!("{:?}", SigningKey::from_secret("top-secret"));
        assert!(!rendered.contains("top-secret"));
    }

    #[rstest]
    fn generated_keys_differ() {
        let first = SigningKey::generate();
        let second = SigningKey::generate();
        assert_ne!(first.0.as_slice(), second.0.as_slice());
    }
}
