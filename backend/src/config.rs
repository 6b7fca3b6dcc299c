//! Service configuration loaded via OrthoConfig.
//!
//! Values layer from CLI flags, `KEYLEDGER_*` environment variables, and
//! configuration files. Every field is optional; accessors apply defaults
//! and parse the typed forms the server needs.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::token::{DEFAULT_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES};
use crate::domain::{KeyId, KeyRecord, MessageFormat, MessageLocale, UnknownLocaleError};
use crate::outbound::sms::{DEFAULT_SMS_SENDER, SmsCredentials};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9000";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";
const DEFAULT_SMS_TIMEOUT_SECONDS: u64 = 10;

/// Problems turning raw settings into typed values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    /// `token_ttl_minutes` is not between one minute and seven days.
    #[error("token lifetime must be 1..=10080 minutes, got {0}")]
    TokenTtl(i64),
    /// `message_locale` is not `en` or `ru`.
    #[error(transparent)]
    Locale(#[from] UnknownLocaleError),
    /// `utc_offset_minutes` is outside one day.
    #[error("utc offset of {0} minutes is out of range")]
    UtcOffset(i32),
    /// `sms_gateway_url` does not parse.
    #[error("invalid sms gateway url: {0}")]
    GatewayUrl(String),
    /// A `memory_keys` entry is not `ID|name|address` with a valid id.
    #[error("invalid memory key entry {entry:?}: {message}")]
    MemoryKey { entry: String, message: String },
}

/// Settings for the key ledger service.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KEYLEDGER")]
pub struct AppSettings {
    /// HTTP listen address.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// HMAC signing secret for session tokens.
    pub token_secret: Option<String>,
    /// Token lifetime in minutes.
    pub token_ttl_minutes: Option<i64>,
    /// Password given to the seeded `admin` account.
    pub admin_password: Option<String>,
    /// SMS gateway endpoint; messages are only logged when absent.
    pub sms_gateway_url: Option<String>,
    pub sms_user: Option<String>,
    pub sms_password: Option<String>,
    pub sms_sender: Option<String>,
    /// Per-request timeout for the SMS gateway.
    pub sms_timeout_seconds: Option<u64>,
    /// `en` or `ru` notification phrasing.
    pub message_locale: Option<String>,
    /// Offset used to render notification timestamps.
    pub utc_offset_minutes: Option<i32>,
    /// Keys loaded into the in-memory store, as `ID|name|address` entries
    /// separated by `;`.
    pub memory_keys: Option<String>,
    /// Comma-separated recipient phones loaded into the in-memory store.
    pub memory_recipients: Option<String>,
}

impl std::fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_configured", &self.database_url.is_some())
            .field("token_secret_configured", &self.token_secret.is_some())
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("sms_gateway_url", &self.sms_gateway_url)
            .field("message_locale", &self.message_locale)
            .field("utc_offset_minutes", &self.utc_offset_minutes)
            .field("memory_keys", &self.memory_keys)
            .finish_non_exhaustive()
    }
}

impl AppSettings {
    /// Listen address, defaulting to port 9000 on all interfaces.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Token lifetime, defaulting to thirty minutes and capped at seven days.
    pub fn token_ttl_minutes(&self) -> Result<i64, SettingsError> {
        match self.token_ttl_minutes {
            None => Ok(DEFAULT_TOKEN_TTL_MINUTES),
            Some(minutes) if (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) => Ok(minutes),
            Some(minutes) => Err(SettingsError::TokenTtl(minutes)),
        }
    }

    /// Password for the seeded administrator.
    pub fn admin_password(&self) -> &str {
        self.admin_password
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_PASSWORD)
    }

    /// Locale and offset used for notification text.
    pub fn message_format(&self) -> Result<MessageFormat, SettingsError> {
        let locale = match self.message_locale.as_deref() {
            Some(raw) => raw.parse::<MessageLocale>()?,
            None => MessageLocale::default(),
        };
        let offset = match self.utc_offset_minutes {
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or(SettingsError::UtcOffset(minutes))?,
            None => MessageFormat::default().offset,
        };
        Ok(MessageFormat { locale, offset })
    }

    /// Gateway endpoint and account, when a gateway is configured.
    pub fn sms_gateway(&self) -> Result<Option<(Url, SmsCredentials)>, SettingsError> {
        let Some(raw) = self.sms_gateway_url.as_deref() else {
            return Ok(None);
        };
        let endpoint = Url::parse(raw).map_err(|err| SettingsError::GatewayUrl(err.to_string()))?;
        let credentials = SmsCredentials {
            user: self.sms_user.clone().unwrap_or_default(),
            password: self.sms_password.clone().unwrap_or_default(),
            sender: self
                .sms_sender
                .clone()
                .unwrap_or_else(|| DEFAULT_SMS_SENDER.to_owned()),
        };
        Ok(Some((endpoint, credentials)))
    }

    /// Timeout applied to each gateway request.
    pub fn sms_timeout(&self) -> Duration {
        Duration::from_secs(
            self.sms_timeout_seconds
                .unwrap_or(DEFAULT_SMS_TIMEOUT_SECONDS),
        )
    }

    /// Catalog entries for the in-memory store.
    pub fn memory_keys(&self) -> Result<Vec<KeyRecord>, SettingsError> {
        let Some(raw) = self.memory_keys.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(';')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_memory_key)
            .collect()
    }

    /// Recipient phones for the in-memory store.
    pub fn memory_recipients(&self) -> Vec<String> {
        self.memory_recipients
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|phone| !phone.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn parse_memory_key(entry: &str) -> Result<KeyRecord, SettingsError> {
    let invalid = |message: String| SettingsError::MemoryKey {
        entry: entry.to_owned(),
        message,
    };
    let mut fields = entry.splitn(3, '|').map(str::trim);
    let (Some(id), Some(name), Some(address)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(invalid("expected ID|name|address".to_owned()));
    };
    let id = KeyId::parse(id).map_err(|err| invalid(err.to_string()))?;
    Ok(KeyRecord::available(id, name, address))
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 14] = [
        "KEYLEDGER_BIND_ADDR",
        "KEYLEDGER_DATABASE_URL",
        "KEYLEDGER_TOKEN_SECRET",
        "KEYLEDGER_TOKEN_TTL_MINUTES",
        "KEYLEDGER_ADMIN_PASSWORD",
        "KEYLEDGER_SMS_GATEWAY_URL",
        "KEYLEDGER_SMS_USER",
        "KEYLEDGER_SMS_PASSWORD",
        "KEYLEDGER_SMS_SENDER",
        "KEYLEDGER_SMS_TIMEOUT_SECONDS",
        "KEYLEDGER_MESSAGE_LOCALE",
        "KEYLEDGER_UTC_OFFSET_MINUTES",
        "KEYLEDGER_MEMORY_KEYS",
        "KEYLEDGER_MEMORY_RECIPIENTS",
    ];

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("keyledger")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("addr"),
            "0.0.0.0:9000".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url.is_none());
        assert!(settings.token_secret.is_none());
        assert_eq!(settings.token_ttl_minutes().expect("ttl"), 30);
        assert_eq!(settings.admin_password(), "admin");
        assert_eq!(settings.sms_gateway().expect("gateway"), None);
        assert_eq!(settings.sms_timeout(), Duration::from_secs(10));
        assert_eq!(settings.message_format().expect("format"), MessageFormat::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("KEYLEDGER_BIND_ADDR", "127.0.0.1:8088"),
            ("KEYLEDGER_DATABASE_URL", "postgres://keys@localhost/keys"),
            ("KEYLEDGER_TOKEN_TTL_MINUTES", "5"),
            ("KEYLEDGER_SMS_GATEWAY_URL", "https://sms.example.invalid/send"),
            ("KEYLEDGER_SMS_USER", "keys"),
            ("KEYLEDGER_SMS_PASSWORD", "hunter2"),
            ("KEYLEDGER_MESSAGE_LOCALE", "RU"),
            ("KEYLEDGER_UTC_OFFSET_MINUTES", "300"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_addr().expect("addr").port(), 8088);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://keys@localhost/keys")
        );
        assert_eq!(settings.token_ttl_minutes().expect("ttl"), 5);
        let (endpoint, credentials) = settings
            .sms_gateway()
            .expect("gateway")
            .expect("configured");
        assert_eq!(endpoint.host_str(), Some("sms.example.invalid"));
        assert_eq!(credentials.user, "keys");
        assert_eq!(credentials.sender, DEFAULT_SMS_SENDER);
        let format = settings.message_format().expect("format");
        assert_eq!(format.locale, MessageLocale::Ru);
        assert_eq!(format.offset.local_minus_utc(), 5 * 3600);
        assert!(!format!("{settings:?}").contains("hunter2"));
    }

    #[rstest]
    #[case("KEYLEDGER_MESSAGE_LOCALE", "fr")]
    #[case("KEYLEDGER_UTC_OFFSET_MINUTES", "1440")]
    fn invalid_message_settings_are_rejected(#[case] var: &str, #[case] value: &str) {
        let _guard = lock_env(env_with(&[(var, value)]));

        let settings = load_from_empty_args();

        assert!(settings.message_format().is_err());
    }

    #[rstest]
    #[case("0", 0)]
    #[case("-5", -5)]
    #[case("10081", 10_081)]
    #[case("9223372036854775807", i64::MAX)]
    fn out_of_range_ttl_is_rejected(#[case] raw: &str, #[case] minutes: i64) {
        let _guard = lock_env(env_with(&[("KEYLEDGER_TOKEN_TTL_MINUTES", raw)]));

        let settings = load_from_empty_args();

        assert_eq!(settings.token_ttl_minutes(), Err(SettingsError::TokenTtl(minutes)));
    }

    #[rstest]
    fn seven_day_ttl_is_accepted() {
        let _guard = lock_env(env_with(&[("KEYLEDGER_TOKEN_TTL_MINUTES", "10080")]));

        let settings = load_from_empty_args();

        assert_eq!(settings.token_ttl_minutes(), Ok(MAX_TOKEN_TTL_MINUTES));
    }

    #[rstest]
    fn memory_seed_entries_are_parsed() {
        let _guard = lock_env(env_with(&[
            (
                "KEYLEDGER_MEMORY_KEYS",
                "K001|North mast|Hill road 1; K002 | South gate | Depot ;",
            ),
            ("KEYLEDGER_MEMORY_RECIPIENTS", "+15550001, +15550002,"),
        ]));

        let settings = load_from_empty_args();

        let keys = settings.memory_keys().expect("keys");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].id.as_str(), "K002");
        assert_eq!(keys[1].name, "South gate");
        assert_eq!(keys[1].address, "Depot");
        assert!(keys.iter().all(|key| !key.borrowed));
        assert_eq!(settings.memory_recipients(), vec!["+15550001", "+15550002"]);
    }

    #[rstest]
    #[case("K001|North mast")]
    #[case("TOOLONG|North mast|Hill road 1")]
    fn malformed_memory_keys_are_rejected(#[case] raw: &str) {
        let _guard = lock_env(env_with(&[("KEYLEDGER_MEMORY_KEYS", raw)]));

        let settings = load_from_empty_args();

        assert!(matches!(
            settings.memory_keys(),
            Err(SettingsError::MemoryKey { .. })
        ));
    }

    #[rstest]
    fn memory_seed_defaults_to_empty() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(settings.memory_keys(), Ok(Vec::new()));
        assert!(settings.memory_recipients().is_empty());
    }
}
