//! Reqwest-backed SMS gateway adapter.
//!
//! One `GET` per message with the credentials, sender, number, and text as
//! query parameters. The adapter owns transport details only; fan-out and
//! failure isolation belong to the notification dispatcher.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Request, StatusCode, Url};
use tracing::debug;

use crate::domain::ports::{SmsGateway, SmsGatewayError};

/// Default sender label shown on the handset.
pub const DEFAULT_SMS_SENDER: &str = "MegaFonKeys";

/// Account used to authenticate against the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct SmsCredentials {
    /// Gateway account name.
    pub user: String,
    /// Gateway account password.
    pub password: String,
    /// Sender label.
    pub sender: String,
}

impl std::fmt::Debug for SmsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsCredentials")
            .field("user", &self.user)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

/// Gateway adapter that sends each message as one HTTP `GET`.
pub struct HttpSmsGateway {
    client: Client,
    endpoint: Url,
    credentials: SmsCredentials,
}

impl HttpSmsGateway {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        credentials: SmsCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    fn build_request(&self, phone: &str, text: &str) -> Result<Request, reqwest::Error> {
        self.client
            .get(self.endpoint.clone())
            .query(&[
                ("USER", self.credentials.user.as_str()),
                ("PASS", self.credentials.password.as_str()),
                ("SENDER", self.credentials.sender.as_str()),
                ("NUMBER", phone),
                ("TEXT", text),
            ])
            .build()
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send(&self, phone: &str, text: &str) -> Result<(), SmsGatewayError> {
        let request = self.build_request(phone, text).map_err(map_transport_error)?;
        let response = self
            .client
            .execute(request)
            .await
            .map_err(map_transport_error)?;
        check_status(response.status())?;
        debug!(recipient = %phone, "sms accepted by gateway");
        Ok(())
    }
}

fn check_status(status: StatusCode) -> Result<(), SmsGatewayError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(SmsGatewayError::status(status.as_u16()))
    }
}

fn map_transport_error(error: reqwest::Error) -> SmsGatewayError {
    // Strip the URL: it carries the gateway password.
    SmsGatewayError::transport(error.without_url().to_string())
}
