//! Driven port delivering a single text message to one phone number.

use async_trait::async_trait;
use tracing::info;

use super::define_port_error;

define_port_error! {
    /// Errors raised while delivering a message.
    pub enum SmsGatewayError {
        /// The request could not be sent or timed out.
        Transport { message: String } => "sms gateway transport failed: {message}",
        /// The gateway answered with a non-success status.
        Status { status: u16 } => "sms gateway returned status {status}",
    }
}

/// Port for outbound text messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Send `text` to `phone`.
    async fn send(&self, phone: &str, text: &str) -> Result<(), SmsGatewayError>;
}

/// Gateway used when no provider is configured; logs and accepts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSmsGateway;

#[async_trait]
impl SmsGateway for FixtureSmsGateway {
    async fn send(&self, phone: &str, text: &str) -> Result<(), SmsGatewayError> {
        info!(recipient = %phone, text = %text, "sms gateway not configured; message logged only");
        Ok(())
    }
}
