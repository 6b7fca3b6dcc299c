//! SMS outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `SmsGateway` port.

mod http_gateway;

pub use http_gateway::{DEFAULT_SMS_SENDER, HttpSmsGateway, SmsCredentials};
