//! OTP delivery over SMS.
//!
//! [`TwilioNotifier`] posts to the Twilio Messages API with bounded retry.
//! Configuration is loaded from environment variables; if `TWILIO_SID` is not
//! set, [`SmsConfig::from_env`] returns `None` and [`LogNotifier`] should be
//! wired in instead.

use std::time::Duration;

use arogya_core::error::{CoreError, CoreResult};
use arogya_core::owner::ContactChannel;
use arogya_core::ports::NotificationPort;
use async_trait::async_trait;

/// Retry delays in seconds between delivery attempts.
const RETRY_DELAYS_SECS: [u64; 2] = [1, 2];

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_TWILIO_BASE_URL: &str = "https://api.twilio.com";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for SMS delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Twilio returned a non-2xx status code.
    #[error("SMS provider returned HTTP {0}")]
    HttpStatus(u16),
}

impl SmsError {
    /// Client errors (bad number, bad credentials) will not succeed on retry.
    fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::HttpStatus(status) => *status == 429 || *status >= 500,
        }
    }
}

impl From<SmsError> for CoreError {
    fn from(err: SmsError) -> Self {
        CoreError::Unavailable(format!("SMS delivery failed: {err}"))
    }
}

// ---------------------------------------------------------------------------
// SmsConfig
// ---------------------------------------------------------------------------

/// Credentials for the Twilio Messages API.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Twilio account SID.
    pub account_sid: String,
    /// Twilio auth token.
    pub auth_token: String,
    /// Sender phone number in E.164 form.
    pub from_number: String,
    /// API base URL (overridable for tests and regional endpoints).
    pub base_url: String,
}

impl SmsConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `TWILIO_SID` is not set or empty, signalling that SMS
    /// delivery is not configured.
    ///
    /// | Variable          | Required | Default                  |
    /// |-------------------|----------|--------------------------|
    /// | `TWILIO_SID`      | yes      | -                        |
    /// | `TWILIO_TOKEN`    | yes      | -                        |
    /// | `TWILIO_FROM`     | yes      | -                        |
    /// | `TWILIO_BASE_URL` | no       | `https://api.twilio.com` |
    pub fn from_env() -> Option<Self> {
        let account_sid = std::env::var("TWILIO_SID").ok().filter(|s| !s.is_empty())?;
        Some(Self {
            account_sid,
            auth_token: std::env::var("TWILIO_TOKEN").unwrap_or_default(),
            from_number: std::env::var("TWILIO_FROM").unwrap_or_default(),
            base_url: std::env::var("TWILIO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_TWILIO_BASE_URL.to_string()),
        })
    }

    /// Messages endpoint for this account.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.account_sid
        )
    }
}

// ---------------------------------------------------------------------------
// TwilioNotifier
// ---------------------------------------------------------------------------

/// Sends one-time codes as SMS through Twilio.
pub struct TwilioNotifier {
    client: reqwest::Client,
    config: SmsConfig,
}

impl TwilioNotifier {
    /// Create a notifier with a pre-configured HTTP client.
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Send `body` to `to`, retrying transient failures.
    pub async fn send(&self, to: &str, body: &str) -> Result<(), SmsError> {
        let mut attempt = 0;
        loop {
            match self.try_send(to, body).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_retryable() && attempt < RETRY_DELAYS_SECS.len() => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %e,
                        "SMS delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(RETRY_DELAYS_SECS[attempt])).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, attempts = attempt + 1, "SMS delivery failed");
                    return Err(e);
                }
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(&self, to: &str, body: &str) -> Result<(), SmsError> {
        let params = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];
        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SmsError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationPort for TwilioNotifier {
    async fn deliver(&self, channel: &ContactChannel, message: &str) -> CoreResult<()> {
        match channel {
            ContactChannel::Sms(phone) => {
                self.send(phone, message).await?;
                tracing::info!(to = %channel.masked(), "OTP SMS sent");
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// LogNotifier
// ---------------------------------------------------------------------------

/// Development notifier: writes the message to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl NotificationPort for LogNotifier {
    async fn deliver(&self, channel: &ContactChannel, message: &str) -> CoreResult<()> {
        tracing::warn!(
            to = %channel.masked(),
            message,
            "SMS provider not configured; OTP message logged instead of sent"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn config() -> SmsConfig {
        SmsConfig {
            account_sid: "AC123".into(),
            auth_token: "secret".into(),
            from_number: "+15550001111".into(),
            base_url: "https://api.twilio.com/".into(),
        }
    }

    #[test]
    fn messages_url_includes_account() {
        assert_eq!(
            config().messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn new_does_not_fail() {
        assert!(TwilioNotifier::new(config()).is_ok());
    }

    #[test]
    fn only_transient_statuses_are_retried() {
        assert!(SmsError::HttpStatus(503).is_retryable());
        assert!(SmsError::HttpStatus(429).is_retryable());
        assert!(!SmsError::HttpStatus(400).is_retryable());
        assert!(!SmsError::HttpStatus(401).is_retryable());
    }

    #[test]
    fn sms_error_display_http_status() {
        let err = SmsError::HttpStatus(502);
        assert_eq!(err.to_string(), "SMS provider returned HTTP 502");
    }

    #[test]
    fn sms_error_maps_to_unavailable() {
        let err: CoreError = SmsError::HttpStatus(400).into();
        assert_matches!(err, CoreError::Unavailable(msg) if msg.contains("HTTP 400"));
    }

    #[tokio::test]
    async fn unreachable_provider_fails_without_retrying_forever() {
        // Port 9 (discard) on localhost refuses connections immediately.
        let notifier = TwilioNotifier::new(SmsConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..config()
        })
        .unwrap();
        let result = notifier
            .deliver(&ContactChannel::Sms("+919800012345".into()), "hi")
            .await;
        assert_matches!(result, Err(CoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let result = LogNotifier
            .deliver(&ContactChannel::Sms("+919800012345".into()), "Your OTP")
            .await;
        assert!(result.is_ok());
    }
}
