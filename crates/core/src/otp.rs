//! One-time password generation for access handshakes.
//!
//! Codes are 6-digit numeric strings drawn uniformly from `100000..=999999`
//! using the thread-local RNG (seeded from the OS). Each code carries an
//! absolute expiry instant; the window length is configurable and defaults
//! to five minutes.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::types::Timestamp;

/// Number of digits in a generated code.
pub const OTP_DIGITS: usize = 6;

/// Default validity window in seconds.
pub const DEFAULT_OTP_TTL_SECS: i64 = 300;

const OTP_MIN: u32 = 10u32.pow(OTP_DIGITS as u32 - 1);
const OTP_MAX: u32 = 10u32.pow(OTP_DIGITS as u32) - 1;

/// A freshly generated code and the instant after which it is no longer valid.
#[derive(Debug, Clone)]
pub struct GeneratedOtp {
    pub code: String,
    pub expires_at: Timestamp,
}

/// Produces numeric one-time codes with a fixed validity window.
#[derive(Debug, Clone)]
pub struct OtpGenerator {
    ttl: Duration,
}

impl OtpGenerator {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn from_secs(ttl_secs: i64) -> Self {
        Self::new(Duration::seconds(ttl_secs))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a code that expires `ttl` after the current time.
    pub fn generate(&self) -> GeneratedOtp {
        self.generate_at(Utc::now())
    }

    /// Generate a code that expires `ttl` after `now`.
    pub fn generate_at(&self, now: Timestamp) -> GeneratedOtp {
        let value: u32 = rand::rng().random_range(OTP_MIN..=OTP_MAX);
        GeneratedOtp {
            code: value.to_string(),
            expires_at: now + self.ttl,
        }
    }
}

impl Default for OtpGenerator {
    fn default() -> Self {
        Self::from_secs(DEFAULT_OTP_TTL_SECS)
    }
}

/// Compare a stored code with a supplied one without short-circuiting on the
/// first differing byte.
pub fn codes_match(expected: &str, supplied: &str) -> bool {
    let (a, b) = (expected.as_bytes(), supplied.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// SMS body delivered to the record owner.
pub fn otp_message(code: &str) -> String {
    format!("Your Arogya Saathi OTP is {code}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_is_six_ascii_digits() {
        let generator = OtpGenerator::default();
        for _ in 0..200 {
            let otp = generator.generate();
            assert_eq!(otp.code.len(), OTP_DIGITS);
            assert!(otp.code.bytes().all(|b| b.is_ascii_digit()));
            assert_ne!(otp.code.as_bytes()[0], b'0', "no leading zero");
        }
    }

    #[test]
    fn expiry_is_now_plus_ttl() {
        let generator = OtpGenerator::from_secs(120);
        let now = Utc::now();
        let otp = generator.generate_at(now);
        assert_eq!(otp.expires_at - now, Duration::seconds(120));
    }

    #[test]
    fn default_window_is_five_minutes() {
        assert_eq!(OtpGenerator::default().ttl(), Duration::minutes(5));
    }

    #[test]
    fn codes_match_requires_exact_equality() {
        assert!(codes_match("123456", "123456"));
        assert!(!codes_match("123456", "123457"));
        assert!(!codes_match("123456", "12345"));
        assert!(!codes_match("123456", ""));
    }

    #[test]
    fn message_embeds_code() {
        assert_eq!(otp_message("424242"), "Your Arogya Saathi OTP is 424242");
    }
}
