//! Outbound adapters for the access core.
//!
//! - [`sms`]: OTP delivery through the Twilio Messages API, plus a log-only
//!   fallback for deployments without SMS credentials.
//! - [`summarizer`]: record summarization through the Gemini
//!   `generateContent` API, plus an unconfigured stand-in.
//!
//! Every adapter implements a port from `arogya_core::ports` and is wired in
//! as an `Arc<dyn Trait>` by the API binary.

pub mod sms;
pub mod summarizer;

pub use sms::{LogNotifier, SmsConfig, TwilioNotifier};
pub use summarizer::{GeminiSummarizer, SummarizerConfig, UnconfiguredSummarizer};
