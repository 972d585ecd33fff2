use arogya_core::grant::DEFAULT_DELIVERY_WAIT;
use arogya_core::otp::DEFAULT_OTP_TTL_SECS;

use crate::auth::jwt::JwtConfig;

const DEFAULT_OTP_DELIVERY_WAIT_MS: u64 = DEFAULT_DELIVERY_WAIT.as_millis() as u64;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Access-grant settings.
    pub access: AccessConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `4000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "4000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            access: AccessConfig::from_env(),
        }
    }
}

/// Settings for the consent handshake.
#[derive(Debug, Clone, Copy)]
pub struct AccessConfig {
    /// Lifetime of a generated OTP in seconds (default: `300`).
    pub otp_ttl_secs: i64,
    /// Longest time an access request waits on OTP delivery before
    /// responding, in milliseconds (default: `5000`).
    pub otp_delivery_wait_ms: u64,
}

impl AccessConfig {
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `OTP_TTL_SECS`         | `300`   |
    /// | `OTP_DELIVERY_WAIT_MS` | `5000`  |
    pub fn from_env() -> Self {
        let otp_ttl_secs: i64 = std::env::var("OTP_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_OTP_TTL_SECS.to_string())
            .parse()
            .expect("OTP_TTL_SECS must be a valid i64");
        assert!(otp_ttl_secs >= 0, "OTP_TTL_SECS must not be negative");
        let otp_delivery_wait_ms: u64 = std::env::var("OTP_DELIVERY_WAIT_MS")
            .unwrap_or_else(|_| DEFAULT_OTP_DELIVERY_WAIT_MS.to_string())
            .parse()
            .expect("OTP_DELIVERY_WAIT_MS must be a valid u64");
        Self {
            otp_ttl_secs,
            otp_delivery_wait_ms,
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: DEFAULT_OTP_TTL_SECS,
            otp_delivery_wait_ms: DEFAULT_OTP_DELIVERY_WAIT_MS,
        }
    }
}
