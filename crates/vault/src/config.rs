//! Configuration loading and validation for the vault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;
use zeroize::Zeroize;

use crate::crypto::FieldKey;

/// Validated vault service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Base64 of the 32-byte AES-256 field key. **Required.**
    pub field_encryption_key: String,

    /// SQLite database file path (`:memory:` for an ephemeral store). **Required.**
    pub database_path: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// HTTP header carrying the owner id verified by upstream authentication.
    #[serde(default = "default_owner_header")]
    pub owner_header_name: String,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// OTLP endpoint for span export. Export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_owner_header() -> String {
    "X-Owner-Id".into()
}
fn default_max_body_bytes() -> usize {
    16 * 1024
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Parse the configured field key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not base64 of exactly 32 bytes. The
    /// message never echoes the configured value.
    pub fn field_key(&self) -> Result<FieldKey> {
        FieldKey::from_base64(&self.field_encryption_key).context("FIELD_ENCRYPTION_KEY is invalid")
    }

    /// Parse the field key, then wipe its base64 text from this config.
    ///
    /// # Errors
    ///
    /// Same as [`Config::field_key`]. The text is wiped on failure too.
    pub fn take_field_key(&mut self) -> Result<FieldKey> {
        let key = self.field_key();
        self.field_encryption_key.zeroize();
        key
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.field_encryption_key, "FIELD_ENCRYPTION_KEY")?;
        ensure_non_empty(&self.database_path, "DATABASE_PATH")?;
        ensure_non_empty(&self.owner_header_name, "OWNER_HEADER_NAME")?;
        self.field_key()?;

        if axum::http::HeaderName::from_bytes(self.owner_header_name.as_bytes()).is_err() {
            anyhow::bail!("OWNER_HEADER_NAME must be a valid HTTP header name");
        }
        if self.max_body_bytes == 0 {
            anyhow::bail!("MAX_BODY_BYTES must be > 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("REQUEST_TIMEOUT_SECS must be > 0");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("field_encryption_key", &"[REDACTED]")
            .field("database_path", &self.database_path)
            .field("listen_port", &self.listen_port)
            .field("owner_header_name", &self.owner_header_name)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn valid() -> Config {
        Config {
            field_encryption_key: STANDARD.encode([7u8; 32]),
            database_path: "/var/lib/vault/vault.db".into(),
            listen_port: default_listen_port(),
            owner_header_name: default_owner_header(),
            max_body_bytes: default_max_body_bytes(),
            request_timeout_secs: default_request_timeout(),
            otel_exporter_otlp_endpoint: None,
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_listen_port(), 8080);
        assert_eq!(default_owner_header(), "X-Owner-Id");
        assert_eq!(default_max_body_bytes(), 16384);
        assert_eq!(default_request_timeout(), 30);
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_database_path() {
        let cfg = Config {
            database_path: " ".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_short_key() {
        let cfg = Config {
            field_encryption_key: STANDARD.encode([7u8; 16]),
            ..valid()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("FIELD_ENCRYPTION_KEY"));
    }

    #[test]
    fn validate_rejects_invalid_header_name() {
        let cfg = Config {
            owner_header_name: "X Owner".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_body_limit() {
        let cfg = Config {
            max_body_bytes: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn take_field_key_wipes_encoded_key() {
        let mut cfg = valid();
        let key = cfg.take_field_key().unwrap();
        assert_eq!(key.as_bytes(), &[7u8; 32]);
        assert!(cfg.field_encryption_key.is_empty());
        assert!(cfg.take_field_key().is_err());
    }

    #[test]
    fn debug_output_redacts_key() {
        let cfg = valid();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains(&cfg.field_encryption_key));
        assert!(rendered.contains("REDACTED"));
    }
}
