//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Credentials present and well-formed
//! - Value ranges (timeouts > 0, search window > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function: RelayConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_http_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(invalid(field, format!("unsupported scheme '{}'", url.scheme()))),
        Err(e) => errors.push(invalid(field, e.to_string())),
    }
}

fn is_hex(value: &str) -> bool {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    !digits.is_empty() && digits.len() % 2 == 0 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.node.address.is_empty() {
        errors.push(ValidationError::Missing("node.address"));
    } else {
        check_http_url("node.address", &config.node.address, &mut errors);
    }
    if config.node.timeout_secs == 0 {
        errors.push(invalid("node.timeout_secs", "must be greater than zero"));
    }

    let seed = config.wallet.seed.trim();
    if seed.is_empty() {
        errors.push(ValidationError::Missing("wallet.seed"));
    } else if !is_hex(seed) {
        errors.push(invalid("wallet.seed", "must be hex encoded"));
    }

    let key = config.oracle.ethereum_private_key.trim();
    if key.is_empty() {
        errors.push(ValidationError::Missing("oracle.ethereum_private_key"));
    } else if !is_hex(key) || key.strip_prefix("0x").unwrap_or(key).len() != 64 {
        errors.push(invalid(
            "oracle.ethereum_private_key",
            "must be 32 hex-encoded bytes",
        ));
    }

    if config.pow.max_iterations == 0 {
        errors.push(invalid("pow.max_iterations", "must be greater than zero"));
    }

    if let Some(feed) = &config.feed {
        check_http_url("feed.url", &feed.url, &mut errors);
        if feed.interval_secs == 0 {
            errors.push(invalid("feed.interval_secs", "must be greater than zero"));
        }
        if feed.timeout_secs == 0 {
            errors.push(invalid("feed.timeout_secs", "must be greater than zero"));
        }
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.as_str()) {
        errors.push(invalid(
            "observability.log_level",
            format!("expected one of {}", LOG_LEVELS.join(", ")),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(invalid(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FeedConfig;

    fn valid_config() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.wallet.seed = "000102030405060708090a0b0c0d0e0f".to_string();
        config.oracle.ethereum_private_key =
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_credentials_reported_together() {
        let errors = validate_config(&RelayConfig::default()).unwrap_err();
        assert!(errors.contains(&ValidationError::Missing("wallet.seed")));
        assert!(errors.contains(&ValidationError::Missing("oracle.ethereum_private_key")));
    }

    #[test]
    fn test_invalid_values() {
        let mut config = valid_config();
        config.node.address = "ftp://node".to_string();
        config.node.timeout_secs = 0;
        config.pow.max_iterations = 0;
        config.oracle.ethereum_private_key = "0x1234".to_string();
        config.feed = Some(FeedConfig {
            url: "not a url".to_string(),
            signed: false,
            interval_secs: 0,
            timeout_secs: 5,
        });
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
    }
}
