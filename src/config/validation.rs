//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes > 0, deadline > 0)
//! - Reject header values that would corrupt the request head
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HttpCliConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::HttpCliConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("client.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("client.user_agent must not contain CR or LF")]
    UserAgentLineBreak,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &HttpCliConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let client = &config.client;

    if client.user_agent.is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    } else if client.user_agent.contains(['\r', '\n']) {
        errors.push(ValidationError::UserAgentLineBreak);
    }

    if client.read_buffer_size == 0 {
        errors.push(ValidationError::Zero("client.read_buffer_size"));
    }
    if client.default_deadline_secs == 0 {
        errors.push(ValidationError::Zero("client.default_deadline_secs"));
    }
    if client.limits.max_head_bytes == 0 {
        errors.push(ValidationError::Zero("client.limits.max_head_bytes"));
    }
    if client.limits.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("client.limits.max_body_bytes"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
