//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the selected register mode has what it needs
//! - Validate value ranges (periods, attempts, worker counts)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatchConfig → Result<(), Vec<ValidationError>>
//! - An empty `registerType` is accepted here; resolution reports it per call

use thiserror::Error;

use crate::config::schema::{DispatchConfig, REGISTER_TYPE_LOCAL, REGISTER_TYPE_MEMORY};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("serverLists configuration required if registerType equals local")]
    MissingServerLists,

    #[error("register instance {index} has an empty host")]
    EmptyInstanceHost { index: usize },

    #[error("retry.maxAttempts must be at least 1")]
    ZeroMaxAttempts,

    #[error("retry.period ({period_ms}ms) exceeds retry.maxPeriod ({max_period_ms}ms)")]
    PeriodAboveMax { period_ms: u64, max_period_ms: u64 },

    #[error("gateway.workers must be at least 1")]
    ZeroWorkers,

    #[error("gateway.queue_capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("transport.request_timeout_ms must be greater than 0")]
    ZeroRequestTimeout,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let register = &config.register;

    if register.register_type == REGISTER_TYPE_LOCAL
        && register.server_lists.split(',').all(|s| s.trim().is_empty())
    {
        errors.push(ValidationError::MissingServerLists);
    }

    if register.register_type == REGISTER_TYPE_MEMORY {
        for (index, instance) in register.instances.iter().enumerate() {
            if instance.host.trim().is_empty() {
                errors.push(ValidationError::EmptyInstanceHost { index });
            }
        }
    }

    let retry = &register.props;
    if retry.max_attempts == 0 {
        errors.push(ValidationError::ZeroMaxAttempts);
    }
    if retry.period_ms > retry.max_period_ms {
        errors.push(ValidationError::PeriodAboveMax {
            period_ms: retry.period_ms,
            max_period_ms: retry.max_period_ms,
        });
    }

    if config.gateway.workers == 0 {
        errors.push(ValidationError::ZeroWorkers);
    }
    if config.gateway.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }
    if config.transport.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
