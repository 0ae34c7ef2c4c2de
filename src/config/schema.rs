//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the dispatcher.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::discovery::InstanceRecord;

/// `registerType` value that selects the static server list.
pub const REGISTER_TYPE_LOCAL: &str = "local";

/// `registerType` value that selects the in-process registry seeded from config.
pub const REGISTER_TYPE_MEMORY: &str = "memory";

/// Root configuration for the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Where upstream instances come from.
    pub register: RegisterConfig,

    /// Load balancing strategy selection.
    pub load_balance: LoadBalanceConfig,

    /// Outbound HTTP transport settings.
    pub transport: TransportConfig,

    /// Inbound gateway settings.
    pub gateway: GatewayConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Instance source configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterConfig {
    /// `"local"` for a static server list, any other value for a registry.
    /// Left empty, every resolution fails with a configuration error.
    pub register_type: String,

    /// Comma-separated server addresses (static mode only).
    pub server_lists: String,

    /// Retry options, keyed the same way as the registry client properties.
    pub props: RetryConfig,

    /// Seed instances for the in-process registry (`registerType = "memory"`).
    pub instances: Vec<InstanceRecord>,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries. Disabled means the first transport failure is terminal.
    #[serde(rename = "retry.enable")]
    pub enabled: bool,

    /// Delay before the first retry in milliseconds.
    #[serde(rename = "retry.period")]
    pub period_ms: u64,

    /// Upper bound for the backoff delay in milliseconds.
    #[serde(rename = "retry.maxPeriod")]
    pub max_period_ms: u64,

    /// Maximum number of attempts, the first one included.
    #[serde(rename = "retry.maxAttempts")]
    pub max_attempts: u32,

    /// Add up to 10% random jitter on top of each delay.
    #[serde(rename = "retry.jitter")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            period_ms: 100,
            max_period_ms: 1000,
            max_attempts: 5,
            jitter: false,
        }
    }
}

/// Load balancer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadBalanceConfig {
    /// Strategy name looked up in the load balancer factory.
    pub strategy: String,
}

impl Default for LoadBalanceConfig {
    fn default() -> Self {
        Self {
            strategy: crate::load_balancer::ROUND_ROBIN.to_string(),
        }
    }
}

/// Outbound transport configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-attempt request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Maximum buffered response body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Inbound gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Bind address (e.g., "0.0.0.0:9195").
    pub bind_address: String,

    /// Context id used when a request carries no `x-context-id` header.
    pub default_context_id: Option<String>,

    /// Capacity of the hand-off queue between the listener and workers.
    pub queue_capacity: usize,

    /// Number of worker tasks draining the queue.
    pub workers: usize,

    /// Total time allowed for one inbound request in seconds.
    pub request_timeout_secs: u64,

    /// Maximum inbound body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:9195".to_string(),
            default_context_id: None,
            queue_capacity: 1024,
            workers: 4,
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
