//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DispatchConfig (validated, immutable)
//!     → handed to DispatcherBuilder and the gateway
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Register keys keep the registry client's camelCase / dotted names

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::DispatchConfig;
pub use schema::GatewayConfig;
pub use schema::LoadBalanceConfig;
pub use schema::ObservabilityConfig;
pub use schema::RegisterConfig;
pub use schema::RetryConfig;
pub use schema::TransportConfig;
