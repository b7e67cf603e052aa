//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, defaults fill the gaps)
//!     → env overrides (PORT, OTLP_ENDPOINT, OTEL_SERVICE_NAME)
//!     → AppConfig (immutable)
//!     → shared with the server and telemetry at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the service runs with no config file
//! - Env overrides win over file values, matching container deployments

pub mod loader;
pub mod schema;

pub use loader::{apply_env_overrides, load_config, ConfigError};
pub use schema::{AppConfig, ObservabilityConfig, ServerConfig, TracingConfig};
