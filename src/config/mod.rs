//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HttpCliConfig (validated, immutable)
//!     → ClientConfig handed to HttpClient, ObservabilityConfig to the binary
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a client is built from one snapshot
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ClientConfig, HttpCliConfig, LimitsConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};
