//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or LaunchConfig::for_app
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LaunchConfig (validated, immutable)
//!     → moved into DevServer, never mutated afterward
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::LaunchConfig;
pub use loader::{load_config, ConfigError};
pub use validation::{validate_config, ValidationError};
