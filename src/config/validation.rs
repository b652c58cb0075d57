//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeout > 0, distinct ports)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LaunchConfig → Result<(), Vec<ValidationError>>

use crate::config::schema::LaunchConfig;

/// A single semantic problem with a launch configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyExecutable,
    EmptyHost,
    ZeroTimeout,
    PortConflict(u16),
    EmptyAppDir,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyExecutable => write!(f, "executable must not be empty"),
            ValidationError::EmptyHost => write!(f, "host must not be empty"),
            ValidationError::ZeroTimeout => write!(f, "timeout_secs must be greater than 0"),
            ValidationError::PortConflict(port) => {
                write!(f, "port and admin_port are both set to {}", port)
            }
            ValidationError::EmptyAppDir => write!(f, "app_dir must not be empty"),
        }
    }
}

/// Check a launch configuration, collecting every problem found.
pub fn validate_config(config: &LaunchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.executable.trim().is_empty() {
        errors.push(ValidationError::EmptyExecutable);
    }
    if config.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    // 0 means ephemeral on both sides, so only explicit ports can collide.
    if config.port != 0 && config.port == config.admin_port {
        errors.push(ValidationError::PortConflict(config.port));
    }
    if config.app_dir.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyAppDir);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
