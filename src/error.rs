//! Structured error types for configuration loading and resolution.

use serde::Serialize;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Schema errors
    DuplicateModule,
    ModuleNotFound,
    OptionNotFound,
    EraNotFound,

    // Value errors
    InvalidValue,

    // Fragment file errors
    ParseError,
}

/// Structured error for configuration operations.
///
/// All errors are fatal at load time: a registry that fails to resolve is
/// never handed off to the execution engine.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{message}")]
pub struct ConfigError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
}

impl ConfigError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            module: None,
            option: None,
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    // Convenience constructors

    pub fn duplicate_module(name: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateModule,
            format!("Module already defined: {}", name),
        )
        .with_module(name)
    }

    pub fn module_not_found(name: &str) -> Self {
        Self::new(
            ErrorCode::ModuleNotFound,
            format!("Module not found: {}", name),
        )
        .with_module(name)
    }

    pub fn option_not_found(module: &str, option: &str) -> Self {
        Self::new(
            ErrorCode::OptionNotFound,
            format!("Module {} has no option {}", module, option),
        )
        .with_module(module)
        .with_option(option)
    }

    pub fn era_not_found(era: &str) -> Self {
        Self::new(ErrorCode::EraNotFound, format!("Unknown era: {}", era))
    }

    pub fn invalid_value(option: &str, reason: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidValue,
            format!("Invalid value for {}: {}", option, reason),
        )
        .with_option(option)
    }

    pub fn parse(err: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::ParseError, err.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_not_found_carries_context() {
        let err = ConfigError::option_not_found("triggerEffTest", "hwSource");
        assert_eq!(err.code, ErrorCode::OptionNotFound);
        assert_eq!(err.module.as_deref(), Some("triggerEffTest"));
        assert_eq!(err.option.as_deref(), Some("hwSource"));
        assert!(err.to_string().contains("triggerEffTest"));
    }

    #[test]
    fn test_error_serializes_code_as_screaming_snake() {
        let err = ConfigError::duplicate_module("triggerEffTest");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "DUPLICATE_MODULE");
    }
}
