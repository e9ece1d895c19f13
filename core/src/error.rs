//! Error types for configuration parsing and font resolution

use thiserror::Error;

/// Errors in user-supplied command-line values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid color '{value}': expected 6 hex digits (RRGGBB)")]
    InvalidColor { value: String },

    #[error("invalid number '{value}'")]
    InvalidNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("invalid screen size '{value}': expected WIDTHxHEIGHT with both sides above zero")]
    InvalidScreenSize { value: String },

    #[error("text to display must not be empty")]
    EmptyText,
}

/// Errors while resolving a font
#[derive(Debug, Error)]
pub enum FontError {
    #[error("could not load font '{requested}' nor fallback font '{fallback}'")]
    Unresolvable {
        requested: String,
        fallback: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
