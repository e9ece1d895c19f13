//! Top-level error type

use text_display_core::{ConfigError, FontError};
use text_display_overlay::PlatformError;
use thiserror::Error;

/// Anything that stops the overlay from being shown. All of them exit with 1.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid arguments")]
    Config(#[from] ConfigError),

    #[error("cannot open display")]
    Connection(#[source] PlatformError),

    #[error("font resolution failed")]
    Font(#[from] FontError),

    #[error("overlay setup failed")]
    Platform(#[from] PlatformError),
}

/// Render an error and its chain of causes on one line
pub fn report(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
