pub mod app;
pub mod cli;
pub mod error;
pub mod logging;

#[cfg(test)]
mod app_tests;

pub use app::{present, run};
pub use cli::Cli;
pub use error::AppError;
