//! Logging configuration
//!
//! Diagnostics go to stderr so stdout only carries the announcement line.
//! `-v` enables info output for text-display crates, `-vv` enables debug.

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Filter directives for a `--verbose` count
pub fn filter_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,text_display=info,text_display_core=info,text_display_overlay=info",
        _ => "info,text_display=debug,text_display_core=debug,text_display_overlay=debug",
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(verbosity: u8) {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let filter = EnvFilter::new(filter_directive(verbosity));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    tracing::debug!(verbosity, "logging initialized");
}
