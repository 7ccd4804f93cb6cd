use std::io::{self, IsTerminal};

use tracing::warn;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, filter::ParseError, fmt, prelude::*};

/// Filter used when no directives were configured. Keeps a normal run silent.
pub const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. Logs are written to stderr only, stdout belongs to the
/// interpreter.
pub fn install(directives: Option<&str>) {
    let (filter_layer, parse_error) = filter_layer(directives);

    let fmt_layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time()
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init();

    if let Some(error) = parse_error {
        warn!(%error, "ignoring invalid log filter, using {DEFAULT_FILTER:?}");
    }
}

pub fn install_error_handler() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .install();
}

fn filter_layer(directives: Option<&str>) -> (EnvFilter, Option<ParseError>) {
    match directives.map(EnvFilter::try_new) {
        Some(Ok(filter)) => (filter, None),
        Some(Err(error)) => (EnvFilter::new(DEFAULT_FILTER), Some(error)),
        None => (EnvFilter::new(DEFAULT_FILTER), None),
    }
}
