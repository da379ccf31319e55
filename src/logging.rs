//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::fmt::format::{DefaultFields, Format};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding per-module log directives.
pub const LOG_ENV: &str = "HIT_VALIDATE_LOG";

static INIT: Once = Once::new();

/// Default filter when `HIT_VALIDATE_LOG` is unset or invalid.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "hit_validate=info"
    } else {
        "hit_validate=warn"
    }
}

/// Initialize logging to stderr.
///
/// Reads `HIT_VALIDATE_LOG`, e.g. `HIT_VALIDATE_LOG=hit_validate::checks=debug`.
/// Stdout is left to the report so JSON and JUnit output stay parseable.
/// `ansi` follows the report's colour setting. Calling this more than once
/// is a no-op.
pub fn init_tracing(verbose: bool, ansi: bool) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

        // A subscriber installed by the host program takes precedence.
        let _ = tracing_subscriber::registry()
            .with(fmt_layer(std::io::stderr, ansi))
            .with(filter)
            .try_init();
    });
}

fn fmt_layer<S, W>(writer: W, ansi: bool) -> fmt::Layer<S, DefaultFields, Format, W>
where
    W: for<'w> fmt::MakeWriter<'w> + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true)
        .with_line_number(true)
}
