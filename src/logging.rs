use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_VAR: &str = "COMBAT_DIGEST_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Logs go to stderr so `analyze` output on stdout
/// stays machine-readable. Calling this twice is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
