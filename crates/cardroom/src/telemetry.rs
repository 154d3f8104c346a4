//! Tracing initialization.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global tracing subscriber: an env filter plus a fmt layer.
///
/// Configure with `RUST_LOG`, e.g. `RUST_LOG=info,cardroom_room=debug`.
/// Defaults to `info` when unset or unparsable. Call once, at startup.
pub fn init() {
    let fmt_layer = fmt::layer().with_target(true);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
