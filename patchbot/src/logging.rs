//! Tracing setup for the bot.
//!
//! Log lines go to stderr so stdout stays free for command output (diff
//! trails, tool responses). The Markdown step summary is written separately
//! by `io::report` and is unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `info`, or `debug` for this crate when
/// `verbose` is set (diff hunks are logged at debug).
///
/// # Example
/// ```bash
/// RUST_LOG=patchbot=debug patchbot edit src/lib.rs --patches patches.json
/// ```
pub fn init(verbose: bool) {
    let default = if verbose { "info,patchbot=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
