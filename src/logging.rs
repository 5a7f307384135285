//! tracing setup for the `gt` binary and tests

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber, writing to stderr
///
/// `RUST_LOG` selects the level and defaults to `warn`. Polecat creation,
/// deletion and config loads log at `info`; every state transition and state
/// file write logs at `debug`, e.g. `RUST_LOG=gastown::polecat=debug`.
pub fn init() -> crate::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .pretty(),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {}", e))?;

    Ok(())
}

/// Idempotent `init` for tests
pub fn init_test() {
    let _ = init();
}
