//! Process logging setup.
//!
//! Call [`init_tracing`] once at startup. Script-emitted diagnostics are
//! logged under the `script` target so they stay distinguishable from the
//! runner's own records.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides `level` when set. With `json` the subscriber
/// emits newline-delimited JSON records for log aggregation. Calling this
/// more than once is a no-op: the global subscriber installs once per
/// process.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
            .ok();
    }
}
