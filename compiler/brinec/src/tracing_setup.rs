//! Logging setup.
//!
//! Nothing is installed unless `BRINE_LOG` (or `RUST_LOG`) holds a filter,
//! e.g. `BRINE_LOG=brine_resolve=trace`.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tracing_tree::HierarchicalLayer;

/// Environment variable read for the log filter.
pub const LOG_ENV: &str = "BRINE_LOG";

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber once. `tree` nests output by span.
pub fn init_tracing(tree: bool) {
    TRACING_INIT.call_once(|| {
        let Ok(directives) = std::env::var(LOG_ENV).or_else(|_| std::env::var("RUST_LOG")) else {
            return;
        };
        let registry = tracing_subscriber::registry().with(EnvFilter::new(directives));
        // Another subscriber may already be installed (embedding, tests).
        let _ = if tree {
            registry
                .with(
                    HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true),
                )
                .try_init()
        };
    });
}
