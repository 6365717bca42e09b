use std::env::{self, VarError};

use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

struct LoggerConfig {
    filter: Result<String, VarError>,
}

impl LoggerConfig {
    pub fn from_env() -> Self {
        const ENV: &str = "IRLINK_LOG";
        let filter = env::var(ENV);
        Self { filter }
    }
}

/// Install the hierarchical stderr logger when `IRLINK_LOG` is set,
/// e.g. `IRLINK_LOG=irlink_linker=trace`.
pub fn init_tracing() {
    let cfg = LoggerConfig::from_env();
    let filter = match cfg.filter {
        Ok(filter) => EnvFilter::new(filter),
        _ => return,
    };
    let layer = tracing_tree::HierarchicalLayer::default()
        .with_writer(std::io::stderr)
        .with_indent_lines(true);
    let subscribe = tracing_subscriber::Registry::default()
        .with(filter)
        .with(layer);
    if tracing::subscriber::set_global_default(subscribe).is_err() {
        tracing::debug!("global subscriber already installed");
    }
}

#[test]
fn test_init_tracing_twice() {
    // SAFETY: the only test of this crate touching the environment.
    unsafe { env::set_var("IRLINK_LOG", "off") };
    init_tracing();
    init_tracing();
}
