pub mod middleware;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `info` for this binary and the HTTP trace layer, silence for everything
/// else. `RUST_LOG` overrides it.
fn default_filter() -> String {
  let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
  format!("{crate_target}=info,tower_http=info")
}

pub fn init_logging() {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_filter()));

  tracing_subscriber::registry()
    .with(tracing_subscriber::fmt::layer().with_target(false))
    .with(filter)
    .init();
}
