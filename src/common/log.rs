use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Embedders call this once at
/// startup; `RUST_LOG` overrides the default level. Safe to call twice —
/// the second call is ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
