use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber. Filtering follows
/// `RUST_LOG` when set; game trace events are emitted under the
/// `felt_web::game` target.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,felt_web=debug"));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("global tracing subscriber was already set");
    }
}
