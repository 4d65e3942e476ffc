use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the tracing subscriber and error reporting for the process.
///
/// Log level is controlled through `RUST_LOG` and defaults to `info`.
/// Intended to be called once at startup; a second call is a no-op.
pub fn init_telemetry() {
    let _ = color_eyre::install();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .try_init();
}
