use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Installs the fmt subscriber on stderr. `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str) -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
}
