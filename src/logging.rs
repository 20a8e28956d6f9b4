use tracing::Level;
use tracing_subscriber::filter::{LevelFilter, filter_fn};
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Errors and warnings go to stderr unless `quiet`; progress lines go to stdout
/// only when `verbose`. `RUST_LOG` overrides the stderr level.
pub fn init(verbose: bool, quiet: bool) {
    let errors = (!quiet).then(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
    });

    let progress = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .without_time()
            .with_level(false)
            .with_filter(filter_fn(|meta| *meta.level() == Level::INFO))
    });

    // a second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(errors).with(progress).try_init();
}
