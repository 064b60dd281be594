use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install `env_logger` as the `log` backend.
///
/// Info and above by default, debug with `verbose` (combat events are logged
/// at debug). An explicit `RUST_LOG` overrides both.
pub fn init(verbose: bool) {
    let default_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level.to_string()));
    builder.format_timestamp_millis();

    // Err only means a logger is already installed; keep that one
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}
