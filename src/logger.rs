use log::LevelFilter;

/// Initialize the logger with the specified level. `RUST_LOG` still applies on top, e.g.
/// `RUST_LOG=refractor::trajectory=trace` to see the paths of reporting rays.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
