use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Warnings by default, everything down to debug with `--verbose`.
pub fn init_logging(verbose: bool) -> LevelFilter {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(err) = SimpleLogger::new().with_level(level).init() {
        eprintln!("warning: failed to initialize logging: {err}");
    }
    level
}
