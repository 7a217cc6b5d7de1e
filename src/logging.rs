use log::{Level, LevelFilter, Log, Metadata, Record};

/// Stderr backend for the `log` facade.
///
/// Renders one record per line as `[ERROR] …`, `[INFO] …`, and so on.
/// Stdout is never touched: it is reserved for the terminal stage's
/// emissions and the final completion line.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "[ERROR]",
            Level::Warn => "[WARN]",
            Level::Info => "[INFO]",
            Level::Debug | Level::Trace => "[DEBUG]",
        };
        eprintln!("{tag} {}", record.args());
    }

    fn flush(&self) {}
}

/// Install the stderr logger.
///
/// The default maximum level is `Error`; set `ANALYZER_LOG=info` (or
/// `debug`) to enable informational output. Safe to call more than once;
/// later calls only adjust the level.
pub fn init() {
    let level = match std::env::var("ANALYZER_LOG").ok().as_deref() {
        Some("debug") => LevelFilter::Debug,
        Some("info") => LevelFilter::Info,
        Some("warn") => LevelFilter::Warn,
        _ => LevelFilter::Error,
    };
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}
