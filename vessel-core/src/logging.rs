use log::{Level, LevelFilter, Log, Metadata, Record};

/// Backend used when the application did not install one.
struct ConsoleLogger;

static CONSOLE: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the stderr fallback at `Info` when no `log` backend is active.
///
/// Returns whether the fallback was installed.
pub fn ensure_logger() -> bool {
    if log::max_level() != LevelFilter::Off {
        return false;
    }
    match log::set_logger(&CONSOLE) {
        Ok(()) => {
            log::set_max_level(LevelFilter::Info);
            true
        }
        Err(..) => false,
    }
}
