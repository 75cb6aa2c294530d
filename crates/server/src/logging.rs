use log::{LevelFilter, Log, Metadata, Record};

/// Stderr logger: `[craftboard] LEVEL target: message`.
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", format_record(record));
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!(
        "[craftboard] {:<5} {}: {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Install the stderr logger. Safe to call more than once; later calls only adjust the level.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_carries_prefix_and_target() {
        let line = format_record(
            &Record::builder()
                .level(log::Level::Warn)
                .target("craftboard_engine")
                .args(format_args!("no free position"))
                .build(),
        );
        assert_eq!(line, "[craftboard] WARN  craftboard_engine: no free position");
    }
}
