//! Serial-backed `log::Log` implementation. `kernel-core` only ever calls
//! `log::info!`/`warn!`/`error!`/`debug!`; this is the one place in the
//! workspace that owns an actual logger.

use log::{Level, LevelFilter, Metadata, Record};

use crate::arch::x86_64::serial;

struct SerialLogger;

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            serial::_print(format_args!("[{}] {}\n", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: SerialLogger = SerialLogger;

pub fn init() {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LevelFilter::Info))
        .expect("logger already initialized");
}
