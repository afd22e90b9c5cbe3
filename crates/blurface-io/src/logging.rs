//! `log` backend for the browser console.
//!
//! The pipeline and this crate log through the `log` facade. In the
//! browser those records go to `console.*` at the matching level.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use wasm_bindgen::JsValue;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Route `log` records at `level` and above to the browser console.
///
/// Calling it more than once keeps the first logger, updates the level,
/// and warns on the console.
pub fn init(level: LevelFilter) {
    if install(level).is_err() {
        web_sys::console::warn_1(&JsValue::from_str(
            "a logger was already installed; keeping it",
        ));
    }
}

fn install(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_max_level(level);
    log::set_logger(&LOGGER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_reported_and_still_sets_level() {
        assert!(install(LevelFilter::Info).is_ok());
        assert!(install(LevelFilter::Debug).is_err());
        assert_eq!(log::max_level(), LevelFilter::Debug);
    }
}
