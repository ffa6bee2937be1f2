// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bridge from the [`log`] crate.

use crate::Logger;
use crate::default_logger;
use crate::format;
use crate::record::Level;
use crate::record::LogEvent;

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

struct LogCrateLogger(());

impl log::Log for LogCrateLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        let Some(logger) = default_logger() else {
            return false;
        };

        log::Log::enabled(logger, metadata)
    }

    fn log(&self, record: &log::Record) {
        if let Some(logger) = default_logger() {
            log::Log::log(logger, record);
        }
    }

    fn flush(&self) {
        if let Some(logger) = default_logger() {
            log::Log::flush(logger);
        }
    }
}

/// Set up the log crate global logger to forward to the default logger.
///
/// # Errors
///
/// Return an error if the log crate global logger has already been set.
pub fn try_setup_log_crate() -> Result<(), log::SetLoggerError> {
    static LOGGER: LogCrateLogger = LogCrateLogger(());
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

/// Set up the log crate global logger to forward to the default logger.
///
/// # Panics
///
/// Panic if the log crate global logger has already been set.
pub fn setup_log_crate() {
    try_setup_log_crate().expect(
        "plainlog::bridge::log::setup_log_crate must be called before the log crate global logger initialized",
    )
}

/// Level checks are left to the `log` max level; every record that reaches the logger is
/// written. The record target is the logger name and the formatted arguments are the message,
/// so `{}` in them is never treated as a placeholder. Arguments that fail to format are written
/// as [`FAILED_TO_STRING`](crate::format::FAILED_TO_STRING), like formatter arguments.
impl log::Log for Logger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let message = match record.args().as_str() {
            Some(message) => message.to_string(),
            None => {
                let mut message = String::new();
                format::safe_append(&mut message, record.args());
                message
            }
        };
        let event = LogEvent::new(record.target(), record.level().into(), Some(message), None);
        self.log_event(event);
    }

    fn flush(&self) {
        Logger::flush(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::Testing;
    use crate::config::Config;

    #[test]
    fn records_are_preformatted() {
        let sink = Testing::default();
        let logger = crate::builder()
            .config(Config::default().show_thread_name(false))
            .sink(sink.clone())
            .build();

        log::Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("{} of {{}}", 3))
                .level(log::Level::Warn)
                .target("app::jobs")
                .build(),
        );

        assert_eq!(sink.text(), "WARN app::jobs - 3 of {}\n");
    }

    struct Panicking;

    impl std::fmt::Display for Panicking {
        fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            panic!("display exploded")
        }
    }

    #[test]
    fn panicking_arguments_are_contained() {
        let sink = Testing::default();
        let logger = crate::builder()
            .config(Config::default().show_thread_name(false))
            .sink(sink.clone())
            .build();

        log::Log::log(
            &logger,
            &log::Record::builder()
                .args(format_args!("value {}", Panicking))
                .level(log::Level::Info)
                .target("app")
                .build(),
        );

        assert_eq!(sink.text(), "INFO app - [FAILED toString()]\n");
    }
}
