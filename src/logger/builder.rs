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

use std::sync::Arc;

use crate::Logger;
use crate::Trap;
use crate::append::Routes;
use crate::append::Sink;
use crate::append::Stderr;
use crate::config::Config;
use crate::logger::log_impl::set_default_logger;
use crate::record::Level;
use crate::trap::DefaultTrap;

/// Create a new empty [`LoggerBuilder`] instance.
///
/// Without further setup, every level is written to standard error with the default
/// [`Config`].
pub fn builder() -> LoggerBuilder {
    LoggerBuilder {
        config: Config::default(),
        sink: Box::new(Stderr::default()),
        routes: vec![],
        trap: Arc::new(DefaultTrap::default()),
    }
}

/// A builder for configuring the logger.
#[must_use = "call `apply` to set the global logger or `build` to construct a logger instance"]
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
    sink: Box<dyn Sink>,
    routes: Vec<(Level, Box<dyn Sink>)>,
    trap: Arc<dyn Trap>,
}

impl LoggerBuilder {
    /// Set the configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the sink of every level that has no route of its own. Default to standard error.
    ///
    /// # Examples
    ///
    /// ```
    /// use plainlog::append;
    ///
    /// let logger = plainlog::builder().sink(append::Stdout::default()).build();
    /// ```
    pub fn sink(mut self, sink: impl Into<Box<dyn Sink>>) -> Self {
        self.sink = sink.into();
        self
    }

    /// Route `level` to its own sink.
    ///
    /// Sinks writing to the same stream are merged, so they share one lock.
    ///
    /// # Examples
    ///
    /// ```
    /// use plainlog::append;
    /// use plainlog::record::Level;
    ///
    /// let logger = plainlog::builder()
    ///     .sink(append::Stdout::default())
    ///     .route(Level::Warn, append::Stderr::default())
    ///     .route(Level::Error, append::Stderr::default())
    ///     .build();
    /// ```
    pub fn route(mut self, level: Level, sink: impl Into<Box<dyn Sink>>) -> Self {
        self.routes.push((level, sink.into()));
        self
    }

    /// Set the trap that receives write failures and configuration errors.
    ///
    /// Default to [`DefaultTrap`].
    pub fn trap(mut self, trap: impl Trap) -> Self {
        self.trap = Arc::new(trap);
        self
    }

    /// Build the [`Logger`].
    ///
    /// Unusable configuration values are reported to the trap and replaced by their defaults.
    pub fn build(self) -> Logger {
        let routes = self
            .routes
            .into_iter()
            .fold(Routes::new(self.sink), |routes, (level, sink)| {
                routes.route(level, sink)
            });
        Logger::new(self.config, routes, self.trap)
    }

    /// Set up the global logger.
    ///
    /// # Errors
    ///
    /// Return the built logger if a global logger has already been set.
    ///
    /// # Examples
    ///
    /// ```
    /// if plainlog::builder().try_apply().is_err() {
    ///     eprintln!("failed to set logger");
    /// }
    /// ```
    pub fn try_apply(self) -> Result<(), Logger> {
        set_default_logger(self.build())
    }

    /// Set up the global logger.
    ///
    /// # Panics
    ///
    /// Panic if the global logger has already been set.
    pub fn apply(self) {
        self.try_apply()
            .expect("LoggerBuilder::apply must be called before the global logger initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::Testing;
    use crate::trap::tests::RecordingTrap;

    #[test]
    fn routes_levels_to_sinks() {
        let out = Testing::default();
        let err = Testing::default();
        let logger = builder()
            .config(Config::default().show_thread_name(false))
            .sink(out.clone())
            .route(Level::Error, err.clone())
            .build();

        logger.info("app", "started", &[]);
        logger.error("app", "stopped", &[]);
        assert_eq!(out.text(), "INFO app - started\n");
        assert_eq!(err.text(), "ERROR app - stopped\n");
    }

    #[test]
    fn bad_configuration_goes_to_the_trap() {
        let trap = RecordingTrap::default();
        let _logger = builder()
            .config(Config::default().charset("EBCDIC"))
            .sink(Testing::default())
            .trap(trap.clone())
            .build();
        assert_eq!(trap.messages().len(), 1);
    }
}
