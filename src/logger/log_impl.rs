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
use std::sync::OnceLock;

use arc_swap::ArcSwap;

use crate::Trap;
use crate::append::Charset;
use crate::append::Router;
use crate::append::Routes;
use crate::config::Config;
use crate::format::Value;
use crate::layout::LayoutPipeline;
use crate::record::Level;
use crate::record::LogEvent;
use crate::throwable::Throwable;

static DEFAULT_LOGGER: OnceLock<Logger> = OnceLock::new();

/// Return the default global logger instance if it has been set.
pub fn default_logger() -> Option<&'static Logger> {
    DEFAULT_LOGGER.get()
}

/// Set the default global logger instance.
///
/// Return the logger back if the default logger has already been set.
pub fn set_default_logger(logger: Logger) -> Result<(), Logger> {
    DEFAULT_LOGGER.set(logger)
}

#[derive(Debug)]
struct State {
    pipeline: LayoutPipeline,
    router: Router,
}

impl State {
    fn build(config: &Config, routes: &Routes, trap: &Arc<dyn Trap>) -> State {
        let charset = Charset::resolve(config.charset_name(), trap.as_ref());
        State {
            pipeline: LayoutPipeline::build(config, trap.as_ref()),
            router: Router::new(routes, charset, trap.clone()),
        }
    }
}

/// A logger renders events and writes each one to the sink of its level.
///
/// Callers are expected to check whether a level is enabled before logging; the logger itself
/// writes every event it is given.
///
/// # Examples
///
/// ```
/// use plainlog::append::Testing;
/// use plainlog::config::Config;
/// use plainlog::format::Value;
///
/// let sink = Testing::default();
/// let logger = plainlog::builder()
///     .config(Config::default().show_thread_name(false))
///     .sink(sink.clone())
///     .build();
///
/// logger.info("app", "user {} logged in", &[Value::from("alice")]);
/// assert_eq!(sink.text(), "INFO app - user alice logged in\n");
/// ```
#[derive(Debug)]
pub struct Logger {
    state: ArcSwap<State>,
    config: ArcSwap<Config>,
    routes: Routes,
    trap: Arc<dyn Trap>,
}

impl Logger {
    pub(super) fn new(config: Config, routes: Routes, trap: Arc<dyn Trap>) -> Self {
        let state = State::build(&config, &routes, &trap);
        Self {
            state: ArcSwap::from_pointee(state),
            config: ArcSwap::from_pointee(config),
            routes,
            trap,
        }
    }

    /// The configuration currently in effect.
    pub fn config(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// The sinks of each level.
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    /// Replace the configuration.
    ///
    /// The layout pipeline and the writers are rebuilt from `config`; the sinks and their locks
    /// are kept. Events being rendered while the swap happens finish with the previous
    /// pipeline.
    pub fn reconfigure(&self, config: Config) {
        let state = State::build(&config, &self.routes, &self.trap);
        self.state.store(Arc::new(state));
        self.config.store(Arc::new(config));
    }

    /// Format `template` with `args` and log the result at `level`.
    ///
    /// A trailing [`Value::Throwable`] argument becomes the throwable of the event. A `None`
    /// template logs a `null` message.
    pub fn log(&self, logger_name: &str, level: Level, template: Option<&str>, args: &[Value]) {
        self.log_event(LogEvent::build(logger_name, level, template, args, None));
    }

    /// Like [`Logger::log`], with an explicit throwable.
    pub fn log_throwable(
        &self,
        logger_name: &str,
        level: Level,
        template: Option<&str>,
        args: &[Value],
        throwable: Arc<Throwable>,
    ) {
        let event = LogEvent::build(logger_name, level, template, args, Some(throwable));
        self.log_event(event);
    }

    /// Log at [`Level::Trace`].
    pub fn trace(&self, logger_name: &str, template: &str, args: &[Value]) {
        self.log(logger_name, Level::Trace, Some(template), args);
    }

    /// Log at [`Level::Debug`].
    pub fn debug(&self, logger_name: &str, template: &str, args: &[Value]) {
        self.log(logger_name, Level::Debug, Some(template), args);
    }

    /// Log at [`Level::Info`].
    pub fn info(&self, logger_name: &str, template: &str, args: &[Value]) {
        self.log(logger_name, Level::Info, Some(template), args);
    }

    /// Log at [`Level::Warn`].
    pub fn warn(&self, logger_name: &str, template: &str, args: &[Value]) {
        self.log(logger_name, Level::Warn, Some(template), args);
    }

    /// Log at [`Level::Error`].
    pub fn error(&self, logger_name: &str, template: &str, args: &[Value]) {
        self.log(logger_name, Level::Error, Some(template), args);
    }

    /// Render `event` and write it to the sink of its level.
    pub fn log_event(&self, mut event: LogEvent) {
        let state = self.state.load_full();
        state.pipeline.render(&mut event);
        state.router.write(&event);
    }

    /// Flush every sink.
    pub fn flush(&self) {
        self.state.load_full().router.flush();
    }
}
