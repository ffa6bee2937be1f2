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

//! Layouts of the text output.
//!
//! Output format:
//!
//! ```text
//! 2024-08-11T22:44:57.172 [plainlog-0.1.0] ERROR [A=1] [main] {req=7} app::db - Hello error!
//! app::Error: connection lost
//!     at app::db.query(db.rs:51)
//! ```

use crate::Trap;
use crate::config::Config;
use crate::config::LoggerNameStyle;
use crate::diagnostic::ThreadLocalDiagnostic;
use crate::layout::Layout;
use crate::layout::LayoutOrder;
use crate::layout::environment::Environments;
use crate::layout::time::TimestampFormatter;
use crate::layout::trace;
use crate::layout::trace::TraceVisitor;
use crate::layout::with_thread_name;
use crate::record::Level;
use crate::record::LogEvent;
use crate::throwable::StackFrame;
use crate::throwable::Throwable;

pub(crate) fn layouts(config: &Config, trap: &dyn Trap) -> Vec<Box<dyn Layout>> {
    let mut layouts: Vec<Box<dyn Layout>> = vec![];

    if config.show_date_time {
        layouts.push(Box::new(DateTimeLayout {
            formatter: TimestampFormatter::new(config, trap),
        }));
    }
    if config.show_implementation_version {
        layouts.push(Box::new(ImplementationLayout {
            tag: format!("[{}] ", config.implementation_version),
        }));
    }
    layouts.push(Box::new(LevelLayout::new(config)));
    if let Some(environments) = Environments::from_config(config) {
        layouts.push(Box::new(EnvironmentLayout::new(
            environments,
            config.environment_remember_on_start,
        )));
    }
    if config.show_thread_name {
        layouts.push(Box::new(ThreadLayout));
    }
    if config.show_context {
        layouts.push(Box::new(ContextLayout));
    }
    if config.logger_name != LoggerNameStyle::Hidden {
        layouts.push(Box::new(LoggerNameLayout {
            style: config.logger_name,
        }));
    }
    layouts.push(Box::new(MessageLayout));
    layouts.push(Box::new(SeparatorLayout));
    layouts.push(Box::new(ThrowableLayout));
    layouts
}

#[derive(Debug)]
struct DateTimeLayout {
    formatter: TimestampFormatter,
}

impl Layout for DateTimeLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::DateTime
    }

    fn render(&self, event: &mut LogEvent) {
        let time = self.formatter.format(event.created_at_millis());
        event.append(&time).append_char(' ');
    }
}

#[derive(Debug)]
struct ImplementationLayout {
    tag: String,
}

impl Layout for ImplementationLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Implementation
    }

    fn render(&self, event: &mut LogEvent) {
        event.append(&self.tag);
    }
}

#[derive(Debug)]
struct LevelLayout {
    labels: [String; 5],
}

impl LevelLayout {
    fn new(config: &Config) -> Self {
        let labels = Level::ALL.map(|level| {
            let label = config.level_labels.label(level);
            if config.level_in_brackets {
                format!("[{label}] ")
            } else {
                format!("{label} ")
            }
        });
        Self { labels }
    }
}

impl Layout for LevelLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Level
    }

    fn render(&self, event: &mut LogEvent) {
        let label = &self.labels[event.level().index()];
        event.append(label);
    }
}

#[derive(Debug)]
struct EnvironmentLayout {
    environments: Environments,
    remembered: Option<String>,
}

impl EnvironmentLayout {
    fn new(environments: Environments, remember_on_start: bool) -> Self {
        let remembered = remember_on_start.then(|| {
            let mut text = String::new();
            environments.render_text(&mut text);
            text
        });
        Self {
            environments,
            remembered,
        }
    }
}

impl Layout for EnvironmentLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Environment
    }

    fn render(&self, event: &mut LogEvent) {
        match &self.remembered {
            Some(text) => {
                event.append(text);
            }
            None => {
                let mut text = String::new();
                self.environments.render_text(&mut text);
                event.append(&text);
            }
        }
    }
}

#[derive(Debug)]
struct ThreadLayout;

impl Layout for ThreadLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Thread
    }

    fn render(&self, event: &mut LogEvent) {
        with_thread_name(|name| {
            event.append_char('[').append(name).append("] ");
        });
    }
}

#[derive(Debug)]
struct ContextLayout;

impl Layout for ContextLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Context
    }

    fn render(&self, event: &mut LogEvent) {
        let mut first = true;
        ThreadLocalDiagnostic::visit(|key, value| {
            event.append(if first { "{" } else { ", " });
            event.append(key).append_char('=').append(value);
            first = false;
        });
        if !first {
            event.append("} ");
        }
    }
}

#[derive(Debug)]
struct LoggerNameLayout {
    style: LoggerNameStyle,
}

impl Layout for LoggerNameLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::LoggerName
    }

    fn render(&self, event: &mut LogEvent) {
        let name = self.style.apply(event.logger_name()).to_string();
        event.append(&name).append(" - ");
    }
}

#[derive(Debug)]
struct MessageLayout;

impl Layout for MessageLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Message
    }

    fn render(&self, event: &mut LogEvent) {
        let message = event.message().unwrap_or("null").to_string();
        event.append(&message);
    }
}

#[derive(Debug)]
struct SeparatorLayout;

impl Layout for SeparatorLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::EventSeparator
    }

    fn render(&self, event: &mut LogEvent) {
        event.append_char('\n');
    }
}

#[derive(Debug)]
struct ThrowableLayout;

impl Layout for ThrowableLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Throwable
    }

    fn render(&self, event: &mut LogEvent) {
        if let Some(throwable) = event.throwable().cloned() {
            let mut writer = StackTraceWriter { event };
            trace::walk(&throwable, &mut writer);
        }
    }
}

struct StackTraceWriter<'a> {
    event: &'a mut LogEvent,
}

impl TraceVisitor for StackTraceWriter<'_> {
    fn visit_caption(&mut self, prefix: &str, label: &str, throwable: &Throwable) {
        self.event
            .append(prefix)
            .append(label)
            .append_display(throwable)
            .append_char('\n');
    }

    fn visit_frame(&mut self, prefix: &str, _: &Throwable, _: usize, frame: &StackFrame) {
        self.event
            .append(prefix)
            .append("\tat ")
            .append_display(frame)
            .append_char('\n');
    }

    fn visit_elided(&mut self, prefix: &str, count: usize) {
        self.event
            .append(prefix)
            .append("\t... ")
            .append_display(count)
            .append(" more\n");
    }

    fn visit_circular(&mut self, prefix: &str, label: &str, throwable: &Throwable) {
        self.event
            .append(prefix)
            .append(label)
            .append("[CIRCULAR REFERENCE: ")
            .append_display(throwable)
            .append("]\n");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::tz::TimeZone;

    use super::*;
    use crate::config::LevelLabels;
    use crate::format::Value;
    use crate::layout::LayoutPipeline;
    use crate::trap::tests::RecordingTrap;

    fn render(config: Config, mut event: LogEvent) -> String {
        let pipeline = LayoutPipeline::build(&config, &RecordingTrap::default());
        pipeline.render(&mut event);
        event.into_buffer()
    }

    fn event(level: Level, template: &str, args: &[Value]) -> LogEvent {
        LogEvent::build("app::db", level, Some(template), args, None)
            .with_created_at_millis(1_700_000_000_123)
    }

    #[test]
    fn full_line() {
        let config = Config::default()
            .show_date_time(true)
            .timezone(TimeZone::UTC)
            .show_implementation_version(true)
            .implementation_version("1.2.3")
            .level_in_brackets(true)
            .show_thread_name(false);
        let line = render(config, event(Level::Warn, "pool at {}%", &[Value::from(93)]));
        assert!(line.ends_with('\n'));
        insta::assert_snapshot!(line.trim_end(), @"2023-11-14T22:13:20.123 [1.2.3] [WARN] app::db - pool at 93%");
    }

    #[test]
    fn labels_and_short_names() {
        let config = Config::default()
            .level_labels(LevelLabels::default().with(Level::Info, "INF"))
            .logger_name(LoggerNameStyle::Short)
            .show_thread_name(false);
        let line = render(config, event(Level::Info, "ok", &[]));
        assert_eq!(line, "INF db - ok\n");

        let config = Config::default()
            .logger_name(LoggerNameStyle::Hidden)
            .show_thread_name(false);
        let line = render(config, event(Level::Info, "ok", &[]));
        assert_eq!(line, "INFO ok\n");
    }

    #[test]
    fn thread_name() {
        let line = std::thread::Builder::new()
            .name("worker-7".to_string())
            .spawn(|| render(Config::default(), event(Level::Debug, "tick", &[])))
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(line, "DEBUG [worker-7] app::db - tick\n");
    }

    #[test]
    fn missing_message() {
        let config = Config::default().show_thread_name(false);
        let line = render(config, LogEvent::new("app", Level::Info, None, None));
        assert_eq!(line, "INFO app - null\n");
    }

    #[test]
    fn context() {
        let config = Config::default().show_thread_name(false).show_context(true);
        let line = std::thread::spawn(move || {
            let empty = render(config.clone(), event(Level::Info, "a", &[]));
            ThreadLocalDiagnostic::insert("user", "ann");
            ThreadLocalDiagnostic::insert("req", "7");
            let full = render(config, event(Level::Info, "b", &[]));
            (empty, full)
        })
        .join()
        .unwrap();
        assert_eq!(line.0, "INFO app::db - a\n");
        assert_eq!(line.1, "INFO {req=7, user=ann} app::db - b\n");
    }

    #[test]
    fn stack_trace() {
        let cause = Arc::new(
            Throwable::new("io::Error")
                .message("reset")
                .frames([
                    StackFrame::new("std::net", "read").native(),
                    StackFrame::new("app::db", "query").at("db.rs", 40),
                    StackFrame::new("app", "main").at("main.rs", 3),
                ]),
        );
        let err = Arc::new(
            Throwable::new("app::DbError")
                .message("query failed")
                .frames([
                    StackFrame::new("app::db", "query").at("db.rs", 44),
                    StackFrame::new("app", "main").at("main.rs", 3),
                ])
                .caused_by(cause),
        );
        err.add_suppressed(Arc::new(Throwable::new("app::CloseError")));

        let config = Config::default().show_thread_name(false);
        let event = LogEvent::build(
            "app::db",
            Level::Error,
            Some("failed"),
            &[Value::from(err)],
            None,
        );
        assert_eq!(
            render(config, event),
            "ERROR app::db - failed\n\
             app::DbError: query failed\n\
             \tat app::db.query(db.rs:44)\n\
             \tat app.main(main.rs:3)\n\
             \tSuppressed: app::CloseError\n\
             Caused by: io::Error: reset\n\
             \tat std::net.read(Native Method)\n\
             \tat app::db.query(db.rs:40)\n\
             \t... 1 more\n"
        );
    }
}
