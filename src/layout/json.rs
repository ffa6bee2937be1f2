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

//! Layouts of the JSON output.
//!
//! Output format:
//!
//! ```json
//! {"timestamp":"2024-08-11T22:44:57.172","level":"ERROR","thread":"main","logger":"app::db","message":"Hello error!","exception":"connection lost","stacktrace":[{"clazz":"app::db","message":"connection lost","method":"query:51"}]}
//! ```
//!
//! Each field is its own layout. The opening brace, the separating commas and the closing
//! brace are layouts too, so the fields can be enabled independently.

use serde::Serialize;

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
    let mut fields: Vec<Box<dyn Layout>> = vec![];

    if config.show_date_time {
        fields.push(Box::new(DateTimeLayout {
            formatter: TimestampFormatter::new(config, trap),
        }));
    }
    if config.show_implementation_version {
        fields.push(Box::new(ImplementationLayout {
            field: format!(
                "\"implementation\":{}",
                json_string(&config.implementation_version)
            ),
        }));
    }
    fields.push(Box::new(LevelLayout::new(config)));
    if let Some(environments) = Environments::from_config(config) {
        fields.push(Box::new(EnvironmentLayout::new(
            environments,
            config.environment_remember_on_start,
        )));
    }
    if config.show_thread_name {
        fields.push(Box::new(ThreadLayout));
    }
    if config.show_context {
        fields.push(Box::new(ContextLayout));
    }
    if config.logger_name != LoggerNameStyle::Hidden {
        fields.push(Box::new(LoggerNameLayout {
            style: config.logger_name,
        }));
    }
    fields.push(Box::new(MessageLayout));
    fields.sort_by_key(|field| field.order());

    let mut layouts: Vec<Box<dyn Layout>> = vec![Box::new(StartToken)];
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            layouts.push(Box::new(FieldSeparator {
                order: field.order(),
            }));
        }
        layouts.push(field);
    }
    layouts.push(Box::new(ThrowableLayout));
    layouts.push(Box::new(EndToken));
    layouts
}

fn json_string(value: &str) -> String {
    // SAFETY: a string is always serializable.
    serde_json::to_string(value).unwrap()
}

#[derive(Debug)]
struct StartToken;

impl Layout for StartToken {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::DateTime
    }

    fn render(&self, event: &mut LogEvent) {
        event.append_char('{');
    }
}

#[derive(Debug)]
struct FieldSeparator {
    order: LayoutOrder,
}

impl Layout for FieldSeparator {
    fn order(&self) -> LayoutOrder {
        self.order
    }

    fn render(&self, event: &mut LogEvent) {
        event.append_char(',');
    }
}

#[derive(Debug)]
struct EndToken;

impl Layout for EndToken {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::EventEnd
    }

    fn render(&self, event: &mut LogEvent) {
        event.append("}\n");
    }
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
        event.append("\"timestamp\":").append(&json_string(&time));
    }
}

#[derive(Debug)]
struct ImplementationLayout {
    field: String,
}

impl Layout for ImplementationLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Implementation
    }

    fn render(&self, event: &mut LogEvent) {
        event.append(&self.field);
    }
}

#[derive(Debug)]
struct LevelLayout {
    fields: [String; 5],
}

impl LevelLayout {
    fn new(config: &Config) -> Self {
        let fields = Level::ALL.map(|level| {
            format!(
                "\"level\":{}",
                json_string(config.level_labels.label(level))
            )
        });
        Self { fields }
    }
}

impl Layout for LevelLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Level
    }

    fn render(&self, event: &mut LogEvent) {
        let field = &self.fields[event.level().index()];
        event.append(field);
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
            environments.render_json(&mut text);
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
                self.environments.render_json(&mut text);
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
            event.append("\"thread\":").append(&json_string(name));
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
        let context = ThreadLocalDiagnostic::snapshot();
        // SAFETY: a map of strings is always serializable.
        let context = serde_json::to_string(&context).unwrap();
        event.append("\"context\":").append(&context);
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
        let name = json_string(self.style.apply(event.logger_name()));
        event.append("\"logger\":").append(&name);
    }
}

#[derive(Debug)]
struct MessageLayout;

impl Layout for MessageLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Message
    }

    fn render(&self, event: &mut LogEvent) {
        let message = match event.message() {
            Some(message) => json_string(message),
            None => "null".to_string(),
        };
        event.append("\"message\":").append(&message);
    }
}

#[derive(Debug)]
struct ThrowableLayout;

#[derive(Serialize)]
#[serde(untagged)]
enum TraceLine {
    Frame {
        clazz: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        method: String,
    },
    Circular(String),
}

#[derive(Default)]
struct TraceCollector {
    lines: Vec<TraceLine>,
}

impl TraceVisitor for TraceCollector {
    fn visit_caption(&mut self, _: &str, _: &str, _: &Throwable) {}

    fn visit_frame(&mut self, _: &str, throwable: &Throwable, index: usize, frame: &StackFrame) {
        let message = if index == 0 {
            throwable.get_message().map(str::to_string)
        } else {
            None
        };
        let native = if frame.is_native() { "native " } else { "" };
        let method = match frame.line() {
            Some(line) => format!("{native}{}:{line}", frame.method_name()),
            None => format!("{native}{}", frame.method_name()),
        };
        self.lines.push(TraceLine::Frame {
            clazz: frame.class_name().to_string(),
            message,
            method,
        });
    }

    fn visit_elided(&mut self, _: &str, _: usize) {}

    fn visit_circular(&mut self, _: &str, _: &str, throwable: &Throwable) {
        self.lines
            .push(TraceLine::Circular(format!("[CIRCULAR REFERENCE: {throwable}]")));
    }
}

impl Layout for ThrowableLayout {
    fn order(&self) -> LayoutOrder {
        LayoutOrder::Throwable
    }

    fn render(&self, event: &mut LogEvent) {
        let Some(throwable) = event.throwable().cloned() else {
            return;
        };

        let mut collector = TraceCollector::default();
        trace::walk(&throwable, &mut collector);

        let exception = match throwable.get_message() {
            Some(message) => json_string(message),
            None => "null".to_string(),
        };
        // SAFETY: trace lines are serializable.
        let stacktrace = serde_json::to_string(&collector.lines).unwrap();
        event
            .append(",\"exception\":")
            .append(&exception)
            .append(",\"stacktrace\":")
            .append(&stacktrace);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jiff::tz::TimeZone;

    use super::*;
    use crate::config::OutputFormat;
    use crate::format::Value;
    use crate::layout::LayoutPipeline;
    use crate::trap::tests::RecordingTrap;

    fn json() -> Config {
        Config::default()
            .format(OutputFormat::Json)
            .show_thread_name(false)
    }

    fn render(config: Config, mut event: LogEvent) -> String {
        let pipeline = LayoutPipeline::build(&config, &RecordingTrap::default());
        pipeline.render(&mut event);
        event.into_buffer()
    }

    fn event(template: &str, args: &[Value]) -> LogEvent {
        LogEvent::build("app::db", Level::Info, Some(template), args, None)
            .with_created_at_millis(1_700_000_000_123)
    }

    #[test]
    fn minimal_object() {
        let line = render(json(), event("pool at {}%", &[Value::from(93)]));
        assert!(line.ends_with("}\n"));
        insta::assert_snapshot!(line.trim_end(), @r#"{"level":"INFO","logger":"app::db","message":"pool at 93%"}"#);
    }

    #[test]
    fn all_fields_in_order() {
        let config = json()
            .show_date_time(true)
            .timezone(TimeZone::UTC)
            .show_implementation_version(true)
            .implementation_version("1.2.3")
            .show_context(true)
            .logger_name(LoggerNameStyle::Short);
        let line = render(config, event("ok", &[]));
        assert_eq!(
            line,
            "{\"timestamp\":\"2023-11-14T22:13:20.123\",\"implementation\":\"1.2.3\",\"level\":\"INFO\",\"context\":{},\"logger\":\"db\",\"message\":\"ok\"}\n"
        );
    }

    #[test]
    fn strings_are_escaped() {
        let line = render(json(), event("say \"{}\"\n", &[Value::from("hi")]));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["message"], "say \"hi\"\n");
    }

    #[test]
    fn missing_message_is_null() {
        let line = render(json(), LogEvent::new("app", Level::Warn, None, None));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(value["message"].is_null());
    }

    #[test]
    fn stack_trace() {
        let cause = Arc::new(
            Throwable::new("io::Error")
                .message("reset")
                .frames([
                    StackFrame::new("std::net", "read").native(),
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
                .caused_by(cause.clone()),
        );
        cause.add_suppressed(err.clone());

        let line = render(json(), event("failed", &[Value::from(err)]));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["exception"], "query failed");
        assert_eq!(
            value["stacktrace"],
            serde_json::json!([
                {"clazz": "app::db", "message": "query failed", "method": "query:44"},
                {"clazz": "app", "method": "main:3"},
                {"clazz": "std::net", "message": "reset", "method": "native read"},
                "[CIRCULAR REFERENCE: app::DbError: query failed]",
            ])
        );
    }
}
