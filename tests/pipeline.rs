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
use std::sync::Mutex;

use jiff::tz::TimeZone;
use plainlog::Error;
use plainlog::Trap;
use plainlog::append::File;
use plainlog::append::Testing;
use plainlog::config::Config;
use plainlog::config::DateTimeOutput;
use plainlog::config::OutputFormat;
use plainlog::format::Value;
use plainlog::record::Level;
use plainlog::record::LogEvent;
use plainlog::throwable::StackFrame;
use plainlog::throwable::Throwable;

#[derive(Debug, Default, Clone)]
struct CollectingTrap(Arc<Mutex<Vec<String>>>);

impl Trap for CollectingTrap {
    fn trap(&self, err: &Error) {
        self.0.lock().unwrap().push(err.to_string());
    }
}

#[test]
fn timestamp_level_message_order() {
    let sink = Testing::default();
    let logger = plainlog::builder()
        .config(
            Config::default()
                .show_date_time(true)
                .date_time_output(DateTimeOutput::UnixTime)
                .show_implementation_version(true)
                .implementation_version("svc-2.0")
                .level_in_brackets(true)
                .show_thread_name(false),
        )
        .sink(sink.clone())
        .build();

    for (i, level) in Level::ALL.into_iter().enumerate() {
        let event = LogEvent::build("svc::api", level, Some("call {}"), &[Value::from(i)], None)
            .with_created_at_millis(1000 + i as i64);
        logger.log_event(event);
    }

    assert_eq!(
        sink.lines(),
        [
            "1000 [svc-2.0] [ERROR] svc::api - call 0",
            "1001 [svc-2.0] [WARN] svc::api - call 1",
            "1002 [svc-2.0] [INFO] svc::api - call 2",
            "1003 [svc-2.0] [DEBUG] svc::api - call 3",
            "1004 [svc-2.0] [TRACE] svc::api - call 4",
        ]
    );
}

#[test]
fn date_time_in_utc() {
    let sink = Testing::default();
    let logger = plainlog::builder()
        .config(
            Config::default()
                .show_date_time(true)
                .timezone(TimeZone::UTC)
                .show_thread_name(false),
        )
        .sink(sink.clone())
        .build();

    let event = LogEvent::build("app", Level::Info, Some("up"), &[], None)
        .with_created_at_millis(1_700_000_000_123);
    logger.log_event(event);
    insta::assert_snapshot!(sink.text().trim_end(), @"2023-11-14T22:13:20.123 INFO app - up");
}

#[test]
fn throwable_follows_the_message() {
    let sink = Testing::default();
    let logger = plainlog::builder()
        .config(Config::default().show_thread_name(false))
        .sink(sink.clone())
        .build();

    let err = Arc::new(
        Throwable::new("app::Timeout")
            .message("after 3s")
            .frame(StackFrame::new("app::net", "connect").at("net.rs", 12)),
    );
    logger.warn("app", "retrying {}", &[Value::from("db"), Value::from(err)]);

    assert_eq!(
        sink.text(),
        "WARN app - retrying db\napp::Timeout: after 3s\n\tat app::net.connect(net.rs:12)\n"
    );
}

#[test]
fn json_lines_parse() {
    let sink = Testing::default();
    let logger = plainlog::builder()
        .config(
            Config::default()
                .format(OutputFormat::Json)
                .show_thread_name(false),
        )
        .sink(sink.clone())
        .build();

    logger.error("app", "bad {}", &[Value::from("input \"x\"\n")]);
    let lines = sink.lines();
    assert_eq!(lines.len(), 1);

    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["level"], "ERROR");
    assert_eq!(value["logger"], "app");
    assert_eq!(value["message"], "bad input \"x\"\n");
}

#[test]
fn file_sinks_on_one_path_share_a_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs").join("app.log");

    let logger = plainlog::builder()
        .config(Config::default().show_thread_name(false))
        .sink(File::open(&path).unwrap())
        .route(Level::Error, File::open(dir.path().join("logs/../logs/app.log")).unwrap())
        .build();
    assert!(
        logger
            .routes()
            .sink(Level::Info)
            .ptr_eq(logger.routes().sink(Level::Error))
    );

    logger.info("app", "one", &[]);
    logger.error("app", "two", &[]);
    logger.flush();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "INFO app - one\nERROR app - two\n");
}

#[test]
fn reconfigure_while_logging() {
    let sink = Testing::default();
    let trap = CollectingTrap::default();
    let logger = Arc::new(
        plainlog::builder()
            .config(Config::default().show_thread_name(false))
            .sink(sink.clone())
            .trap(trap.clone())
            .build(),
    );

    let writer = {
        let logger = logger.clone();
        std::thread::spawn(move || {
            for i in 0..500 {
                logger.info("app", "n={}", &[Value::from(i)]);
            }
        })
    };
    for i in 0..20 {
        let format = if i % 2 == 0 {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };
        logger.reconfigure(Config::default().format(format).show_thread_name(false));
    }
    writer.join().unwrap();

    let lines = sink.lines();
    assert_eq!(lines.len(), 500);
    for line in lines {
        let whole_text = line.starts_with("INFO app - n=");
        let whole_json = line.starts_with('{') && line.ends_with('}');
        assert!(whole_text || whole_json, "{line}");
    }
    assert!(trap.0.lock().unwrap().is_empty());
}

#[test]
fn charset_applies_to_every_sink() {
    let sink = Testing::default();
    let logger = plainlog::builder()
        .config(
            Config::default()
                .charset("ISO-8859-1")
                .show_thread_name(false),
        )
        .sink(sink.clone())
        .build();

    logger.info("app", "café", &[]);
    assert_eq!(sink.bytes(), b"INFO app - caf\xe9\n");
}
