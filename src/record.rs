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

//! Log levels and log events.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;

use crate::Error;
use crate::format;
use crate::format::Value;
use crate::throwable::Throwable;

/// An enum representing the available verbosity levels of the logger.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Designates very serious errors.
    Error,
    /// Designates hazardous situations.
    Warn,
    /// Designates useful information.
    Info,
    /// Designates lower priority information.
    Debug,
    /// Designates very low priority, often extremely verbose, information.
    Trace,
}

impl Level {
    /// All levels, from the most severe to the most verbose.
    pub const ALL: [Level; 5] = [
        Level::Error,
        Level::Warn,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    /// Return the string representation of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Level, Self::Err> {
        for level in Level::ALL {
            if s.trim().eq_ignore_ascii_case(level.as_str()) {
                return Ok(level);
            }
        }

        Err(Error::new(format!("malformed level: {s:?}")))
    }
}

/// One resolved logging call on its way to a sink.
///
/// An event is created once per call, after the message has been formatted, and is owned by
/// the calling thread. The layout pipeline renders into its buffer, which starts empty and can
/// only be appended to; the event writer then consumes the buffer.
///
/// # Examples
///
/// ```
/// use plainlog::format::Value;
/// use plainlog::record::Level;
/// use plainlog::record::LogEvent;
///
/// let event = LogEvent::build("app::db", Level::Info, Some("{} rows"), &[Value::from(3)], None);
/// assert_eq!(event.message(), Some("3 rows"));
/// assert!(event.buffer().is_empty());
/// ```
#[derive(Debug)]
pub struct LogEvent {
    logger_name: String,
    level: Level,
    message: Option<String>,
    throwable: Option<Arc<Throwable>>,
    created_at_millis: i64,
    buffer: String,
}

impl LogEvent {
    /// Create an event from an already resolved message.
    pub fn new(
        logger_name: impl Into<String>,
        level: Level,
        message: Option<String>,
        throwable: Option<Arc<Throwable>>,
    ) -> Self {
        Self {
            logger_name: logger_name.into(),
            level,
            message,
            throwable,
            created_at_millis: now_millis(),
            buffer: String::with_capacity(128),
        }
    }

    /// Format `template` with `args` and create an event from the result.
    ///
    /// The arguments are formatted in array mode: a trailing [`Value::Throwable`] becomes the
    /// event's throwable unless `throwable` is given explicitly, in which case the explicit one
    /// wins and no argument is extracted.
    pub fn build(
        logger_name: impl Into<String>,
        level: Level,
        template: Option<&str>,
        args: &[Value],
        throwable: Option<Arc<Throwable>>,
    ) -> Self {
        let tuple = match throwable {
            Some(throwable) => format::format_array_with_throwable(template, args, Some(throwable)),
            None => format::format_array(template, args),
        };
        let (message, throwable) = tuple.into_parts();
        Self::new(logger_name, level, message, throwable)
    }

    /// Override the creation timestamp, in milliseconds since the Unix epoch.
    pub fn with_created_at_millis(mut self, millis: i64) -> Self {
        self.created_at_millis = millis;
        self
    }

    /// The name of the logger that produced this event.
    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    /// The level of this event.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The resolved message. `None` if the call passed no template.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The attached throwable, if any.
    pub fn throwable(&self) -> Option<&Arc<Throwable>> {
        self.throwable.as_ref()
    }

    /// The creation time in milliseconds since the Unix epoch.
    pub fn created_at_millis(&self) -> i64 {
        self.created_at_millis
    }

    /// The text rendered so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// The length of the text rendered so far, in bytes.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Append text to the buffer.
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.buffer.push_str(text);
        self
    }

    /// Append one character to the buffer.
    pub fn append_char(&mut self, c: char) -> &mut Self {
        self.buffer.push(c);
        self
    }

    /// Append a displayable value to the buffer.
    pub fn append_display(&mut self, value: impl fmt::Display) -> &mut Self {
        use std::fmt::Write;

        // SAFETY: write to a string always succeeds
        write!(&mut self.buffer, "{value}").unwrap();
        self
    }

    /// Consume the event and return the rendered text.
    pub fn into_buffer(self) -> String {
        self.buffer
    }
}

pub(crate) fn now_millis() -> i64 {
    match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(dur) => dur.as_millis() as i64,
        Err(err) => -(err.duration().as_millis() as i64),
    }
}
