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

//! The resolved configuration of a logger.
//!
//! The enums implement [`FromStr`] for loaders that read settings from text, such as
//! properties files or environment variables. Unknown names are returned as errors for the
//! loader to handle; a built [`Config`] only holds valid values.

use std::str::FromStr;

use jiff::tz::TimeZone;

use crate::Error;
use crate::record::Level;

/// The shape of one output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Space separated text.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "TEXT" => Ok(OutputFormat::Text),
            "JSON" => Ok(OutputFormat::Json),
            _ => Err(Error::new(format!("malformed output format: {s:?}"))),
        }
    }
}

/// How the timestamp of an event is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateTimeOutput {
    /// Local date and time, `2024-08-11T22:44:57.172` by default.
    #[default]
    DateTime,
    /// Local time of day, `22:44:57.172` by default.
    Time,
    /// Milliseconds since the Unix epoch.
    UnixTime,
    /// Milliseconds since [`Config::start_millis`].
    MillisFromStart,
}

impl FromStr for DateTimeOutput {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "DATETIME" => Ok(DateTimeOutput::DateTime),
            "TIME" => Ok(DateTimeOutput::Time),
            "UNIXTIME" => Ok(DateTimeOutput::UnixTime),
            "MILLISFROMSTART" => Ok(DateTimeOutput::MillisFromStart),
            _ => Err(Error::new(format!("malformed date time output: {s:?}"))),
        }
    }
}

/// How the logger name is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggerNameStyle {
    /// The full name, `app::db::pool`.
    #[default]
    Full,
    /// The last path segment, `pool`.
    Short,
    /// No logger name.
    Hidden,
}

impl LoggerNameStyle {
    pub(crate) fn apply<'a>(&self, name: &'a str) -> &'a str {
        match self {
            LoggerNameStyle::Full | LoggerNameStyle::Hidden => name,
            LoggerNameStyle::Short => {
                let tail = name.rsplit("::").next().unwrap_or(name);
                tail.rsplit('.').next().unwrap_or(tail)
            }
        }
    }
}

impl FromStr for LoggerNameStyle {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "FULL" => Ok(LoggerNameStyle::Full),
            "SHORT" => Ok(LoggerNameStyle::Short),
            "HIDDEN" | "NONE" => Ok(LoggerNameStyle::Hidden),
            _ => Err(Error::new(format!("malformed logger name style: {s:?}"))),
        }
    }
}

/// The label printed for each level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelLabels {
    labels: [String; 5],
}

impl Default for LevelLabels {
    fn default() -> Self {
        Self {
            labels: Level::ALL.map(|level| level.as_str().to_string()),
        }
    }
}

impl LevelLabels {
    /// Replace the label of one level.
    ///
    /// # Examples
    ///
    /// ```
    /// use plainlog::config::LevelLabels;
    /// use plainlog::record::Level;
    ///
    /// let labels = LevelLabels::default().with(Level::Warn, "WARNING");
    /// assert_eq!(labels.label(Level::Warn), "WARNING");
    /// assert_eq!(labels.label(Level::Info), "INFO");
    /// ```
    pub fn with(mut self, level: Level, label: impl Into<String>) -> Self {
        self.labels[level.index()] = label.into();
        self
    }

    /// The label of `level`.
    pub fn label(&self, level: Level) -> &str {
        &self.labels[level.index()]
    }
}

/// A resolved configuration snapshot.
///
/// The configuration is read-only once a pipeline has been built from it. To change the
/// output, build a new configuration and reconfigure the logger.
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use plainlog::config::Config;
/// use plainlog::config::DateTimeOutput;
///
/// let config = Config::default()
///     .show_date_time(true)
///     .date_time_output(DateTimeOutput::Time)
///     .timezone(TimeZone::UTC)
///     .level_in_brackets(true);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) format: OutputFormat,
    pub(crate) charset: Option<String>,
    pub(crate) show_date_time: bool,
    pub(crate) date_time_output: DateTimeOutput,
    pub(crate) date_time_pattern: Option<String>,
    pub(crate) timezone: TimeZone,
    pub(crate) show_implementation_version: bool,
    pub(crate) implementation_version: String,
    pub(crate) level_labels: LevelLabels,
    pub(crate) level_in_brackets: bool,
    pub(crate) environments: Vec<String>,
    pub(crate) environment_show_name: bool,
    pub(crate) environment_show_nullable: bool,
    pub(crate) environment_remember_on_start: bool,
    pub(crate) show_thread_name: bool,
    pub(crate) show_context: bool,
    pub(crate) logger_name: LoggerNameStyle,
    pub(crate) start_millis: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            charset: None,
            show_date_time: false,
            date_time_output: DateTimeOutput::DateTime,
            date_time_pattern: None,
            timezone: TimeZone::system(),
            show_implementation_version: false,
            implementation_version: concat!("plainlog-", env!("CARGO_PKG_VERSION")).to_string(),
            level_labels: LevelLabels::default(),
            level_in_brackets: false,
            environments: vec![],
            environment_show_name: false,
            environment_show_nullable: false,
            environment_remember_on_start: false,
            show_thread_name: true,
            show_context: false,
            logger_name: LoggerNameStyle::Full,
            start_millis: crate::record::now_millis(),
        }
    }
}

impl Config {
    /// Set the output format. Default to [`OutputFormat::Text`].
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the charset name used to encode output lines. Default to UTF-8.
    ///
    /// An unknown name falls back to UTF-8 when the writer is built.
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Print the event timestamp. Default to `false`.
    pub fn show_date_time(mut self, show: bool) -> Self {
        self.show_date_time = show;
        self
    }

    /// Set how the timestamp is printed.
    pub fn date_time_output(mut self, output: DateTimeOutput) -> Self {
        self.date_time_output = output;
        self
    }

    /// Set a custom strftime pattern for the date time and time outputs.
    ///
    /// See [`jiff::fmt::strtime`] for the supported directives. An unusable pattern falls back
    /// to the default pattern when the pipeline is built.
    pub fn date_time_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.date_time_pattern = Some(pattern.into());
        self
    }

    /// Set the time zone of printed timestamps. Default to the system time zone.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    /// Print the implementation version. Default to `false`.
    pub fn show_implementation_version(mut self, show: bool) -> Self {
        self.show_implementation_version = show;
        self
    }

    /// Set the printed implementation version.
    pub fn implementation_version(mut self, version: impl Into<String>) -> Self {
        self.implementation_version = version.into();
        self
    }

    /// Set the level labels.
    pub fn level_labels(mut self, labels: LevelLabels) -> Self {
        self.level_labels = labels;
        self
    }

    /// Print the level as `[INFO]` instead of `INFO` in text output. Default to `false`.
    pub fn level_in_brackets(mut self, brackets: bool) -> Self {
        self.level_in_brackets = brackets;
        self
    }

    /// Set the environment variables printed with every event.
    pub fn environments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments = names.into_iter().map(Into::into).collect();
        self
    }

    /// Print `NAME=value` instead of `value`. Default to `false`.
    pub fn environment_show_name(mut self, show: bool) -> Self {
        self.environment_show_name = show;
        self
    }

    /// Print unset environment variables as `null` instead of skipping them. Default to
    /// `false`.
    pub fn environment_show_nullable(mut self, show: bool) -> Self {
        self.environment_show_nullable = show;
        self
    }

    /// Read the environment once when the pipeline is built. Default to `false`.
    pub fn environment_remember_on_start(mut self, remember: bool) -> Self {
        self.environment_remember_on_start = remember;
        self
    }

    /// Print the name of the calling thread. Default to `true`.
    pub fn show_thread_name(mut self, show: bool) -> Self {
        self.show_thread_name = show;
        self
    }

    /// Print the thread-local diagnostic context. Default to `false`.
    pub fn show_context(mut self, show: bool) -> Self {
        self.show_context = show;
        self
    }

    /// Set how the logger name is printed. Default to [`LoggerNameStyle::Full`].
    pub fn logger_name(mut self, style: LoggerNameStyle) -> Self {
        self.logger_name = style;
        self
    }

    /// Set the start instant of [`DateTimeOutput::MillisFromStart`], in milliseconds since the
    /// Unix epoch. Default to the creation time of the configuration.
    pub fn start_millis(mut self, millis: i64) -> Self {
        self.start_millis = millis;
        self
    }

    /// The output format.
    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// The configured charset name, if any.
    pub fn charset_name(&self) -> Option<&str> {
        self.charset.as_deref()
    }
}

fn normalize(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_names_parse_loosely() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "DATE_TIME".parse::<DateTimeOutput>().unwrap(),
            DateTimeOutput::DateTime
        );
        assert_eq!(
            "millis-from-start".parse::<DateTimeOutput>().unwrap(),
            DateTimeOutput::MillisFromStart
        );
        assert_eq!(
            "short".parse::<LoggerNameStyle>().unwrap(),
            LoggerNameStyle::Short
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn short_logger_name() {
        let style = LoggerNameStyle::Short;
        assert_eq!(style.apply("app::db::pool"), "pool");
        assert_eq!(style.apply("io.goodforgod.App"), "App");
        assert_eq!(style.apply("main"), "main");
        assert_eq!(LoggerNameStyle::Full.apply("app::db"), "app::db");
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.output_format(), OutputFormat::Text);
        assert!(config.charset_name().is_none());
        assert!(config.show_thread_name);
        assert!(!config.show_date_time);
        assert_eq!(config.level_labels.label(Level::Error), "ERROR");
    }
}
