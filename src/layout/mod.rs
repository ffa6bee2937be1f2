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

//! Layouts render one part of an output line into the buffer of a log event.
//!
//! A [`LayoutPipeline`] holds the layouts enabled by a configuration, sorted by their
//! [`LayoutOrder`]. Rendering an event runs every layout of the pipeline once, in order.

use std::fmt;

use crate::Trap;
use crate::config::Config;
use crate::config::OutputFormat;
use crate::record::LogEvent;

mod environment;
mod json;
mod text;
mod time;
mod trace;

pub use self::time::TimestampFormatter;

/// The position of a layout within a line.
///
/// Layouts are sorted by this key when a pipeline is built. Layouts with the same key keep the
/// order in which they were added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayoutOrder {
    /// The event timestamp.
    DateTime,
    /// The implementation version.
    Implementation,
    /// The event level.
    Level,
    /// Selected environment variables.
    Environment,
    /// The name of the calling thread.
    Thread,
    /// The thread-local diagnostic context.
    Context,
    /// The logger name.
    LoggerName,
    /// The message.
    Message,
    /// The end of the message line.
    EventSeparator,
    /// The attached throwable.
    Throwable,
    /// Tokens closing the whole event.
    EventEnd,
}

/// A layout renders one part of a line.
///
/// Layouts only append to the event buffer and are shared by all threads that log through the
/// same pipeline.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// The position of this layout within a line.
    fn order(&self) -> LayoutOrder;

    /// Append the text of this layout to the buffer of `event`.
    fn render(&self, event: &mut LogEvent);
}

impl<T: Layout> From<T> for Box<dyn Layout> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// The ordered layouts of one configuration.
///
/// # Examples
///
/// ```
/// use plainlog::config::Config;
/// use plainlog::layout::LayoutPipeline;
/// use plainlog::record::Level;
/// use plainlog::record::LogEvent;
/// use plainlog::trap::DefaultTrap;
///
/// let config = Config::default().show_thread_name(false);
/// let pipeline = LayoutPipeline::build(&config, &DefaultTrap::default());
///
/// let mut event = LogEvent::build("app", Level::Info, Some("ready"), &[], None);
/// pipeline.render(&mut event);
/// assert_eq!(event.buffer(), "INFO app - ready\n");
/// ```
#[derive(Debug)]
pub struct LayoutPipeline {
    layouts: Vec<Box<dyn Layout>>,
}

impl LayoutPipeline {
    /// Build the pipeline enabled by `config`.
    ///
    /// Unusable configuration values are reported to `trap` and replaced by their defaults.
    pub fn build(config: &Config, trap: &dyn Trap) -> Self {
        let layouts = match config.format {
            OutputFormat::Text => text::layouts(config, trap),
            OutputFormat::Json => json::layouts(config, trap),
        };
        Self::from_layouts(layouts)
    }

    /// Build a pipeline from custom layouts.
    pub fn from_layouts(mut layouts: Vec<Box<dyn Layout>>) -> Self {
        layouts.sort_by_key(|layout| layout.order());
        Self { layouts }
    }

    /// Render `event` by running every layout in order.
    pub fn render(&self, event: &mut LogEvent) {
        for layout in self.layouts.iter() {
            layout.render(event);
        }
    }

    /// The order keys of the layouts, in rendering order.
    pub fn orders(&self) -> Vec<LayoutOrder> {
        self.layouts.iter().map(|layout| layout.order()).collect()
    }
}

fn with_thread_name<R>(f: impl FnOnce(&str) -> R) -> R {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => f(name),
        None => f(&format!("{:?}", thread.id())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Level;
    use crate::trap::tests::RecordingTrap;

    #[derive(Debug)]
    struct Fixed(LayoutOrder, &'static str);

    impl Layout for Fixed {
        fn order(&self) -> LayoutOrder {
            self.0
        }

        fn render(&self, event: &mut LogEvent) {
            event.append(self.1);
        }
    }

    #[test]
    fn custom_layouts_are_sorted_stably() {
        let pipeline = LayoutPipeline::from_layouts(vec![
            Fixed(LayoutOrder::Message, "m").into(),
            Fixed(LayoutOrder::Level, "l1").into(),
            Fixed(LayoutOrder::DateTime, "t").into(),
            Fixed(LayoutOrder::Level, "l2").into(),
        ]);

        let mut event = LogEvent::new("test", Level::Info, None, None);
        pipeline.render(&mut event);
        assert_eq!(event.buffer(), "tl1l2m");
    }

    #[test]
    fn text_orders_follow_configuration() {
        let config = Config::default()
            .show_date_time(true)
            .show_implementation_version(true)
            .environments(["HOME"])
            .show_context(true);
        let pipeline = LayoutPipeline::build(&config, &RecordingTrap::default());
        assert_eq!(
            pipeline.orders(),
            [
                LayoutOrder::DateTime,
                LayoutOrder::Implementation,
                LayoutOrder::Level,
                LayoutOrder::Environment,
                LayoutOrder::Thread,
                LayoutOrder::Context,
                LayoutOrder::LoggerName,
                LayoutOrder::Message,
                LayoutOrder::EventSeparator,
                LayoutOrder::Throwable,
            ]
        );

        let pipeline = LayoutPipeline::build(&Config::default(), &RecordingTrap::default());
        assert_eq!(
            pipeline.orders(),
            [
                LayoutOrder::Level,
                LayoutOrder::Thread,
                LayoutOrder::LoggerName,
                LayoutOrder::Message,
                LayoutOrder::EventSeparator,
                LayoutOrder::Throwable,
            ]
        );
    }

    #[test]
    fn unnamed_threads_print_their_id() {
        let name = std::thread::spawn(|| with_thread_name(str::to_string))
            .join()
            .unwrap();
        assert!(name.starts_with("ThreadId("));

        let name = std::thread::Builder::new()
            .name("worker-1".to_string())
            .spawn(|| with_thread_name(str::to_string))
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(name, "worker-1");
    }
}
