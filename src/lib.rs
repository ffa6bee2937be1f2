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


//! Plainlog renders log records through an ordered layout pipeline and writes each record to
//! its sink as one atomic write.
//!
//! # Overview
//!
//! A log call goes through three stages:
//!
//! * [`format`] resolves `{}` placeholders in the message template. Arguments are
//!   [`format::Value`]s and nested arrays are rendered deeply, with cycles cut short.
//! * [`layout::LayoutPipeline`] renders the event fields (timestamp, level, thread, logger
//!   name, message, stack trace and more) in a fixed order, as text or JSON.
//! * [`append::EventWriter`] encodes the rendered text and writes and flushes it while holding
//!   the sink lock, so concurrent records never interleave.
//!
//! Failures never reach the caller: they are reported to a [`Trap`].
//!
//! # Examples
//!
//! ```
//! use plainlog::append;
//! use plainlog::config::Config;
//! use plainlog::format::Value;
//! use plainlog::record::Level;
//!
//! let logger = plainlog::builder()
//!     .config(Config::default().show_date_time(true))
//!     .sink(append::Stdout::default())
//!     .route(Level::Error, append::Stderr::default())
//!     .build();
//!
//! logger.info("app", "listening on {}:{}", &[Value::from("0.0.0.0"), Value::from(8080)]);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod append;
pub mod config;
pub mod diagnostic;
pub mod format;
pub mod layout;
pub mod record;
pub mod throwable;
pub mod trap;

pub use append::Sink;
pub use layout::Layout;
pub use trap::Trap;

mod error;
pub use error::Error;

mod logger;
pub use logger::*;

/// Bridges from other logging frameworks.
pub mod bridge {
    #[cfg(feature = "bridge-log")]
    pub mod log;
}
