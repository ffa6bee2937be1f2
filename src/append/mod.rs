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

//! Write rendered events to output streams.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;

mod charset;
mod file;
mod router;
mod stdio;
mod testing;
mod writer;

pub use self::charset::Charset;
pub use self::file::File;
pub use self::router::Router;
pub use self::router::Routes;
pub use self::stdio::Stderr;
pub use self::stdio::Stdout;
pub use self::testing::Testing;
pub use self::writer::EventWriter;

/// The identity of the physical stream behind a sink.
///
/// Sinks with equal ids write to the same stream and are merged into one [`SharedSink`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SinkId {
    /// The standard output of the process.
    Stdout,
    /// The standard error of the process.
    Stderr,
    /// A file.
    Path(PathBuf),
    /// An in-process stream identified by its address.
    Address(usize),
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkId::Stdout => f.write_str("stdout"),
            SinkId::Stderr => f.write_str("stderr"),
            SinkId::Path(path) => write!(f, "{}", path.display()),
            SinkId::Address(addr) => write!(f, "{addr:#x}"),
        }
    }
}

/// A destination stream for encoded events.
///
/// A sink is only used under the lock of its [`SharedSink`], so it never sees two writes at
/// the same time.
pub trait Sink: fmt::Debug + Send + 'static {
    /// The identity of the underlying stream.
    fn id(&self) -> SinkId;

    /// Write all of `bytes`.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error>;

    /// Flush buffered bytes to the underlying stream.
    fn flush(&mut self) -> Result<(), Error>;
}

impl<T: Sink> From<T> for Box<dyn Sink> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// A sink behind the lock that serializes writes to its stream.
///
/// Clones share the sink and the lock.
#[derive(Debug, Clone)]
pub struct SharedSink {
    id: SinkId,
    sink: Arc<Mutex<Box<dyn Sink>>>,
}

impl SharedSink {
    /// Put `sink` behind a new lock.
    pub fn new(sink: impl Into<Box<dyn Sink>>) -> Self {
        let sink = sink.into();
        Self {
            id: sink.id(),
            sink: Arc::new(Mutex::new(sink)),
        }
    }

    /// The identity of the underlying stream.
    pub fn id(&self) -> &SinkId {
        &self.id
    }

    /// Whether both handles share the same lock.
    pub fn ptr_eq(&self, other: &SharedSink) -> bool {
        Arc::ptr_eq(&self.sink, &other.sink)
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Box<dyn Sink>> {
        self.sink.lock().unwrap_or_else(|e| e.into_inner())
    }
}
