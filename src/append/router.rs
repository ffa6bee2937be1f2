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

use crate::Trap;
use crate::append::Charset;
use crate::append::EventWriter;
use crate::append::SharedSink;
use crate::append::Sink;
use crate::record::Level;
use crate::record::LogEvent;

/// The sink of each level.
///
/// Sinks are merged by [`SinkId`](crate::append::SinkId): routing two levels to sinks with the
/// same id makes both levels share the first sink and its lock.
///
/// # Examples
///
/// ```
/// use plainlog::append::Routes;
/// use plainlog::append::Stderr;
/// use plainlog::append::Stdout;
/// use plainlog::record::Level;
///
/// let routes = Routes::new(Stdout::default())
///     .route(Level::Warn, Stderr::default())
///     .route(Level::Error, Stderr::default());
/// assert!(routes.sink(Level::Warn).ptr_eq(routes.sink(Level::Error)));
/// assert!(!routes.sink(Level::Info).ptr_eq(routes.sink(Level::Error)));
/// ```
#[derive(Debug, Clone)]
pub struct Routes {
    sinks: Vec<SharedSink>,
    levels: [usize; 5],
}

impl Routes {
    /// Route every level to `sink`.
    pub fn new(sink: impl Into<Box<dyn Sink>>) -> Self {
        Self {
            sinks: vec![SharedSink::new(sink)],
            levels: [0; 5],
        }
    }

    /// Route `level` to `sink`.
    pub fn route(mut self, level: Level, sink: impl Into<Box<dyn Sink>>) -> Self {
        let sink = sink.into();
        let id = sink.id();
        let index = match self.sinks.iter().position(|s| *s.id() == id) {
            Some(index) => index,
            None => {
                self.sinks.push(SharedSink::new(sink));
                self.sinks.len() - 1
            }
        };
        self.levels[level.index()] = index;
        self
    }

    /// The sink of `level`.
    pub fn sink(&self, level: Level) -> &SharedSink {
        &self.sinks[self.levels[level.index()]]
    }
}

/// Dispatches events to the writer of their level.
///
/// There is one [`EventWriter`] per distinct sink, shared by all levels routed to it.
#[derive(Debug)]
pub struct Router {
    writers: Vec<Arc<EventWriter>>,
    levels: [usize; 5],
}

impl Router {
    /// Create one writer per sink of `routes`.
    pub fn new(routes: &Routes, charset: Charset, trap: Arc<dyn Trap>) -> Self {
        let writers = routes
            .sinks
            .iter()
            .map(|sink| Arc::new(EventWriter::new(sink.clone(), charset, trap.clone())))
            .collect();
        Self {
            writers,
            levels: routes.levels,
        }
    }

    /// The writer of `level`.
    pub fn writer(&self, level: Level) -> &Arc<EventWriter> {
        &self.writers[self.levels[level.index()]]
    }

    /// Write `event` with the writer of its level.
    pub fn write(&self, event: &LogEvent) {
        self.writer(event.level()).write(event);
    }

    /// Flush every sink once.
    pub fn flush(&self) {
        for writer in self.writers.iter() {
            writer.flush();
        }
    }
}
