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

use crate::Error;
use crate::Trap;
use crate::append::Charset;
use crate::append::SharedSink;
use crate::record::LogEvent;

/// Encodes rendered events and writes each one to its sink in a single locked write.
///
/// A record is written and flushed while the sink lock is held, so records of concurrent
/// callers never interleave. Write failures are reported to the trap and never reach the
/// caller.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use plainlog::append::Charset;
/// use plainlog::append::EventWriter;
/// use plainlog::append::SharedSink;
/// use plainlog::append::Testing;
/// use plainlog::record::Level;
/// use plainlog::record::LogEvent;
/// use plainlog::trap::DefaultTrap;
///
/// let sink = Testing::default();
/// let writer = EventWriter::new(
///     SharedSink::new(sink.clone()),
///     Charset::Utf8,
///     Arc::new(DefaultTrap::default()),
/// );
///
/// let mut event = LogEvent::new("app", Level::Info, Some("ready".to_string()), None);
/// event.append("INFO ready\n");
/// writer.write(&event);
/// assert_eq!(sink.text(), "INFO ready\n");
/// ```
#[derive(Debug)]
pub struct EventWriter {
    sink: SharedSink,
    charset: Charset,
    trap: Arc<dyn Trap>,
}

impl EventWriter {
    /// Create a writer for `sink`.
    pub fn new(sink: SharedSink, charset: Charset, trap: Arc<dyn Trap>) -> Self {
        Self {
            sink,
            charset,
            trap,
        }
    }

    /// The sink this writer writes to.
    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    /// The charset events are encoded with.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Write the rendered buffer of `event`.
    pub fn write(&self, event: &LogEvent) {
        let bytes = self.charset.encode(event.buffer());
        let result = {
            let mut sink = self.sink.lock();
            sink.write_all(&bytes).and_then(|()| sink.flush())
        };

        if let Err(err) = result {
            let err = Error::new("failed to write log event")
                .with_context("sink", self.sink.id())
                .with_context("bytes", bytes.len())
                .with_source(err);
            self.trap.trap(&err);
        }
    }

    /// Flush the sink.
    pub fn flush(&self) {
        let result = self.sink.lock().flush();
        if let Err(err) = result {
            let err = Error::new("failed to flush sink")
                .with_context("sink", self.sink.id())
                .with_source(err);
            self.trap.trap(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::Sink;
    use crate::append::SinkId;
    use crate::append::Testing;
    use crate::record::Level;
    use crate::trap::tests::RecordingTrap;

    #[derive(Debug)]
    struct BrokenPipe;

    impl Sink for BrokenPipe {
        fn id(&self) -> SinkId {
            SinkId::Address(0)
        }

        fn write_all(&mut self, _: &[u8]) -> Result<(), Error> {
            Err(Error::from_io_error(std::io::Error::from(
                std::io::ErrorKind::BrokenPipe,
            )))
        }

        fn flush(&mut self) -> Result<(), Error> {
            Ok(())
        }
    }

    fn rendered(text: &str) -> LogEvent {
        let mut event = LogEvent::new("test", Level::Info, None, None);
        event.append(text);
        event
    }

    #[test]
    fn failures_go_to_the_trap() {
        let trap = RecordingTrap::default();
        let writer = EventWriter::new(
            SharedSink::new(BrokenPipe),
            Charset::Utf8,
            Arc::new(trap.clone()),
        );
        writer.write(&rendered("lost\n"));

        let messages = trap.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("failed to write log event"));
        assert!(messages[0].contains("bytes: 5"));
    }

    #[test]
    fn encodes_with_charset() {
        let sink = Testing::default();
        let writer = EventWriter::new(
            SharedSink::new(sink.clone()),
            Charset::Ascii,
            Arc::new(RecordingTrap::default()),
        );
        writer.write(&rendered("café\n"));
        assert_eq!(sink.bytes(), b"caf?\n");
    }
}
