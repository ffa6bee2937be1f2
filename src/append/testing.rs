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

use crate::Error;
use crate::append::Sink;
use crate::append::SinkId;

/// A sink that collects written bytes in memory, so tests can inspect the output.
///
/// Clones share the same buffer and report the same [`SinkId`].
///
/// # Examples
///
/// ```
/// use plainlog::append::Testing;
///
/// let sink = Testing::default();
/// let handle = sink.clone();
/// assert!(handle.text().is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct Testing {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Testing {
    /// A copy of the bytes written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The bytes written so far, decoded as UTF-8 with replacement characters.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    /// The lines written so far, without line terminators.
    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }

    /// Discard everything written so far.
    pub fn clear(&self) {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Sink for Testing {
    fn id(&self) -> SinkId {
        SinkId::Address(Arc::as_ptr(&self.buffer) as usize)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
