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

//! Errors attached to log records, with stack frames, causes and suppressed errors.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;

/// One frame of a [`Throwable`] stack trace.
///
/// Two frames are equal when their class, method and line are equal. The file name and the
/// native flag do not take part in the comparison.
#[derive(Clone, Debug)]
pub struct StackFrame {
    class_name: String,
    method_name: String,
    file_name: Option<String>,
    line: Option<u32>,
    native: bool,
}

impl StackFrame {
    /// Create a frame for `class_name.method_name`.
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            file_name: None,
            line: None,
            native: false,
        }
    }

    /// Set the source location of this frame.
    pub fn at(mut self, file_name: impl Into<String>, line: u32) -> Self {
        self.file_name = Some(file_name.into());
        self.line = Some(line);
        self
    }

    /// Set the source file of this frame without a line.
    pub fn file(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Mark this frame as a native method.
    pub fn native(mut self) -> Self {
        self.native = true;
        self
    }

    /// The class (or module path) owning the method.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The method (or function) name.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The source file name, if known.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The line, if known.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Whether this frame is a native method.
    pub fn is_native(&self) -> bool {
        self.native
    }
}

impl PartialEq for StackFrame {
    fn eq(&self, other: &Self) -> bool {
        self.class_name == other.class_name
            && self.method_name == other.method_name
            && self.line == other.line
    }
}

impl Eq for StackFrame {}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class_name, self.method_name)?;
        if self.native {
            return f.write_str("(Native Method)");
        }
        match (&self.file_name, self.line) {
            (Some(file), Some(line)) => write!(f, "({file}:{line})"),
            (Some(file), None) => write!(f, "({file})"),
            (None, _) => f.write_str("(Unknown Source)"),
        }
    }
}

/// An error value that can be attached to a log record.
///
/// A throwable carries a class name, an optional message and its stack frames. The cause can
/// be set once after construction and suppressed throwables can be added at any time, which
/// makes cyclic cause chains constructible. Renderers guard against such cycles.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use plainlog::throwable::StackFrame;
/// use plainlog::throwable::Throwable;
///
/// let cause = Arc::new(Throwable::new("io::Error").message("connection reset"));
/// let err = Throwable::new("app::FetchError")
///     .message("failed to fetch")
///     .frame(StackFrame::new("app::client", "fetch").at("client.rs", 42))
///     .caused_by(cause);
///
/// assert_eq!(err.to_string(), "app::FetchError: failed to fetch");
/// assert!(err.cause().is_some());
/// ```
pub struct Throwable {
    class_name: String,
    message: Option<String>,
    frames: Vec<StackFrame>,
    cause: OnceLock<Arc<Throwable>>,
    suppressed: Mutex<Vec<Arc<Throwable>>>,
}

impl Throwable {
    /// Create a throwable of the given class without a message.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: None,
            frames: vec![],
            cause: OnceLock::new(),
            suppressed: Mutex::new(vec![]),
        }
    }

    /// Set the message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Append one stack frame. Frames are listed innermost first.
    pub fn frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Replace all stack frames.
    pub fn frames(mut self, frames: impl IntoIterator<Item = StackFrame>) -> Self {
        self.frames = frames.into_iter().collect();
        self
    }

    /// Set the cause.
    pub fn caused_by(self, cause: Arc<Throwable>) -> Self {
        // a freshly built throwable has no cause yet
        let _ = self.cause.set(cause);
        self
    }

    /// Set the cause of an already shared throwable.
    ///
    /// Returns `false` if the cause had already been set.
    pub fn init_cause(&self, cause: Arc<Throwable>) -> bool {
        self.cause.set(cause).is_ok()
    }

    /// Add a suppressed throwable.
    pub fn add_suppressed(&self, suppressed: Arc<Throwable>) {
        self.suppressed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(suppressed);
    }

    /// The class name.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The message, if any.
    pub fn get_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The stack frames, innermost first.
    pub fn stack_frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// The cause, if any.
    pub fn cause(&self) -> Option<&Arc<Throwable>> {
        self.cause.get()
    }

    /// A snapshot of the suppressed throwables.
    pub fn suppressed(&self) -> Vec<Arc<Throwable>> {
        self.suppressed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Convert an error and its `source()` chain.
    ///
    /// The outermost throwable takes the type name of `E`. Sources are opaque trait objects
    /// and are named after the trait.
    pub fn from_error<E>(err: &E) -> Throwable
    where
        E: std::error::Error + 'static,
    {
        let mut chain = vec![];
        let mut source = err.source();
        while let Some(err) = source {
            chain.push(Throwable::new(SOURCE_CLASS_NAME).message(err.to_string()));
            source = err.source();
        }

        let head = Throwable::new(std::any::type_name::<E>()).message(err.to_string());
        link_chain(head, chain)
    }
}

const SOURCE_CLASS_NAME: &str = "dyn std::error::Error";

fn link_chain(head: Throwable, chain: Vec<Throwable>) -> Throwable {
    let cause = chain
        .into_iter()
        .rev()
        .fold(None::<Arc<Throwable>>, |inner, outer| {
            Some(Arc::new(match inner {
                Some(inner) => outer.caused_by(inner),
                None => outer,
            }))
        });
    match cause {
        Some(cause) => head.caused_by(cause),
        None => head,
    }
}

impl From<anyhow::Error> for Throwable {
    fn from(err: anyhow::Error) -> Self {
        let mut chain = err.chain();
        let head = match chain.next() {
            Some(head) => Throwable::new("anyhow::Error").message(head.to_string()),
            None => Throwable::new("anyhow::Error"),
        };
        let rest = chain
            .map(|err| Throwable::new(SOURCE_CLASS_NAME).message(err.to_string()))
            .collect();
        link_chain(head, rest)
    }
}

// Causes may form cycles, so the derived recursive form is not an option.
impl fmt::Debug for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throwable")
            .field("class_name", &self.class_name)
            .field("message", &self.message)
            .field("frames", &self.frames.len())
            .field("cause", &self.cause().map(|c| c.to_string()))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.class_name, message),
            None => f.write_str(&self.class_name),
        }
    }
}
