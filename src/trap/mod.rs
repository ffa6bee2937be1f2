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

//! Traps for errors that must not reach the logging caller.
//!
//! A log call never fails. Failed value conversions, sink I/O errors and unusable
//! configuration values are reported to a trap instead and then recovered from.

use std::fmt;
use std::sync::Arc;
use std::sync::LazyLock;

use arc_swap::ArcSwap;

use crate::Error;

mod default;

pub use self::default::DefaultTrap;

/// A trap receives errors that the logging pipeline recovered from.
pub trait Trap: fmt::Debug + Send + Sync + 'static {
    /// Handle an error.
    fn trap(&self, err: &Error);
}

impl<T: Trap> From<T> for Box<dyn Trap> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

static GLOBAL_TRAP: LazyLock<ArcSwap<Box<dyn Trap>>> = LazyLock::new(|| {
    let trap: Box<dyn Trap> = Box::new(DefaultTrap::default());
    ArcSwap::from_pointee(trap)
});

/// Replace the process-wide trap.
///
/// The process-wide trap serves the message formatter, which has no logger at hand. Loggers
/// and writers carry their own trap.
///
/// # Examples
///
/// ```
/// use plainlog::trap::DefaultTrap;
///
/// plainlog::trap::set_global_trap(DefaultTrap::default());
/// ```
pub fn set_global_trap(trap: impl Into<Box<dyn Trap>>) {
    GLOBAL_TRAP.store(Arc::new(trap.into()));
}

/// Report an error to the process-wide trap.
pub fn report(err: &Error) {
    GLOBAL_TRAP.load().trap(err);
}
