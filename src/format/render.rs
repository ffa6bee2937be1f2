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

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write;
use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;

use crate::Error;
use crate::format::ArrayRef;
use crate::format::Primitives;
use crate::format::Value;
use crate::trap;

/// Replaces the text of a value that could not be converted.
pub const FAILED_TO_STRING: &str = "[FAILED toString()]";

/// Append the text of `value` to `out`.
///
/// Arrays are rendered recursively as `[a, b, c]`. An array that is already being rendered
/// further up the stack renders as `...`, so self-referencing arrays terminate. Conversions
/// that fail or panic render as [`FAILED_TO_STRING`] and are reported to the process-wide
/// trap.
///
/// # Examples
///
/// ```
/// use plainlog::format::Value;
/// use plainlog::format::render_value;
///
/// let mut out = String::new();
/// render_value(&mut out, &Value::from(vec![1.0f64, 2.5]));
/// assert_eq!(out, "[1.0, 2.5]");
/// ```
pub fn render_value(out: &mut String, value: &Value) {
    let mut seen = HashSet::new();
    deeply_append(out, value, &mut seen);
}

fn deeply_append(out: &mut String, value: &Value, seen: &mut HashSet<usize>) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(v) => append_display(out, v),
        Value::I64(v) => append_display(out, v),
        Value::U64(v) => append_display(out, v),
        Value::F64(v) => append_debug(out, v),
        Value::Char(v) => out.push(*v),
        Value::Str(v) => out.push_str(v),
        Value::Display(v) => safe_append(out, v.as_ref()),
        Value::Deferred(supplier) => match catch_unwind(AssertUnwindSafe(|| supplier())) {
            Ok(Ok(value)) => deeply_append(out, &value, seen),
            Ok(Err(err)) => {
                trap::report(&Error::new("failed to supply argument").with_source(err));
                out.push_str(FAILED_TO_STRING);
            }
            Err(payload) => {
                trap::report(
                    &Error::new("argument supplier panicked")
                        .with_context("panic", panic_message(payload.as_ref())),
                );
                out.push_str(FAILED_TO_STRING);
            }
        },
        Value::Primitives(array) => append_primitives(out, array),
        Value::Array(array) => append_array(out, array, seen),
        Value::Throwable(throwable) => append_display(out, throwable),
    }
}

fn append_array(out: &mut String, array: &ArrayRef, seen: &mut HashSet<usize>) {
    out.push('[');
    let addr = array.addr();
    if seen.insert(addr) {
        for (i, value) in array.snapshot().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            deeply_append(out, value, seen);
        }
        seen.remove(&addr);
    } else {
        out.push_str("...");
    }
    out.push(']');
}

fn append_primitives(out: &mut String, array: &Primitives) {
    match array {
        Primitives::Bool(a) => join(out, &a[..], append_display),
        Primitives::Byte(a) => join(out, &a[..], append_display),
        Primitives::Char(a) => join(out, &a[..], append_display),
        Primitives::Short(a) => join(out, &a[..], append_display),
        Primitives::Int(a) => join(out, &a[..], append_display),
        Primitives::Long(a) => join(out, &a[..], append_display),
        Primitives::Float(a) => join(out, &a[..], append_debug),
        Primitives::Double(a) => join(out, &a[..], append_debug),
    }
}

fn join<T>(out: &mut String, values: &[T], append: fn(&mut String, &T)) {
    out.push('[');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        append(out, value);
    }
    out.push(']');
}

fn append_display<T: fmt::Display + ?Sized>(out: &mut String, value: &T) {
    // SAFETY: write to a string always succeeds
    write!(out, "{value}").unwrap();
}

// Debug keeps the fractional part of whole floats.
fn append_debug<T: fmt::Debug>(out: &mut String, value: &T) {
    // SAFETY: write to a string always succeeds
    write!(out, "{value:?}").unwrap();
}

/// Append the text of `value`, or [`FAILED_TO_STRING`] if the conversion fails or panics.
pub(crate) fn safe_append(out: &mut String, value: &dyn fmt::Display) {
    let converted = catch_unwind(AssertUnwindSafe(|| {
        let mut text = String::new();
        write!(&mut text, "{value}").map(|()| text)
    }));

    match converted {
        Ok(Ok(text)) => out.push_str(&text),
        Ok(Err(err)) => {
            trap::report(&Error::from_fmt_error(err));
            out.push_str(FAILED_TO_STRING);
        }
        Err(payload) => {
            trap::report(
                &Error::new("argument conversion panicked")
                    .with_context("panic", panic_message(payload.as_ref())),
            );
            out.push_str(FAILED_TO_STRING);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}
