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

//! Substitute positional `{}` placeholders in message templates.
//!
//! Scanning runs left to right. A placeholder preceded by one backslash is escaped: it renders
//! as a literal `{}` and does not consume an argument. A placeholder preceded by two
//! backslashes renders one backslash followed by the argument. Placeholders left over when the
//! arguments run out stay verbatim, and arguments left over when the placeholders run out are
//! ignored.
//!
//! # Examples
//!
//! ```
//! use plainlog::format;
//! use plainlog::format::Value;
//!
//! let tuple = format::format2(Some("Hi {}. My name is {}."), &Value::from("Alice"), &Value::from("Bob"));
//! assert_eq!(tuple.message(), Some("Hi Alice. My name is Bob."));
//!
//! let tuple = format::format(Some("Set \\{} differs from {}"), &Value::from(3));
//! assert_eq!(tuple.message(), Some("Set {} differs from 3"));
//! ```

use std::sync::Arc;

use crate::throwable::Throwable;

mod render;
mod value;

pub use self::render::FAILED_TO_STRING;
pub(crate) use self::render::safe_append;
pub use self::render::render_value;
pub use self::value::ArrayRef;
pub use self::value::Primitives;
pub use self::value::Value;

const DELIM: &str = "{}";
const ESCAPE: u8 = b'\\';

/// The result of formatting a template.
#[derive(Debug, Clone, Default)]
pub struct FormattingTuple {
    message: Option<String>,
    args: Vec<Value>,
    throwable: Option<Arc<Throwable>>,
}

impl FormattingTuple {
    /// The resolved message. `None` when the template was `None`.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The arguments the message was formatted with, without an extracted throwable.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The throwable attached to the message, if any.
    pub fn throwable(&self) -> Option<&Arc<Throwable>> {
        self.throwable.as_ref()
    }

    /// Split into the message and the throwable.
    pub fn into_parts(self) -> (Option<String>, Option<Arc<Throwable>>) {
        (self.message, self.throwable)
    }
}

/// Format a template with one argument.
pub fn format(template: Option<&str>, arg: &Value) -> FormattingTuple {
    format_with(template, std::slice::from_ref(arg), None)
}

/// Format a template with two arguments.
///
/// If the template holds a single placeholder, the second argument is dropped.
pub fn format2(template: Option<&str>, arg1: &Value, arg2: &Value) -> FormattingTuple {
    format_with(template, &[arg1.clone(), arg2.clone()], None)
}

/// Format a template with any number of arguments.
///
/// If the last argument is a [`Value::Throwable`], it is removed from the arguments and
/// returned as the throwable of the tuple instead of being rendered.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use plainlog::format;
/// use plainlog::format::Value;
/// use plainlog::throwable::Throwable;
///
/// let err = Arc::new(Throwable::new("io::Error"));
/// let args = [Value::from(1), Value::from(2), Value::from(err)];
/// let tuple = format::format_array(Some("{}{}{}"), &args);
/// assert_eq!(tuple.message(), Some("12{}"));
/// assert!(tuple.throwable().is_some());
/// ```
pub fn format_array(template: Option<&str>, args: &[Value]) -> FormattingTuple {
    match args.split_last() {
        Some((Value::Throwable(throwable), rest)) => {
            format_with(template, rest, Some(throwable.clone()))
        }
        _ => format_with(template, args, None),
    }
}

/// Format a template with any number of arguments and an explicit throwable.
///
/// No argument is extracted, a trailing [`Value::Throwable`] renders like any other value.
pub fn format_array_with_throwable(
    template: Option<&str>,
    args: &[Value],
    throwable: Option<Arc<Throwable>>,
) -> FormattingTuple {
    format_with(template, args, throwable)
}

fn format_with(
    template: Option<&str>,
    args: &[Value],
    throwable: Option<Arc<Throwable>>,
) -> FormattingTuple {
    let message = template.map(|template| substitute(template, args));
    FormattingTuple {
        message,
        args: args.to_vec(),
        throwable,
    }
}

fn substitute(template: &str, args: &[Value]) -> String {
    if args.is_empty() {
        return template.to_string();
    }

    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len() + 16 * args.len());
    let mut i = 0;
    let mut next = 0;

    while next < args.len() {
        let Some(found) = template[i..].find(DELIM) else {
            break;
        };
        let j = i + found;

        if j >= 1 && bytes[j - 1] == ESCAPE {
            if j >= 2 && bytes[j - 2] == ESCAPE {
                // double escape: keep one backslash and substitute
                out.push_str(&template[i..j - 1]);
                render_value(&mut out, &args[next]);
                next += 1;
                i = j + DELIM.len();
            } else {
                // escaped: the argument stays for the next placeholder
                out.push_str(&template[i..j - 1]);
                out.push('{');
                i = j + 1;
            }
        } else {
            out.push_str(&template[i..j]);
            render_value(&mut out, &args[next]);
            next += 1;
            i = j + DELIM.len();
        }
    }

    out.push_str(&template[i..]);
    out
}
