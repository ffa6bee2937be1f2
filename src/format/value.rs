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

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::sync::RwLock;

use crate::Error;
use crate::throwable::Throwable;

/// A message argument.
///
/// Arguments form a closed set of kinds: scalars, arbitrary displayable values, deferred
/// suppliers, arrays of primitives, shared object arrays (which may nest and even contain
/// themselves) and throwables.
///
/// # Examples
///
/// ```
/// use plainlog::format::ArrayRef;
/// use plainlog::format::Value;
///
/// let nested = ArrayRef::new(vec![Value::from(2), Value::from(3)]);
/// let args = [Value::from(1), Value::from(nested)];
/// let tuple = plainlog::format::format_array(Some("{} {}"), &args);
/// assert_eq!(tuple.message(), Some("1 [2, 3]"));
/// ```
#[derive(Clone)]
pub enum Value {
    /// The absent value, rendered as `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    I64(i64),
    /// An unsigned integer.
    U64(u64),
    /// A floating point number, always rendered with a fractional part.
    F64(f64),
    /// A character.
    Char(char),
    /// A string.
    Str(Cow<'static, str>),
    /// Any displayable value. Its conversion may fail.
    Display(Arc<dyn fmt::Display + Send + Sync>),
    /// A supplier evaluated at render time.
    Deferred(Arc<dyn Fn() -> Result<Value, Error> + Send + Sync>),
    /// An array of primitives.
    Primitives(Primitives),
    /// A shared array of values.
    Array(ArrayRef),
    /// A throwable. As the last argument of an array-mode call it is attached to the record
    /// instead of being rendered.
    Throwable(Arc<Throwable>),
}

impl Value {
    /// Wrap any displayable value.
    pub fn display(value: impl fmt::Display + Send + Sync + 'static) -> Value {
        Value::Display(Arc::new(value))
    }

    /// Wrap a supplier that is evaluated only when the message is rendered.
    pub fn deferred<F>(supplier: F) -> Value
    where
        F: Fn() -> Result<Value, Error> + Send + Sync + 'static,
    {
        Value::Deferred(Arc::new(supplier))
    }

    /// Whether this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Value::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Value::Display(_) => f.write_str("Display(..)"),
            Value::Deferred(_) => f.write_str("Deferred(..)"),
            Value::Primitives(v) => f.debug_tuple("Primitives").field(v).finish(),
            Value::Array(v) => f.debug_tuple("Array").field(&v.len()).finish(),
            Value::Throwable(v) => f.debug_tuple("Throwable").field(&v.to_string()).finish(),
        }
    }
}

/// An array of primitive values. Elements cannot contain further arrays.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitives {
    /// `[bool]`
    Bool(Arc<[bool]>),
    /// `[u8]`
    Byte(Arc<[u8]>),
    /// `[char]`
    Char(Arc<[char]>),
    /// `[i16]`
    Short(Arc<[i16]>),
    /// `[i32]`
    Int(Arc<[i32]>),
    /// `[i64]`
    Long(Arc<[i64]>),
    /// `[f32]`
    Float(Arc<[f32]>),
    /// `[f64]`
    Double(Arc<[f64]>),
}

impl Primitives {
    /// The number of elements.
    pub fn len(&self) -> usize {
        match self {
            Primitives::Bool(a) => a.len(),
            Primitives::Byte(a) => a.len(),
            Primitives::Char(a) => a.len(),
            Primitives::Short(a) => a.len(),
            Primitives::Int(a) => a.len(),
            Primitives::Long(a) => a.len(),
            Primitives::Float(a) => a.len(),
            Primitives::Double(a) => a.len(),
        }
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A shared, mutable array of values compared by identity.
///
/// Clones refer to the same array, so an array can be stored inside itself. Renderers detect
/// such cycles by the address of the shared allocation, never by comparing contents.
///
/// # Examples
///
/// ```
/// use plainlog::format::ArrayRef;
/// use plainlog::format::Value;
///
/// let cyclic = ArrayRef::new(vec![]);
/// cyclic.push(Value::from(cyclic.clone()));
/// let tuple = plainlog::format::format(Some("{}"), &Value::from(cyclic));
/// assert_eq!(tuple.message(), Some("[[...]]"));
/// ```
#[derive(Clone, Default)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ArrayRef {
    /// Create an array holding `values`.
    pub fn new(values: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(values)))
    }

    /// Append a value.
    pub fn push(&self, value: Value) {
        self.0.write().unwrap_or_else(|e| e.into_inner()).push(value);
    }

    /// Replace the value at `index`.
    ///
    /// # Panics
    ///
    /// Panic if `index` is out of bounds.
    pub fn set(&self, index: usize, value: Value) {
        self.0.write().unwrap_or_else(|e| e.into_inner())[index] = value;
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.0.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of the current elements. Nested arrays stay shared.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Whether both handles refer to the same array.
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// The identity of this array.
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayRef")
            .field("addr", &self.addr())
            .field("len", &self.len())
            .finish()
    }
}

impl From<ArrayRef> for Value {
    fn from(value: ArrayRef) -> Self {
        Value::Array(value)
    }
}

impl From<Primitives> for Value {
    fn from(value: Primitives) -> Self {
        Value::Primitives(value)
    }
}

impl From<Arc<Throwable>> for Value {
    fn from(value: Arc<Throwable>) -> Self {
        Value::Throwable(value)
    }
}

impl From<Throwable> for Value {
    fn from(value: Throwable) -> Self {
        Value::Throwable(Arc::new(value))
    }
}

impl From<&'static str> for Value {
    fn from(value: &'static str) -> Self {
        Value::Str(Cow::Borrowed(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Cow::Owned(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::$variant(value as $target)
                }
            }
        )*
    };
}

impl_from_int!(I64 as i64: i8, i16, i32, i64, isize);
impl_from_int!(U64 as u64: u8, u16, u32, u64, usize);

macro_rules! impl_from_primitive_vec {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<Vec<$t>> for Value {
                fn from(value: Vec<$t>) -> Self {
                    Value::Primitives(Primitives::$variant(value.into()))
                }
            }

            impl From<&[$t]> for Value {
                fn from(value: &[$t]) -> Self {
                    Value::Primitives(Primitives::$variant(value.into()))
                }
            }
        )*
    };
}

impl_from_primitive_vec!(
    bool => Bool,
    u8 => Byte,
    char => Char,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double
);

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(value))
    }
}
