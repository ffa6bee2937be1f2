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

use std::cell::RefCell;
use std::collections::BTreeMap;

thread_local! {
    static CONTEXT: RefCell<BTreeMap<String, String>> = const { RefCell::new(BTreeMap::new()) };
}

/// A diagnostic that stores key-value pairs in a thread-local map.
///
/// The context layout prints the map of the calling thread, ordered by key.
///
/// ## Example
///
/// ```rust
/// use plainlog::diagnostic::ThreadLocalDiagnostic;
///
/// ThreadLocalDiagnostic::insert("request_id", "42");
/// assert_eq!(ThreadLocalDiagnostic::snapshot().len(), 1);
/// ThreadLocalDiagnostic::remove("request_id");
/// ```
#[derive(Default, Debug, Clone, Copy)]
#[non_exhaustive]
pub struct ThreadLocalDiagnostic {}

impl ThreadLocalDiagnostic {
    /// Inserts a key-value pair into the thread local diagnostic .
    pub fn insert<K, V>(key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        CONTEXT.with(|map| {
            map.borrow_mut().insert(key.into(), value.into());
        });
    }

    /// Removes a key-value pair from the thread local diagnostic.
    pub fn remove(key: &str) {
        CONTEXT.with(|map| {
            map.borrow_mut().remove(key);
        });
    }

    /// Removes all key-value pairs of the calling thread.
    pub fn clear() {
        CONTEXT.with(|map| map.borrow_mut().clear());
    }

    /// Returns a copy of the key-value pairs of the calling thread.
    pub fn snapshot() -> BTreeMap<String, String> {
        CONTEXT.with(|map| map.borrow().clone())
    }

    /// Visits the key-value pairs of the calling thread in key order.
    pub fn visit<F>(mut visitor: F)
    where
        F: FnMut(&str, &str),
    {
        CONTEXT.with(|map| {
            for (key, value) in map.borrow().iter() {
                visitor(key.as_str(), value.as_str());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_per_thread() {
        ThreadLocalDiagnostic::insert("b", "2");
        ThreadLocalDiagnostic::insert("a", "1");

        let mut seen = vec![];
        ThreadLocalDiagnostic::visit(|k, v| seen.push(format!("{k}={v}")));
        assert_eq!(seen, ["a=1", "b=2"]);

        let other = std::thread::spawn(ThreadLocalDiagnostic::snapshot)
            .join()
            .unwrap();
        assert!(other.is_empty());

        ThreadLocalDiagnostic::clear();
        assert!(ThreadLocalDiagnostic::snapshot().is_empty());
    }
}
