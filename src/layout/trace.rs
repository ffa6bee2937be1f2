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

use std::collections::HashSet;
use std::sync::Arc;

use crate::throwable::StackFrame;
use crate::throwable::Throwable;

pub(crate) const CAUSED_BY: &str = "Caused by: ";
pub(crate) const SUPPRESSED: &str = "Suppressed: ";

/// A visitor to walk through a throwable, its suppressed throwables and its causes.
pub(crate) trait TraceVisitor {
    /// Visits the caption of a throwable. `label` is empty for the outermost throwable.
    fn visit_caption(&mut self, prefix: &str, label: &str, throwable: &Throwable);

    /// Visits one frame that is not shared with the enclosing trace.
    fn visit_frame(&mut self, prefix: &str, throwable: &Throwable, index: usize, frame: &StackFrame);

    /// Visits the number of frames shared with the enclosing trace.
    fn visit_elided(&mut self, prefix: &str, count: usize);

    /// Visits a throwable that has already been visited.
    fn visit_circular(&mut self, prefix: &str, label: &str, throwable: &Throwable);
}

/// Walk `throwable` in stack trace order: frames, suppressed throwables, then the cause.
pub(crate) fn walk(throwable: &Arc<Throwable>, visitor: &mut impl TraceVisitor) {
    let mut visited = HashSet::new();
    visited.insert(addr(throwable));

    visitor.visit_caption("", "", throwable);
    let frames = throwable.stack_frames();
    for (i, frame) in frames.iter().enumerate() {
        visitor.visit_frame("", throwable, i, frame);
    }
    for suppressed in throwable.suppressed() {
        walk_enclosed(&suppressed, frames, "\t", SUPPRESSED, &mut visited, visitor);
    }
    if let Some(cause) = throwable.cause() {
        walk_enclosed(cause, frames, "", CAUSED_BY, &mut visited, visitor);
    }
}

fn walk_enclosed(
    throwable: &Arc<Throwable>,
    enclosing: &[StackFrame],
    prefix: &str,
    label: &str,
    visited: &mut HashSet<usize>,
    visitor: &mut impl TraceVisitor,
) {
    if !visited.insert(addr(throwable)) {
        visitor.visit_circular(prefix, label, throwable);
        return;
    }

    let frames = throwable.stack_frames();
    let mut m = frames.len();
    let mut n = enclosing.len();
    while m > 0 && n > 0 && frames[m - 1] == enclosing[n - 1] {
        m -= 1;
        n -= 1;
    }
    let in_common = frames.len() - m;

    visitor.visit_caption(prefix, label, throwable);
    for (i, frame) in frames[..m].iter().enumerate() {
        visitor.visit_frame(prefix, throwable, i, frame);
    }
    if in_common != 0 {
        visitor.visit_elided(prefix, in_common);
    }

    let nested = format!("{prefix}\t");
    for suppressed in throwable.suppressed() {
        walk_enclosed(&suppressed, frames, &nested, SUPPRESSED, visited, visitor);
    }
    if let Some(cause) = throwable.cause() {
        walk_enclosed(cause, frames, prefix, CAUSED_BY, visited, visitor);
    }
}

fn addr(throwable: &Arc<Throwable>) -> usize {
    Arc::as_ptr(throwable) as usize
}
