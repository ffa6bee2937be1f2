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

use std::io::Write;

use crate::Error;
use crate::append::Sink;
use crate::append::SinkId;

/// A sink that writes to stdout.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Stdout {}

impl Sink for Stdout {
    fn id(&self) -> SinkId {
        SinkId::Stdout
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        std::io::stdout()
            .write_all(bytes)
            .map_err(Error::from_io_error)
    }

    fn flush(&mut self) -> Result<(), Error> {
        std::io::stdout().flush().map_err(Error::from_io_error)
    }
}

/// A sink that writes to stderr.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct Stderr {}

impl Sink for Stderr {
    fn id(&self) -> SinkId {
        SinkId::Stderr
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        std::io::stderr()
            .write_all(bytes)
            .map_err(Error::from_io_error)
    }

    fn flush(&mut self) -> Result<(), Error> {
        std::io::stderr().flush().map_err(Error::from_io_error)
    }
}
