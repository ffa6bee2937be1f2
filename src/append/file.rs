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

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::Error;
use crate::append::Sink;
use crate::append::SinkId;

/// A sink that appends to a file.
///
/// # Examples
///
/// ```
/// use plainlog::append::File;
///
/// let dir = tempfile::tempdir().unwrap();
/// let file = File::open(dir.path().join("app.log")).unwrap();
/// ```
#[derive(Debug)]
pub struct File {
    path: PathBuf,
    file: std::fs::File,
}

impl File {
    /// Open `path` for appending, creating the file and its parent directories if needed.
    ///
    /// # Errors
    ///
    /// Return an error if the parent directory cannot be created or the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<File, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    Error::new("failed to create log directory")
                        .with_context("path", parent.display())
                        .with_source(err)
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| {
                Error::new("failed to open log file")
                    .with_context("path", path.display())
                    .with_source(err)
            })?;

        // the canonical path identifies the file however it was spelled
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Ok(File { path, file })
    }

    /// The canonical path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for File {
    fn id(&self) -> SinkId {
        SinkId::Path(self.path.clone())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.file.write_all(bytes).map_err(Error::from_io_error)
    }

    fn flush(&mut self) -> Result<(), Error> {
        self.file.flush().map_err(Error::from_io_error)
    }
}

impl Drop for File {
    fn drop(&mut self) {
        let _ = self.file.flush();
    }
}
