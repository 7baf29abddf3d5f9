//! File output sink.
//!
//! The sink owns the output file for the duration of one write. A sink that
//! is dropped without [`FileSink::finish`] having succeeded removes the
//! partially written file, so a failed run never leaves a truncated TIFF
//! behind.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::IoError;

/// Buffered file writer with cleanup on failure.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    finished: bool,
}

impl FileSink {
    /// Create (or truncate) the output file.
    ///
    /// # Errors
    /// Returns `IoError::SinkOpen` if the file cannot be created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| IoError::SinkOpen {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), "opened output sink");

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            finished: false,
        })
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered bytes and sync the file to disk.
    ///
    /// After a successful call the file is kept when the sink is dropped.
    pub fn finish(mut self) -> Result<(), IoError> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };

        let file = writer.into_inner().map_err(|e| IoError::Flush {
            message: e.error().to_string(),
        })?;
        file.sync_all().map_err(|e| IoError::Flush {
            message: e.to_string(),
        })?;

        self.finished = true;
        Ok(())
    }

    /// Close the sink and remove the partial file.
    pub fn abort(self) {
        drop(self);
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer.as_mut() {
            Some(writer) => writer.write(buf),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is closed")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        // Close the handle before unlinking.
        self.writer.take();
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed partial output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove partial output"
            ),
        }
    }
}
