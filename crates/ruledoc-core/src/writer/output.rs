//! Buffered output file owned by a single writer.

use super::WriterError;

use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

/// An output file that is opened lazily and closed exactly once.
///
/// Text is written as UTF-8 without a byte-order mark, lines end in `\n`.
#[derive(Debug)]
pub struct OutputFile {
    path: PathBuf,
    inner: Option<BufWriter<File>>,
}

impl OutputFile {
    /// Creates a handle for `path` without touching the disk.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            inner: None,
        }
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` between [`open`](Self::open) and [`close`](Self::close).
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Creates parent directories and opens the file for overwrite.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub async fn open(&mut self) -> Result<(), WriterError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        let file = File::create(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        debug!("Opened {}", self.path.display());
        self.inner = Some(BufWriter::new(file));
        Ok(())
    }

    /// Appends text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not open or the write fails.
    pub async fn write_str(&mut self, text: &str) -> Result<(), WriterError> {
        let Some(inner) = self.inner.as_mut() else {
            return Err(WriterError::NotStarted {
                path: self.path.clone(),
            });
        };
        if let Err(e) = inner.write_all(text.as_bytes()).await {
            return Err(self.io_error(e));
        }
        Ok(())
    }

    /// Appends text followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is not open or the write fails.
    pub async fn write_line(&mut self, text: &str) -> Result<(), WriterError> {
        self.write_str(text).await?;
        self.write_str("\n").await
    }

    /// Flushes and closes the file. Closing a file that is not open is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub async fn close(&mut self) -> Result<(), WriterError> {
        let Some(mut inner) = self.inner.take() else {
            return Ok(());
        };
        inner.flush().await.map_err(|e| self.io_error(e))?;
        inner.shutdown().await.map_err(|e| self.io_error(e))?;
        debug!("Closed {}", self.path.display());
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> WriterError {
        WriterError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_parent_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.txt");

        let mut file = OutputFile::new(&path);
        file.open().await.unwrap();
        file.write_line("first run with more text").await.unwrap();
        file.close().await.unwrap();

        let mut file = OutputFile::new(&path);
        file.open().await.unwrap();
        file.write_str("second").await.unwrap();
        file.close().await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[tokio::test]
    async fn write_before_open_fails() {
        let mut file = OutputFile::new("never-opened.txt");
        let err = file.write_str("x").await.unwrap_err();
        assert!(matches!(err, WriterError::NotStarted { .. }));
        file.close().await.unwrap();
    }
}
