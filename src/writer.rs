use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

/// Duplicates output to our own stdout and, optionally, to a file.
///
/// Only one thread (the consumer loop in main) ever writes, so both
/// destinations observe the same byte sequence in the same order
/// without any locking beyond the stdout handle itself.
pub struct OutputWriter {
    file: Option<File>,
    path: Option<PathBuf>,
}

impl OutputWriter {
    /// Open writer.
    /// With no path, writes go to stdout only. Otherwise the file is
    /// created if needed and truncated, or appended to if `append` is
    /// set. Failure to open the file is fatal to the caller; there is
    /// no silent fallback to stdout-only.
    pub fn open(path: Option<&str>, append: bool) -> io::Result<Self> {
        let file = match path {
            Some(path) => Some(
                OpenOptions::new()
                    .write(true)
                    .create(true)
                    .append(append)
                    .truncate(!append)
                    .open(path)?,
            ),
            None => None,
        };

        // Resolved after open so the file is guaranteed to exist.
        let path = match path {
            Some(path) => Some(fs::canonicalize(path)?),
            None => None,
        };

        Ok(OutputWriter { file, path })
    }

    /// True if output is duplicated to a file.
    pub fn ondisk(&self) -> bool {
        self.file.is_some()
    }

    /// Absolute path of the output file, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }

    /// Write one tagged line: prefix followed by the raw payload.
    /// Both chunks go to stdout under a single lock, then the
    /// identical bytes go to the file.
    pub fn write_record(&mut self, prefix: &[u8], payload: &[u8]) -> io::Result<()> {
        {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prefix)?;
            stdout.write_all(payload)?;
        }

        if let Some(file) = &mut self.file {
            file.write_all(prefix)?;
            file.write_all(payload)?;
        }

        Ok(())
    }

    /// Write banner line (no prefix).
    pub fn write_banner(&mut self, text: &str) -> io::Result<()> {
        self.write_record(text.as_bytes(), &[])
    }

    /// Flush both destinations and close the file.
    /// The file handle must not be left to process teardown; every
    /// normal exit path goes through here.
    pub fn close(mut self) -> io::Result<()> {
        io::stdout().flush()?;

        // File writes are unbuffered, closing is enough.
        drop(self.file.take());

        Ok(())
    }
}
