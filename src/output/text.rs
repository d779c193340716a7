//! Plain text listing: one path per line, groups separated by a blank line.

use std::io::{self, Write};
use std::path::Path;

use super::Emitter;
use crate::duplicates::DuplicateGroup;

/// Writes groups as newline-separated paths.
///
/// No blank line precedes the first group or follows the last one.
#[derive(Debug)]
pub struct TextEmitter<W: Write> {
    writer: W,
    groups_written: usize,
}

impl<W: Write> TextEmitter<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            groups_written: 0,
        }
    }

    /// Number of groups written so far.
    #[must_use]
    pub fn groups_written(&self) -> usize {
        self.groups_written
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Emitter for TextEmitter<W> {
    fn emit(&mut self, group: DuplicateGroup) -> io::Result<()> {
        if self.groups_written > 0 {
            self.writer.write_all(b"\n")?;
        }
        for path in &group.paths {
            write_path(&mut self.writer, path)?;
            self.writer.write_all(b"\n")?;
        }
        self.groups_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(unix)]
fn write_path<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    use std::os::unix::ffi::OsStrExt;
    writer.write_all(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn write_path<W: Write>(writer: &mut W, path: &Path) -> io::Result<()> {
    write!(writer, "{}", path.display())
}
