//! Emission of confirmed duplicate groups.
//!
//! The finder hands every group to an [`Emitter`] as soon as the hash
//! grouping stage produces it. [`TextEmitter`] writes the plain listing
//! used on stdout; a `Vec<DuplicateGroup>` collects groups in memory.
//!
//! # Example
//!
//! ```
//! use dupsift::duplicates::DuplicateGroup;
//! use dupsift::output::{Emitter, TextEmitter};
//! use std::path::PathBuf;
//!
//! let group = DuplicateGroup {
//!     size: 5,
//!     mode: None,
//!     hash: "5d41402abc4b2a76b9719d911017c592".to_string(),
//!     paths: vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")],
//! };
//!
//! let mut emitter = TextEmitter::new(Vec::new());
//! emitter.emit(group).unwrap();
//! emitter.finish().unwrap();
//!
//! assert_eq!(emitter.into_inner(), b"a.txt\nb.txt\n");
//! ```

pub mod text;

pub use text::TextEmitter;

use std::io;

use crate::duplicates::DuplicateGroup;

/// Destination for duplicate groups.
pub trait Emitter {
    /// Accept one group.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the group cannot be written.
    fn emit(&mut self, group: DuplicateGroup) -> io::Result<()>;

    /// Called once after the last group.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if buffered output cannot be flushed.
    fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Emitter for Vec<DuplicateGroup> {
    fn emit(&mut self, group: DuplicateGroup) -> io::Result<()> {
        self.push(group);
        Ok(())
    }
}

impl<E: Emitter + ?Sized> Emitter for &mut E {
    fn emit(&mut self, group: DuplicateGroup) -> io::Result<()> {
        (**self).emit(group)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}
