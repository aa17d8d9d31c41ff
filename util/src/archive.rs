//! Archiving functionality
//!
//! Modules that want a timestamped record of their outputs hold an `Archiver`
//! and serialise one row per cycle into it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::fs::{File, OpenOptions};
use std::path::Path;
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use thiserror::Error;

// Internal imports
use crate::session::{Session, SessionError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive path: {0}")]
    PathError(#[from] SessionError),

    #[error("Cannot open the archive file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Cannot write the archive record: {0}")]
    CsvError(#[from] csv::Error),

    #[error("The archiver has not been initialised")]
    NotInitialised,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, ArchiveError> {
        let full_path = session.arch_path(path)?;

        Self::from_file_path(full_path)
    }

    /// Create a new archiver writing to an absolute path, truncating any
    /// existing file.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let w = WriterBuilder::new()
            .has_headers(true)
            .from_writer(file);

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record)?;
                w.flush()?;
                Ok(())
            },
            None => Err(ArchiveError::NotInitialised)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_archive_rows() {
        let path = std::env::temp_dir().join("biped_util_archive_test.csv");

        let mut arch = Archiver::from_file_path(&path).unwrap();
        arch.serialise(vec![0.0, 90.0, 90.0]).unwrap();
        arch.serialise(vec![10.0, 95.5, 84.5]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "0.0,90.0,90.0\n10.0,95.5,84.5\n");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_uninitialised_archiver() {
        let mut arch = Archiver::default();
        assert!(matches!(arch.serialise(vec![1.0]), Err(ArchiveError::NotInitialised)));
    }
}
