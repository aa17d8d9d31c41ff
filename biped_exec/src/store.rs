//! [`ByteStore`] implementations standing in for an EEPROM.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fs;
use std::path::{Path, PathBuf};

use eqpt_if::eqpt::store::{ByteStore, StoreError};
use log::{debug, info};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Value of an erased EEPROM cell.
pub const ERASED_BYTE: u8 = 0xFF;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Volatile in-memory byte store.
#[derive(Debug, Clone)]
pub struct MemStore {
    bytes: Vec<u8>,
}

/// Byte store persisted to a file, written through on every write.
///
/// Missing files are treated as an erased store. A file shorter than the capacity is padded with
/// erased bytes.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    image: MemStore,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MemStore {
    /// Create an erased store of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            bytes: vec![ERASED_BYTE; capacity],
        }
    }

    /// Create a store from an existing image.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ByteStore for MemStore {
    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read_byte(&self, index: usize) -> Result<u8, StoreError> {
        self.bytes
            .get(index)
            .copied()
            .ok_or(StoreError::OutOfRange {
                index,
                capacity: self.bytes.len(),
            })
    }

    fn write_byte(&mut self, index: usize, value: u8) -> Result<(), StoreError> {
        let capacity = self.bytes.len();
        match self.bytes.get_mut(index) {
            Some(b) => {
                *b = value;
                Ok(())
            }
            None => Err(StoreError::OutOfRange { index, capacity }),
        }
    }
}

impl FileStore {
    /// Open the store at `path` with the given capacity.
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let mut bytes = match fs::read(&path) {
            Ok(b) => {
                info!("Loaded {} byte store image from {:?}", b.len(), path);
                b
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No store image at {:?}, starting erased", path);
                Vec::new()
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        bytes.resize(capacity, ERASED_BYTE);

        Ok(Self {
            path,
            image: MemStore::from_bytes(bytes),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.image.as_bytes())?;
        Ok(())
    }
}

impl ByteStore for FileStore {
    fn capacity(&self) -> usize {
        self.image.capacity()
    }

    fn read_byte(&self, index: usize) -> Result<u8, StoreError> {
        self.image.read_byte(index)
    }

    fn write_byte(&mut self, index: usize, value: u8) -> Result<(), StoreError> {
        self.image.write_byte(index, value)?;
        debug!("Store byte {} <- {:#04x}", index, value);
        self.flush()
    }
}
