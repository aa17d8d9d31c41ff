//! # Persistent Byte Store Interface

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A small persistent memory addressed one byte at a time, such as an EEPROM.
pub trait ByteStore {
    /// Number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Read the byte at `index`.
    fn read_byte(&self, index: usize) -> Result<u8, StoreError>;

    /// Write `value` to the byte at `index`.
    fn write_byte(&mut self, index: usize, value: u8) -> Result<(), StoreError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by a byte store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Index {index} is outside the store (capacity {capacity})")]
    OutOfRange {
        index: usize,
        capacity: usize,
    },

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}
