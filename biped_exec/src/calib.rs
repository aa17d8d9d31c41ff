//! # Calibration trims
//!
//! Each joint's trim is persisted as a single unsigned byte at the joint's index in a
//! [`ByteStore`]. The byte is the trim plus a fixed bias, and decoding always clamps into the
//! legal trim range so a corrupted or erased byte can never push a joint somewhere unexpected.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use eqpt_if::eqpt::store::{ByteStore, StoreError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Bias added to a trim before it is stored.
pub const TRIM_BIAS: i16 = 90;

/// Largest magnitude trim which can be applied to a joint.
///
/// Units: degrees
pub const TRIM_LIMIT_DEG: i8 = 30;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised while loading or saving trims.
#[derive(thiserror::Error, Debug)]
pub enum CalibError {
    #[error("The byte store only holds {capacity} bytes but {num_joints} trims are needed")]
    StoreTooSmall {
        capacity: usize,
        num_joints: usize,
    },

    #[error("Could not access the byte store: {0}")]
    Store(#[from] StoreError),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Clamp a trim into `[-TRIM_LIMIT_DEG, TRIM_LIMIT_DEG]`.
pub fn clamp_trim(trim_deg: i16) -> i8 {
    trim_deg.clamp(-(TRIM_LIMIT_DEG as i16), TRIM_LIMIT_DEG as i16) as i8
}

/// Encode a trim as its persisted byte. Out of range trims are clamped first.
pub fn encode_trim(trim_deg: i8) -> u8 {
    (clamp_trim(trim_deg as i16) as i16 + TRIM_BIAS) as u8
}

/// Decode a persisted byte into a trim, clamping into the legal range.
pub fn decode_trim(byte: u8) -> i8 {
    clamp_trim(byte as i16 - TRIM_BIAS)
}

/// Read `N` trims from indices `0..N` of the store.
pub fn read_trims<S, const N: usize>(store: &S) -> Result<[i8; N], CalibError>
where
    S: ByteStore + ?Sized
{
    check_capacity(store, N)?;

    let mut trims = [0i8; N];
    for (i, trim) in trims.iter_mut().enumerate() {
        *trim = decode_trim(store.read_byte(i)?);
    }

    Ok(trims)
}

/// Write `N` trims to indices `0..N` of the store.
pub fn write_trims<S, const N: usize>(store: &mut S, trims: &[i8; N]) -> Result<(), CalibError>
where
    S: ByteStore + ?Sized
{
    check_capacity(store, N)?;

    for (i, trim) in trims.iter().enumerate() {
        store.write_byte(i, encode_trim(*trim))?;
    }

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_capacity<S: ByteStore + ?Sized>(store: &S, num_joints: usize) -> Result<(), CalibError> {
    if store.capacity() < num_joints {
        Err(CalibError::StoreTooSmall {
            capacity: store.capacity(),
            num_joints,
        })
    }
    else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::MemStore;

    #[test]
    fn test_encode_decode_example() {
        assert_eq!(encode_trim(-20), 70);
        assert_eq!(decode_trim(70), -20);
    }

    #[test]
    fn test_round_trip_legal_range() {
        for t in -TRIM_LIMIT_DEG..=TRIM_LIMIT_DEG {
            assert_eq!(decode_trim(encode_trim(t)), t);
        }
    }

    #[test]
    fn test_out_of_range_trims_clamp() {
        assert_eq!(decode_trim(encode_trim(100)), TRIM_LIMIT_DEG);
        assert_eq!(decode_trim(encode_trim(-128)), -TRIM_LIMIT_DEG);
        assert_eq!(decode_trim(encode_trim(i8::MAX)), TRIM_LIMIT_DEG);
    }

    #[test]
    fn test_corrupt_bytes_clamp() {
        // Erased EEPROM cells read as 0xFF
        assert_eq!(decode_trim(0xFF), TRIM_LIMIT_DEG);
        assert_eq!(decode_trim(0), -TRIM_LIMIT_DEG);

        for b in 0..=u8::MAX {
            let t = decode_trim(b);
            assert!(t >= -TRIM_LIMIT_DEG && t <= TRIM_LIMIT_DEG);
        }
    }

    #[test]
    fn test_read_write_trims() {
        let mut store = MemStore::new(16);

        write_trims(&mut store, &[-20i8, 0, 7, 30]).unwrap();
        assert_eq!(store.read_byte(0).unwrap(), 70);

        let trims: [i8; 4] = read_trims(&store).unwrap();
        assert_eq!(trims, [-20, 0, 7, 30]);
    }

    #[test]
    fn test_store_too_small() {
        let store = MemStore::new(2);
        assert!(matches!(
            read_trims::<_, 4>(&store),
            Err(CalibError::StoreTooSmall { capacity: 2, num_joints: 4 })
        ));
    }
}
