//! Joint synchronisation control module
//!
//! Drives all joints of the robot together. Every motion, whether a ramped direct move or an
//! oscillation, is sampled on a single fixed-period tick and all joints are written on the same
//! tick before the loop moves on, which keeps multi-joint gaits phase locked.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

use crate::calib::CalibError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during SyncCtrl operation.
///
/// Every error is raised before any joint is written, so a rejected command never moves the robot.
#[derive(Debug, thiserror::Error)]
pub enum SyncCtrlError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("Joint index {index} is out of range for a {num_joints} joint robot")]
    InvalidJointIndex {
        index: usize,
        num_joints: usize,
    },

    #[error("Oscillation period must be greater than zero")]
    InvalidPeriod,

    #[error("Invalid motion command: {0}")]
    InvalidCommand(String),

    #[error("Calibration error: {0}")]
    Calib(#[from] CalibError),
}
