//! Gesture catalogue for the four joint biped

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod cmd;
mod calc_oscillating;
mod calc_posed;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use cmd::*;
pub use calc_oscillating::*;
pub use calc_posed::*;

use eqpt_if::eqpt::servo::{JointId, BIPED_JOINTS};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The number of joints on the biped.
pub const NUM_BIPED_JOINTS: usize = 4;

/// Index of each joint in the biped's joint arrays.
pub const LEG_L: usize = 0;
pub const LEG_R: usize = 1;
pub const FOOT_L: usize = 2;
pub const FOOT_R: usize = 3;

pub const FORWARD: i8 = 1;
pub const BACKWARD: i8 = -1;
pub const LEFT: i8 = 1;
pub const RIGHT: i8 = -1;

/// Standard gesture heights.
///
/// Units: degrees
pub const SMALL: i16 = 5;
pub const MEDIUM: i16 = 15;
pub const BIG: i16 = 30;

/// Pose with every joint centred.
///
/// Units: degrees
pub const HOME_POSE: [f64; NUM_BIPED_JOINTS] = [90.0; NUM_BIPED_JOINTS];

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// The synchronisation controller as used by the biped gestures.
pub type BipedCtrl<A, C> = crate::sync_ctrl::SyncCtrl<A, C, NUM_BIPED_JOINTS>;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// The joint driven by each entry of the biped's joint arrays.
pub fn biped_joint(index: usize) -> Option<JointId> {
    BIPED_JOINTS.get(index).copied()
}
