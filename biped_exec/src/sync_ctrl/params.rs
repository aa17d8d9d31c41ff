//! Parameters structure for SyncCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for joint synchronisation control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    // ---- TIMING ----
    /// Period of one sampling tick.
    ///
    /// Units: milliseconds
    pub sampling_period_ms: u64,

    /// Duration of a return to the home pose when none is given.
    ///
    /// Units: milliseconds
    pub home_duration_ms: u64,

    // ---- CAPABILITIES ----
    /// Lowest angle any joint may be commanded to.
    ///
    /// Units: degrees
    pub min_angle_deg: f64,

    /// Highest angle any joint may be commanded to.
    ///
    /// Units: degrees
    pub max_angle_deg: f64,

    // ---- JOINTS ----
    /// The neutral pose the robot rests in, one angle per joint. Oscillations are centred on it.
    ///
    /// Units: degrees
    pub home_pose_deg: Vec<f64>,

    /// Joints whose oscillation is mirrored. Empty means no joint is reversed, otherwise one entry
    /// per joint.
    #[serde(default)]
    pub reversed: Vec<bool>,
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("The sampling period must be greater than zero")]
    ZeroSamplingPeriod,

    #[error("Invalid joint angle range [{0}, {1}]")]
    InvalidAngleRange(f64, f64),

    #[error("Expected {expected} entries in `{name}` but found {found}")]
    WrongNumJoints {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Home angle {1} of joint {0} is outside the joint angle range")]
    HomeOutOfRange(usize, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Default parameters for a robot with `num_joints` joints: 10 ms ticks, a [0, 180] degree
    /// range, every joint homed at 90 degrees and a 500 ms return home.
    pub fn with_joints(num_joints: usize) -> Self {
        Self {
            sampling_period_ms: 10,
            home_duration_ms: 500,
            min_angle_deg: 0.0,
            max_angle_deg: 180.0,
            home_pose_deg: vec![90.0; num_joints],
            reversed: Vec::new(),
        }
    }

    /// Determines if the parameters are valid for a robot with `num_joints` joints.
    pub fn are_valid(&self, num_joints: usize) -> Result<(), ParamsError> {
        if self.sampling_period_ms == 0 {
            return Err(ParamsError::ZeroSamplingPeriod);
        }

        if !(self.min_angle_deg.is_finite()
            && self.max_angle_deg.is_finite()
            && self.min_angle_deg < self.max_angle_deg)
        {
            return Err(ParamsError::InvalidAngleRange(
                self.min_angle_deg,
                self.max_angle_deg,
            ));
        }

        if self.home_pose_deg.len() != num_joints {
            return Err(ParamsError::WrongNumJoints {
                name: "home_pose_deg",
                expected: num_joints,
                found: self.home_pose_deg.len(),
            });
        }

        if !self.reversed.is_empty() && self.reversed.len() != num_joints {
            return Err(ParamsError::WrongNumJoints {
                name: "reversed",
                expected: num_joints,
                found: self.reversed.len(),
            });
        }

        for (i, h) in self.home_pose_deg.iter().enumerate() {
            if !(*h >= self.min_angle_deg && *h <= self.max_angle_deg) {
                return Err(ParamsError::HomeOutOfRange(i, *h));
            }
        }

        Ok(())
    }

    /// Whether joint `index` is reversed.
    pub fn is_reversed(&self, index: usize) -> bool {
        self.reversed.get(index).copied().unwrap_or(false)
    }
}
