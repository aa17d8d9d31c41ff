//! # Servo Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Joints of the four servo biped, in engine slot order.
pub const BIPED_JOINTS: [JointId; 4] = [
    JointId::LegL,
    JointId::LegR,
    JointId::FootL,
    JointId::FootR,
];

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A single positional servo actuator.
///
/// Implementations must be synchronous and non-blocking, and all calls must be safe to make
/// redundantly (attaching an attached servo does nothing).
pub trait Actuator {
    /// Power the actuator so that it holds the demanded angle.
    fn attach(&mut self) -> Result<(), ActuatorError>;

    /// Remove drive from the actuator, leaving it free to move.
    fn detach(&mut self) -> Result<(), ActuatorError>;

    /// Demand an absolute angle.
    ///
    /// Units: degrees, in the range [0, 180]
    fn write_angle(&mut self, angle_deg: f64) -> Result<(), ActuatorError>;

    /// Whether the actuator is currently attached.
    fn is_attached(&self) -> bool;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the biped's joints.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum JointId {
    LegL,
    LegR,
    FootL,
    FootR,
}

/// Errors raised by an actuator driver.
#[derive(thiserror::Error, Debug)]
pub enum ActuatorError {
    #[error("The actuator is not attached")]
    NotAttached,

    #[error("Angle {0} deg is outside the actuator's range")]
    InvalidAngle(f64),

    #[error("The actuator driver reported an error: {0}")]
    Driver(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn attach(&mut self) -> Result<(), ActuatorError> {
        (**self).attach()
    }

    fn detach(&mut self) -> Result<(), ActuatorError> {
        (**self).detach()
    }

    fn write_angle(&mut self, angle_deg: f64) -> Result<(), ActuatorError> {
        (**self).write_angle(angle_deg)
    }

    fn is_attached(&self) -> bool {
        (**self).is_attached()
    }
}
