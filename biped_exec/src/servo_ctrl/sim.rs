//! Simulated servo

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use eqpt_if::eqpt::servo::{Actuator, ActuatorError, JointId};
use log::trace;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A servo with no hardware behind it. Every demand is kept so that motion can be inspected.
#[derive(Debug, Clone)]
pub struct SimServo {
    joint: Option<JointId>,
    attached: bool,
    writes: Vec<f64>,
    num_attaches: usize,
    num_detaches: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimServo {
    pub fn new(joint: Option<JointId>) -> Self {
        Self {
            joint,
            attached: false,
            writes: Vec::new(),
            num_attaches: 0,
            num_detaches: 0,
        }
    }

    /// All angles written since creation or the last `clear_writes`.
    pub fn writes(&self) -> &[f64] {
        &self.writes
    }

    pub fn last_angle(&self) -> Option<f64> {
        self.writes.last().copied()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Number of transitions from detached to attached.
    pub fn num_attaches(&self) -> usize {
        self.num_attaches
    }

    /// Number of transitions from attached to detached.
    pub fn num_detaches(&self) -> usize {
        self.num_detaches
    }
}

impl Default for SimServo {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Actuator for SimServo {
    fn attach(&mut self) -> Result<(), ActuatorError> {
        if !self.attached {
            self.attached = true;
            self.num_attaches += 1;
        }
        Ok(())
    }

    fn detach(&mut self) -> Result<(), ActuatorError> {
        if self.attached {
            self.attached = false;
            self.num_detaches += 1;
        }
        Ok(())
    }

    fn write_angle(&mut self, angle_deg: f64) -> Result<(), ActuatorError> {
        if !self.attached {
            return Err(ActuatorError::NotAttached);
        }
        if !(0.0..=180.0).contains(&angle_deg) {
            return Err(ActuatorError::InvalidAngle(angle_deg));
        }

        trace!("{:?} <- {:.2} deg", self.joint, angle_deg);
        self.writes.push(angle_deg);
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}
