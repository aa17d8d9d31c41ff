//! Oscillating gestures
//!
//! Each gesture is a table of per joint amplitudes, offsets and phases run through
//! [`SyncCtrl::execute_gesture`](crate::sync_ctrl::SyncCtrl::execute_gesture). The tables are tuned
//! on the real robot, and asymmetries between the two sides are deliberate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::eqpt::servo::Actuator;
use util::{maths::deg_to_rad, time::Clock};

use super::{BipedCtrl, LEFT, NUM_BIPED_JOINTS};
use crate::sync_ctrl::SyncCtrlError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Highest jitter height before the feet collide.
///
/// Units: degrees
const JITTER_MAX_HEIGHT: i16 = 25;

/// Highest ascending turn height before the feet collide.
///
/// Units: degrees
const ASCENDING_TURN_MAX_HEIGHT: i16 = 13;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Oscillator parameters for every joint of the biped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OscTable {
    /// Units: degrees
    pub amplitude_deg: [f64; NUM_BIPED_JOINTS],

    /// Units: degrees
    pub offset_deg: [f64; NUM_BIPED_JOINTS],

    /// Units: radians
    pub phase_rad: [f64; NUM_BIPED_JOINTS],
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Walk forward or backward. Hips in phase, feet in phase, hips and feet a quarter period apart.
pub fn walk_table(dir: i8) -> OscTable {
    let feet_phase = deg(f64::from(dir) * -90.0);

    OscTable {
        amplitude_deg: [30.0, 30.0, 20.0, 20.0],
        offset_deg: [0.0, 0.0, 4.0, -4.0],
        phase_rad: [0.0, 0.0, feet_phase, feet_phase],
    }
}

/// Turn left or right by giving one hip a larger swing than the other.
pub fn turn_table(dir: i8) -> OscTable {
    let hips = if dir == LEFT { [30.0, 10.0] } else { [10.0, 30.0] };

    OscTable {
        amplitude_deg: [hips[0], hips[1], 20.0, 20.0],
        offset_deg: [0.0, 0.0, 4.0, -4.0],
        phase_rad: [0.0, 0.0, deg(-90.0), deg(-90.0)],
    }
}

/// Rise and fall on the feet, which run half a period apart.
pub fn updown_table(height_deg: i16) -> OscTable {
    let h = f64::from(height_deg);

    OscTable {
        amplitude_deg: [0.0, 0.0, h, h],
        offset_deg: [0.0, 0.0, h, -h],
        phase_rad: [0.0, 0.0, deg(-90.0), deg(90.0)],
    }
}

/// Rock from side to side.
pub fn swing_table(height_deg: i16) -> OscTable {
    let h = f64::from(height_deg);
    let half = f64::from(height_deg / 2);

    OscTable {
        amplitude_deg: [0.0, 0.0, h, h],
        offset_deg: [0.0, 0.0, half, -half],
        phase_rad: [0.0; NUM_BIPED_JOINTS],
    }
}

/// Rock from side to side without the heels touching the floor.
pub fn tiptoe_swing_table(height_deg: i16) -> OscTable {
    let h = f64::from(height_deg);

    OscTable {
        amplitude_deg: [0.0, 0.0, h, h],
        offset_deg: [0.0, 0.0, h, -h],
        phase_rad: [0.0; NUM_BIPED_JOINTS],
    }
}

/// Twist the legs against each other. The height is capped at 25 degrees.
pub fn jitter_table(height_deg: i16) -> OscTable {
    let h = f64::from(height_deg.min(JITTER_MAX_HEIGHT));

    OscTable {
        amplitude_deg: [h, h, 0.0, 0.0],
        offset_deg: [0.0; NUM_BIPED_JOINTS],
        phase_rad: [deg(-90.0), deg(90.0), 0.0, 0.0],
    }
}

/// Jitter while rising and falling. The height is capped at 13 degrees.
pub fn ascending_turn_table(height_deg: i16) -> OscTable {
    let h = height_deg.min(ASCENDING_TURN_MAX_HEIGHT);
    let hf = f64::from(h);

    OscTable {
        amplitude_deg: [hf; NUM_BIPED_JOINTS],
        offset_deg: [0.0, 0.0, f64::from(h + 4), f64::from(-h + 4)],
        phase_rad: [deg(-90.0), deg(90.0), deg(-90.0), deg(90.0)],
    }
}

/// Slide sideways with a travelling wave across the feet, which run 60 degrees apart.
pub fn moonwalker_table(height_deg: i16, dir: i8) -> OscTable {
    let h = f64::from(height_deg);
    let half = height_deg / 2;
    let phi = -i16::from(dir) * 90;

    OscTable {
        amplitude_deg: [0.0, 0.0, h, h],
        offset_deg: [0.0, 0.0, f64::from(half + 2), f64::from(-half - 2)],
        phase_rad: [
            0.0,
            0.0,
            deg(f64::from(phi)),
            deg(f64::from(-60 * i16::from(dir) + phi)),
        ],
    }
}

/// A mix of the moonwalker and walk.
///
/// The leg phases are a raw 90 rather than a converted angle, which is what the gesture was tuned
/// with.
pub fn crusaito_table(height_deg: i16, dir: i8) -> OscTable {
    let h = f64::from(height_deg);
    let half = height_deg / 2;

    OscTable {
        amplitude_deg: [25.0, 25.0, h, h],
        offset_deg: [0.0, 0.0, f64::from(half + 4), f64::from(-half - 4)],
        phase_rad: [90.0, 90.0, deg(0.0), deg(-60.0 * f64::from(dir))],
    }
}

/// Flap the legs while stepping forward or backward.
pub fn flapping_table(height_deg: i16, dir: i8) -> OscTable {
    let h = f64::from(height_deg);
    let d = f64::from(dir);

    OscTable {
        amplitude_deg: [12.0, 12.0, h, h],
        offset_deg: [0.0, 0.0, h - 10.0, -h + 10.0],
        phase_rad: [deg(0.0), deg(180.0), deg(-90.0 * d), deg(90.0 * d)],
    }
}

/// Run `steps` cycles of an oscillation table.
pub fn run_table<A, C>(
    ctrl: &mut BipedCtrl<A, C>,
    table: &OscTable,
    period_ms: u64,
    steps: f64,
) -> Result<(), SyncCtrlError>
where
    A: Actuator,
    C: Clock,
{
    ctrl.execute_gesture(
        &table.amplitude_deg,
        &table.offset_deg,
        period_ms,
        &table.phase_rad,
        steps,
    )
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn deg(angle_deg: f64) -> f64 {
    deg_to_rad(angle_deg)
}
