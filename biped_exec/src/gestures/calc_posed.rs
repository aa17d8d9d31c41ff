//! Posed gestures
//!
//! Gestures built from a sequence of direct moves between fixed poses rather than from
//! oscillation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::eqpt::servo::Actuator;
use log::debug;
use util::time::Clock;

use super::{BipedCtrl, FOOT_L, FOOT_R, HOME_POSE, NUM_BIPED_JOINTS};
use crate::sync_ctrl::SyncCtrlError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

type Pose = [f64; NUM_BIPED_JOINTS];

const JUMP_UP_POSE: Pose = [90.0, 90.0, 150.0, 30.0];

/// Fixed duration of the lean into a bend or shake. Faster leans topple the robot.
///
/// Units: milliseconds
const BEND_LEAN_MS: u64 = 800;
const SHAKE_LEAN_MS: u64 = 2000;

/// Duration of the return home at the end of each bend or shake.
///
/// Units: milliseconds
const POSED_HOME_MS: u64 = 500;

/// Number of shakes in each shake leg step.
const NUM_SHAKES: u64 = 2;

/// Shortest duration of a single shake.
///
/// Units: milliseconds
const MIN_SHAKE_MS: u64 = 200;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Rise onto the tips of the feet and drop back, once per step. Each move takes `period_ms`.
pub fn jump<A, C>(ctrl: &mut BipedCtrl<A, C>, steps: u32, period_ms: u64) -> Result<(), SyncCtrlError>
where
    A: Actuator,
    C: Clock,
{
    for _ in 0..steps {
        ctrl.move_direct(&JUMP_UP_POSE, period_ms)?;
        ctrl.move_direct(&HOME_POSE, period_ms)?;
    }

    Ok(())
}

/// Lean over on one foot and hold for `0.8 * period_ms`, once per step.
///
/// `dir` is left (1) or right (-1).
pub fn bend<A, C>(
    ctrl: &mut BipedCtrl<A, C>,
    steps: u32,
    period_ms: u64,
    dir: i8,
) -> Result<(), SyncCtrlError>
where
    A: Actuator,
    C: Clock,
{
    let (lean, bent) = bend_poses(dir);
    let hold_ms = (period_ms as f64 * 0.8) as u64;

    for i in 0..steps {
        debug!("Bend {} of {}", i + 1, steps);

        ctrl.move_direct(&lean, BEND_LEAN_MS / 2)?;
        ctrl.move_direct(&bent, BEND_LEAN_MS / 2)?;
        ctrl.wait(hold_ms);
        ctrl.move_direct(&HOME_POSE, POSED_HOME_MS)?;
    }

    Ok(())
}

/// Stand on one leg and shake the other. `period_ms` covers the lean and the shakes together.
///
/// `dir` is right (-1) to shake the left leg, anything else shakes the right leg.
pub fn shake_leg<A, C>(
    ctrl: &mut BipedCtrl<A, C>,
    steps: u32,
    period_ms: u64,
    dir: i8,
) -> Result<(), SyncCtrlError>
where
    A: Actuator,
    C: Clock,
{
    let (lean, raised, shaken) = shake_poses(dir);
    let shake_ms = period_ms
        .saturating_sub(SHAKE_LEAN_MS)
        .max(MIN_SHAKE_MS * NUM_SHAKES);
    let half_shake_ms = shake_ms / (2 * NUM_SHAKES);

    for i in 0..steps {
        debug!("Leg shake {} of {}", i + 1, steps);

        ctrl.move_direct(&lean, SHAKE_LEAN_MS / 2)?;
        ctrl.move_direct(&raised, SHAKE_LEAN_MS / 2)?;

        for _ in 0..NUM_SHAKES {
            ctrl.move_direct(&shaken, half_shake_ms)?;
            ctrl.move_direct(&raised, half_shake_ms)?;
        }

        ctrl.move_direct(&HOME_POSE, POSED_HOME_MS)?;
    }

    ctrl.wait(shake_ms);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn bend_poses(dir: i8) -> (Pose, Pose) {
    let mut lean = [90.0, 90.0, 62.0, 35.0];
    let mut bent = [90.0, 90.0, 62.0, 105.0];

    if dir == -1 {
        lean[FOOT_L] = 180.0 - 35.0;
        lean[FOOT_R] = 180.0 - 60.0;
        bent[FOOT_L] = 180.0 - 105.0;
        bent[FOOT_R] = 180.0 - 60.0;
    }

    (lean, bent)
}

fn shake_poses(dir: i8) -> (Pose, Pose, Pose) {
    let mut lean = [90.0, 90.0, 58.0, 35.0];
    let mut raised = [90.0, 90.0, 58.0, 120.0];
    let mut shaken = [90.0, 90.0, 58.0, 60.0];

    if dir == -1 {
        lean[FOOT_L] = 180.0 - 35.0;
        lean[FOOT_R] = 180.0 - 58.0;
        raised[FOOT_L] = 180.0 - 120.0;
        raised[FOOT_R] = 180.0 - 58.0;
        shaken[FOOT_L] = 180.0 - 60.0;
        shaken[FOOT_R] = 180.0 - 58.0;
    }

    (lean, raised, shaken)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gestures::{LEFT, RIGHT};
    use crate::servo_ctrl::SimServo;
    use crate::sync_ctrl::{Params, SyncCtrl};
    use util::time::SimClock;

    fn biped() -> BipedCtrl<SimServo, SimClock> {
        SyncCtrl::new(
            Params::with_joints(NUM_BIPED_JOINTS),
            std::array::from_fn(|_| SimServo::default()),
            SimClock::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_jump() {
        let mut ctrl = biped();
        jump(&mut ctrl, 1, 200).unwrap();

        // Up and down, 20 ticks each
        let foot_l = ctrl.actuators()[FOOT_L].writes();
        assert_eq!(foot_l.len(), 40);
        assert_eq!(foot_l[19], 150.0);
        assert_eq!(foot_l[39], 90.0);
        assert_eq!(ctrl.clock().now_ms(), 400);
    }

    #[test]
    fn test_bend_timing() {
        let mut ctrl = biped();
        bend(&mut ctrl, 2, 1000, LEFT).unwrap();

        // Lean, bend, hold and return home for each step
        assert_eq!(ctrl.clock().now_ms(), 2 * (400 + 400 + 800 + 500));
        assert_eq!(ctrl.positions(), &HOME_POSE);
        assert!(!ctrl.is_resting());
    }

    #[test]
    fn test_bend_right_poses() {
        let (lean, bent) = bend_poses(RIGHT);
        assert_eq!(lean, [90.0, 90.0, 145.0, 120.0]);
        assert_eq!(bent, [90.0, 90.0, 75.0, 120.0]);
        assert_eq!(bend_poses(LEFT).1, [90.0, 90.0, 62.0, 105.0]);
    }

    #[test]
    fn test_shake_leg_timing() {
        let mut ctrl = biped();
        shake_leg(&mut ctrl, 1, 3000, RIGHT).unwrap();

        // One second of shaking, split over two shakes of two moves each
        assert_eq!(ctrl.clock().now_ms(), 2000 + 1000 + 500 + 1000);

        let (_, raised, shaken) = shake_poses(RIGHT);
        assert_eq!(raised[FOOT_L], 60.0);
        assert_eq!(shaken[FOOT_L], 120.0);
    }

    #[test]
    fn test_short_shake_clamped() {
        let mut ctrl = biped();
        shake_leg(&mut ctrl, 1, 1000, LEFT).unwrap();

        // Shakes never take less than 400 ms in total
        assert_eq!(ctrl.clock().now_ms(), 2000 + 400 + 500 + 400);
    }
}
