//! Gesture commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use eqpt_if::eqpt::servo::Actuator;
use log::info;
use serde::{Deserialize, Serialize};
use util::time::Clock;

use super::*;
use crate::sync_ctrl::SyncCtrlError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A gesture the biped can perform.
///
/// In parameter files each gesture is a table tagged with its name, for example
/// `{ gesture = "walk", steps = 4.0, period_ms = 1000, dir = 1 }`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum Gesture {
    /// Return to the home pose and rest.
    Home,

    /// Pause without moving.
    Wait {
        /// Units: milliseconds
        duration_ms: u64,
    },

    /// Rise onto the tips of the feet and drop back.
    Jump {
        steps: u32,

        /// Duration of each of the rise and the drop.
        ///
        /// Units: milliseconds
        period_ms: u64,
    },

    /// Walk forward (1) or backward (-1).
    Walk {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        dir: i8,
    },

    /// Turn on the spot, left (1) or right (-1).
    Turn {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        dir: i8,
    },

    /// Lean over on one foot, left (1) or right (-1).
    Bend {
        steps: u32,

        /// Units: milliseconds
        period_ms: u64,

        dir: i8,
    },

    /// Stand on one leg and shake the other. Right (-1) shakes the left leg.
    ShakeLeg {
        steps: u32,

        /// Units: milliseconds
        period_ms: u64,

        dir: i8,
    },

    UpDown {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        /// Units: degrees
        height_deg: i16,
    },

    Swing {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        /// Units: degrees
        height_deg: i16,
    },

    TiptoeSwing {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        /// Units: degrees
        height_deg: i16,
    },

    Jitter {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        /// Units: degrees
        height_deg: i16,
    },

    AscendingTurn {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        /// Units: degrees
        height_deg: i16,
    },

    /// Slide sideways, left (1) or right (-1).
    Moonwalker {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        /// Units: degrees
        height_deg: i16,

        dir: i8,
    },

    Crusaito {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        /// Units: degrees
        height_deg: i16,

        dir: i8,
    },

    Flapping {
        steps: f64,

        /// Units: milliseconds
        period_ms: u64,

        /// Units: degrees
        height_deg: i16,

        dir: i8,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Gesture {
    /// Perform the gesture, blocking until it completes.
    pub fn perform<A, C>(&self, ctrl: &mut BipedCtrl<A, C>) -> Result<(), SyncCtrlError>
    where
        A: Actuator,
        C: Clock,
    {
        info!("Performing {:?}", self);

        match *self {
            Gesture::Home => ctrl.home(),
            Gesture::Wait { duration_ms } => {
                ctrl.wait(duration_ms);
                Ok(())
            }
            Gesture::Jump { steps, period_ms } => jump(ctrl, steps, period_ms),
            Gesture::Walk { steps, period_ms, dir } => {
                run_table(ctrl, &walk_table(dir), period_ms, steps)
            }
            Gesture::Turn { steps, period_ms, dir } => {
                run_table(ctrl, &turn_table(dir), period_ms, steps)
            }
            Gesture::Bend { steps, period_ms, dir } => bend(ctrl, steps, period_ms, dir),
            Gesture::ShakeLeg { steps, period_ms, dir } => shake_leg(ctrl, steps, period_ms, dir),
            Gesture::UpDown { steps, period_ms, height_deg } => {
                run_table(ctrl, &updown_table(height_deg), period_ms, steps)
            }
            Gesture::Swing { steps, period_ms, height_deg } => {
                run_table(ctrl, &swing_table(height_deg), period_ms, steps)
            }
            Gesture::TiptoeSwing { steps, period_ms, height_deg } => {
                run_table(ctrl, &tiptoe_swing_table(height_deg), period_ms, steps)
            }
            Gesture::Jitter { steps, period_ms, height_deg } => {
                run_table(ctrl, &jitter_table(height_deg), period_ms, steps)
            }
            Gesture::AscendingTurn { steps, period_ms, height_deg } => {
                run_table(ctrl, &ascending_turn_table(height_deg), period_ms, steps)
            }
            Gesture::Moonwalker { steps, period_ms, height_deg, dir } => {
                run_table(ctrl, &moonwalker_table(height_deg, dir), period_ms, steps)
            }
            Gesture::Crusaito { steps, period_ms, height_deg, dir } => {
                run_table(ctrl, &crusaito_table(height_deg, dir), period_ms, steps)
            }
            Gesture::Flapping { steps, period_ms, height_deg, dir } => {
                run_table(ctrl, &flapping_table(height_deg, dir), period_ms, steps)
            }
        }
    }

    /// A demonstration routine running every gesture once with its usual settings.
    pub fn demo_routine() -> Vec<Gesture> {
        vec![
            Gesture::Walk { steps: 4.0, period_ms: 1000, dir: FORWARD },
            Gesture::Walk { steps: 4.0, period_ms: 1000, dir: BACKWARD },
            Gesture::Turn { steps: 4.0, period_ms: 2000, dir: LEFT },
            Gesture::Turn { steps: 4.0, period_ms: 2000, dir: RIGHT },
            Gesture::Jump { steps: 1, period_ms: 2000 },
            Gesture::Bend { steps: 1, period_ms: 1400, dir: LEFT },
            Gesture::ShakeLeg { steps: 1, period_ms: 3000, dir: RIGHT },
            Gesture::UpDown { steps: 1.0, period_ms: 1000, height_deg: 20 },
            Gesture::Swing { steps: 1.0, period_ms: 1000, height_deg: 20 },
            Gesture::TiptoeSwing { steps: 1.0, period_ms: 900, height_deg: 20 },
            Gesture::Jitter { steps: 1.0, period_ms: 500, height_deg: 20 },
            Gesture::AscendingTurn { steps: 1.0, period_ms: 900, height_deg: 20 },
            Gesture::Moonwalker { steps: 1.0, period_ms: 900, height_deg: 20, dir: LEFT },
            Gesture::Crusaito { steps: 1.0, period_ms: 900, height_deg: 20, dir: FORWARD },
            Gesture::Flapping { steps: 1.0, period_ms: 1000, height_deg: 20, dir: FORWARD },
            Gesture::Home,
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::servo_ctrl::SimServo;
    use crate::sync_ctrl::{Params, SyncCtrl};
    use serde::Deserialize;
    use util::time::SimClock;

    fn biped() -> BipedCtrl<SimServo, SimClock> {
        SyncCtrl::new(
            Params::with_joints(NUM_BIPED_JOINTS),
            std::array::from_fn(|_| SimServo::default()),
            SimClock::new(),
        )
        .unwrap()
    }

    #[derive(Deserialize)]
    struct Routine {
        routine: Vec<Gesture>,
    }

    #[test]
    fn test_deserialise_routine() {
        let r: Routine = util::params::from_toml_str(
            r#"
            routine = [
                { gesture = "walk", steps = 2.5, period_ms = 1000, dir = -1 },
                { gesture = "shake_leg", steps = 1, period_ms = 3000, dir = 1 },
                { gesture = "ascending_turn", steps = 1.0, period_ms = 900, height_deg = 15 },
                { gesture = "home" },
            ]
            "#
        ).unwrap();

        assert_eq!(r.routine, vec![
            Gesture::Walk { steps: 2.5, period_ms: 1000, dir: BACKWARD },
            Gesture::ShakeLeg { steps: 1, period_ms: 3000, dir: LEFT },
            Gesture::AscendingTurn { steps: 1.0, period_ms: 900, height_deg: MEDIUM },
            Gesture::Home,
        ]);
    }

    #[test]
    fn test_walk_matches_table() {
        let mut by_gesture = biped();
        Gesture::Walk { steps: 2.0, period_ms: 1000, dir: FORWARD }
            .perform(&mut by_gesture)
            .unwrap();

        let mut by_table = biped();
        let t = walk_table(FORWARD);
        by_table
            .execute_gesture(&t.amplitude_deg, &t.offset_deg, 1000, &t.phase_rad, 2.0)
            .unwrap();

        for i in 0..NUM_BIPED_JOINTS {
            assert_eq!(by_gesture.actuators()[i].writes(), by_table.actuators()[i].writes());
        }
        assert_eq!(by_gesture.clock().now_ms(), 2000);
    }

    #[test]
    fn test_walk_leg_swing() {
        let mut ctrl = biped();
        Gesture::Walk { steps: 1.0, period_ms: 1000, dir: FORWARD }
            .perform(&mut ctrl)
            .unwrap();

        // Legs swing 30 degrees either side of centre
        let legs = ctrl.actuators()[LEG_L].writes();
        let max = legs.iter().cloned().fold(f64::MIN, f64::max);
        let min = legs.iter().cloned().fold(f64::MAX, f64::min);
        assert!((max - 120.0).abs() < 1e-9);
        assert!((min - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_demo_routine_ends_resting() {
        let mut ctrl = biped();
        ctrl.init(None).unwrap();

        for g in Gesture::demo_routine() {
            g.perform(&mut ctrl).unwrap();
        }

        assert!(ctrl.is_resting());
        assert_eq!(ctrl.positions(), &HOME_POSE);
        assert_eq!(ctrl.report().num_write_failures, 0);
    }

    #[test]
    fn test_wait_gesture() {
        let mut ctrl = biped();
        Gesture::Wait { duration_ms: 250 }.perform(&mut ctrl).unwrap();

        assert_eq!(ctrl.clock().now_ms(), 250);
        assert!(ctrl.actuators().iter().all(|a| a.writes().is_empty()));
    }
}
