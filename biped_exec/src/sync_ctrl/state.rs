//! Implementations for the SyncCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use eqpt_if::eqpt::{
    servo::Actuator,
    store::ByteStore,
};
use log::{debug, info, warn};
use serde::Serialize;

// Internal
use super::{Params, SyncCtrlError};
use crate::{calib, osc::Oscillator};
use util::{
    archive::{ArchiveError, Archiver},
    maths::clamp_finite,
    session::Session,
    time::Clock,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Session relative path of the per-tick demand archive.
const DEMANDS_ARCH_PATH: &str = "sync_ctrl/demands.csv";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Joint synchronisation controller for a robot with `N` joints.
///
/// Owns one oscillator and one actuator per joint, the record of where each joint was last
/// commanded, and the rest state. All motion calls block until the motion is complete.
pub struct SyncCtrl<A, C, const N: usize>
where
    A: Actuator,
    C: Clock,
{
    params: Params,

    home_pose_deg: [f64; N],

    actuators: [A; N],

    oscs: [Oscillator; N],

    /// Last commanded angle of each joint, without trim.
    ///
    /// Units: degrees
    joint_positions_deg: [f64; N],

    resting: bool,

    clock: C,

    report: StatusReport,

    arch_demands: Option<Archiver>,
}

/// Running totals describing the controller's sampling.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Number of ticks on which joints were written.
    pub num_ticks: u64,

    /// Number of ticks skipped over because the loop woke late.
    pub num_overrun_ticks: u64,

    /// Number of joint writes clamped into the angle range.
    pub num_clamped_writes: u64,

    /// Number of joint writes rejected by an actuator.
    pub num_write_failures: u64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<A, C, const N: usize> SyncCtrl<A, C, N>
where
    A: Actuator,
    C: Clock,
{
    /// Create a new controller.
    ///
    /// The controller starts active (not resting) with every joint's last known position set to
    /// its home angle. Actuators are not attached until `init` or the first motion.
    pub fn new(params: Params, actuators: [A; N], clock: C) -> Result<Self, SyncCtrlError> {
        params.are_valid(N)?;

        let home_pose_deg: [f64; N] = std::array::from_fn(|i| params.home_pose_deg[i]);
        let oscs: [Oscillator; N] = std::array::from_fn(|i| {
            let mut o = Oscillator::new(params.sampling_period_ms);
            o.set_reversed(params.is_reversed(i));
            o
        });

        Ok(Self {
            params,
            home_pose_deg,
            actuators,
            oscs,
            joint_positions_deg: home_pose_deg,
            resting: false,
            clock,
            report: StatusReport::default(),
            arch_demands: None,
        })
    }

    /// Initialise the controller, attaching all actuators and, if a store is given, loading the
    /// calibration trims from it.
    pub fn init(&mut self, calib_store: Option<&dyn ByteStore>) -> Result<(), SyncCtrlError> {
        self.attach_all();

        if let Some(store) = calib_store {
            self.load_trims(store)?;
        }

        info!(
            "SyncCtrl initialised with {} joints, trims {:?}",
            N,
            self.trims()
        );

        Ok(())
    }

    /// Archive every tick's commanded joint angles into the session.
    pub fn enable_archive(&mut self, session: &Session) -> Result<(), ArchiveError> {
        self.arch_demands = Some(Archiver::from_path(session, DEMANDS_ARCH_PATH)?);
        Ok(())
    }

    // ---- ACTUATORS ----

    /// Power every actuator, leaving the rest state. Calling this with actuators already attached
    /// does nothing.
    pub fn attach_all(&mut self) {
        self.resting = false;

        for (i, a) in self.actuators.iter_mut().enumerate() {
            if let Err(e) = a.attach() {
                warn!("Could not attach joint {}: {}", i, e);
            }
        }
    }

    /// Remove drive from every actuator.
    pub fn detach_all(&mut self) {
        for (i, a) in self.actuators.iter_mut().enumerate() {
            if let Err(e) = a.detach() {
                warn!("Could not detach joint {}: {}", i, e);
            }
        }
    }

    // ---- MOTION ----

    /// Ramp every joint linearly from its last known position to `target_deg` over
    /// `duration_ms`.
    ///
    /// A duration shorter than one sampling period is an instantaneous move, writing each joint
    /// once. Targets are clamped into the joint angle range.
    pub fn move_direct(&mut self, target_deg: &[f64; N], duration_ms: u64) -> Result<(), SyncCtrlError> {
        if let Some(t) = target_deg.iter().find(|t| !t.is_finite()) {
            return Err(SyncCtrlError::InvalidCommand(format!(
                "Direct move target {} is not finite", t
            )));
        }

        self.activate();

        let (min, max) = self.angle_range();
        let target: [f64; N] = std::array::from_fn(|i| clamp_finite(target_deg[i], min, max));

        debug!("Direct move to {:?} over {} ms", target, duration_ms);

        let ts = self.params.sampling_period_ms;
        if duration_ms < ts {
            for (i, t) in target.iter().enumerate() {
                self.write_joint(i, *t);
            }
            self.end_tick();
            return Ok(());
        }

        let start = self.joint_positions_deg;
        let total_ticks = (duration_ms as f64 / ts as f64).round() as u64;

        self.run_ticks(total_ticks, |ctrl, tick, _| {
            for i in 0..N {
                let pos = if tick >= total_ticks {
                    target[i]
                } else {
                    start[i] + (target[i] - start[i]) * tick as f64 / total_ticks as f64
                };
                ctrl.write_joint(i, pos);
            }
        });

        Ok(())
    }

    /// Move a single joint straight to `angle_deg`.
    pub fn move_single(&mut self, angle_deg: f64, index: usize) -> Result<(), SyncCtrlError> {
        self.check_index(index)?;
        if !angle_deg.is_finite() {
            return Err(SyncCtrlError::InvalidCommand(format!(
                "Single move angle {} is not finite", angle_deg
            )));
        }

        self.activate();

        debug!("Single move of joint {} to {} deg", index, angle_deg);
        self.write_joint(index, angle_deg);
        self.end_tick();

        Ok(())
    }

    /// Oscillate every joint for `fraction` of one period.
    ///
    /// Each joint's oscillator is configured with its own amplitude, offset and phase and the
    /// shared period, then all joints are sampled together for `period_ms * fraction`
    /// milliseconds. Oscillator phase is not reset, so consecutive calls continue smoothly.
    pub fn oscillate_cycle(
        &mut self,
        amplitude_deg: &[f64; N],
        offset_deg: &[f64; N],
        period_ms: u64,
        phase_rad: &[f64; N],
        fraction: f64,
    ) -> Result<(), SyncCtrlError> {
        check_cycles(period_ms, fraction, "Cycle fraction")?;

        self.activate();
        self.configure_oscs(amplitude_deg, offset_deg, period_ms, phase_rad);
        self.run_oscillation(self.cycle_ticks(period_ms, fraction));

        Ok(())
    }

    /// Perform `steps` oscillation cycles: `floor(steps)` complete cycles followed by one partial
    /// cycle covering the fractional remainder.
    ///
    /// Cycle `k` ends on tick `round((k + 1) * T / Ts)` counted from the start of the gesture, so a
    /// period which is not a whole number of ticks does not accumulate rounding error from cycle to
    /// cycle.
    pub fn execute_gesture(
        &mut self,
        amplitude_deg: &[f64; N],
        offset_deg: &[f64; N],
        period_ms: u64,
        phase_rad: &[f64; N],
        steps: f64,
    ) -> Result<(), SyncCtrlError> {
        check_cycles(period_ms, steps, "Step count")?;

        self.activate();

        debug!(
            "Gesture: A {:?}, O {:?}, T {} ms, phi {:?}, {} steps",
            amplitude_deg, offset_deg, period_ms, phase_rad, steps
        );

        // Every sub-cycle shares the same configuration and the phase is never reset between
        // them, so the whole gesture is one run of the oscillators
        self.configure_oscs(amplitude_deg, offset_deg, period_ms, phase_rad);
        self.run_oscillation(self.cycle_ticks(period_ms, steps));

        Ok(())
    }

    /// Return to the home pose over `duration_ms` and detach, leaving the robot resting.
    ///
    /// Does nothing if the robot is already resting. A zero duration uses the default home
    /// duration.
    pub fn return_home(&mut self, duration_ms: u64) -> Result<(), SyncCtrlError> {
        if self.resting {
            debug!("Already resting, not returning home");
            return Ok(());
        }

        let duration_ms = if duration_ms == 0 {
            self.params.home_duration_ms
        } else {
            duration_ms
        };

        let home = self.home_pose_deg;
        self.move_direct(&home, duration_ms)?;
        self.detach_all();
        self.resting = true;

        info!("Resting at home pose");

        Ok(())
    }

    /// Return home over the default home duration.
    pub fn home(&mut self) -> Result<(), SyncCtrlError> {
        self.return_home(self.params.home_duration_ms)
    }

    /// Block for `duration_ms` without writing any joint.
    pub fn wait(&mut self, duration_ms: u64) {
        let deadline = self.clock.now_ms() + duration_ms;
        self.clock.wait_until(deadline);
    }

    // ---- CALIBRATION ----

    /// Set every joint's trim. Trims are clamped into the legal trim range and are not persisted
    /// until `save_trims` is called.
    pub fn set_trims(&mut self, trims_deg: &[i8; N]) {
        for (osc, t) in self.oscs.iter_mut().zip(trims_deg.iter()) {
            osc.set_trim(calib::clamp_trim(*t as i16));
        }
    }

    /// Set a single joint's trim.
    pub fn set_trim(&mut self, index: usize, trim_deg: i8) -> Result<(), SyncCtrlError> {
        self.check_index(index)?;
        self.oscs[index].set_trim(calib::clamp_trim(trim_deg as i16));
        Ok(())
    }

    pub fn trims(&self) -> [i8; N] {
        std::array::from_fn(|i| self.oscs[i].trim())
    }

    /// Load every joint's trim from the store.
    pub fn load_trims(&mut self, store: &dyn ByteStore) -> Result<(), SyncCtrlError> {
        let trims: [i8; N] = calib::read_trims(store)?;
        self.set_trims(&trims);

        info!("Trims loaded: {:?}", trims);
        Ok(())
    }

    /// Persist every joint's trim to the store.
    pub fn save_trims(&self, store: &mut dyn ByteStore) -> Result<(), SyncCtrlError> {
        let trims = self.trims();
        calib::write_trims(store, &trims)?;

        info!("Trims saved: {:?}", trims);
        Ok(())
    }

    // ---- ACCESSORS ----

    /// True only between a completed `return_home` and the next motion.
    pub fn is_resting(&self) -> bool {
        self.resting
    }

    /// Last commanded angle of each joint, without trim.
    pub fn positions(&self) -> &[f64; N] {
        &self.joint_positions_deg
    }

    pub fn home_pose(&self) -> &[f64; N] {
        &self.home_pose_deg
    }

    pub fn oscillator(&self, index: usize) -> Option<&Oscillator> {
        self.oscs.get(index)
    }

    pub fn oscillator_mut(&mut self, index: usize) -> Option<&mut Oscillator> {
        self.oscs.get_mut(index)
    }

    pub fn actuators(&self) -> &[A; N] {
        &self.actuators
    }

    pub fn actuators_mut(&mut self) -> &mut [A; N] {
        &mut self.actuators
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn report(&self) -> StatusReport {
        self.report
    }

    // ---- PRIVATE ----

    /// Leave the rest state ready for motion.
    fn activate(&mut self) {
        self.attach_all();
    }

    fn angle_range(&self) -> (f64, f64) {
        (self.params.min_angle_deg, self.params.max_angle_deg)
    }

    fn check_index(&self, index: usize) -> Result<(), SyncCtrlError> {
        if index >= N {
            warn!("Rejecting command for joint {} of {}", index, N);
            return Err(SyncCtrlError::InvalidJointIndex {
                index,
                num_joints: N,
            });
        }
        Ok(())
    }

    fn configure_oscs(
        &mut self,
        amplitude_deg: &[f64; N],
        offset_deg: &[f64; N],
        period_ms: u64,
        phase_rad: &[f64; N],
    ) {
        for (i, osc) in self.oscs.iter_mut().enumerate() {
            osc.configure(amplitude_deg[i], offset_deg[i], period_ms, phase_rad[i]);
        }
    }

    /// Number of ticks in `cycles` periods.
    fn cycle_ticks(&self, period_ms: u64, cycles: f64) -> u64 {
        (period_ms as f64 * cycles / self.params.sampling_period_ms as f64).round() as u64
    }

    /// Sample every oscillator for `total_ticks`, centring each joint on its home angle.
    fn run_oscillation(&mut self, total_ticks: u64) {
        self.run_ticks(total_ticks, |ctrl, _, elapsed_ticks| {
            for i in 0..N {
                ctrl.oscs[i].advance_by(elapsed_ticks);
                let wave = ctrl.oscs[i].untrimmed_position();
                ctrl.write_joint(i, ctrl.home_pose_deg[i] + wave);
            }
        });
    }

    /// Record and write the commanded (untrimmed) angle of one joint.
    fn write_joint(&mut self, index: usize, commanded_deg: f64) {
        let (min, max) = self.angle_range();

        let commanded = clamp_finite(commanded_deg, min, max);
        let trimmed = commanded + f64::from(self.oscs[index].trim());
        let angle = clamp_finite(trimmed, min, max);

        if commanded != commanded_deg || angle != trimmed {
            self.report.num_clamped_writes += 1;
        }

        self.joint_positions_deg[index] = commanded;

        if let Err(e) = self.actuators[index].write_angle(angle) {
            warn!("Could not write {:.2} deg to joint {}: {}", angle, index, e);
            self.report.num_write_failures += 1;
        }
    }

    /// Run `total_ticks` sampling ticks against the clock.
    ///
    /// Tick `k` is due at `start + k * Ts`. On each wake the number of ticks actually elapsed is
    /// computed from the clock, and `on_tick(ctrl, due_tick, elapsed_ticks)` is called once with
    /// it, so a late wake catches up rather than drifting. `due_tick` never exceeds `total_ticks`
    /// and the final call always has `due_tick == total_ticks`.
    fn run_ticks<F>(&mut self, total_ticks: u64, mut on_tick: F)
    where
        F: FnMut(&mut Self, u64, u64),
    {
        let ts = self.params.sampling_period_ms;
        let start = self.clock.now_ms();
        let mut done = 0u64;

        while done < total_ticks {
            self.clock.wait_until(start + (done + 1) * ts);

            let elapsed_ms = self.clock.now_ms().saturating_sub(start);
            let due = (elapsed_ms / ts).clamp(done + 1, total_ticks);
            let elapsed_ticks = due - done;

            if elapsed_ticks > 1 {
                debug!("Sampling loop overran by {} tick(s), catching up", elapsed_ticks - 1);
                self.report.num_overrun_ticks += elapsed_ticks - 1;
            }

            on_tick(self, due, elapsed_ticks);
            self.end_tick();

            done = due;
        }
    }

    /// Book-keeping once every joint has been written for a tick.
    fn end_tick(&mut self) {
        self.report.num_ticks += 1;

        let failed = match self.arch_demands {
            Some(ref mut arch) => {
                let mut row = Vec::with_capacity(N + 1);
                row.push(self.clock.now_ms() as f64);
                row.extend_from_slice(&self.joint_positions_deg);

                match arch.serialise(row) {
                    Ok(_) => false,
                    Err(e) => {
                        warn!("Could not archive joint demands, archiving disabled: {}", e);
                        true
                    }
                }
            }
            None => false,
        };

        if failed {
            self.arch_demands = None;
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Check an oscillation command before anything is written.
fn check_cycles(period_ms: u64, cycles: f64, what: &str) -> Result<(), SyncCtrlError> {
    if period_ms == 0 {
        return Err(SyncCtrlError::InvalidPeriod);
    }
    if !cycles.is_finite() || cycles < 0.0 {
        return Err(SyncCtrlError::InvalidCommand(format!(
            "{} {} must be finite and non-negative", what, cycles
        )));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::servo_ctrl::SimServo;
    use crate::store::MemStore;
    use std::f64::consts::{PI, TAU};
    use util::time::SimClock;

    fn sim_ctrl<const N: usize>() -> SyncCtrl<SimServo, SimClock, N> {
        sim_ctrl_with(Params::with_joints(N))
    }

    fn sim_ctrl_with<const N: usize>(params: Params) -> SyncCtrl<SimServo, SimClock, N> {
        SyncCtrl::new(
            params,
            std::array::from_fn(|_| SimServo::default()),
            SimClock::new(),
        )
        .unwrap()
    }

    fn clear_writes<const N: usize>(ctrl: &mut SyncCtrl<SimServo, SimClock, N>) {
        for a in ctrl.actuators_mut().iter_mut() {
            a.clear_writes();
        }
    }

    #[test]
    fn test_new_rejects_bad_params() {
        let result = SyncCtrl::<SimServo, SimClock, 4>::new(
            Params::with_joints(2),
            std::array::from_fn(|_| SimServo::default()),
            SimClock::new(),
        );
        assert!(matches!(result, Err(SyncCtrlError::InvalidParams(_))));
    }

    #[test]
    fn test_initial_state() {
        let mut ctrl = sim_ctrl::<4>();

        assert!(!ctrl.is_resting());
        assert_eq!(ctrl.positions(), &[90.0; 4]);
        assert!(ctrl.actuators().iter().all(|a| !a.is_attached()));

        ctrl.init(None).unwrap();
        assert!(ctrl.actuators().iter().all(|a| a.is_attached()));
    }

    #[test]
    fn test_constant_offset_cycle() {
        let mut ctrl = sim_ctrl::<1>();

        ctrl.execute_gesture(&[0.0], &[45.0], 1000, &[0.0], 1.0).unwrap();

        let writes = ctrl.actuators()[0].writes();
        assert_eq!(writes.len(), 100);
        assert!(writes.iter().all(|w| *w == 135.0));
        assert_eq!(ctrl.oscillator(0).unwrap().position(), 45.0);
        assert_eq!(ctrl.clock().now_ms(), 1000);
    }

    #[test]
    fn test_antiphase_joints() {
        let mut ctrl = sim_ctrl::<2>();

        ctrl.execute_gesture(&[30.0, 30.0], &[0.0, 0.0], 1000, &[0.0, PI], 1.0).unwrap();

        let w0 = ctrl.actuators()[0].writes();
        let w1 = ctrl.actuators()[1].writes();
        assert_eq!(w0.len(), w1.len());
        for (a, b) in w0.iter().zip(w1.iter()) {
            assert!(((b - 90.0) + (a - 90.0)).abs() < 1e-9);
        }

        let p0 = ctrl.oscillator(0).unwrap().position();
        let p1 = ctrl.oscillator(1).unwrap().position();
        assert!((p1 + p0).abs() < 1e-9);
    }

    #[test]
    fn test_oscillation_closed_form() {
        let mut ctrl = sim_ctrl::<1>();
        ctrl.set_trims(&[-5]);

        ctrl.oscillate_cycle(&[20.0], &[10.0], 800, &[0.4], 1.0).unwrap();

        let n = 800.0 / 10.0;
        let writes = ctrl.actuators()[0].writes();
        assert_eq!(writes.len(), 80);
        for (k, w) in writes.iter().enumerate() {
            let k = (k + 1) as f64;
            let expected = 90.0 - 5.0 + 10.0 + 20.0 * (TAU * k / n + 0.4).sin();
            assert!((w - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_gesture_decomposition_phase() {
        let a = [30.0, 30.0, 20.0, 20.0];
        let o = [0.0, 0.0, 4.0, -4.0];
        let phi = [0.0, 0.0, -PI / 2.0, -PI / 2.0];

        let mut whole = sim_ctrl::<4>();
        whole.execute_gesture(&a, &o, 1000, &phi, 4.5).unwrap();

        let mut parts = sim_ctrl::<4>();
        for _ in 0..4 {
            parts.oscillate_cycle(&a, &o, 1000, &phi, 1.0).unwrap();
        }
        parts.oscillate_cycle(&a, &o, 1000, &phi, 0.5).unwrap();

        for i in 0..4 {
            assert_eq!(whole.oscillator(i).unwrap().phase(), parts.oscillator(i).unwrap().phase());
            assert_eq!(whole.actuators()[i].writes(), parts.actuators()[i].writes());
        }

        // 450 ticks of 2 pi / 100 each, with no discontinuity between sub-cycles
        let phase = whole.oscillator(0).unwrap().phase();
        assert!((phase - 4.5 * TAU).abs() < 1e-9);
        assert_eq!(whole.actuators()[0].writes().len(), 450);
        assert_eq!(whole.clock().now_ms(), 4500);
    }

    #[test]
    fn test_catch_up_after_overrun() {
        let mut reference = sim_ctrl::<2>();
        reference.oscillate_cycle(&[30.0, 10.0], &[0.0, 5.0], 1000, &[0.0, 1.0], 1.0).unwrap();

        let mut delayed = sim_ctrl::<2>();
        delayed.clock_mut().inject_delay(35);
        delayed.oscillate_cycle(&[30.0, 10.0], &[0.0, 5.0], 1000, &[0.0, 1.0], 1.0).unwrap();

        for i in 0..2 {
            let p_ref = reference.oscillator(i).unwrap().phase();
            let p_del = delayed.oscillator(i).unwrap().phase();
            assert!((p_ref - p_del).abs() < 1e-9);

            let last_ref = reference.actuators()[i].last_angle().unwrap();
            let last_del = delayed.actuators()[i].last_angle().unwrap();
            assert!((last_ref - last_del).abs() < 1e-9);
        }

        // The late wake covered four ticks with one write
        assert_eq!(delayed.actuators()[0].writes().len(), 97);
        assert_eq!(delayed.report().num_overrun_ticks, 3);
        assert_eq!(delayed.clock().now_ms(), 1000);
    }

    #[test]
    fn test_long_gesture_keeps_phase_with_fractional_period() {
        let mut ctrl = sim_ctrl::<1>();

        // 100.4 ticks per period
        ctrl.execute_gesture(&[30.0], &[0.0], 1004, &[0.0], 100.0).unwrap();

        assert_eq!(ctrl.clock().now_ms(), 100_400);
        assert_eq!(ctrl.actuators()[0].writes().len(), 10_040);

        let cycles = ctrl.oscillator(0).unwrap().phase() / TAU;
        assert!((cycles - 100.0).abs() < 1e-6);
        assert!((ctrl.positions()[0] - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_period_cycle_boundaries() {
        let mut ctrl = sim_ctrl::<1>();

        // Cycles end on ticks 101 and 201 from the start, the half cycle on tick 251
        ctrl.execute_gesture(&[10.0], &[0.0], 1005, &[0.0], 2.5).unwrap();

        assert_eq!(ctrl.clock().now_ms(), 2510);
        assert_eq!(ctrl.actuators()[0].writes().len(), 251);
    }

    #[test]
    fn test_direct_move_ramp() {
        let mut ctrl = sim_ctrl::<2>();

        ctrl.move_direct(&[110.0, 70.0], 100).unwrap();

        let w0 = ctrl.actuators()[0].writes();
        let w1 = ctrl.actuators()[1].writes();
        assert_eq!(w0.len(), 10);
        for (k, (a, b)) in w0.iter().zip(w1.iter()).enumerate() {
            let k = (k + 1) as f64;
            assert!((a - (90.0 + 2.0 * k)).abs() < 1e-9);
            assert!((b - (90.0 - 2.0 * k)).abs() < 1e-9);
        }
        assert_eq!(ctrl.positions(), &[110.0, 70.0]);
        assert_eq!(ctrl.clock().now_ms(), 100);
    }

    #[test]
    fn test_direct_move_below_one_tick() {
        let mut ctrl = sim_ctrl::<4>();

        ctrl.move_direct(&[10.0, 20.0, 30.0, 40.0], 5).unwrap();

        for (i, t) in [10.0, 20.0, 30.0, 40.0].iter().enumerate() {
            assert_eq!(ctrl.actuators()[i].writes(), &[*t]);
        }
        assert_eq!(ctrl.clock().now_ms(), 0);
    }

    #[test]
    fn test_direct_move_converges_then_rests() {
        let mut ctrl = sim_ctrl::<4>();
        ctrl.init(None).unwrap();

        ctrl.move_single(30.0, 0).unwrap();
        ctrl.move_direct(&[120.0, 45.5, 170.0, 3.3], 230).unwrap();
        ctrl.move_direct(&[90.0; 4], 500).unwrap();

        assert_eq!(ctrl.positions(), &[90.0; 4]);
        assert!(!ctrl.is_resting());

        ctrl.return_home(500).unwrap();
        assert!(ctrl.is_resting());
        assert!(ctrl.actuators().iter().all(|a| !a.is_attached()));
    }

    #[test]
    fn test_return_home_idempotent() {
        let mut ctrl = sim_ctrl::<4>();
        ctrl.move_direct(&[100.0; 4], 50).unwrap();

        ctrl.return_home(0).unwrap();
        assert!(ctrl.is_resting());
        assert_eq!(ctrl.positions(), &[90.0; 4]);
        assert_eq!(ctrl.clock().now_ms(), 50 + 500);

        clear_writes(&mut ctrl);
        let detaches = ctrl.actuators()[0].num_detaches();
        let now = ctrl.clock().now_ms();

        ctrl.return_home(0).unwrap();
        ctrl.home().unwrap();

        assert!(ctrl.is_resting());
        assert!(ctrl.actuators().iter().all(|a| a.writes().is_empty()));
        assert_eq!(ctrl.actuators()[0].num_detaches(), detaches);
        assert_eq!(ctrl.clock().now_ms(), now);
    }

    #[test]
    fn test_motion_leaves_rest_state() {
        let mut ctrl = sim_ctrl::<2>();

        ctrl.home().unwrap();
        assert!(ctrl.is_resting());
        ctrl.move_single(100.0, 1).unwrap();
        assert!(!ctrl.is_resting());
        assert!(ctrl.actuators().iter().all(|a| a.is_attached()));

        ctrl.home().unwrap();
        ctrl.execute_gesture(&[10.0; 2], &[0.0; 2], 500, &[0.0; 2], 0.5).unwrap();
        assert!(!ctrl.is_resting());

        ctrl.home().unwrap();
        ctrl.move_direct(&[90.0; 2], 0).unwrap();
        assert!(!ctrl.is_resting());
    }

    #[test]
    fn test_attach_while_resting_leaves_rest() {
        let mut ctrl = sim_ctrl::<2>();

        ctrl.home().unwrap();
        assert!(ctrl.is_resting());

        ctrl.attach_all();
        assert!(!ctrl.is_resting());
        assert!(ctrl.actuators().iter().all(|a| a.is_attached()));

        ctrl.home().unwrap();
        assert!(ctrl.is_resting());
        assert!(ctrl.actuators().iter().all(|a| !a.is_attached()));
    }

    #[test]
    fn test_invalid_commands_rejected() {
        let mut ctrl = sim_ctrl::<4>();

        assert!(matches!(
            ctrl.move_single(90.0, 4),
            Err(SyncCtrlError::InvalidJointIndex { index: 4, num_joints: 4 })
        ));
        assert!(matches!(
            ctrl.execute_gesture(&[10.0; 4], &[0.0; 4], 0, &[0.0; 4], 2.0),
            Err(SyncCtrlError::InvalidPeriod)
        ));
        assert!(matches!(
            ctrl.oscillate_cycle(&[10.0; 4], &[0.0; 4], 1000, &[0.0; 4], f64::NAN),
            Err(SyncCtrlError::InvalidCommand(_))
        ));
        assert!(matches!(
            ctrl.execute_gesture(&[10.0; 4], &[0.0; 4], 1000, &[0.0; 4], -1.0),
            Err(SyncCtrlError::InvalidCommand(_))
        ));
        assert!(matches!(
            ctrl.move_direct(&[90.0, f64::NAN, 90.0, 90.0], 100),
            Err(SyncCtrlError::InvalidCommand(_))
        ));
        assert!(ctrl.set_trim(9, 1).is_err());

        assert!(ctrl.actuators().iter().all(|a| a.writes().is_empty()));
        assert_eq!(ctrl.clock().now_ms(), 0);
    }

    #[test]
    fn test_out_of_range_angles_clamped() {
        let mut ctrl = sim_ctrl::<2>();
        ctrl.set_trims(&[10, 0]);

        ctrl.move_single(200.0, 1).unwrap();
        assert_eq!(ctrl.positions()[1], 180.0);
        assert_eq!(ctrl.actuators()[1].last_angle(), Some(180.0));

        ctrl.move_single(175.0, 0).unwrap();
        assert_eq!(ctrl.positions()[0], 175.0);
        assert_eq!(ctrl.actuators()[0].last_angle(), Some(180.0));

        ctrl.execute_gesture(&[120.0, 0.0], &[0.0, 0.0], 400, &[0.0, 0.0], 1.0).unwrap();
        assert!(ctrl.actuators()[0].writes().iter().all(|w| (0.0..=180.0).contains(w)));

        assert_eq!(ctrl.report().num_write_failures, 0);
        assert!(ctrl.report().num_clamped_writes > 0);
    }

    #[test]
    fn test_trims_applied_and_persisted() {
        let mut ctrl = sim_ctrl::<4>();
        ctrl.set_trims(&[-20, 0, 5, 100]);
        assert_eq!(ctrl.trims(), [-20, 0, 5, 30]);

        ctrl.move_direct(&[90.0; 4], 0).unwrap();
        let written: Vec<f64> = ctrl
            .actuators()
            .iter()
            .map(|a| a.last_angle().unwrap())
            .collect();
        assert_eq!(written, vec![70.0, 90.0, 95.0, 120.0]);
        assert_eq!(ctrl.positions(), &[90.0; 4]);

        let mut store = MemStore::new(64);
        ctrl.save_trims(&mut store).unwrap();
        assert_eq!(store.read_byte(0).unwrap(), 70);

        let mut other = sim_ctrl::<4>();
        other.init(Some(&store)).unwrap();
        assert_eq!(other.trims(), [-20, 0, 5, 30]);
    }

    #[test]
    fn test_runtime_trims_not_persisted() {
        let mut store = MemStore::new(8);
        let mut ctrl = sim_ctrl::<2>();
        ctrl.set_trims(&[4, -4]);
        ctrl.save_trims(&mut store).unwrap();

        ctrl.set_trim(0, 12).unwrap();
        ctrl.load_trims(&store).unwrap();
        assert_eq!(ctrl.trims(), [4, -4]);
    }

    #[test]
    fn test_reversed_joint_mirrors() {
        let mut params = Params::with_joints(2);
        params.reversed = vec![false, true];
        let mut ctrl = sim_ctrl_with::<2>(params);

        ctrl.execute_gesture(&[25.0, 25.0], &[5.0, 5.0], 600, &[0.3, 0.3], 1.0).unwrap();

        let w0 = ctrl.actuators()[0].writes();
        let w1 = ctrl.actuators()[1].writes();
        for (a, b) in w0.iter().zip(w1.iter()) {
            assert!(((a - 90.0) + (b - 90.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stopped_oscillator_holds() {
        let mut ctrl = sim_ctrl::<2>();
        ctrl.oscillate_cycle(&[30.0; 2], &[0.0; 2], 1000, &[0.0; 2], 0.25).unwrap();

        let held = ctrl.actuators()[1].last_angle().unwrap();
        ctrl.oscillator_mut(1).unwrap().stop();
        ctrl.oscillate_cycle(&[30.0; 2], &[0.0; 2], 1000, &[0.0; 2], 0.25).unwrap();

        assert!(ctrl.actuators()[1].writes()[25..].iter().all(|w| *w == held));
        assert!(ctrl.actuators()[0].writes()[25..].iter().any(|w| *w != held));
    }

    #[test]
    fn test_stopped_joint_follows_new_trim() {
        let mut ctrl = sim_ctrl::<1>();
        ctrl.set_trims(&[5]);
        ctrl.oscillate_cycle(&[30.0], &[0.0], 1000, &[0.0], 0.25).unwrap();

        // Top of the swing with the old trim
        let held = ctrl.positions()[0];
        assert!((held - 120.0).abs() < 1e-9);
        assert!((ctrl.actuators()[0].last_angle().unwrap() - 125.0).abs() < 1e-9);

        ctrl.oscillator_mut(0).unwrap().stop();
        ctrl.set_trims(&[-8]);
        ctrl.oscillate_cycle(&[30.0], &[0.0], 1000, &[0.0], 0.1).unwrap();

        assert_eq!(ctrl.positions()[0], held);
        assert!(ctrl.actuators()[0].writes()[25..].iter().all(|w| (w - (held - 8.0)).abs() < 1e-9));
    }

    #[test]
    fn test_wait_does_not_write() {
        let mut ctrl = sim_ctrl::<2>();
        ctrl.wait(800);

        assert_eq!(ctrl.clock().now_ms(), 800);
        assert!(ctrl.actuators().iter().all(|a| a.writes().is_empty()));
    }

    #[test]
    fn test_oscillation_updates_positions() {
        let mut ctrl = sim_ctrl::<1>();
        ctrl.oscillate_cycle(&[30.0], &[0.0], 1000, &[0.0], 0.25).unwrap();

        // A quarter period ends at the top of the swing
        assert!((ctrl.positions()[0] - 120.0).abs() < 1e-9);

        ctrl.move_direct(&[90.0], 300).unwrap();
        let first = ctrl.actuators()[0].writes()[25];
        assert!((first - 119.0).abs() < 1e-9);
    }
}
