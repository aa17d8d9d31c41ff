//! # Oscillator
//!
//! Sinusoidal waveform generator for a single joint. One sample is produced per sampling tick:
//!
//! ```text
//! position = trim + O + A * sin(phase + phi)
//! ```
//!
//! where `phase` advances by `2 pi / (T / Ts)` on every tick. The oscillator holds no actuator,
//! the synchronisation engine converts its position into a joint angle and writes it out.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;
use std::f64::consts::TAU;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Waveform generator for one joint.
#[derive(Debug, Clone, Serialize)]
pub struct Oscillator {
    /// Amplitude of the swing.
    ///
    /// Units: degrees
    amplitude_deg: f64,

    /// Offset of the centre of the swing.
    ///
    /// Units: degrees
    offset_deg: f64,

    /// Period of one oscillation.
    ///
    /// Units: milliseconds
    period_ms: u64,

    /// Initial phase.
    ///
    /// Units: radians
    phase0_rad: f64,

    /// Calibration trim added to every position.
    ///
    /// Units: degrees
    trim_deg: i8,

    /// Negate the waveform term, for servos mounted mirrored.
    reversed: bool,

    /// Sampling period the phase increment is derived from.
    ///
    /// Units: milliseconds
    sampling_period_ms: u64,

    /// Running phase accumulator.
    ///
    /// Units: radians
    phase_rad: f64,

    /// Phase added on every tick.
    ///
    /// Units: radians
    inc_rad: f64,

    /// Waveform term at the last running tick, held while stopped. Trim is not included so that a
    /// trim change applies to a held joint too.
    ///
    /// Units: degrees
    held_deg: f64,

    running: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Oscillator {
    /// Create a new stationary oscillator sampled every `sampling_period_ms`.
    pub fn new(sampling_period_ms: u64) -> Self {
        Self {
            amplitude_deg: 0.0,
            offset_deg: 0.0,
            period_ms: 0,
            phase0_rad: 0.0,
            trim_deg: 0,
            reversed: false,
            sampling_period_ms,
            phase_rad: 0.0,
            inc_rad: 0.0,
            held_deg: 0.0,
            running: true,
        }
    }

    /// Set the waveform parameters.
    ///
    /// The running phase is not reset, so consecutive segments join without a discontinuity.
    /// Negative or non-finite amplitudes are stored as zero, a non-finite offset or phase as zero.
    pub fn configure(&mut self, amplitude_deg: f64, offset_deg: f64, period_ms: u64, phase_rad: f64) {
        self.amplitude_deg = if amplitude_deg.is_finite() && amplitude_deg > 0.0 {
            amplitude_deg
        } else {
            0.0
        };
        self.offset_deg = if offset_deg.is_finite() { offset_deg } else { 0.0 };
        self.phase0_rad = if phase_rad.is_finite() { phase_rad } else { 0.0 };
        self.set_period(period_ms);
    }

    /// Set the period, recomputing the phase increment.
    ///
    /// A zero period (or zero sampling period) leaves the oscillator with no increment, so it never
    /// advances.
    pub fn set_period(&mut self, period_ms: u64) {
        self.period_ms = period_ms;
        self.inc_rad = match self.samples_per_period() {
            Some(n) => TAU / n,
            None => 0.0,
        };
    }

    pub fn set_trim(&mut self, trim_deg: i8) {
        self.trim_deg = trim_deg;
    }

    pub fn trim(&self) -> i8 {
        self.trim_deg
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Freeze the oscillator at its last position.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Resume advancing.
    pub fn play(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Return the running phase to zero.
    pub fn reset(&mut self) {
        self.phase_rad = 0.0;
    }

    /// Advance by one sampling tick and return the new position.
    pub fn advance(&mut self) -> f64 {
        self.advance_by(1)
    }

    /// Advance by `ticks` elapsed sampling ticks in one step and return the new position.
    ///
    /// Used when the sampling loop wakes late: the phase lands where it would have been had every
    /// tick been serviced. A stopped oscillator returns its held position unchanged.
    pub fn advance_by(&mut self, ticks: u64) -> f64 {
        if self.running {
            self.phase_rad += ticks as f64 * self.inc_rad;
            self.held_deg = self.waveform();
        }

        self.position()
    }

    /// The untrimmed waveform term, `O + A sin(phase + phi)`, negated when reversed.
    pub fn waveform(&self) -> f64 {
        let w = self.offset_deg + self.amplitude_deg * (self.phase_rad + self.phase0_rad).sin();
        if self.reversed { -w } else { w }
    }

    /// The last computed position, including the current trim.
    ///
    /// Units: degrees, relative to the joint's centre
    pub fn position(&self) -> f64 {
        f64::from(self.trim_deg) + self.held_deg
    }

    /// The last computed position without trim.
    ///
    /// Units: degrees, relative to the joint's centre
    pub fn untrimmed_position(&self) -> f64 {
        self.held_deg
    }

    /// The running phase accumulator.
    pub fn phase(&self) -> f64 {
        self.phase_rad
    }

    /// Phase added per tick.
    pub fn phase_increment(&self) -> f64 {
        self.inc_rad
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    pub fn sampling_period_ms(&self) -> u64 {
        self.sampling_period_ms
    }

    /// Number of samples in one period, or `None` for a degenerate period.
    pub fn samples_per_period(&self) -> Option<f64> {
        if self.period_ms == 0 || self.sampling_period_ms == 0 {
            None
        }
        else {
            Some(self.period_ms as f64 / self.sampling_period_ms as f64)
        }
    }
}
