//! # Servo Controller Module
//!
//! This module provides [`Actuator`] implementations for the joint servos, abstracting over
//! different types of servo driver boards, plus a simulated servo for running without hardware.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`ServoDriver`] implementation for the Adafruit PCA9685 16 channel servo driver board.
pub mod pca9685;

/// Simulated servo which records every demand.
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use eqpt_if::eqpt::servo::{Actuator, ActuatorError};
use log::debug;
use serde::{Deserialize, Serialize};
use util::maths::lin_map;

pub use sim::SimServo;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing servo driver boards.
pub trait ServoDriver {

    /// The type that the underlying driver uses for channel identification
    type Channel: Copy + std::fmt::Debug;

    /// Set the duty cycle of a channel.
    ///
    /// ## Arguments
    /// - `channel` - The channel to set the duty cycle for
    /// - `duty_cycle` - The duty cycle to set. Must be a value between 0.0 and 1.0. Values outside
    ///   this range will be rejected.
    fn set_duty_cycle(&mut self, channel: Self::Channel, duty_cycle: f64) -> Result<(), ServoError>;

    /// Turn the channel fully off, removing drive from the servo.
    fn set_off(&mut self, channel: Self::Channel) -> Result<(), ServoError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pulse configuration shared by the servos on a board.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PwmConfig {
    /// PWM frequency of the board.
    ///
    /// Units: hertz
    pub pwm_freq_hz: f64,

    /// Pulse width commanding `min_angle_deg`.
    ///
    /// Units: microseconds
    pub min_pulse_us: f64,

    /// Pulse width commanding `max_angle_deg`.
    ///
    /// Units: microseconds
    pub max_pulse_us: f64,

    /// Units: degrees
    pub min_angle_deg: f64,

    /// Units: degrees
    pub max_angle_deg: f64,
}

/// A positional servo on one channel of a (possibly shared) driver board.
pub struct PwmServo<D: ServoDriver> {
    driver: Rc<RefCell<D>>,
    channel: D::Channel,
    config: PwmConfig,
    attached: bool,
    last_angle_deg: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ServoError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Duty cycle must be between 0.0 and 1.0")]
    InvalidDutyCycle,

    #[error("Invalid board configuration: {0}")]
    InvalidConfig(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            pwm_freq_hz: 50.0,
            min_pulse_us: 500.0,
            max_pulse_us: 2500.0,
            min_angle_deg: 0.0,
            max_angle_deg: 180.0,
        }
    }
}

impl PwmConfig {
    /// Duty cycle which commands the given angle.
    pub fn angle_to_duty_cycle(&self, angle_deg: f64) -> f64 {
        let pulse_us = lin_map(
            (self.min_angle_deg, self.max_angle_deg),
            (self.min_pulse_us, self.max_pulse_us),
            angle_deg,
        );

        pulse_us * self.pwm_freq_hz / 1e6
    }

    /// Check the configuration describes a usable servo.
    pub fn are_valid(&self) -> Result<(), ServoError> {
        if !(self.pwm_freq_hz > 0.0) {
            return Err(ServoError::InvalidConfig(format!(
                "PWM frequency must be positive, found {}", self.pwm_freq_hz
            )));
        }
        if !(self.max_angle_deg > self.min_angle_deg) {
            return Err(ServoError::InvalidConfig(
                "Maximum angle must be greater than the minimum angle".into()
            ));
        }
        if self.max_pulse_us * self.pwm_freq_hz / 1e6 > 1.0 || self.min_pulse_us < 0.0 {
            return Err(ServoError::InvalidConfig(
                "Pulse widths do not fit within the PWM period".into()
            ));
        }

        Ok(())
    }
}

impl<D: ServoDriver> PwmServo<D> {
    /// Create a new servo on `channel` of `driver`. The servo starts detached.
    pub fn new(driver: Rc<RefCell<D>>, channel: D::Channel, config: PwmConfig) -> Self {
        Self {
            driver,
            channel,
            config,
            attached: false,
            last_angle_deg: None,
        }
    }

    pub fn channel(&self) -> D::Channel {
        self.channel
    }

    fn drive(&mut self, angle_deg: f64) -> Result<(), ActuatorError> {
        let duty = self.config.angle_to_duty_cycle(angle_deg);
        self.driver
            .borrow_mut()
            .set_duty_cycle(self.channel, duty)
            .map_err(|e| ActuatorError::Driver(e.to_string()))
    }
}

impl<D: ServoDriver> Actuator for PwmServo<D> {
    fn attach(&mut self) -> Result<(), ActuatorError> {
        if self.attached {
            return Ok(());
        }

        // Resume holding the last demand, if there was one
        if let Some(a) = self.last_angle_deg {
            self.drive(a)?;
        }

        debug!("Servo on channel {:?} attached", self.channel);
        self.attached = true;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), ActuatorError> {
        if !self.attached {
            return Ok(());
        }

        self.driver
            .borrow_mut()
            .set_off(self.channel)
            .map_err(|e| ActuatorError::Driver(e.to_string()))?;

        debug!("Servo on channel {:?} detached", self.channel);
        self.attached = false;
        Ok(())
    }

    fn write_angle(&mut self, angle_deg: f64) -> Result<(), ActuatorError> {
        if !self.attached {
            return Err(ActuatorError::NotAttached);
        }
        if !(angle_deg >= self.config.min_angle_deg && angle_deg <= self.config.max_angle_deg) {
            return Err(ActuatorError::InvalidAngle(angle_deg));
        }

        self.drive(angle_deg)?;
        self.last_angle_deg = Some(angle_deg);
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}
