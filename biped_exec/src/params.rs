//! # Biped Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use biped_lib::{gestures::Gesture, servo_ctrl::PwmConfig, sync_ctrl::Params};
use eqpt_if::eqpt::servo::JointId;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct BipedExecParams {
    /// Synchronisation engine parameters
    pub sync_ctrl: Params,

    /// Which servos to drive
    pub backend: ServoBackend,

    /// Calibration trim handling
    pub calib: CalibParams,

    /// Log every simulated servo write
    #[serde(default)]
    pub per_tick_logging: bool,

    /// Archive every tick's joint demands into the session
    #[serde(default)]
    pub archive_demands: bool,

    /// Gestures to perform, in order. Empty runs the demonstration routine.
    #[serde(default)]
    pub routine: Vec<Gesture>,
}

#[derive(Deserialize)]
pub struct CalibParams {
    /// Path of the calibration store file, relative to the software root. No file keeps trims in
    /// memory only.
    pub store_file: Option<String>,

    /// Number of bytes in the calibration store
    pub store_capacity: usize,

    /// Load trims from the store at startup
    pub load: bool,

    /// Trims to apply after loading, one per joint
    pub trims: Option<Vec<i8>>,

    /// Save the trims in use back to the store
    pub save: bool,
}

/// Mapping of a joint onto a driver board channel.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct ChannelMap {
    pub joint: JointId,
    pub channel: u8,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServoBackend {
    /// Simulated servos, no hardware required
    Sim,

    /// Servos on a PCA9685 board
    Pca9685 {
        /// 7 bit I2C address of the board
        i2c_address: u8,

        #[serde(default)]
        pwm: PwmConfig,

        /// Board channel of each joint
        channels: Vec<ChannelMap>,
    },
}
