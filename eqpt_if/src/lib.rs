//! # Equipment interface crate.
//!
//! Provides the interfaces between the joint control software and the equipment it drives: the
//! servo actuators and the persistent byte store holding calibration data.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Actuator and byte store interface definitions
pub mod eqpt;
