//! # Biped library.
//!
//! Joint synchronisation for small servo driven robots, plus the gesture catalogue of the four
//! servo biped. The executable and benchmarks access the engine through this library.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Calibration trims - persists per joint trims to a byte store
pub mod calib;

/// Gestures - the biped's canned motions, expressed as oscillator tables and poses
pub mod gestures;

/// Oscillator - sinusoidal waveform generator for a single joint
pub mod osc;

/// Servo control - actuator implementations for driver boards and simulation
pub mod servo_ctrl;

/// Byte stores - EEPROM emulation in memory or in a file
pub mod store;

/// Synchronisation control - drives every joint together from one sampling loop
pub mod sync_ctrl;
