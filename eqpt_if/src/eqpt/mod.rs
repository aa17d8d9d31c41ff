//! # Equipment Interface
//!
//! This module defines the traits which equipment drivers implement so they can be driven by the
//! joint synchronisation engine.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod servo;
pub mod store;
