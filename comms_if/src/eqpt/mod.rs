//! # Equipment message definitions
//!
//! Wire formats for the external processes the exec talks to: the marker
//! recognizer and the gesture tracker.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod gesture;
pub mod marker;
