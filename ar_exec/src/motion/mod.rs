//! Vehicle motion module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_discrete;
mod calc_gesture;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during MotionCtrl operation.
///
/// Motion processing is pure arithmetic on the current state and cannot fail
/// once the module is initialised.
#[derive(Debug, thiserror::Error)]
pub enum MotionCtrlError {}
