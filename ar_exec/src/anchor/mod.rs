//! Plane anchor module

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

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

/// Possible errors that can occur during AnchorCtrl operation.
///
/// Anchor processing never fails once the module is initialised: bad
/// detections are rejected and counted in the status report instead.
#[derive(Debug, thiserror::Error)]
pub enum AnchorCtrlError {}
