//! # AR exec library.
//!
//! This library allows other crates in the workspace to access items defined inside the exec
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Plane anchor module - pins the virtual scene to a recognised marker
pub mod anchor;

/// Vehicle motion module - integrates the car's pose from driver inputs
pub mod motion;

/// Global data store for the exec
pub mod data_store;

/// Parameters for the exec itself
pub mod params;

/// Marker client - receives marker detections from the recognizer process
pub mod marker_client;

/// Gesture client - receives steering samples from the hand tracker process
#[cfg(feature = "gesture")]
pub mod gesture_client;

/// Input client - receives driver commands from the frontend
pub mod input_client;

/// Render server - publishes the scene state for the display process
pub mod render_server;
