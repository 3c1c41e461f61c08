//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Driver input definitions (key events and system actions)
pub mod input;

/// Message definitions for equipment (marker recognizer, gesture tracker)
pub mod eqpt;

/// Network module
pub mod net;
