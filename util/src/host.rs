//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable which points at the root of the software checkout.
///
/// All parameter files and session directories are resolved relative to this
/// root so that the executables can be run from any working directory.
pub const SW_ROOT_ENV_VAR: &str = "GHOST_WHEEL_SW_ROOT";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with resolving host information.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("The software root environment variable (GHOST_WHEEL_SW_ROOT) is not set")]
    SwRootNotSet,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the root directory of the software checkout.
pub fn get_ghost_wheel_sw_root() -> Result<PathBuf, HostError> {
    match env::var(SW_ROOT_ENV_VAR) {
        Ok(p) => Ok(PathBuf::from(p)),
        Err(_) => Err(HostError::SwRootNotSet),
    }
}

/// Get a short description of the host platform.
pub fn get_host_description() -> String {
    format!("{} ({})", env::consts::OS, env::consts::ARCH)
}
