//! Parameters for the exec itself
//!
//! See `params/ar_exec.toml` for the specific values of these parameters.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ArExecParams {
    /// Number of cycles a gesture steering sample stays usable before the
    /// exec falls back to key steering.
    pub gesture_stale_limit_cycles: u64,

    /// Whether the ground grid overlay starts visible.
    pub grid_visible_default: bool,
}
