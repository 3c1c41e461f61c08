//! Parameters for the plane anchor module
//!
//! See `params/anchor_ctrl.toml` for the specific values of these parameters.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Minimum time between recognition requests while searching for a
    /// marker.
    ///
    /// Units: seconds
    pub recognition_interval_s: f64,
}
