//! Parameters for the vehicle motion module
//!
//! See `params/motion_ctrl.toml` for the specific values of these parameters.
//!
//! The motion model is a fixed-step integrator running at the cycle rate, so
//! all rates here are per cycle, not per second.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Speed increment added while a throttle control is held.
    ///
    /// Units: scene units/cycle
    pub accel_rate: f64,

    /// Maximum speed of the car. The velocity vector is scaled back onto this
    /// limit whenever it is exceeded.
    ///
    /// Units: scene units/cycle
    pub max_speed: f64,

    /// Fraction of the velocity retained each cycle. Values just below one
    /// give a gentle coast-down when the throttle is released.
    pub friction_factor: f64,

    /// Extra velocity retention factor applied while the brake is held, on
    /// top of friction.
    pub brake_factor: f64,

    /// Heading change applied per cycle while a steer key is held.
    ///
    /// Units: radians/cycle
    pub turn_rate_rad: f64,

    /// Speed below which steering has no effect, so a parked car cannot spin
    /// on the spot.
    ///
    /// Units: scene units/cycle
    pub turn_deadzone: f64,

    /// Exponential smoothing factor applied to the gesture wheel angle, in
    /// (0, 1]. One means no smoothing.
    pub steer_smoothing_factor: f64,

    /// Gesture samples below this confidence freeze the car entirely.
    pub confidence_threshold: f64,

    /// Heading change per cycle per radian of smoothed wheel angle.
    ///
    /// Units: 1/cycle
    pub gesture_turn_gain: f64,
}
