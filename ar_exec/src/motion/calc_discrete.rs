//! Motion calculations for discrete (key held) steering

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{ControlInputs, MotionCtrl, SteerInput};

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionCtrl {
    /// Run one integration step with the steering driven by held keys.
    ///
    /// Each held steer key contributes a fixed heading rate, there is no
    /// wheel angle to smooth.
    pub(crate) fn calc_discrete(&mut self, controls: &ControlInputs) {
        let accel = self.throttle_accel(controls);

        let steer_delta_rad = match controls.steer {
            SteerInput::Left => self.params.turn_rate_rad,
            SteerInput::Right => -self.params.turn_rate_rad,
            _ => 0.0,
        };

        self.step(accel, controls.brake, steer_delta_rad);
    }
}
