//! Motion calculations for gesture (wheel angle) steering

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{ControlInputs, MotionCtrl};
use comms_if::eqpt::gesture::MAX_STEERING_ANGLE_DEG;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionCtrl {
    /// Run one integration step with the steering driven by a gesture sample.
    ///
    /// A sample below the confidence threshold acts as a dead-man's switch:
    /// the whole step is skipped, so the car holds its last pose rather than
    /// coasting on while the driver's hands are off the wheel.
    pub(crate) fn calc_gesture(&mut self, controls: &ControlInputs, angle_deg: f64, confidence: f64) {
        if confidence < self.params.confidence_threshold {
            self.report.gesture_gated = true;
            trace!(
                "Gesture sample gated, confidence {:.2} below threshold {:.2}",
                confidence,
                self.params.confidence_threshold
            );
            return;
        }

        // Smooth the wheel towards the measured angle so tracker jitter
        // doesn't shake the car
        let target_deg = clamp(&angle_deg, &-MAX_STEERING_ANGLE_DEG, &MAX_STEERING_ANGLE_DEG);
        self.smoothed_steer_deg +=
            (target_deg - self.smoothed_steer_deg) * self.params.steer_smoothing_factor;

        // Positive wheel angle is to the right, which lowers the heading
        let steer_delta_rad =
            -self.smoothed_steer_deg.to_radians() * self.params.gesture_turn_gain;

        let accel = self.throttle_accel(controls);

        self.step(accel, controls.brake, steer_delta_rad);
    }
}
