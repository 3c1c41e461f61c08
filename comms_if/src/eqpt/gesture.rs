//! # Gesture Tracker Messages
//!
//! The gesture tracker turns the height difference between the driver's two
//! hands into a steering wheel angle and publishes it with a confidence
//! score. The exec treats low-confidence samples as "hands off the wheel".

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Maximum magnitude of the published steering angle.
///
/// Units: degrees
pub const MAX_STEERING_ANGLE_DEG: f64 = 45.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single steering sample from the gesture tracker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SteeringData {
    /// Capture time of the sample in milliseconds since the unix epoch.
    pub timestamp: i64,

    /// Steering wheel angle in degrees, positive to the right, clamped by the
    /// tracker to [-45, 45].
    pub steering_angle: f64,

    /// Tracking confidence in [0, 1]. Zero when fewer than two hands are
    /// visible.
    pub confidence: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Messages published on the gesture channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureMsg {
    /// Periodic steering sample
    SteeringData(SteeringData),

    /// Connection greeting sent by the tracker when a client attaches
    Connection { status: String },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SteeringData {
    /// The steering angle clamped into the valid range.
    ///
    /// The tracker clamps before publishing, but a hand-rolled publisher (or
    /// a bug on the other end) must not be able to demand a larger angle.
    pub fn clamped_angle_deg(&self) -> f64 {
        self.steering_angle
            .max(-MAX_STEERING_ANGLE_DEG)
            .min(MAX_STEERING_ANGLE_DEG)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_steering_data() {
        let json = r#"{
            "type": "steering_data",
            "timestamp": 1700000000000,
            "steering_angle": -12.5,
            "confidence": 0.92
        }"#;

        let msg: GestureMsg = serde_json::from_str(json).unwrap();

        match msg {
            GestureMsg::SteeringData(data) => {
                assert_eq!(data.timestamp, 1700000000000);
                assert_eq!(data.steering_angle, -12.5);
                assert_eq!(data.confidence, 0.92);
            }
            other => panic!("Expected steering data, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_connection() {
        let json = r#"{ "type": "connection", "status": "connected" }"#;
        let msg: GestureMsg = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, GestureMsg::Connection { .. }));
    }

    #[test]
    fn test_clamped_angle() {
        let data = SteeringData {
            timestamp: 0,
            steering_angle: 90.0,
            confidence: 1.0,
        };
        assert_eq!(data.clamped_angle_deg(), MAX_STEERING_ANGLE_DEG);

        let data = SteeringData {
            timestamp: 0,
            steering_angle: -60.0,
            confidence: 1.0,
        };
        assert_eq!(data.clamped_angle_deg(), -MAX_STEERING_ANGLE_DEG);
    }
}
