//! # Marker Recognizer Messages
//!
//! The recognizer publishes one message per processed video frame, carrying
//! the identifier of the detected fiducial marker and its pose relative to
//! the camera. Frames with no marker carry the sentinel id.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Sentinel marker id meaning "no marker detected in this frame".
pub const NO_MARKER_ID: i32 = -1;

/// Number of elements in a 4x4 column-major pose matrix.
pub const POSE_NUM_ELEMENTS: usize = 16;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single marker detection published by the recognizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerDetection {
    /// The decoded marker id, or [`NO_MARKER_ID`] if no marker was found.
    pub marker_id: i32,

    /// The marker pose as a 4x4 column-major matrix in the recognizer's axis
    /// convention. May be empty when `marker_id` is the sentinel.
    pub pose: Vec<f64>,

    /// Time at which the source frame was captured.
    pub timestamp: DateTime<Utc>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MarkerDetection {
    /// True if this detection is the "no marker" sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.marker_id == NO_MARKER_ID
    }

    /// Get the pose as a fixed-size element array, or `None` if the pose is
    /// malformed (wrong length or non-finite elements).
    ///
    /// Malformed poses are expected steady-state noise from the recognizer
    /// and must never be treated as faults by the caller.
    pub fn pose_elements(&self) -> Option<[f64; POSE_NUM_ELEMENTS]> {
        if self.pose.len() != POSE_NUM_ELEMENTS {
            return None;
        }

        if self.pose.iter().any(|e| !e.is_finite()) {
            return None;
        }

        let mut elements = [0.0; POSE_NUM_ELEMENTS];
        elements.copy_from_slice(&self.pose);
        Some(elements)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn identity_pose() -> Vec<f64> {
        let mut pose = vec![0.0; POSE_NUM_ELEMENTS];
        for i in 0..4 {
            pose[i * 5] = 1.0;
        }
        pose
    }

    #[test]
    fn test_sentinel() {
        let det = MarkerDetection {
            marker_id: NO_MARKER_ID,
            pose: vec![],
            timestamp: Utc::now(),
        };
        assert!(det.is_sentinel());
    }

    #[test]
    fn test_pose_elements_valid() {
        let det = MarkerDetection {
            marker_id: 7,
            pose: identity_pose(),
            timestamp: Utc::now(),
        };
        let elements = det.pose_elements().unwrap();
        assert_eq!(elements[0], 1.0);
        assert_eq!(elements[15], 1.0);
    }

    #[test]
    fn test_pose_elements_malformed() {
        let empty = MarkerDetection {
            marker_id: 7,
            pose: vec![],
            timestamp: Utc::now(),
        };
        assert!(empty.pose_elements().is_none());

        let mut pose = identity_pose();
        pose[3] = f64::NAN;
        let nan = MarkerDetection {
            marker_id: 7,
            pose,
            timestamp: Utc::now(),
        };
        assert!(nan.pose_elements().is_none());
    }
}
