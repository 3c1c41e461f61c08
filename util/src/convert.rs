//! Implements `Convert` functions between various external types.
//!
//! The main job of this module is moving marker poses between the recognizer's
//! axis convention (up along the camera depth axis) and the scene convention
//! (up along the height axis). That change is a fixed relabelling of axes, not
//! a numerical estimation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Matrix4;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait Convert<O> {
    fn convert(&self) -> O;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

/// Column-major 16-element pose arrays, as sent by the marker recognizer.
impl Convert<Matrix4<f64>> for [f64; 16] {
    fn convert(&self) -> Matrix4<f64> {
        Matrix4::from_column_slice(self)
    }
}

impl Convert<[f64; 16]> for Matrix4<f64> {
    fn convert(&self) -> [f64; 16] {
        let mut array = [0.0; 16];
        array.copy_from_slice(self.as_slice());
        array
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The constant basis change from the recognizer frame into the scene frame.
///
/// The recognizer reports marker poses with the marker normal along its z
/// axis, while the scene places up along y. The change maps x -> x, y -> z,
/// z -> -y, which is a -90 degree rotation about x.
pub fn recognizer_to_scene_basis() -> Matrix4<f64> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, -1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Convert a recognizer-frame pose matrix into the scene frame.
///
/// Applies the fixed basis change to the whole rigid transform, so both the
/// rotation and the translation components are relabelled.
pub fn recognizer_to_scene(pose: &Matrix4<f64>) -> Matrix4<f64> {
    recognizer_to_scene_basis() * pose
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector4;

    #[test]
    fn test_identity_maps_to_basis_change() {
        let converted = recognizer_to_scene(&Matrix4::identity());
        assert_eq!(converted, recognizer_to_scene_basis());
    }

    #[test]
    fn test_translation_is_relabelled() {
        let mut pose = Matrix4::identity();
        pose.set_column(3, &Vector4::new(1.0, 2.0, 3.0, 1.0));

        let converted = recognizer_to_scene(&pose);

        // y becomes z, z becomes -y
        assert_eq!(converted[(0, 3)], 1.0);
        assert_eq!(converted[(1, 3)], 3.0);
        assert_eq!(converted[(2, 3)], -2.0);
        assert_eq!(converted[(3, 3)], 1.0);
    }

    #[test]
    fn test_pose_array_round_trip() {
        let pose: [f64; 16] = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.5, -0.25, 2.0, 1.0,
        ];

        let matrix: Matrix4<f64> = pose.convert();
        let array: [f64; 16] = matrix.convert();

        assert_eq!(pose, array);
    }
}
