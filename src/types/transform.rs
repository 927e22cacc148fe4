//! Transform types for bone and page rotations.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local rotation of one page bone.
///
/// Two independent axes: `fold` about X (lifts the page edge during a turn)
/// and `twist` about Y (the spine axis the page turns around). Applied in
/// XYZ Euler order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneRotation {
    /// Rotation about X in radians.
    pub fold: f32,
    /// Rotation about Y in radians.
    pub twist: f32,
}

impl BoneRotation {
    pub fn new(twist: f32, fold: f32) -> Self {
        Self { fold, twist }
    }

    /// Check if this is an identity rotation.
    pub fn is_identity(&self) -> bool {
        self.fold == 0.0 && self.twist == 0.0
    }

    /// Get the rotation as a quaternion.
    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.fold, self.twist, 0.0)
    }
}

/// Local transform of a bone: translate by its rest offset, then rotate.
pub fn local_transform(offset: Vec3, rotation: BoneRotation) -> Mat4 {
    Mat4::from_rotation_translation(rotation.to_quat(), offset)
}

/// Transform of a page group inside the book.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageTransform {
    /// Translation of the group.
    pub translation: [f32; 3],
    /// Rotation about Y in radians.
    pub rotation_y: f32,
}

impl PageTransform {
    pub fn new(translation: [f32; 3], rotation_y: f32) -> Self {
        Self {
            translation,
            rotation_y,
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(
            Quat::from_rotation_y(self.rotation_y),
            Vec3::from(self.translation),
        )
    }
}
