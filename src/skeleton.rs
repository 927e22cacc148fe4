//! Arena-backed bone chain for one page.
//!
//! Bones live in a flat `Vec` with parent indices. Parents always precede
//! their children, so world transforms resolve in a single forward pass.

use crate::geometry::Vertex;
use crate::types::{local_transform, BoneRotation};
use glam::{Mat4, Vec3, Vec4};

/// A rigid sub-transform of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    /// Parent bone index; `None` for the root, which hangs off the page group.
    pub parent: Option<usize>,
    /// Rest translation relative to the parent.
    pub offset: Vec3,
    /// Current local rotation.
    pub rotation: BoneRotation,
}

/// Ordered chain of bones plus their bind pose.
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
    inverse_bind: Vec<Mat4>,
}

impl Skeleton {
    /// Build a straight chain along +X: `segments + 1` bones, the root at the
    /// origin and each following bone one segment further out.
    pub fn chain(segments: usize, segment_width: f32) -> Self {
        let bones = (0..=segments)
            .map(|i| Bone {
                parent: i.checked_sub(1),
                offset: if i == 0 {
                    Vec3::ZERO
                } else {
                    Vec3::new(segment_width, 0.0, 0.0)
                },
                rotation: BoneRotation::default(),
            })
            .collect();
        Self::from_bones(bones)
    }

    /// Build from explicit bones, capturing the current pose as bind pose.
    pub fn from_bones(bones: Vec<Bone>) -> Self {
        let mut skeleton = Self {
            bones,
            inverse_bind: Vec::new(),
        };
        skeleton.inverse_bind = skeleton
            .world_matrices()
            .iter()
            .map(Mat4::inverse)
            .collect();
        skeleton
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Inverse bind matrices, one per bone.
    pub fn inverse_bind_matrices(&self) -> &[Mat4] {
        &self.inverse_bind
    }

    /// Length of the chain along its rest axis.
    pub fn length(&self) -> f32 {
        self.bones.iter().map(|bone| bone.offset.length()).sum()
    }

    pub fn rotation(&self, index: usize) -> Option<BoneRotation> {
        self.bones.get(index).map(|bone| bone.rotation)
    }

    /// Set one bone's local rotation. Out-of-range indices are ignored.
    pub fn set_rotation(&mut self, index: usize, rotation: BoneRotation) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.rotation = rotation;
        }
    }

    /// Copy a full pose onto the chain.
    pub fn apply_pose(&mut self, pose: &[BoneRotation]) {
        for (bone, rotation) in self.bones.iter_mut().zip(pose) {
            bone.rotation = *rotation;
        }
    }

    /// Current rotations of every bone.
    pub fn pose(&self) -> Vec<BoneRotation> {
        self.bones.iter().map(|bone| bone.rotation).collect()
    }

    pub fn local_matrix(&self, index: usize) -> Mat4 {
        let bone = &self.bones[index];
        local_transform(bone.offset, bone.rotation)
    }

    /// Transforms of every bone relative to the page group.
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut world: Vec<Mat4> = Vec::with_capacity(self.bones.len());
        for (i, bone) in self.bones.iter().enumerate() {
            let local = self.local_matrix(i);
            let matrix = match bone.parent {
                Some(parent) if parent < i => world[parent] * local,
                _ => local,
            };
            world.push(matrix);
        }
        world
    }

    /// Skinning matrices (`world * inverse_bind`) for the current pose.
    pub fn skinning_matrices(&self) -> Vec<Mat4> {
        self.world_matrices()
            .iter()
            .zip(&self.inverse_bind)
            .map(|(world, inverse)| *world * *inverse)
            .collect()
    }

    /// Linear-blend skin vertex positions with the current pose.
    pub fn skin_positions(&self, vertices: &[Vertex]) -> Vec<[f32; 3]> {
        let skinning = self.skinning_matrices();
        vertices
            .iter()
            .map(|vertex| {
                let rest = Vec4::from((Vec3::from(vertex.position), 1.0));
                let mut skinned = Vec4::ZERO;
                for (joint, weight) in vertex.joints.iter().zip(vertex.weights) {
                    if weight == 0.0 {
                        continue;
                    }
                    if let Some(matrix) = skinning.get(*joint as usize) {
                        skinned += (*matrix * rest) * weight;
                    }
                }
                skinned.truncate().to_array()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_chain_structure() {
        let skeleton = Skeleton::chain(35, 1.28 / 35.0);
        assert_eq!(skeleton.bone_count(), 36);
        assert_eq!(skeleton.bones()[0].parent, None);
        assert_eq!(skeleton.bones()[0].offset, Vec3::ZERO);
        for i in 1..skeleton.bone_count() {
            assert_eq!(skeleton.bones()[i].parent, Some(i - 1));
        }
    }

    #[test]
    fn test_chain_length_equals_page_width() {
        let skeleton = Skeleton::chain(35, 1.28 / 35.0);
        assert!((skeleton.length() - 1.28).abs() < 1e-5);

        let world = skeleton.world_matrices();
        let tip = world[35].transform_point3(Vec3::ZERO);
        assert!((tip.x - 1.28).abs() < 1e-5);
    }

    #[test]
    fn test_rotation_propagates_down_the_chain() {
        let mut skeleton = Skeleton::chain(4, 1.0);
        skeleton.set_rotation(0, BoneRotation::new(FRAC_PI_2, 0.0));

        let world = skeleton.world_matrices();
        // Root rotated a quarter turn about Y swings the chain onto -Z.
        let tip = world[4].transform_point3(Vec3::ZERO);
        assert!(tip.abs_diff_eq(Vec3::new(0.0, 0.0, -4.0), 1e-5));
    }

    #[test]
    fn test_bind_pose_skins_to_rest() {
        let skeleton = Skeleton::chain(2, 1.0);
        let vertex = Vertex::skinned([1.5, 0.2, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0], [1, 2, 0, 0], [0.5, 0.5, 0.0, 0.0]);
        let skinned = skeleton.skin_positions(&[vertex]);
        assert!(Vec3::from(skinned[0]).abs_diff_eq(Vec3::new(1.5, 0.2, 0.0), 1e-5));
    }

    #[test]
    fn test_rigid_root_rotation_skins_whole_page() {
        let mut skeleton = Skeleton::chain(2, 1.0);
        skeleton.set_rotation(0, BoneRotation::new(FRAC_PI_2, 0.0));
        let vertex = Vertex::skinned([2.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0], [1, 2, 0, 0], [0.0, 1.0, 0.0, 0.0]);
        let skinned = skeleton.skin_positions(&[vertex]);
        assert!(Vec3::from(skinned[0]).abs_diff_eq(Vec3::new(0.0, 0.0, -2.0), 1e-5));
    }

    #[test]
    fn test_apply_pose_round_trip() {
        let mut skeleton = Skeleton::chain(3, 1.0);
        let pose = vec![
            BoneRotation::new(0.1, 0.0),
            BoneRotation::new(0.2, 0.01),
            BoneRotation::new(-0.3, 0.0),
            BoneRotation::new(0.0, 0.02),
        ];
        skeleton.apply_pose(&pose);
        assert_eq!(skeleton.pose(), pose);
        // Bind pose is unaffected by later posing.
        assert!(skeleton.inverse_bind_matrices()[1]
            .transform_point3(Vec3::new(1.0, 0.0, 0.0))
            .abs_diff_eq(Vec3::ZERO, 1e-6));
    }
}
