//! Shared types used throughout the library.

mod transform;

pub use transform::{local_transform, BoneRotation, PageTransform};

use serde::{Deserialize, Serialize};

/// Texture ids for the two printed faces of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    /// Texture id of the front face (material slot 4).
    pub front: String,
    /// Texture id of the back face (material slot 5).
    pub back: String,
}

impl PageSpec {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: impl Iterator<Item = [f32; 3]>) -> Option<Self> {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        let mut has_points = false;

        for p in points {
            has_points = true;
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_points {
            Some(Self { min, max })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_from_points() {
        let points = vec![[0.0, -0.855, 0.0015], [1.28, 0.855, -0.0015]];
        let bounds = BoundingBox::from_points(points.into_iter()).unwrap();
        assert_eq!(bounds.min, [0.0, -0.855, -0.0015]);
        assert_eq!(bounds.max, [1.28, 0.855, 0.0015]);
    }

    #[test]
    fn test_bounding_box_empty() {
        assert!(BoundingBox::from_points(std::iter::empty()).is_none());
    }
}
