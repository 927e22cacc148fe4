//! Raw page buffers for hosts that build their own GPU meshes.

use crate::book::Book;
use crate::error::{Result, StorybookError};
use crate::geometry::{MaterialGroup, Mesh};
use crate::skeleton::Skeleton;

/// Flat vertex and index buffers of one page mesh.
#[derive(Debug, Clone)]
pub struct RawPageData {
    /// Rest-pose positions (3 floats per vertex).
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    /// Bone indices (4 per vertex).
    pub joints: Vec<[u16; 4]>,
    /// Bone weights (4 per vertex).
    pub weights: Vec<[f32; 4]>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
    /// Index ranges per material slot.
    pub groups: Vec<MaterialGroup>,
    /// Positions deformed by the current pose, when requested.
    pub skinned_positions: Option<Vec<[f32; 3]>>,
}

/// Export the shared page mesh in its rest pose.
pub fn export_raw(mesh: &Mesh) -> RawPageData {
    RawPageData {
        positions: mesh.vertices.iter().map(|v| v.position).collect(),
        normals: mesh.vertices.iter().map(|v| v.normal).collect(),
        uvs: mesh.vertices.iter().map(|v| v.uv).collect(),
        joints: mesh.vertices.iter().map(|v| v.joints).collect(),
        weights: mesh.vertices.iter().map(|v| v.weights).collect(),
        indices: mesh.indices.clone(),
        groups: mesh.groups.clone(),
        skinned_positions: None,
    }
}

/// Export the page mesh together with positions skinned by `skeleton`.
pub fn export_raw_posed(mesh: &Mesh, skeleton: &Skeleton) -> RawPageData {
    RawPageData {
        skinned_positions: Some(skeleton.skin_positions(&mesh.vertices)),
        ..export_raw(mesh)
    }
}

/// Export one page of a book in its current pose.
pub fn export_page_raw(book: &Book, number: usize) -> Result<RawPageData> {
    let page = book.page(number).ok_or(StorybookError::OutOfRangeIndex {
        index: number,
        page_count: book.page_count(),
    })?;
    Ok(export_raw_posed(book.mesh(), page.skeleton()))
}

impl RawPageData {
    /// Get positions as a flat array.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.iter().copied()).collect()
    }

    /// Get normals as a flat array.
    pub fn normals_flat(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| n.iter().copied()).collect()
    }

    /// Get UVs as a flat array.
    pub fn uvs_flat(&self) -> Vec<f32> {
        self.uvs.iter().flat_map(|uv| uv.iter().copied()).collect()
    }

    pub fn joints_flat(&self) -> Vec<u16> {
        self.joints.iter().flat_map(|j| j.iter().copied()).collect()
    }

    pub fn weights_flat(&self) -> Vec<f32> {
        self.weights.iter().flat_map(|w| w.iter().copied()).collect()
    }

    /// Skinned positions as a flat array, empty when not posed.
    pub fn skinned_positions_flat(&self) -> Vec<f32> {
        self.skinned_positions
            .iter()
            .flatten()
            .flat_map(|p| p.iter().copied())
            .collect()
    }

    /// Groups as `[start, count, material]` triples.
    pub fn groups_flat(&self) -> Vec<u32> {
        self.groups
            .iter()
            .flat_map(|g| [g.start as u32, g.count as u32, g.material as u32])
            .collect()
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
