//! Skinned box geometry for a single page.
//!
//! The page is a thin box tessellated along its width, shifted so the spine
//! edge sits at x = 0. Faces are emitted as six material groups in the order
//! +X, -X, +Y, -Y, +Z, -Z, which puts the front print in slot 4 and the back
//! print in slot 5.

use super::mesh::{Mesh, Vertex};
use crate::config::PageDimensions;

/// Material slot of the front print.
pub const FRONT_MATERIAL: usize = 4;
/// Material slot of the back print.
pub const BACK_MATERIAL: usize = 5;

#[derive(Clone, Copy)]
enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// One face of the box: which axes the grid spans and which way it faces.
struct Plane {
    u: Axis,
    v: Axis,
    w: Axis,
    udir: f32,
    vdir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: usize,
    grid_y: usize,
    material: usize,
}

/// Build the skinned page mesh for the given dimensions.
pub fn build_page_mesh(dims: &PageDimensions) -> Mesh {
    let (w, h, d) = (dims.width, dims.height, dims.depth);
    let (sx, sy, sz) = (dims.segments, dims.height_segments, 1);

    let planes = [
        Plane { u: Axis::Z, v: Axis::Y, w: Axis::X, udir: -1.0, vdir: -1.0, width: d, height: h, depth: w, grid_x: sz, grid_y: sy, material: 0 },
        Plane { u: Axis::Z, v: Axis::Y, w: Axis::X, udir: 1.0, vdir: -1.0, width: d, height: h, depth: -w, grid_x: sz, grid_y: sy, material: 1 },
        Plane { u: Axis::X, v: Axis::Z, w: Axis::Y, udir: 1.0, vdir: 1.0, width: w, height: d, depth: h, grid_x: sx, grid_y: sz, material: 2 },
        Plane { u: Axis::X, v: Axis::Z, w: Axis::Y, udir: 1.0, vdir: -1.0, width: w, height: d, depth: -h, grid_x: sx, grid_y: sz, material: 3 },
        Plane { u: Axis::X, v: Axis::Y, w: Axis::Z, udir: 1.0, vdir: -1.0, width: w, height: h, depth: d, grid_x: sx, grid_y: sy, material: FRONT_MATERIAL },
        Plane { u: Axis::X, v: Axis::Y, w: Axis::Z, udir: -1.0, vdir: -1.0, width: w, height: h, depth: -d, grid_x: sx, grid_y: sy, material: BACK_MATERIAL },
    ];

    let mut mesh = Mesh::new();
    for plane in &planes {
        build_plane(&mut mesh, plane);
    }

    // Spine edge at the origin; the page extends along +X.
    mesh.translate([w / 2.0, 0.0, 0.0]);

    let segment_width = dims.segment_width();
    let last_joint = dims.segments;
    for vertex in &mut mesh.vertices {
        let (joints, weights) = skin_binding(vertex.position[0], segment_width, last_joint);
        vertex.joints = joints;
        vertex.weights = weights;
    }

    mesh
}

/// Bind a vertex at `x` to the two bones around it.
///
/// The lower joint is clamped so the far edge blends into the last bone
/// instead of referencing one past it. `last_joint` saturates at `u16::MAX`;
/// `BookConfig::validate` keeps real pages below that.
pub fn skin_binding(x: f32, segment_width: f32, last_joint: usize) -> ([u16; 4], [f32; 4]) {
    let last_joint = last_joint.min(u16::MAX as usize);
    let max_lower = last_joint.saturating_sub(1);
    let lower = ((x / segment_width).floor().max(0.0) as usize).min(max_lower);
    let weight = ((x - lower as f32 * segment_width) / segment_width).clamp(0.0, 1.0);
    (
        [lower as u16, (lower + 1) as u16, 0, 0],
        [1.0 - weight, weight, 0.0, 0.0],
    )
}

fn build_plane(mesh: &mut Mesh, plane: &Plane) {
    let segment_width = plane.width / plane.grid_x as f32;
    let segment_height = plane.height / plane.grid_y as f32;
    let width_half = plane.width / 2.0;
    let height_half = plane.height / 2.0;
    let depth_half = plane.depth / 2.0;
    let grid_x1 = plane.grid_x + 1;
    let grid_y1 = plane.grid_y + 1;

    let vertex_start = mesh.vertex_count() as u32;
    let index_start = mesh.indices.len();

    for iy in 0..grid_y1 {
        let y = iy as f32 * segment_height - height_half;
        for ix in 0..grid_x1 {
            let x = ix as f32 * segment_width - width_half;

            let mut position = [0.0f32; 3];
            position[plane.u as usize] = x * plane.udir;
            position[plane.v as usize] = y * plane.vdir;
            position[plane.w as usize] = depth_half;

            let mut normal = [0.0f32; 3];
            normal[plane.w as usize] = if plane.depth > 0.0 { 1.0 } else { -1.0 };

            let uv = [
                ix as f32 / plane.grid_x as f32,
                1.0 - iy as f32 / plane.grid_y as f32,
            ];

            mesh.add_vertex(Vertex::new(position, normal, uv));
        }
    }

    let grid_x1 = grid_x1 as u32;
    for iy in 0..plane.grid_y as u32 {
        for ix in 0..plane.grid_x as u32 {
            let a = vertex_start + ix + grid_x1 * iy;
            let b = vertex_start + ix + grid_x1 * (iy + 1);
            let c = vertex_start + (ix + 1) + grid_x1 * (iy + 1);
            let d = vertex_start + (ix + 1) + grid_x1 * iy;
            mesh.add_triangle(a, b, d);
            mesh.add_triangle(b, c, d);
        }
    }

    mesh.add_group(index_start, plane.material);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_mesh() -> Mesh {
        build_page_mesh(&PageDimensions::default())
    }

    #[test]
    fn test_vertex_and_group_counts() {
        let mesh = default_mesh();
        // +-X: 2x3 grid, +-Y: 36x2 grid, +-Z: 36x3 grid.
        assert_eq!(mesh.vertex_count(), 2 * 6 + 2 * 72 + 2 * 108);
        assert_eq!(mesh.groups.len(), 6);
        let materials: Vec<usize> = mesh.groups.iter().map(|g| g.material).collect();
        assert_eq!(materials, vec![0, 1, 2, 3, 4, 5]);
        // 35 x 2 quads on each print face.
        assert_eq!(mesh.groups[FRONT_MATERIAL].count, 35 * 2 * 6);
    }

    #[test]
    fn test_spine_at_origin() {
        let mesh = default_mesh();
        let min_x = mesh.vertices.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
        let max_x = mesh.vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        assert!(min_x.abs() < 1e-6);
        assert!((max_x - 1.28).abs() < 1e-5);
    }

    #[test]
    fn test_print_faces_point_outwards() {
        let mesh = default_mesh();
        let front = &mesh.groups[FRONT_MATERIAL];
        let back = &mesh.groups[BACK_MATERIAL];
        for &i in mesh.group_indices(front) {
            assert_eq!(mesh.vertices[i as usize].normal, [0.0, 0.0, 1.0]);
        }
        for &i in mesh.group_indices(back) {
            assert_eq!(mesh.vertices[i as usize].normal, [0.0, 0.0, -1.0]);
        }
    }

    #[test]
    fn test_skin_weights_valid() {
        let dims = PageDimensions::default();
        let mesh = build_page_mesh(&dims);
        for vertex in &mesh.vertices {
            let sum: f32 = vertex.weights.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5);
            assert!((vertex.joints[1] as usize) < dims.bone_count());
        }
    }

    #[test]
    fn test_skin_binding_edges() {
        let width = 1.28 / 35.0;
        let (joints, weights) = skin_binding(0.0, width, 35);
        assert_eq!(joints, [0, 1, 0, 0]);
        assert_eq!(weights, [1.0, 0.0, 0.0, 0.0]);

        let (joints, weights) = skin_binding(1.28, width, 35);
        assert_eq!(joints, [34, 35, 0, 0]);
        assert!((weights[1] - 1.0).abs() < 1e-4);

        let (joints, weights) = skin_binding(width * 2.5, width, 35);
        assert_eq!(joints, [2, 3, 0, 0]);
        assert!((weights[1] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_skin_binding_at_segment_limit() {
        let segments = crate::config::MAX_SEGMENTS;
        let (joints, _) = skin_binding(1.28, 1.28 / segments as f32, segments);
        assert_eq!(joints, [segments as u16 - 1, segments as u16, 0, 0]);

        // Oversized chains never wrap around to low joint indices.
        let (joints, _) = skin_binding(1.28, 1.28 / 70_000.0, 70_000);
        assert_eq!(joints, [u16::MAX - 1, u16::MAX, 0, 0]);
    }
}
