//! Page geometry.
//!
//! Every page shares the same skinned mesh; only its materials and bone
//! pose differ.

pub mod mesh;
pub mod page;

pub use mesh::{MaterialGroup, Mesh, Vertex};
pub use page::{build_page_mesh, skin_binding, BACK_MATERIAL, FRONT_MATERIAL};
