//! Page export formats.
//!
//! GLB for viewers and asset pipelines, raw buffers for hosts that upload
//! their own GPU meshes.

pub mod gltf;
pub mod raw;

pub use gltf::{export_glb, export_page_glb, PageExport};
pub use raw::{export_page_raw, export_raw, export_raw_posed, RawPageData};
