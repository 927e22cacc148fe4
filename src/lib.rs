//! # Storybook Pages
//!
//! Page-turning core of a 3D storybook: skinned page geometry, the per-frame
//! bend animation of every page, and the smoother that walks the displayed
//! page toward the requested one.
//!
//! ## Overview
//!
//! A [`Book`] owns one shared page mesh and, per page, a bone chain, an
//! animator and six material slots. The host drives it with
//! [`Book::advance_frame`] and reads back bone rotations, depth offsets and
//! highlight intensities each frame. Rendering, audio and texture loading stay
//! with the host.
//!
//! ## Quick Start
//!
//! ```ignore
//! use storybook_pages::{build_pages, texture_ids, Book, BookConfig, TextureRegistry};
//!
//! let config = BookConfig::default();
//! let textures = TextureRegistry::preloaded(texture_ids(&build_pages(&config.catalog)?));
//! let mut book = Book::new(config, &textures)?;
//!
//! book.set_requested_page(3)?;
//! for _ in 0..120 {
//!     book.advance_frame(1.0 / 60.0);
//! }
//! let glb_bytes = storybook_pages::export_page_glb(&book, 1)?;
//! ```

pub mod error;
pub mod config;
pub mod types;
pub mod catalog;
pub mod skeleton;
pub mod geometry;
pub mod material;
pub mod animation;
pub mod selection;
pub mod book;
pub mod export;

// Re-export main types for convenience
pub use error::{Result, StorybookError};
pub use config::{AnimationTuning, AudioConfig, BookConfig, CatalogConfig, PageDimensions, SceneConfig, SelectionTiming, MAX_SEGMENTS};
pub use types::{BoneRotation, BoundingBox, PageSpec, PageTransform};
pub use catalog::{build_pages, page_label, texture_ids};
pub use skeleton::{Bone, Skeleton};
pub use geometry::{build_page_mesh, Mesh, Vertex};
pub use material::{PageMaterials, TextureHandle, TextureProvider, TextureRegistry};
pub use animation::{FrameTime, PageAnimator, PageState};
pub use selection::{PageSignal, PageSmoother, StepEvent};
pub use book::{Book, BookPose, Page, PagePose};
pub use export::gltf::{export_glb, export_page_glb};
pub use export::raw::{export_page_raw, export_raw, RawPageData};

#[cfg(feature = "wasm")]
pub mod wasm;
