//! Book configuration.
//!
//! Every section carries serde defaults, so a JSON file only needs the
//! values it overrides:
//!
//! ```ignore
//! let config = BookConfig::from_json_str(r#"{ "catalog": { "pictures": ["a", "b"] } }"#)?;
//! assert_eq!(config.page.segments, 35);
//! ```

use crate::error::{Result, StorybookError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Most width segments a page may have; joint indices are stored as `u16`.
pub const MAX_SEGMENTS: usize = u16::MAX as usize - 1;

/// Top-level book configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Page dimensions and tessellation.
    pub page: PageDimensions,
    /// Bend animation constants.
    pub animation: AnimationTuning,
    /// Page selection step cadence.
    pub selection: SelectionTiming,
    /// Picture list the pages are built from.
    pub catalog: CatalogConfig,
    /// Scene composition for the host renderer.
    pub scene: SceneConfig,
    /// Sound descriptors for the host.
    pub audio: AudioConfig,
}

impl BookConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BookConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Create config with a different picture list.
    pub fn with_pictures<I, S>(mut self, pictures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.catalog.pictures = pictures.into_iter().map(Into::into).collect();
        self
    }

    /// Create config with a different segment count.
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.page.segments = segments;
        self
    }

    /// Check the values a book cannot be built from.
    pub fn validate(&self) -> Result<()> {
        let page = &self.page;
        if !(page.width > 0.0 && page.height > 0.0 && page.depth > 0.0) {
            return Err(StorybookError::InvalidConfig(format!(
                "page dimensions must be positive, got {}x{}x{}",
                page.width, page.height, page.depth
            )));
        }
        if page.segments < 2 {
            return Err(StorybookError::InvalidConfig(format!(
                "a page needs at least 2 segments, got {}",
                page.segments
            )));
        }
        if page.segments > MAX_SEGMENTS {
            return Err(StorybookError::InvalidConfig(format!(
                "a page supports at most {} segments, got {}",
                MAX_SEGMENTS, page.segments
            )));
        }
        if page.height_segments == 0 {
            return Err(StorybookError::InvalidConfig(
                "height_segments must be at least 1".to_string(),
            ));
        }
        if self.animation.turn_duration_ms <= 0.0 {
            return Err(StorybookError::InvalidConfig(
                "turn_duration_ms must be positive".to_string(),
            ));
        }
        if self.catalog.pictures.is_empty() {
            return Err(StorybookError::InvalidConfig(
                "catalog needs at least one picture".to_string(),
            ));
        }
        Ok(())
    }
}

/// Page size and tessellation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageDimensions {
    /// Width along the spine axis (X).
    pub width: f32,
    /// Height (Y).
    pub height: f32,
    /// Thickness (Z); also the stacking step between closed pages.
    pub depth: f32,
    /// Segments along the width. The skeleton has `segments + 1` bones.
    pub segments: usize,
    /// Segments along the height.
    pub height_segments: usize,
}

impl Default for PageDimensions {
    fn default() -> Self {
        Self {
            width: 1.28,
            height: 1.71,
            depth: 0.003,
            segments: 35,
            height_segments: 2,
        }
    }
}

impl PageDimensions {
    /// Width of one segment.
    pub fn segment_width(&self) -> f32 {
        self.width / self.segments as f32
    }

    /// Number of bones in a page skeleton.
    pub fn bone_count(&self) -> usize {
        self.segments + 1
    }
}

/// Constants of the page bend animator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTuning {
    /// Smoothing time of the twist spring, in seconds.
    pub easing_factor: f32,
    /// Smoothing time of the fold spring, in seconds.
    pub easing_factor_fold: f32,
    pub inside_curve_strength: f32,
    pub outside_curve_strength: f32,
    pub turning_curve_strength: f32,
    /// Length of the turning bump after an open/close transition.
    pub turn_duration_ms: f64,
    /// Extra rotation per page index while the book is open, in degrees.
    pub page_stagger_deg: f32,
    /// Peak fold angle during a turn, in degrees.
    pub fold_angle_deg: f32,
    /// Emissive intensity of a hovered page.
    pub highlight_intensity: f32,
    /// Fraction of the remaining emissive distance covered per reference frame.
    pub highlight_rate: f32,
    /// Frame rate the highlight rate is expressed at.
    pub highlight_reference_fps: f32,
}

impl Default for AnimationTuning {
    fn default() -> Self {
        Self {
            easing_factor: 0.5,
            easing_factor_fold: 0.3,
            inside_curve_strength: 0.18,
            outside_curve_strength: 0.05,
            turning_curve_strength: 0.09,
            turn_duration_ms: 400.0,
            page_stagger_deg: 0.8,
            fold_angle_deg: 2.0,
            highlight_intensity: 0.22,
            highlight_rate: 0.1,
            highlight_reference_fps: 60.0,
        }
    }
}

/// Step cadence of the page selection smoother, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionTiming {
    /// Delay while the remaining distance is above `fast_distance`.
    pub fast_step_ms: f64,
    /// Delay for the final approach.
    pub slow_step_ms: f64,
    pub fast_distance: usize,
}

impl Default for SelectionTiming {
    fn default() -> Self {
        Self {
            fast_step_ms: 50.0,
            slow_step_ms: 150.0,
            fast_distance: 2,
        }
    }
}

impl SelectionTiming {
    /// Delay before the step that follows one taken at `distance`.
    pub fn delay_for(&self, distance: usize) -> f64 {
        if distance > self.fast_distance {
            self.fast_step_ms
        } else {
            self.slow_step_ms
        }
    }
}

/// Pictures printed on the pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Picture texture ids, paired front/back across the inner pages.
    pub pictures: Vec<String>,
    /// Front of the first page.
    pub cover: String,
    /// Back of the last page.
    pub back_cover: String,
    /// URI template; `{id}` is replaced by the texture id.
    pub texture_uri_template: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            pictures: ["bg1", "redqueen_invite", "bg2", "bg3", "bg4", "tea_and_time"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cover: "book-cover-2".to_string(),
            back_cover: "book-back-1".to_string(),
            texture_uri_template: "/assets/textures/{id}.jpg".to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn texture_uri(&self, id: &str) -> String {
        self.texture_uri_template.replace("{id}", id)
    }
}

/// Declarative scene around the book. The core never renders it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera_position: [f32; 3],
    pub camera_fov: f32,
    pub ambient_intensity: f32,
    pub ambient_color: String,
    pub light_position: [f32; 3],
    pub light_intensity: f32,
    pub shadow_map_size: u32,
    pub shadow_bias: f32,
    /// Tilt of the floating wrapper around the book.
    pub float_rotation_x: f32,
    pub float_speed: f32,
    pub float_intensity: f32,
    pub float_rotation_intensity: f32,
    pub ground_y: f32,
    pub ground_size: f32,
    pub ground_shadow_opacity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera_position: [0.0, 1.0, 3.0],
            camera_fov: 45.0,
            ambient_intensity: 0.2,
            ambient_color: "white".to_string(),
            light_position: [2.0, 6.0, 3.0],
            light_intensity: 2.0,
            shadow_map_size: 2048,
            shadow_bias: -0.0001,
            float_rotation_x: -std::f32::consts::FRAC_PI_4,
            float_speed: 1.0,
            float_intensity: 1.0,
            float_rotation_intensity: 1.0,
            ground_y: -1.5,
            ground_size: 100.0,
            ground_shadow_opacity: 0.2,
        }
    }
}

/// Sounds the host plays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Played whenever the requested page changes.
    pub page_flip: String,
    pub soundtrack: String,
    pub soundtrack_loop: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            page_flip: "/assets/audios/page-flip-01a.mp3".to_string(),
            soundtrack: "/assets/audios/alice-underground-avril-lavigne.mp3".to_string(),
            soundtrack_loop: true,
        }
    }
}
