//! Target rotations of a bending page.
//!
//! Pure functions of the page state: the animator eases the actual bone
//! rotations toward whatever these return.

use crate::config::AnimationTuning;
use crate::types::BoneRotation;
use std::f32::consts::{FRAC_PI_2, PI};

/// First bone of the outer, flatter part of the page.
pub const CURVE_SEAM_BONE: usize = 8;

/// Bump over the turn window: 0 at the flip, 1 halfway, 0 again at the end.
///
/// `elapsed_ms` is the time since the last open/closed transition, or `None`
/// if the page never turned.
pub fn turning_progress(elapsed_ms: Option<f64>, duration_ms: f64) -> f32 {
    let Some(elapsed) = elapsed_ms else {
        return 0.0;
    };
    let t = (elapsed.clamp(0.0, duration_ms) / duration_ms) as f32;
    (t * PI).sin()
}

/// Rotation the whole page turns toward about the spine.
pub fn base_target(is_open: bool, is_book_closed: bool, page_number: usize, tuning: &AnimationTuning) -> f32 {
    let mut target = if is_open { -FRAC_PI_2 } else { FRAC_PI_2 };
    if !is_book_closed {
        target += (page_number as f32 * tuning.page_stagger_deg).to_radians();
    }
    target
}

/// Curvature near the spine.
pub fn inside_curve(bone: usize) -> f32 {
    if bone < CURVE_SEAM_BONE {
        (bone as f32 * 0.2 + 0.25).sin()
    } else {
        0.0
    }
}

/// Counter-curvature toward the outer edge.
pub fn outside_curve(bone: usize) -> f32 {
    if bone >= CURVE_SEAM_BONE {
        (bone as f32 * 0.3 + 0.09).cos()
    } else {
        0.0
    }
}

/// Inputs shared by every bone of a page in one frame.
#[derive(Debug, Clone, Copy)]
pub struct BendInput {
    pub base_target: f32,
    pub turning_progress: f32,
    pub is_book_closed: bool,
    pub bone_count: usize,
}

/// Target twist and fold of one bone.
pub fn bone_target(bone: usize, input: &BendInput, tuning: &AnimationTuning) -> BoneRotation {
    let base = input.base_target;

    if input.is_book_closed {
        // A shut book turns every page as one rigid board.
        return if bone == 0 {
            BoneRotation::new(base, 0.0)
        } else {
            BoneRotation::default()
        };
    }

    let span = bone as f32 * PI / input.bone_count as f32;
    let turn_intensity = span.sin() * input.turning_progress;

    let twist = tuning.inside_curve_strength * inside_curve(bone) * base
        - tuning.outside_curve_strength * outside_curve(bone) * base
        + tuning.turning_curve_strength * turn_intensity * base;

    let fold_envelope = if bone > CURVE_SEAM_BONE {
        (span - 0.5).sin() * input.turning_progress
    } else {
        0.0
    };
    let fold = (base.signum() * tuning.fold_angle_deg).to_radians() * fold_envelope;

    BoneRotation::new(twist, fold)
}

/// Targets for every bone of a page.
pub fn bone_targets(input: &BendInput, tuning: &AnimationTuning) -> Vec<BoneRotation> {
    (0..input.bone_count)
        .map(|bone| bone_target(bone, input, tuning))
        .collect()
}
