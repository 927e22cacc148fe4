//! Per-page animation state and its per-frame update.

use super::bend::{base_target, bone_target, turning_progress, BendInput};
use super::damp::Damped;
use super::highlight::Highlight;
use crate::config::AnimationTuning;
use crate::types::BoneRotation;

/// Clock reading for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Book clock at this frame, in milliseconds.
    pub now_ms: f64,
    /// Seconds since the previous frame.
    pub delta: f32,
}

/// Where a page sits relative to the displayed page boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub is_open: bool,
    pub is_book_closed: bool,
}

/// Transient animation state owned by one page.
#[derive(Debug, Clone)]
pub struct PageAnimator {
    number: usize,
    turned_at_ms: Option<f64>,
    last_open: bool,
    highlight: Highlight,
    twist: Vec<Damped>,
    fold: Vec<Damped>,
}

impl PageAnimator {
    pub fn new(number: usize, bone_count: usize, initially_open: bool) -> Self {
        Self {
            number,
            turned_at_ms: None,
            last_open: initially_open,
            highlight: Highlight::default(),
            twist: vec![Damped::default(); bone_count],
            fold: vec![Damped::default(); bone_count],
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn bone_count(&self) -> usize {
        self.twist.len()
    }

    pub fn is_hovered(&self) -> bool {
        self.highlight.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.highlight.hovered = hovered;
    }

    pub fn emissive_intensity(&self) -> f32 {
        self.highlight.intensity
    }

    /// Book-clock time of the last open/closed flip.
    pub fn turned_at_ms(&self) -> Option<f64> {
        self.turned_at_ms
    }

    pub fn turning_progress(&self, now_ms: f64, tuning: &AnimationTuning) -> f32 {
        let elapsed = self.turned_at_ms.map(|turned_at| now_ms - turned_at);
        turning_progress(elapsed, tuning.turn_duration_ms)
    }

    pub fn rotation(&self, bone: usize) -> Option<BoneRotation> {
        Some(BoneRotation::new(
            self.twist.get(bone)?.value,
            self.fold.get(bone)?.value,
        ))
    }

    /// Current eased rotation of every bone.
    pub fn rotations(&self) -> Vec<BoneRotation> {
        self.twist
            .iter()
            .zip(&self.fold)
            .map(|(twist, fold)| BoneRotation::new(twist.value, fold.value))
            .collect()
    }

    /// Advance one frame. Returns true if the page flipped open or closed.
    pub fn advance(&mut self, frame: FrameTime, state: PageState, tuning: &AnimationTuning) -> bool {
        self.highlight.advance(frame.delta, tuning);

        let flipped = self.last_open != state.is_open;
        if flipped {
            self.turned_at_ms = Some(frame.now_ms);
            self.last_open = state.is_open;
            log::debug!(
                "page {} {} at {:.0}ms",
                self.number,
                if state.is_open { "opening" } else { "closing" },
                frame.now_ms
            );
        }

        let input = BendInput {
            base_target: base_target(state.is_open, state.is_book_closed, self.number, tuning),
            turning_progress: self.turning_progress(frame.now_ms, tuning),
            is_book_closed: state.is_book_closed,
            bone_count: self.bone_count(),
        };

        for (bone, (twist, fold)) in self.twist.iter_mut().zip(self.fold.iter_mut()).enumerate() {
            let target = bone_target(bone, &input, tuning);
            twist.step_angle(target.twist, tuning.easing_factor, frame.delta);
            fold.step_angle(target.fold, tuning.easing_factor_fold, frame.delta);
        }

        flipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const CLOSED_FRONT: PageState = PageState {
        is_open: false,
        is_book_closed: true,
    };

    fn run(animator: &mut PageAnimator, state: PageState, start_ms: f64, frames: usize, delta: f32) -> f64 {
        let tuning = AnimationTuning::default();
        let mut now = start_ms;
        for _ in 0..frames {
            now += delta as f64 * 1000.0;
            animator.advance(FrameTime { now_ms: now, delta }, state, &tuning);
        }
        now
    }

    #[test]
    fn test_closed_book_converges_to_rigid_pose() {
        let mut animator = PageAnimator::new(2, 36, false);
        run(&mut animator, CLOSED_FRONT, 0.0, 600, 1.0 / 60.0);

        let rotations = animator.rotations();
        assert!((rotations[0].twist - FRAC_PI_2).abs() < 1e-6);
        assert_eq!(rotations[0].fold, 0.0);
        for rotation in &rotations[1..] {
            assert_eq!(rotation.twist, 0.0);
            assert_eq!(rotation.fold, 0.0);
        }
    }

    #[test]
    fn test_zero_delta_never_drifts() {
        let tuning = AnimationTuning::default();
        let mut animator = PageAnimator::new(0, 36, false);
        animator.set_hovered(true);
        let now = run(&mut animator, PageState { is_open: false, is_book_closed: false }, 0.0, 10, 1.0 / 60.0);

        let rotations = animator.rotations();
        let glow = animator.emissive_intensity();
        for i in 0..20 {
            animator.advance(
                FrameTime { now_ms: now + i as f64 * 50.0, delta: 0.0 },
                PageState { is_open: false, is_book_closed: false },
                &tuning,
            );
        }
        assert_eq!(animator.rotations(), rotations);
        assert_eq!(animator.emissive_intensity(), glow);
    }

    #[test]
    fn test_transition_records_turn_time() {
        let tuning = AnimationTuning::default();
        let mut animator = PageAnimator::new(0, 36, false);
        let closed = PageState { is_open: false, is_book_closed: false };
        let open = PageState { is_open: true, is_book_closed: false };

        assert!(!animator.advance(FrameTime { now_ms: 16.0, delta: 0.016 }, closed, &tuning));
        assert_eq!(animator.turned_at_ms(), None);
        assert_eq!(animator.turning_progress(16.0, &tuning), 0.0);

        assert!(animator.advance(FrameTime { now_ms: 1000.0, delta: 0.016 }, open, &tuning));
        assert_eq!(animator.turned_at_ms(), Some(1000.0));
        assert!((animator.turning_progress(1200.0, &tuning) - 1.0).abs() < 1e-6);
        assert!(animator.turning_progress(1400.0, &tuning).abs() < 1e-6);

        // Staying open does not restart the bump.
        assert!(!animator.advance(FrameTime { now_ms: 1100.0, delta: 0.016 }, open, &tuning));
        assert_eq!(animator.turned_at_ms(), Some(1000.0));
    }

    #[test]
    fn test_opening_page_turns_toward_negative_quarter() {
        let mut animator = PageAnimator::new(1, 36, false);
        let open = PageState { is_open: true, is_book_closed: false };
        run(&mut animator, open, 0.0, 600, 1.0 / 60.0);

        let rotations = animator.rotations();
        // Inner bones curve with the turn, outer bones counter-curve.
        assert!(rotations[3].twist < 0.0);
        assert!(rotations.iter().all(|r| r.fold.abs() < 1e-6));
        let tuning = AnimationTuning::default();
        let base = -FRAC_PI_2 + 0.8f32.to_radians();
        let expected = tuning.inside_curve_strength * (3.0f32 * 0.2 + 0.25).sin() * base;
        assert!((rotations[3].twist - expected).abs() < 1e-5);
    }

    #[test]
    fn test_fold_appears_mid_turn() {
        let tuning = AnimationTuning::default();
        let mut animator = PageAnimator::new(1, 36, false);
        let open = PageState { is_open: true, is_book_closed: false };
        let mut now = 0.0;
        let mut peak_fold = 0.0f32;
        for _ in 0..24 {
            now += 1000.0 / 60.0;
            animator.advance(FrameTime { now_ms: now, delta: 1.0 / 60.0 }, open, &tuning);
            peak_fold = peak_fold.max(animator.rotation(20).unwrap().fold.abs());
        }
        assert!(peak_fold > 0.0);
    }

    #[test]
    fn test_hover_glow() {
        let tuning = AnimationTuning::default();
        let mut animator = PageAnimator::new(0, 36, false);
        animator.set_hovered(true);
        let mut now = 0.0;
        for _ in 0..180 {
            now += 1000.0 / 60.0;
            animator.advance(FrameTime { now_ms: now, delta: 1.0 / 60.0 }, CLOSED_FRONT, &tuning);
        }
        assert!((animator.emissive_intensity() - 0.22).abs() < 1e-4);

        animator.set_hovered(false);
        for _ in 0..180 {
            now += 1000.0 / 60.0;
            animator.advance(FrameTime { now_ms: now, delta: 1.0 / 60.0 }, CLOSED_FRONT, &tuning);
        }
        assert!(animator.emissive_intensity() < 1e-4);
    }
}
