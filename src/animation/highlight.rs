//! Hover glow of a page.

use super::damp::lerp_toward;
use crate::config::AnimationTuning;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Highlight {
    pub hovered: bool,
    pub intensity: f32,
}

impl Highlight {
    pub fn target(&self, tuning: &AnimationTuning) -> f32 {
        if self.hovered {
            tuning.highlight_intensity
        } else {
            0.0
        }
    }

    /// Ease the glow toward its target and return the new intensity.
    pub fn advance(&mut self, delta: f32, tuning: &AnimationTuning) -> f32 {
        self.intensity = lerp_toward(
            self.intensity,
            self.target(tuning),
            tuning.highlight_rate,
            tuning.highlight_reference_fps,
            delta,
        );
        self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fades_in_and_out() {
        let tuning = AnimationTuning::default();
        let mut highlight = Highlight {
            hovered: true,
            ..Default::default()
        };
        for _ in 0..120 {
            highlight.advance(1.0 / 60.0, &tuning);
        }
        assert!((highlight.intensity - 0.22).abs() < 1e-4);

        highlight.hovered = false;
        for _ in 0..120 {
            highlight.advance(1.0 / 60.0, &tuning);
        }
        assert!(highlight.intensity < 1e-4);
    }

    #[test]
    fn test_first_frame_at_reference_rate() {
        let tuning = AnimationTuning::default();
        let mut highlight = Highlight {
            hovered: true,
            ..Default::default()
        };
        let value = highlight.advance(1.0 / 60.0, &tuning);
        assert!((value - 0.022).abs() < 1e-6);
    }
}
