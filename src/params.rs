//! Detector configuration.
//!
//! Every tunable of the pipeline lives here and is passed by reference into
//! each stage. The defaults reproduce the calibration the detector was tuned
//! with (rice on a dark tray); they are heuristics and usually need to be
//! re-tuned per imaging setup.

use serde::{Deserialize, Serialize};

use crate::error::GrainError;

/// Contrast normalization and the two-stage threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    /// Additive offset applied after scaling.
    pub brightness: f32,
    /// Multiplicative gain applied to every colour channel.
    pub contrast: f32,
    /// Channel values strictly above this cutoff survive the colour threshold.
    pub color_cutoff: u8,
    /// Value written for surviving channels.
    pub color_value: u8,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            brightness: 6.0,
            contrast: 0.60,
            color_cutoff: 82,
            color_value: 230,
        }
    }
}

/// Morphology used by the noise reducer and the marker generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphologyParams {
    /// Side of the square structuring element.
    pub kernel_size: usize,
    /// Erode/dilate pairs of the opening.
    pub opening_iterations: usize,
    /// Extra erosions that break thin necks between touching grains.
    pub erosion_iterations: usize,
    /// Dilations producing the sure-background margin.
    pub dilation_iterations: usize,
}

impl Default for MorphologyParams {
    fn default() -> Self {
        Self {
            kernel_size: 3,
            opening_iterations: 6,
            erosion_iterations: 2,
            dilation_iterations: 7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerParams {
    /// Fraction of the maximum distance above which a pixel is sure foreground.
    pub foreground_fraction: f32,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            foreground_fraction: 0.4,
        }
    }
}

/// Hysteresis thresholds of the supplementary edge detector (L1 gradient units).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParams {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low_threshold: 30.0,
            high_threshold: 200.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupParams {
    /// Candidates overlapping the claimed mask by this fraction or more are duplicates.
    pub overlap_threshold: f64,
}

impl Default for DedupParams {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.55,
        }
    }
}

/// Presentation-only settings of the annotated image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayParams {
    /// Headline font scale per pixel of image width.
    pub font_scale_per_px: f32,
    /// Font scale of the per-grain numbers.
    pub label_scale: f32,
    /// Offset (both axes) of edge-detected grain numbers so they do not
    /// collide with region-grown ones.
    pub label_offset: i32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self {
            font_scale_per_px: 1.0 / 1000.0,
            label_scale: 1.5,
            label_offset: 20,
        }
    }
}

/// Complete detector configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub threshold: ThresholdParams,
    pub morphology: MorphologyParams,
    pub markers: MarkerParams,
    pub edges: EdgeParams,
    pub dedup: DedupParams,
    pub overlay: OverlayParams,
}

impl DetectorParams {
    /// Reject configurations no stage can run with.
    pub fn validate(&self) -> Result<(), GrainError> {
        let invalid = |msg: String| Err(GrainError::InvalidParams(msg));

        let t = &self.threshold;
        if !t.contrast.is_finite() || !t.brightness.is_finite() {
            return invalid(format!(
                "contrast ({}) and brightness ({}) must be finite",
                t.contrast, t.brightness
            ));
        }
        if self.morphology.kernel_size == 0 {
            return invalid("morphology kernel size must be at least 1".to_string());
        }
        let fraction = self.markers.foreground_fraction;
        if !(0.0..1.0).contains(&fraction) {
            return invalid(format!(
                "foreground fraction must lie in [0, 1), got {fraction}"
            ));
        }
        let e = &self.edges;
        if !e.low_threshold.is_finite() || !e.high_threshold.is_finite() {
            return invalid("edge thresholds must be finite".to_string());
        }
        if e.low_threshold > e.high_threshold {
            return invalid(format!(
                "edge low threshold {} exceeds high threshold {}",
                e.low_threshold, e.high_threshold
            ));
        }
        let overlap = self.dedup.overlap_threshold;
        if !(overlap > 0.0 && overlap <= 1.0) {
            return invalid(format!(
                "overlap threshold must lie in (0, 1], got {overlap}"
            ));
        }
        let o = &self.overlay;
        if !(o.font_scale_per_px.is_finite() && o.font_scale_per_px > 0.0) {
            return invalid("headline font scale must be positive".to_string());
        }
        if !(o.label_scale.is_finite() && o.label_scale > 0.0) {
            return invalid("label font scale must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_calibration() {
        let p = DetectorParams::default();
        assert_eq!(p.threshold.brightness, 6.0);
        assert_eq!(p.threshold.contrast, 0.60);
        assert_eq!((p.threshold.color_cutoff, p.threshold.color_value), (82, 230));
        assert_eq!(p.morphology.kernel_size, 3);
        assert_eq!(p.morphology.opening_iterations, 6);
        assert_eq!(p.morphology.erosion_iterations, 2);
        assert_eq!(p.morphology.dilation_iterations, 7);
        assert_eq!(p.markers.foreground_fraction, 0.4);
        assert_eq!((p.edges.low_threshold, p.edges.high_threshold), (30.0, 200.0));
        assert_eq!(p.dedup.overlap_threshold, 0.55);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_values() {
        let mut p = DetectorParams::default();
        p.morphology.kernel_size = 0;
        assert!(matches!(p.validate(), Err(GrainError::InvalidParams(_))));

        let mut p = DetectorParams::default();
        p.edges.low_threshold = 250.0;
        assert!(p.validate().is_err());

        let mut p = DetectorParams::default();
        p.markers.foreground_fraction = 1.0;
        assert!(p.validate().is_err());

        let mut p = DetectorParams::default();
        p.dedup.overlap_threshold = 0.0;
        assert!(p.validate().is_err());

        let mut p = DetectorParams::default();
        p.threshold.contrast = f32::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "morphology": { "erosion_iterations": 3 }, "dedup": { "overlap_threshold": 0.7 } }"#;
        let p: DetectorParams = serde_json::from_str(json).unwrap();
        assert_eq!(p.morphology.erosion_iterations, 3);
        assert_eq!(p.morphology.opening_iterations, 6);
        assert_eq!(p.dedup.overlap_threshold, 0.7);
        assert_eq!(p.threshold, ThresholdParams::default());
    }
}
