use ndarray::{Array2, Array3, ArrayView3};

use super::result::DetectionResult;
use super::stages::{
    aggregate, count_primary, detect_supplementary, generate_markers, preprocess, reduce_noise,
    topographic_surface,
};
use crate::error::GrainError;
use crate::params::DetectorParams;
use crate::segmentation::grow_regions;

/// Every intermediate buffer of one detection run, in pipeline order.
#[derive(Clone, Debug)]
pub struct DetectionStages {
    pub contrast: Array3<u8>,
    pub color_mask: Array3<u8>,
    pub luma: Array2<u8>,
    pub binary_mask: Array2<u8>,
    pub opened: Array2<u8>,
    pub eroded: Array2<u8>,
    pub sure_background: Array2<u8>,
    pub distance: Array2<f32>,
    pub sure_foreground: Array2<u8>,
    pub seed_markers: Array2<i32>,
    /// Gradient surface the seeds grow over.
    pub surface: Array2<u8>,
    pub grown_markers: Array2<i32>,
    pub edges: Array2<u8>,
}

/// Grain counter combining marker-seeded region growing with an edge-based
/// second pass.
///
/// The detector is immutable after construction and can be shared between
/// threads; each call owns its buffers.
#[derive(Clone, Debug, Default)]
pub struct GrainDetector {
    params: DetectorParams,
}

impl GrainDetector {
    /// Create a detector, rejecting parameters no stage can run with.
    pub fn new(params: DetectorParams) -> Result<Self, GrainError> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Detector parameters.
    #[inline]
    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    /// Count the grains of an `(height, width, channels)` image.
    pub fn detect(&self, image: ArrayView3<u8>) -> Result<DetectionResult, GrainError> {
        self.run(image).map(|(result, _)| result)
    }

    /// Like [`detect`](Self::detect), also returning every intermediate buffer.
    pub fn detect_with_stages(
        &self,
        image: ArrayView3<u8>,
    ) -> Result<(DetectionResult, DetectionStages), GrainError> {
        self.run(image)
    }

    fn run(
        &self,
        image: ArrayView3<u8>,
    ) -> Result<(DetectionResult, DetectionStages), GrainError> {
        validate_image(image)?;
        let params = &self.params;
        let (height, width, channels) = image.dim();
        log::debug!("detecting grains in {width}x{height} image with {channels} channel(s)");

        let pre = preprocess(image, params)?;
        let noise = reduce_noise(pre.mask.view(), params)?;
        let markers = generate_markers(noise.eroded.view(), params)?;

        let surface = topographic_surface(image);
        let grown = grow_regions(surface.view(), markers.markers.view())?;
        let primary = count_primary(grown.view())?;

        let supplementary = detect_supplementary(noise.opened.view(), params)?;
        let result = aggregate(image, grown.view(), &primary, &supplementary, params)?;

        log::info!(
            "{} grains ({} region-grown, {} edge-detected)",
            result.total_count,
            result.primary_count(),
            result.supplementary_count()
        );

        let stages = DetectionStages {
            contrast: pre.contrast,
            color_mask: pre.color_mask,
            luma: pre.luma,
            binary_mask: pre.mask,
            opened: noise.opened,
            eroded: noise.eroded,
            sure_background: markers.sure_background,
            distance: markers.distance,
            sure_foreground: markers.sure_foreground,
            seed_markers: markers.markers,
            surface,
            grown_markers: grown,
            edges: supplementary.edges,
        };

        Ok((result, stages))
    }
}

/// Reject images the pipeline cannot process.
fn validate_image(image: ArrayView3<u8>) -> Result<(), GrainError> {
    let (height, width, channels) = image.dim();
    if height == 0 || width == 0 {
        return Err(GrainError::InvalidInput(format!(
            "image is {width}x{height}, both dimensions must be non-zero"
        )));
    }
    if !matches!(channels, 1 | 3 | 4) {
        return Err(GrainError::InvalidInput(format!(
            "expected 1, 3 or 4 channels, got {channels}"
        )));
    }
    Ok(())
}

/// Count grains with the default parameters.
///
/// # Arguments
/// * `image` - Image with 1, 3, or 4 channels (height, width, channels)
///
/// # Returns
/// Total count, per-grain centroids and the annotated RGB image
pub fn detect_grains(image: ArrayView3<u8>) -> Result<DetectionResult, GrainError> {
    GrainDetector::default().detect(image)
}
