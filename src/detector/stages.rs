//! The individual pipeline stages.
//!
//! Every stage is a pure function of its input buffers and the detector
//! parameters and returns freshly allocated outputs.

use std::collections::BTreeMap;

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

use super::result::{Centroid, DetectionResult, Grain, GrainOrigin};
use crate::annotate;
use crate::error::{ensure_same_dim, GrainError, Stage};
use crate::filters::color_adjust::linear_adjust_u8;
use crate::filters::distance::euclidean_distance_transform;
use crate::filters::edge::{canny, gradient_magnitude_u8};
use crate::filters::grayscale::{luma_u8, GrayscaleWeights};
use crate::filters::morphology::{dilate_rect, erode_rect, open_rect};
use crate::filters::stylize::{binarize_u8, threshold_channels_u8, MASK_ON};
use crate::params::DetectorParams;
use crate::segmentation::{
    external_contours, label_components, Connectivity, Contour, BACKGROUND, FIRST_REGION, UNKNOWN,
};

fn coverage(mask: &Array2<u8>) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    mask.iter().filter(|&&v| v != 0).count() as f64 / mask.len() as f64
}

// ============================================================================
// Preprocess
// ============================================================================

/// Buffers produced by [`preprocess`].
#[derive(Clone, Debug)]
pub struct Preprocessed {
    /// Contrast/brightness normalized input.
    pub contrast: Array3<u8>,
    /// Per-channel color threshold of `contrast`.
    pub color_mask: Array3<u8>,
    /// Luma of `color_mask`.
    pub luma: Array2<u8>,
    /// Binary foreground mask (0 / 255).
    pub mask: Array2<u8>,
}

/// Normalize contrast and threshold the image down to a binary mask.
pub fn preprocess(
    image: ArrayView3<u8>,
    params: &DetectorParams,
) -> Result<Preprocessed, GrainError> {
    let t = &params.threshold;
    let contrast = linear_adjust_u8(image, t.contrast, t.brightness);
    let color_mask = threshold_channels_u8(contrast.view(), t.color_cutoff, t.color_value);
    let luma = luma_u8(color_mask.view(), GrayscaleWeights::BT601);
    let mask = binarize_u8(luma.view(), 0);

    ensure_same_dim(
        Stage::Preprocess,
        "binary mask",
        (image.dim().0, image.dim().1),
        mask.dim(),
    )?;
    log::debug!("preprocess: foreground coverage {:.3}", coverage(&mask));

    Ok(Preprocessed {
        contrast,
        color_mask,
        luma,
        mask,
    })
}

// ============================================================================
// Noise reduction
// ============================================================================

/// Buffers produced by [`reduce_noise`].
#[derive(Clone, Debug)]
pub struct NoiseReduced {
    /// Mask after the morphological opening.
    pub opened: Array2<u8>,
    /// Opened mask eroded further to split touching grains.
    pub eroded: Array2<u8>,
}

/// Remove specks with an opening, then erode to break thin necks.
pub fn reduce_noise(
    mask: ArrayView2<u8>,
    params: &DetectorParams,
) -> Result<NoiseReduced, GrainError> {
    let m = &params.morphology;
    if m.kernel_size == 0 {
        return Err(GrainError::processing(
            Stage::NoiseReduction,
            "structuring element is empty",
        ));
    }
    let opened = open_rect(mask, m.kernel_size, m.opening_iterations);
    let eroded = erode_rect(opened.view(), m.kernel_size, m.erosion_iterations);

    log::debug!(
        "noise reduction: coverage {:.3} after opening, {:.3} after erosion",
        coverage(&opened),
        coverage(&eroded)
    );

    Ok(NoiseReduced { opened, eroded })
}

// ============================================================================
// Marker generation
// ============================================================================

/// Buffers produced by [`generate_markers`].
#[derive(Clone, Debug)]
pub struct Markers {
    pub sure_background: Array2<u8>,
    /// Distance of every eroded-mask pixel to the nearest background pixel.
    pub distance: Array2<f32>,
    pub sure_foreground: Array2<u8>,
    /// Seed map: `UNKNOWN`, `BACKGROUND` or a region id >= `FIRST_REGION`.
    pub markers: Array2<i32>,
    /// Number of region seeds.
    pub seed_count: usize,
}

/// Derive watershed seeds from the eroded mask.
///
/// Pixels far from any background pixel become seeds, one region per
/// 8-connected component. The band between the seeds and the dilated
/// mask stays unknown for the region grower to resolve.
pub fn generate_markers(
    eroded: ArrayView2<u8>,
    params: &DetectorParams,
) -> Result<Markers, GrainError> {
    let m = &params.morphology;
    let sure_background = dilate_rect(eroded, m.kernel_size, m.dilation_iterations);
    let distance = euclidean_distance_transform(eroded);

    let max = distance.iter().fold(0.0f32, |acc, &d| acc.max(d));
    let cutoff = params.markers.foreground_fraction * max;
    let sure_foreground = if max > 0.0 {
        distance.mapv(|d| if d > cutoff { MASK_ON } else { 0 })
    } else {
        Array2::zeros(eroded.dim())
    };

    let components = label_components(sure_foreground.view(), Connectivity::Eight);
    let seed_count = components.count;
    if seed_count > (i32::MAX - FIRST_REGION) as usize {
        return Err(GrainError::processing(
            Stage::MarkerGeneration,
            format!("{seed_count} seeds exceed the label range"),
        ));
    }

    let mut markers = components.labels.mapv(|l| l as i32 + BACKGROUND);
    for ((bg, fg), marker) in sure_background
        .iter()
        .zip(sure_foreground.iter())
        .zip(markers.iter_mut())
    {
        if bg.saturating_sub(*fg) != 0 {
            *marker = UNKNOWN;
        }
    }

    log::debug!("marker generation: max distance {max:.2}, {seed_count} seeds");

    Ok(Markers {
        sure_background,
        distance,
        sure_foreground,
        markers,
        seed_count,
    })
}

// ============================================================================
// Region growing
// ============================================================================

/// Elevation map for region growing: Sobel magnitude of the input luma.
pub fn topographic_surface(image: ArrayView3<u8>) -> Array2<u8> {
    let luma = luma_u8(image, GrayscaleWeights::BT601);
    gradient_magnitude_u8(luma.view())
}

// ============================================================================
// Primary count
// ============================================================================

/// Outline of one grown region.
#[derive(Clone, Debug)]
pub struct RegionOutline {
    /// Region id in the grown marker map.
    pub label: i32,
    /// All outer contours of the region; more than one when the region
    /// is split into several pieces.
    pub contours: Vec<Contour>,
    /// Centroid of the largest-area contour rather than the first traced
    /// one, `None` when it encloses no area.
    pub centroid: Option<Centroid>,
}

/// Inclusive bounding box `(min_x, min_y, max_x, max_y)`.
type Bounds = (usize, usize, usize, usize);

/// Trace every grown region (ids >= `FIRST_REGION`) in ascending id order.
pub fn count_primary(grown: ArrayView2<i32>) -> Result<Vec<RegionOutline>, GrainError> {
    let (height, width) = grown.dim();

    let mut bounds: BTreeMap<i32, Bounds> = BTreeMap::new();
    for ((y, x), &l) in grown.indexed_iter() {
        if l < FIRST_REGION {
            continue;
        }
        bounds
            .entry(l)
            .and_modify(|b| {
                b.0 = b.0.min(x);
                b.1 = b.1.min(y);
                b.2 = b.2.max(x);
                b.3 = b.3.max(y);
            })
            .or_insert((x, y, x, y));
    }

    let mut outlines = Vec::with_capacity(bounds.len());
    for (&label, &(min_x, min_y, max_x, max_y)) in &bounds {
        // One pixel of padding keeps the crop's frame outside the region
        let x0 = min_x.saturating_sub(1);
        let y0 = min_y.saturating_sub(1);
        let x1 = (max_x + 1).min(width - 1);
        let y1 = (max_y + 1).min(height - 1);

        let crop = Array2::from_shape_fn((y1 - y0 + 1, x1 - x0 + 1), |(y, x)| {
            if grown[[y + y0, x + x0]] == label {
                MASK_ON
            } else {
                0
            }
        });
        let contours: Vec<Contour> = external_contours(crop.view())
            .into_iter()
            .map(|c| Contour {
                points: c
                    .points
                    .into_iter()
                    .map(|(x, y)| (x + x0 as i32, y + y0 as i32))
                    .collect(),
            })
            .collect();

        if contours.is_empty() {
            return Err(GrainError::processing(
                Stage::PrimaryCount,
                format!("region {label} has no outer contour"),
            ));
        }

        let centroid = contours
            .iter()
            .map(|c| c.moments())
            .max_by(|a, b| a.area().total_cmp(&b.area()))
            .and_then(|m| m.centroid())
            .map(Centroid::from);

        if centroid.is_none() {
            log::trace!("region {label} encloses no area, not counted");
        }
        outlines.push(RegionOutline {
            label,
            contours,
            centroid,
        });
    }

    log::debug!(
        "primary count: {} regions, {} with area",
        outlines.len(),
        outlines.iter().filter(|o| o.centroid.is_some()).count()
    );

    Ok(outlines)
}

// ============================================================================
// Supplementary detection
// ============================================================================

/// One edge contour and its deduplication verdict.
#[derive(Clone, Debug)]
pub struct EdgeCandidate {
    pub contour: Contour,
    /// Fraction of the filled contour lying on the opened mask.
    pub overlap: f64,
    /// Centroid when the contour encloses area.
    pub centroid: Option<Centroid>,
}

impl EdgeCandidate {
    /// Whether the candidate is not already covered by the claimed mask.
    pub fn is_novel(&self, overlap_threshold: f64) -> bool {
        self.overlap < overlap_threshold
    }

    /// Whether the candidate counts as an extra grain.
    pub fn is_promoted(&self, overlap_threshold: f64) -> bool {
        self.is_novel(overlap_threshold) && self.centroid.is_some()
    }
}

/// Buffers produced by [`detect_supplementary`].
#[derive(Clone, Debug)]
pub struct Supplementary {
    /// Binary edge map of the opened mask.
    pub edges: Array2<u8>,
    /// Every external edge contour in raster order of discovery.
    pub candidates: Vec<EdgeCandidate>,
}

/// Share of `pixels` that are set in `mask`, 0 for an empty set.
fn overlap_fraction(pixels: &[(usize, usize)], mask: ArrayView2<u8>) -> f64 {
    if pixels.is_empty() {
        return 0.0;
    }
    let hits = pixels.iter().filter(|&&(y, x)| mask[[y, x]] != 0).count();
    hits as f64 / pixels.len() as f64
}

/// Find grain outlines with an edge detector and score them against the
/// claimed mask.
pub fn detect_supplementary(
    opened: ArrayView2<u8>,
    params: &DetectorParams,
) -> Result<Supplementary, GrainError> {
    let e = &params.edges;
    let edges = canny(opened, e.low_threshold, e.high_threshold);
    ensure_same_dim(
        Stage::SupplementaryDetection,
        "edge map",
        opened.dim(),
        edges.dim(),
    )?;
    let (height, width) = opened.dim();

    let threshold = params.dedup.overlap_threshold;
    let candidates: Vec<EdgeCandidate> = external_contours(edges.view())
        .into_iter()
        .map(|contour| {
            let filled = contour.fill(height, width);
            let overlap = overlap_fraction(&filled, opened);
            let centroid = contour.moments().centroid().map(Centroid::from);
            log::trace!(
                "edge contour at {:?}: {} px, overlap {overlap:.3} -> {}",
                contour.points.first(),
                filled.len(),
                if overlap < threshold { "novel" } else { "duplicate" }
            );
            EdgeCandidate {
                contour,
                overlap,
                centroid,
            }
        })
        .collect();

    log::debug!(
        "supplementary detection: {} edge contours, {} promoted",
        candidates.len(),
        candidates
            .iter()
            .filter(|c| c.is_promoted(threshold))
            .count()
    );

    Ok(Supplementary { edges, candidates })
}

// ============================================================================
// Aggregation
// ============================================================================

/// Merge both grain sets and render the annotated image.
pub fn aggregate(
    image: ArrayView3<u8>,
    grown: ArrayView2<i32>,
    primary: &[RegionOutline],
    supplementary: &Supplementary,
    params: &DetectorParams,
) -> Result<DetectionResult, GrainError> {
    let (height, width, _) = image.dim();
    ensure_same_dim(Stage::Aggregation, "grown marker map", (height, width), grown.dim())?;
    ensure_same_dim(
        Stage::Aggregation,
        "edge map",
        (height, width),
        supplementary.edges.dim(),
    )?;

    let overlay = &params.overlay;
    let threshold = params.dedup.overlap_threshold;
    let mut canvas = annotate::base_canvas(image);
    annotate::paint_boundaries(&mut canvas, grown, annotate::GREEN);

    let mut grains = Vec::new();

    for region in primary {
        for contour in &region.contours {
            annotate::draw_contour(
                &mut canvas,
                contour,
                annotate::GREEN,
                annotate::CONTOUR_THICKNESS,
            );
        }
        let Some(centroid) = region.centroid else {
            continue;
        };
        let id = grains.len() + 1;
        annotate::draw_label(
            &mut canvas,
            &id.to_string(),
            centroid.pixel(),
            overlay.label_scale,
            annotate::RED,
        );
        grains.push(Grain {
            id,
            centroid,
            origin: GrainOrigin::RegionGrown,
        });
    }

    for candidate in &supplementary.candidates {
        if !candidate.is_novel(threshold) {
            continue;
        }
        annotate::draw_contour(
            &mut canvas,
            &candidate.contour,
            annotate::GREEN,
            annotate::CONTOUR_THICKNESS,
        );
        let Some(centroid) = candidate.centroid else {
            continue;
        };
        let id = grains.len() + 1;
        let (x, y) = centroid.pixel();
        annotate::draw_label(
            &mut canvas,
            &id.to_string(),
            (x + overlay.label_offset, y + overlay.label_offset),
            overlay.label_scale,
            annotate::RED,
        );
        grains.push(Grain {
            id,
            centroid,
            origin: GrainOrigin::EdgeDetected,
        });
    }

    let total_count = grains.len();
    annotate::draw_headline(
        &mut canvas,
        total_count,
        overlay.font_scale_per_px,
        annotate::WHITE,
    );

    log::debug!("aggregation: {total_count} grains");

    Ok(DetectionResult {
        total_count,
        grains,
        annotated: canvas,
        edge_contour_count: supplementary.candidates.len(),
    })
}
