//! GrainStag: touching-grain counting
//!
//! Counts discrete grain-shaped objects (e.g. rice) in a raster image and
//! separates grains that touch or overlap. A marker-seeded region grower
//! does the bulk of the work; an edge-contour pass recovers grains the
//! grower missed and discards those it already claimed.
//!
//! ## Image Format
//! The pipeline accepts multiple channel configurations:
//! - **Grayscale**: (height, width, 1) - single channel
//! - **RGB**: (height, width, 3) - 3 color channels
//! - **RGBA**: (height, width, 4) - 3 color channels + alpha (ignored)
//!
//! All buffers are `u8` (0-255) `ndarray` arrays in (height, width, channels)
//! order. The annotated result is always RGB.
//!
//! ## Pipeline
//! 1. [`detector::preprocess`] - contrast normalization and thresholding
//! 2. [`detector::reduce_noise`] - morphological opening and erosion
//! 3. [`detector::generate_markers`] - distance-transform seeds
//! 4. [`segmentation::grow_regions`] - marker-seeded region growing
//! 5. [`detector::count_primary`] - per-region contours and centroids
//! 6. [`detector::detect_supplementary`] - edge contours with overlap dedup
//! 7. [`detector::aggregate`] - merged count and annotated image
//!
//! ```no_run
//! use grainstag::{detect_grains, GrainDetector, DetectorParams};
//! # fn load() -> ndarray::Array3<u8> { ndarray::Array3::zeros((480, 640, 3)) }
//!
//! let image = load();
//! let result = detect_grains(image.view())?;
//! println!("{} grains", result.total_count);
//!
//! let mut params = DetectorParams::default();
//! params.morphology.erosion_iterations = 3;
//! let detector = GrainDetector::new(params)?;
//! let (result, stages) = detector.detect_with_stages(image.view())?;
//! # let _ = (result, stages);
//! # Ok::<(), grainstag::GrainError>(())
//! ```

pub mod annotate;
pub mod detector;
pub mod error;
pub mod filters;
pub mod params;
pub mod segmentation;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use detector::{
    detect_grains, Centroid, DetectionResult, DetectionStages, Grain, GrainDetector, GrainOrigin,
};
pub use error::{GrainError, Stage};
pub use params::{
    DedupParams, DetectorParams, EdgeParams, MarkerParams, MorphologyParams, OverlayParams,
    ThresholdParams,
};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::detector;

    // ========================================================================
    // Grain detection
    // ========================================================================

    /// Count grains in a uint8 image of shape (height, width, channels).
    ///
    /// Returns `(total, centroids, primary_count, annotated)` where
    /// `centroids` lists `(x, y)` of every grain, region-grown ones first,
    /// and `annotated` is an RGB uint8 array of the input's size.
    #[pyfunction]
    pub fn detect_grains<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<(usize, Vec<(f64, f64)>, usize, Bound<'py, PyArray3<u8>>)> {
        let input = image.as_array();
        let result =
            detector::detect_grains(input).map_err(|e| PyValueError::new_err(e.to_string()))?;
        let centroids = result.centroids();
        let primary = result.primary_count();
        Ok((
            result.total_count,
            centroids,
            primary,
            result.annotated.into_pyarray(py),
        ))
    }

    /// GrainStag Rust extension module
    #[pymodule]
    pub fn grainstag(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(detect_grains, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::grainstag;
