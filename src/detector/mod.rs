//! Grain detection pipeline.
//!
//! Wires the stages together: preprocessing, noise reduction, marker
//! generation, region growing, primary counting, edge-based supplementary
//! detection and aggregation into the annotated result.

mod pipeline;
mod result;
pub mod stages;

pub use pipeline::{detect_grains, DetectionStages, GrainDetector};
pub use result::{Centroid, DetectionResult, Grain, GrainOrigin};
pub use stages::{
    aggregate, count_primary, detect_supplementary, generate_markers, preprocess, reduce_noise,
};
