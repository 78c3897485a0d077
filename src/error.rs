//! Error types shared by every pipeline stage.

use std::fmt;

/// Pipeline stage that produced a [`GrainError::Processing`] failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Preprocess,
    NoiseReduction,
    MarkerGeneration,
    RegionGrowing,
    PrimaryCount,
    SupplementaryDetection,
    Aggregation,
}

impl Stage {
    /// Stable kebab-case name used in error messages and logs.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Preprocess => "preprocess",
            Stage::NoiseReduction => "noise-reduction",
            Stage::MarkerGeneration => "marker-generation",
            Stage::RegionGrowing => "region-growing",
            Stage::PrimaryCount => "primary-count",
            Stage::SupplementaryDetection => "supplementary-detection",
            Stage::Aggregation => "aggregation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors returned by the grain detector.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GrainError {
    #[error("invalid input image: {0}")]
    InvalidInput(String),
    #[error("invalid detector parameters: {0}")]
    InvalidParams(String),
    #[error("{stage} stage failed: {reason}")]
    Processing { stage: Stage, reason: String },
}

impl GrainError {
    pub(crate) fn processing(stage: Stage, reason: impl Into<String>) -> Self {
        GrainError::Processing {
            stage,
            reason: reason.into(),
        }
    }

    /// Stage tag of a processing failure, `None` for input/parameter errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            GrainError::Processing { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Fail with a processing error when two buffers disagree on `(height, width)`.
pub(crate) fn ensure_same_dim(
    stage: Stage,
    what: &str,
    expected: (usize, usize),
    actual: (usize, usize),
) -> Result<(), GrainError> {
    if expected != actual {
        return Err(GrainError::processing(
            stage,
            format!(
                "{what} is {}x{} but the pipeline runs at {}x{}",
                actual.1, actual.0, expected.1, expected.0
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_error_names_stage() {
        let err = GrainError::processing(Stage::RegionGrowing, "bad surface");
        assert_eq!(err.to_string(), "region-growing stage failed: bad surface");
        assert_eq!(err.stage(), Some(Stage::RegionGrowing));
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let err = ensure_same_dim(Stage::PrimaryCount, "marker map", (4, 5), (4, 6)).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::PrimaryCount));
        assert!(err.to_string().contains("6x4"));
        assert!(ensure_same_dim(Stage::PrimaryCount, "marker map", (4, 5), (4, 5)).is_ok());
    }
}
