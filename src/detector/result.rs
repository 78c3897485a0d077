use ndarray::Array3;
use serde::{Deserialize, Serialize};

/// Sub-pixel grain center in image coordinates (x right, y down).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub x: f64,
    pub y: f64,
}

impl Centroid {
    /// Integer pixel the centroid falls into (truncation toward zero).
    pub fn pixel(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

impl From<(f64, f64)> for Centroid {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Technique that found a grain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrainOrigin {
    /// Marker-seeded region growing.
    RegionGrown,
    /// Edge contour not covered by the region-grown mask.
    EdgeDetected,
}

/// One counted grain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grain {
    /// 1-based display number, unique across both techniques.
    pub id: usize,
    pub centroid: Centroid,
    pub origin: GrainOrigin,
}

/// Output of a grain detection run.
#[derive(Clone, Debug)]
pub struct DetectionResult {
    pub total_count: usize,
    /// Region-grown grains first, then edge-detected ones, each in
    /// detection order.
    pub grains: Vec<Grain>,
    /// Input rendered as RGB with boundaries, outlines, numbers and the
    /// count headline drawn on top; shape `(height, width, 3)`.
    pub annotated: Array3<u8>,
    /// External contours found by the edge detector before deduplication.
    pub edge_contour_count: usize,
}

impl DetectionResult {
    pub fn primary_count(&self) -> usize {
        self.count_origin(GrainOrigin::RegionGrown)
    }

    pub fn supplementary_count(&self) -> usize {
        self.count_origin(GrainOrigin::EdgeDetected)
    }

    /// Centroids `(x, y)` of every grain in `grains` order.
    pub fn centroids(&self) -> Vec<(f64, f64)> {
        self.grains
            .iter()
            .map(|g| (g.centroid.x, g.centroid.y))
            .collect()
    }

    fn count_origin(&self, origin: GrainOrigin) -> usize {
        self.grains.iter().filter(|g| g.origin == origin).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_origin() {
        let grain = |id, origin| Grain {
            id,
            centroid: Centroid { x: 1.0, y: 2.0 },
            origin,
        };
        let result = DetectionResult {
            total_count: 3,
            grains: vec![
                grain(1, GrainOrigin::RegionGrown),
                grain(2, GrainOrigin::RegionGrown),
                grain(3, GrainOrigin::EdgeDetected),
            ],
            annotated: Array3::zeros((1, 1, 3)),
            edge_contour_count: 4,
        };
        assert_eq!(result.primary_count(), 2);
        assert_eq!(result.supplementary_count(), 1);
        assert_eq!(result.centroids()[2], (1.0, 2.0));
    }

    #[test]
    fn centroid_pixel_truncates() {
        assert_eq!(Centroid { x: 3.9, y: 0.2 }.pixel(), (3, 0));
    }

    #[test]
    fn origin_serializes_snake_case() {
        let json = serde_json::to_string(&GrainOrigin::EdgeDetected).unwrap();
        assert_eq!(json, "\"edge_detected\"");
    }
}
