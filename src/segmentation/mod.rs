//! Segmentation algorithms for grain separation.
//!
//! - **Labeling**: breadth-first connected-component labeling
//! - **Watershed**: marker-seeded region growing over a gradient surface
//! - **Contour**: outer boundary tracing, polygon moments and fill
//!
//! Marker maps are `Array2<i32>` using the label constants below.

pub mod contour;
pub mod labeling;
pub mod watershed;

pub use contour::{external_contours, Contour, Moments};
pub use labeling::{label_components, Components, Connectivity};
pub use watershed::grow_regions;

/// Not yet assigned to any region.
pub const UNKNOWN: i32 = 0;
/// Sure background.
pub const BACKGROUND: i32 = 1;
/// First id handed out to a foreground region.
pub const FIRST_REGION: i32 = 2;
/// Pixel contested by two regions after growth.
pub const BOUNDARY: i32 = -1;
