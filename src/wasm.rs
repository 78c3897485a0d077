//! WebAssembly exports for grain detection.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat row-major byte arrays.

use ndarray::Array3;
use wasm_bindgen::prelude::*;

use crate::detector::detect_grains;

/// Detection result handed to JavaScript.
#[wasm_bindgen]
pub struct WasmDetection {
    total: usize,
    primary: usize,
    centroids: Vec<f64>,
    annotated: Vec<u8>,
}

#[wasm_bindgen]
impl WasmDetection {
    /// Total grain count.
    #[wasm_bindgen(getter)]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Grains found by region growing.
    #[wasm_bindgen(getter)]
    pub fn primary(&self) -> usize {
        self.primary
    }

    /// Flat centroid list `[x0, y0, x1, y1, ...]`.
    #[wasm_bindgen(getter)]
    pub fn centroids(&self) -> Vec<f64> {
        self.centroids.clone()
    }

    /// Annotated image as flat RGB bytes (length = width * height * 3).
    #[wasm_bindgen(getter)]
    pub fn annotated(&self) -> Vec<u8> {
        self.annotated.clone()
    }
}

// ============================================================================
// Grain detection
// ============================================================================

/// Count grains in a flat image buffer.
///
/// # Arguments
/// * `data` - Flat array of bytes (length = width * height * channels)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `channels` - 1 (gray), 3 (RGB) or 4 (RGBA)
///
/// # Returns
/// Counts, centroids and the annotated RGB image
#[wasm_bindgen]
pub fn detect_grains_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<WasmDetection, JsValue> {
    let input = Array3::from_shape_vec((height, width, channels), data.to_vec())
        .map_err(|e| JsValue::from_str(&format!("invalid dimensions: {e}")))?;

    let result = detect_grains(input.view()).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let centroids = result
        .grains
        .iter()
        .flat_map(|g| [g.centroid.x, g.centroid.y])
        .collect();

    Ok(WasmDetection {
        total: result.total_count,
        primary: result.primary_count(),
        centroids,
        annotated: result.annotated.into_raw_vec_and_offset().0,
    })
}
