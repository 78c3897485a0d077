//! Euclidean distance transform.
//!
//! Exact squared distances via the separable lower-envelope algorithm of
//! Felzenszwalb & Huttenlocher: a 1D pass down every column followed by a
//! 1D pass along every row, then a square root.

use ndarray::{Array2, ArrayView2};

const INF: f64 = 1e20;

/// Squared distance transform of one sampled function, in place.
fn edt_1d(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    if n == 0 {
        return;
    }
    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;

    for q in 1..n {
        let qf = q as f64;
        // z[0] is -inf, so the search always stops at k >= 0
        let s = loop {
            let p = v[k];
            let pf = p as f64;
            let s = ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf);
            if s > z[k] {
                break s;
            }
            k -= 1;
        };
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate() {
        let qf = q as f64;
        while z[k + 1] < qf {
            k += 1;
        }
        let p = v[k];
        let diff = qf - p as f64;
        *out = diff * diff + f[p];
    }
}

/// Distance of every non-zero pixel to the nearest zero pixel.
///
/// Zero pixels map to 0.0. A mask without any zero pixel has no finite
/// distance; every pixel then carries the same large sentinel value, so
/// relative comparisons against the maximum still behave.
///
/// # Arguments
/// * `mask` - Binary plane, non-zero = foreground
///
/// # Returns
/// Euclidean distances as f32, same shape as the mask
pub fn euclidean_distance_transform(mask: ArrayView2<u8>) -> Array2<f32> {
    let (height, width) = mask.dim();
    let mut sq = mask.mapv(|v| if v == 0 { 0.0f64 } else { INF });

    let n = height.max(width);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    // Columns
    for x in 0..width {
        for y in 0..height {
            f[y] = sq[[y, x]];
        }
        edt_1d(&f[..height], &mut d[..height], &mut v, &mut z);
        for y in 0..height {
            sq[[y, x]] = d[y];
        }
    }

    // Rows
    for y in 0..height {
        for x in 0..width {
            f[x] = sq[[y, x]];
        }
        edt_1d(&f[..width], &mut d[..width], &mut v, &mut z);
        for x in 0..width {
            sq[[y, x]] = d[x];
        }
    }

    sq.mapv(|v| v.sqrt() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_zero_center() {
        let mut m = Array2::<u8>::from_elem((5, 5), 255);
        m[[2, 2]] = 0;
        let dist = euclidean_distance_transform(m.view());

        assert_eq!(dist[[2, 2]], 0.0);
        assert_relative_eq!(dist[[2, 3]], 1.0);
        assert_relative_eq!(dist[[3, 3]], 2.0f32.sqrt());
        assert_relative_eq!(dist[[0, 0]], 8.0f32.sqrt());
        assert_relative_eq!(dist[[0, 3]], 5.0f32.sqrt());
    }

    #[test]
    fn test_square_interior() {
        let mut m = Array2::<u8>::zeros((9, 9));
        for y in 2..7 {
            for x in 2..7 {
                m[[y, x]] = 255;
            }
        }
        let dist = euclidean_distance_transform(m.view());

        assert_eq!(dist[[0, 0]], 0.0);
        assert_relative_eq!(dist[[2, 2]], 1.0);
        assert_relative_eq!(dist[[4, 4]], 3.0);
        assert_relative_eq!(dist[[4, 2]], 1.0);
    }

    #[test]
    fn test_all_foreground_is_uniform() {
        let m = Array2::<u8>::from_elem((3, 4), 255);
        let dist = euclidean_distance_transform(m.view());
        let first = dist[[0, 0]];
        assert!(first > 1e6);
        assert!(dist.iter().all(|&v| v == first));
    }

    #[test]
    fn test_all_background_is_zero() {
        let m = Array2::<u8>::zeros((3, 3));
        let dist = euclidean_distance_transform(m.view());
        assert!(dist.iter().all(|&v| v == 0.0));
    }
}
