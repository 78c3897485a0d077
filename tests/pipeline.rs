use grainstag::annotate::headline_box;
use grainstag::{detect_grains, DetectorParams, GrainDetector, GrainError, GrainOrigin};
use ndarray::Array3;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];

fn canvas(h: usize, w: usize, bg: [u8; 3]) -> Array3<u8> {
    Array3::from_shape_fn((h, w, 3), |(_, _, c)| bg[c])
}

fn disk(img: &mut Array3<u8>, cx: f64, cy: f64, r: f64, color: [u8; 3]) {
    let (h, w, _) = img.dim();
    for y in 0..h {
        for x in 0..w {
            let (dx, dy) = (x as f64 - cx, y as f64 - cy);
            if dx * dx + dy * dy <= r * r {
                for c in 0..3 {
                    img[[y, x, c]] = color[c];
                }
            }
        }
    }
}

fn rect(img: &mut Array3<u8>, x0: usize, y0: usize, x1: usize, y1: usize) {
    for y in y0..y1 {
        for x in x0..x1 {
            for c in 0..3 {
                img[[y, x, c]] = 255;
            }
        }
    }
}

fn dumbbell(neck: usize) -> Array3<u8> {
    let mut img = canvas(100, 160, BLACK);
    disk(&mut img, 50.0, 50.0, 20.0, WHITE);
    disk(&mut img, 110.0, 50.0, 20.0, WHITE);
    rect(&mut img, 50, 50 - neck / 2, 110, 50 - neck / 2 + neck);
    img
}

#[test]
fn single_disk_is_one_grain() {
    let mut img = canvas(120, 120, BLACK);
    disk(&mut img, 60.0, 60.0, 25.0, WHITE);

    let result = detect_grains(img.view()).unwrap();
    assert_eq!(result.total_count, 1);
    assert_eq!(result.primary_count(), 1);
    assert_eq!(result.grains[0].id, 1);
    let c = result.grains[0].centroid;
    assert!((c.x - 60.0).abs() < 1.5, "x = {}", c.x);
    assert!((c.y - 60.0).abs() < 1.5, "y = {}", c.y);
}

#[test]
fn off_center_disks_are_single_grains() {
    for &(cx, cy, r) in &[(50.0, 47.0, 18.0), (40.0, 70.0, 15.0), (63.5, 60.0, 20.0)] {
        let mut img = canvas(120, 130, BLACK);
        disk(&mut img, cx, cy, r, WHITE);
        let result = detect_grains(img.view()).unwrap();
        assert_eq!(result.total_count, 1, "disk at ({cx}, {cy}) r={r}");
        let c = result.grains[0].centroid;
        assert!((c.x - cx).abs() < 1.5 && (c.y - cy).abs() < 1.5);
    }
}

#[test]
fn separated_blobs_each_counted() {
    let disks = [
        (40.0, 40.0, 16.0),
        (110.0, 38.0, 18.0),
        (190.0, 45.0, 20.0),
        (45.0, 115.0, 19.0),
        (120.0, 118.0, 17.0),
        (195.0, 120.0, 21.0),
    ];
    let bg = [20, 20, 20];

    let mut forward = canvas(160, 240, bg);
    for &(cx, cy, r) in &disks {
        disk(&mut forward, cx, cy, r, WHITE);
    }
    let mut backward = canvas(160, 240, bg);
    for &(cx, cy, r) in disks.iter().rev() {
        disk(&mut backward, cx, cy, r, WHITE);
    }
    assert_eq!(forward, backward);

    let result = detect_grains(forward.view()).unwrap();
    assert_eq!(result.total_count, 6);
    assert_eq!(result.primary_count(), 6);

    // every disk owns exactly one centroid
    for &(cx, cy, _) in &disks {
        let hits = result
            .grains
            .iter()
            .filter(|g| (g.centroid.x - cx).abs() < 2.0 && (g.centroid.y - cy).abs() < 2.0)
            .count();
        assert_eq!(hits, 1, "disk at ({cx}, {cy})");
    }

    let ids: Vec<usize> = result.grains.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn thin_neck_splits_touching_grains() {
    let result = detect_grains(dumbbell(6).view()).unwrap();
    assert_eq!(result.total_count, 2);
    assert_eq!(result.primary_count(), 2);
    let mut xs: Vec<f64> = result.grains.iter().map(|g| g.centroid.x).collect();
    xs.sort_by(f64::total_cmp);
    assert!(xs[0] < 80.0 && xs[1] > 80.0);
}

#[test]
fn thick_neck_stays_one_grain() {
    let result = detect_grains(dumbbell(32).view()).unwrap();
    assert_eq!(result.total_count, 1);
}

#[test]
fn neck_split_bound() {
    for neck in [14, 16] {
        let total = detect_grains(dumbbell(neck).view()).unwrap().total_count;
        assert_eq!(total, 2, "neck {neck}");
    }
    for neck in [18, 20] {
        let total = detect_grains(dumbbell(neck).view()).unwrap().total_count;
        assert_eq!(total, 1, "neck {neck}");
    }
}

#[test]
fn overlapping_disks_split_by_distance() {
    let pair = |d: usize| {
        let mut img = canvas(100, 160, BLACK);
        let left = 80 - d / 2;
        disk(&mut img, left as f64, 50.0, 20.0, WHITE);
        disk(&mut img, (left + d) as f64, 50.0, 20.0, WHITE);
        detect_grains(img.view()).unwrap().total_count
    };
    assert_eq!(pair(40), 2);
    assert_eq!(pair(32), 1);
}

#[test]
fn ring_is_recovered_by_edge_pass() {
    let mut img = canvas(140, 140, BLACK);
    disk(&mut img, 70.0, 70.0, 60.0, WHITE);
    disk(&mut img, 70.0, 70.0, 42.0, BLACK);

    let result = detect_grains(img.view()).unwrap();
    assert_eq!(result.primary_count(), 1);
    assert_eq!(result.supplementary_count(), 1);
    assert_eq!(result.total_count, 2);
    assert!(result.edge_contour_count >= 1);

    let extra = result
        .grains
        .iter()
        .find(|g| g.origin == GrainOrigin::EdgeDetected)
        .unwrap();
    assert_eq!(extra.id, 2);
    assert!((extra.centroid.x - 70.0).abs() < 2.0);
    assert!((extra.centroid.y - 70.0).abs() < 2.0);
}

#[test]
fn blank_image_has_no_grains() {
    for bg in [BLACK, [100, 100, 100]] {
        let img = canvas(80, 100, bg);
        let result = detect_grains(img.view()).unwrap();
        assert_eq!(result.total_count, 0);
        assert!(result.grains.is_empty());

        // only the headline is drawn
        let (bx, by, bw, bh) =
            headline_box(100, 0, DetectorParams::default().overlay.font_scale_per_px);
        for ((y, x, c), &v) in result.annotated.indexed_iter() {
            let (x, y) = (x as i32, y as i32);
            let inside = x >= bx && x < bx + bw && y >= by && y < by + bh;
            if !inside {
                assert_eq!(v, img[[y as usize, x as usize, c]], "pixel ({x}, {y})");
            }
        }
        assert_ne!(result.annotated, img);
    }
}

#[test]
fn detection_is_deterministic() {
    let img = dumbbell(10);
    let detector = GrainDetector::default();
    let a = detector.detect(img.view()).unwrap();
    let b = detector.detect(img.view()).unwrap();
    assert_eq!(a.grains, b.grains);
    assert_eq!(a.annotated, b.annotated);
    assert_eq!(a.edge_contour_count, b.edge_contour_count);
}

#[test]
fn gray_and_rgba_inputs() {
    let mut rgb = canvas(120, 120, BLACK);
    disk(&mut rgb, 60.0, 60.0, 25.0, WHITE);

    let gray = Array3::from_shape_fn((120, 120, 1), |(y, x, _)| rgb[[y, x, 0]]);
    let result = detect_grains(gray.view()).unwrap();
    assert_eq!(result.total_count, 1);
    assert_eq!(result.annotated.dim(), (120, 120, 3));

    let rgba = Array3::from_shape_fn((120, 120, 4), |(y, x, c)| {
        if c == 3 {
            255
        } else {
            rgb[[y, x, c]]
        }
    });
    let result = detect_grains(rgba.view()).unwrap();
    assert_eq!(result.total_count, 1);
    assert_eq!(result.annotated.dim(), (120, 120, 3));
}

#[test]
fn zero_sized_image_is_rejected() {
    let img = Array3::<u8>::zeros((0, 0, 3));
    assert!(matches!(
        detect_grains(img.view()),
        Err(GrainError::InvalidInput(_))
    ));
}

#[test]
fn bad_params_are_rejected() {
    let mut params = DetectorParams::default();
    params.markers.foreground_fraction = 1.5;
    assert!(matches!(
        GrainDetector::new(params),
        Err(GrainError::InvalidParams(_))
    ));

    let mut params = DetectorParams::default();
    params.edges.low_threshold = 250.0;
    params.edges.high_threshold = 10.0;
    assert!(matches!(
        GrainDetector::new(params),
        Err(GrainError::InvalidParams(_))
    ));
}

#[test]
fn params_load_from_partial_json() {
    let params: DetectorParams =
        serde_json::from_str(r#"{ "morphology": { "erosion_iterations": 3 } }"#).unwrap();
    assert_eq!(params.morphology.erosion_iterations, 3);
    assert_eq!(params.dedup, DetectorParams::default().dedup);
    assert!(GrainDetector::new(params).is_ok());
}
