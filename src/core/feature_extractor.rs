// Feature extraction - flattens a hand's landmarks into a distance-comparable vector

use crate::models::gesture::FeatureVector;
use crate::models::landmark::Landmark;

/// Flatten landmarks in order, three values (x, y, z) per landmark.
///
/// Landmark `i` lands at indices `3i`, `3i + 1` and `3i + 2`. Callers only
/// invoke this when the detector reported a hand; length agreement between
/// vectors is checked by the classifier.
pub fn extract(landmarks: &[Landmark]) -> FeatureVector {
    let mut values = Vec::with_capacity(landmarks.len() * 3);
    for point in landmarks {
        values.extend_from_slice(&[point.x, point.y, point.z]);
    }
    FeatureVector::new(values)
}

/// Euclidean distance between two equal-length vectors.
///
/// Accumulates in f64; the classifier validates lengths before calling.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
