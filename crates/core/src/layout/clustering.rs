//! Gap-based clustering primitives.
//!
//! Both layout axes are handled the same way: sort positions, walk
//! consecutive pairs, and cut wherever the gap is strictly larger than a
//! threshold. A gap equal to the threshold never cuts.

use ordered_float::OrderedFloat;

/// Sort `values` ascending. NaN never reaches here; ingest rejects it.
pub fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by_key(|v| OrderedFloat(*v));
    values
}

/// Largest difference between consecutive sorted values (0 for fewer than
/// two values).
pub fn max_gap(sorted_values: &[f64]) -> f64 {
    sorted_values
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(0.0, f64::max)
}

/// Positions that open a new cluster in `sorted_values`.
///
/// The first value always opens a cluster; every value whose distance to
/// its predecessor is strictly greater than `threshold` opens another.
pub fn cluster_starts(sorted_values: &[f64], threshold: f64) -> Vec<f64> {
    let Some(&first) = sorted_values.first() else {
        return Vec::new();
    };
    let mut starts = vec![first];
    for w in sorted_values.windows(2) {
        if w[1] - w[0] > threshold {
            starts.push(w[1]);
        }
    }
    starts
}

/// Split an ordered sequence wherever `gap(prev, next)` exceeds `threshold`.
///
/// Relative order inside and across groups is preserved.
pub fn split_on_gaps<T, F>(items: Vec<T>, threshold: f64, gap: F) -> Vec<Vec<T>>
where
    F: Fn(&T, &T) -> f64,
{
    let mut groups: Vec<Vec<T>> = Vec::new();
    let mut current: Vec<T> = Vec::new();
    for item in items {
        if let Some(prev) = current.last() {
            if gap(prev, &item) > threshold {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(item);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Median of `values`; the mean of the two middle values for even counts.
pub fn median(values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let values = sorted(values);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
