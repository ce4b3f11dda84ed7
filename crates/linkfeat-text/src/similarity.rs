//! Set similarity

use std::collections::HashSet;
use std::hash::Hash;

/// Jaccard index `|A ∩ B| / |A ∪ B|`.
///
/// Defined as 0.0 when either set is empty, including when both are.
pub fn jaccard_similarity<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|x| large.contains(*x)).count();
    let union = a.len() + b.len() - intersection;

    intersection as f64 / union as f64
}
