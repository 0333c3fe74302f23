//! Sampling for session creation.
//!
//! Slices and random comparisons are sampled exactly once, when a session is
//! created; the sampled set is immutable for the session's lifetime. The
//! active-sort engine itself never uses randomness.

use rand::Rng;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DatasetImage, SliceRef};

/// Partial Fisher-Yates: only as many items as requested are shuffled.
///
/// In the full-shuffle case (`count == items.len()`) the final swap (0 -> 0)
/// is redundant, which classic Fisher-Yates avoids with an `i > 0` bound.
/// When `count < items.len()` that last swap is no longer redundant, so the
/// loop bound is `i > items.len() - count - 1` instead.
pub fn sample_without_replacement<T: Clone, R: Rng>(
    items: &[T],
    count: usize,
    rng: &mut R,
) -> DomainResult<Vec<T>> {
    if count == 0 {
        return Ok(vec![]);
    }
    if count > items.len() {
        return Err(DomainError::ValidationFailed(format!(
            "can't sample {count} elements from {} items",
            items.len()
        )));
    }

    let mut items = items.to_vec();
    let len = items.len();
    for i in ((len - count)..len).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }

    Ok(items[len - count..].to_vec())
}

/// Sample `count` unordered slice-index pairs from all combinations.
///
/// A `count` of `None` keeps every combination. Pair indices refer to
/// positions in the session's slice sequence.
pub fn sample_comparisons<R: Rng>(
    slice_count: usize,
    count: Option<usize>,
    rng: &mut R,
) -> DomainResult<Vec<(usize, usize)>> {
    let mut combinations = Vec::new();
    for i in 0..slice_count {
        for j in (i + 1)..slice_count {
            combinations.push((i, j));
        }
    }

    let count = count.unwrap_or(combinations.len()).min(combinations.len());
    sample_without_replacement(&combinations, count, rng)
}

/// Sample `image_count` images and wrap each as a whole-image slice.
///
/// Per-image slice counts require reading volume headers, which is outside
/// this crate; callers with real headers can build `SliceRef`s directly and
/// skip this helper.
pub fn sample_image_slices<R: Rng>(
    images: &[DatasetImage],
    image_count: usize,
    rng: &mut R,
) -> DomainResult<Vec<SliceRef>> {
    let sampled = sample_without_replacement(images, image_count, rng)?;
    Ok(sampled.iter().map(|img| SliceRef::new(img.id, 0, 0)).collect())
}
