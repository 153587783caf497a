use std::cmp::Ordering;

use num::Float;

pub trait Compare<N>
where
    N: Float,
{
    /// dot product over sparse `(index, value)` streams
    /// d(a, b) = Σ(a_i * b_i)
    fn dot(vec: impl Iterator<Item = (usize, N)>, other: impl Iterator<Item = (usize, N)>) -> f64;
    /// cosine similarity
    /// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
    /// 0.0 when either side has zero magnitude
    fn cosine_similarity(vec: impl Iterator<Item = (usize, N)>, other: impl Iterator<Item = (usize, N)>) -> f64;
}

/// Merge-join comparator.
/// Both inputs must be sorted by ascending index.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCompare;

impl<N> Compare<N> for DefaultCompare
where
    N: Float + Into<f64>,
{
    #[inline(always)]
    fn dot(vec: impl Iterator<Item = (usize, N)>, other: impl Iterator<Item = (usize, N)>) -> f64 {
        let mut a_it = vec.fuse();
        let mut b_it = other.fuse();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut dot = 0_f64;
        while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
            match ia.cmp(&ib) {
                Ordering::Equal => {
                    let (va, vb): (f64, f64) = (va.into(), vb.into());
                    dot += va * vb;
                    a_next = a_it.next();
                    b_next = b_it.next();
                }
                Ordering::Less => a_next = a_it.next(),
                Ordering::Greater => b_next = b_it.next(),
            }
        }
        dot
    }

    #[inline(always)]
    fn cosine_similarity(vec: impl Iterator<Item = (usize, N)>, other: impl Iterator<Item = (usize, N)>) -> f64 {
        let mut a_it = vec.fuse();
        let mut b_it = other.fuse();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut norm_a = 0_f64;
        let mut norm_b = 0_f64;
        let mut dot = 0_f64;
        while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
            let (va, vb): (f64, f64) = (va.into(), vb.into());
            match ia.cmp(&ib) {
                Ordering::Equal => { norm_a += va * va; norm_b += vb * vb; dot += va * vb; a_next = a_it.next(); b_next = b_it.next(); }
                Ordering::Less => { norm_a += va * va; a_next = a_it.next(); }
                Ordering::Greater => { norm_b += vb * vb; b_next = b_it.next(); }
            }
        }
        while let Some((_, va)) = a_next { let va: f64 = va.into(); norm_a += va * va; a_next = a_it.next(); }
        while let Some((_, vb)) = b_next { let vb: f64 = vb.into(); norm_b += vb * vb; b_next = b_it.next(); }
        if norm_a == 0.0 || norm_b == 0.0 { 0.0 } else { dot / (norm_a.sqrt() * norm_b.sqrt()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cos(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
        <DefaultCompare as Compare<f64>>::cosine_similarity(a.iter().copied(), b.iter().copied())
    }

    #[test]
    fn identical_vectors_score_one() {
        let a = [(0, 0.6), (3, 0.8)];
        assert!((cos(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_vectors_score_zero() {
        assert_eq!(cos(&[(0, 1.0)], &[(1, 1.0)]), 0.0);
    }

    #[test]
    fn zero_magnitude_scores_zero() {
        assert_eq!(cos(&[], &[(1, 1.0)]), 0.0);
        assert_eq!(cos(&[(1, 1.0)], &[]), 0.0);
        assert_eq!(cos(&[], &[]), 0.0);
    }

    #[test]
    fn partial_overlap() {
        // a = (1, 1, 0), b = (0, 1, 1) -> 1 / 2
        let s = cos(&[(0, 1.0), (1, 1.0)], &[(1, 1.0), (2, 1.0)]);
        assert!((s - 0.5).abs() < 1e-12);
    }

    #[test]
    fn dot_only_counts_shared_indices() {
        let d = <DefaultCompare as Compare<f32>>::dot(
            [(0, 2.0_f32), (2, 3.0)].into_iter(),
            [(1, 5.0_f32), (2, 4.0)].into_iter(),
        );
        assert!((d - 12.0).abs() < 1e-9);
    }
}
