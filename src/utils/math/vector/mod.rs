use std::fmt::Debug;

use num::Num;
use serde::{Deserialize, Serialize};

/// SparseVec stores only the non-zero elements of a vector.
/// It holds `ind` (element indices) and `val` (element values)
/// as two parallel arrays.
///
/// Elements are guaranteed to be sorted by ascending index,
/// which lets two vectors be compared with a single merge pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N>
where
    N: Num + Copy,
{
    /// logical dimension
    len: usize,
    ind: Vec<usize>,
    val: Vec<N>,
}

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    /// All-zero vector of dimension `len`
    #[inline]
    pub fn new(len: usize) -> Self {
        SparseVec {
            len,
            ind: Vec::new(),
            val: Vec::new(),
        }
    }

    /// Build from `(index, value)` pairs in any order.
    /// Zero values are skipped, duplicated indices are summed,
    /// indices outside `len` are ignored.
    pub fn from_pairs(len: usize, mut pairs: Vec<(usize, N)>) -> Self {
        pairs.retain(|(idx, _)| *idx < len);
        pairs.sort_by_key(|(idx, _)| *idx);
        let mut ind: Vec<usize> = Vec::with_capacity(pairs.len());
        let mut val: Vec<N> = Vec::with_capacity(pairs.len());
        for (idx, v) in pairs {
            match ind.last() {
                Some(&last) if last == idx => {
                    if let Some(acc) = val.last_mut() {
                        *acc = *acc + v;
                    }
                }
                _ => {
                    ind.push(idx);
                    val.push(v);
                }
            }
        }
        // a sum can cancel out to zero
        let mut vec = SparseVec { len, ind, val };
        vec.prune_zeros();
        vec
    }

    fn prune_zeros(&mut self) {
        let mut keep = 0;
        for i in 0..self.ind.len() {
            if self.val[i] != N::zero() {
                self.ind[keep] = self.ind[i];
                self.val[keep] = self.val[i];
                keep += 1;
            }
        }
        self.ind.truncate(keep);
        self.val.truncate(keep);
    }

    /// logical dimension
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// number of non-zero elements
    #[inline]
    pub fn nnz(&self) -> usize {
        self.ind.len()
    }

    /// true when every element is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.ind.is_empty()
    }

    /// Get the value at `index`, zero when not stored
    #[inline]
    pub fn get(&self, index: usize) -> N {
        match self.ind.binary_search(&index) {
            Ok(pos) => self.val[pos],
            Err(_) => N::zero(),
        }
    }

    /// Iterate the stored `(index, value)` pairs in ascending index order
    #[inline]
    pub fn raw_iter(&self) -> impl Iterator<Item = (usize, N)> + '_ {
        self.ind.iter().copied().zip(self.val.iter().copied())
    }

    /// Multiply every element by `factor`
    pub fn scale(&mut self, factor: N) {
        for v in self.val.iter_mut() {
            *v = *v * factor;
        }
        self.prune_zeros();
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64
    where
        N: Into<f64>,
    {
        self.val
            .iter()
            .map(|v| {
                let v: f64 = (*v).into();
                v * v
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Check that indices are strictly ascending and inside `len`
    pub fn is_well_formed(&self) -> bool {
        self.ind.len() == self.val.len()
            && self.ind.windows(2).all(|w| w[0] < w[1])
            && self.ind.last().map_or(true, |&last| last < self.len)
    }

    pub fn shrink_to_fit(&mut self) {
        self.ind.shrink_to_fit();
        self.val.shrink_to_fit();
    }
}
