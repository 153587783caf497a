use indexmap::IndexSet;
use num::{Float, FromPrimitive};

use crate::{utils::math::vector::SparseVec, vectorizer::term::TermFrequency};

pub trait TFIDFEngine<N>
where
    N: Float,
{
    /// Generate the IDF vector
    /// # Arguments
    /// * `doc_freq` - number of phrases containing each vocabulary term, by dimension
    /// * `doc_num` - number of phrases in the corpus
    /// # Returns
    /// * `Vec<N>` - IDF weight per dimension
    fn idf_vec(doc_freq: &[u64], doc_num: u64) -> Vec<N>;

    /// Generate the weighted vector of one phrase
    /// Terms missing from `vocabulary` are ignored
    /// # Arguments
    /// * `freq` - term counts of the phrase
    /// * `vocabulary` - term dimension sample
    /// * `idf` - IDF vector produced by `idf_vec`
    fn tfidf_vec(freq: &TermFrequency, vocabulary: &IndexSet<Box<str>>, idf: &[N]) -> SparseVec<N>;
}

/// Default TF-IDF engine
///
/// tf(t, d) = raw count of t in d
/// idf(t) = ln((1 + n) / (1 + df(t))) + 1
/// w(t, d) = tf × idf, then each vector is scaled to unit length
///
/// The smoothed idf never divides by zero and keeps terms that appear in
/// every phrase at a positive weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl DefaultTFIDFEngine {
    pub fn new() -> Self {
        DefaultTFIDFEngine
    }

    #[inline]
    pub fn idf_calc(doc_num: u64, doc_freq: u64) -> f64 {
        ((1.0 + doc_num as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
    }
}

impl<N> TFIDFEngine<N> for DefaultTFIDFEngine
where
    N: Float + FromPrimitive + Into<f64>,
{
    fn idf_vec(doc_freq: &[u64], doc_num: u64) -> Vec<N> {
        doc_freq
            .iter()
            .map(|&df| N::from_f64(Self::idf_calc(doc_num, df)).unwrap_or_else(N::one))
            .collect()
    }

    fn tfidf_vec(freq: &TermFrequency, vocabulary: &IndexSet<Box<str>>, idf: &[N]) -> SparseVec<N> {
        let pairs: Vec<(usize, N)> = freq
            .iter()
            .filter_map(|(term, count)| {
                let dim = vocabulary.get_index_of(term)?;
                let weight = idf.get(dim).copied()?;
                let tf = N::from_u64(count)?;
                Some((dim, tf * weight))
            })
            .collect();
        let mut vec = SparseVec::from_pairs(vocabulary.len(), pairs);
        let norm = vec.norm();
        if norm > 0.0 {
            if let Some(inv) = N::from_f64(1.0 / norm) {
                vec.scale(inv);
            }
        }
        vec.shrink_to_fit();
        vec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(terms: &[&str]) -> IndexSet<Box<str>> {
        terms.iter().map(|t| Box::from(*t)).collect()
    }

    #[test]
    fn idf_is_smoothed() {
        // term in every phrase: ln(1) + 1
        assert!((DefaultTFIDFEngine::idf_calc(3, 3) - 1.0).abs() < 1e-12);
        // rarer terms weigh more
        assert!(DefaultTFIDFEngine::idf_calc(3, 1) > DefaultTFIDFEngine::idf_calc(3, 2));
        // a zero document frequency does not divide by zero
        assert!(DefaultTFIDFEngine::idf_calc(0, 0).is_finite());
    }

    #[test]
    fn tfidf_vec_is_unit_length() {
        let vocabulary = vocab(&["refund", "policy", "shipping"]);
        let idf: Vec<f64> = <DefaultTFIDFEngine as TFIDFEngine<f64>>::idf_vec(&[1, 2, 1], 2);
        let freq = TermFrequency::from_normalized("refund policy refund");
        let vec = <DefaultTFIDFEngine as TFIDFEngine<f64>>::tfidf_vec(&freq, &vocabulary, &idf);
        assert!((vec.norm() - 1.0).abs() < 1e-9);
        assert_eq!(vec.get(2), 0.0);
        assert!(vec.get(0) > vec.get(1));
    }

    #[test]
    fn unknown_terms_are_ignored() {
        let vocabulary = vocab(&["refund"]);
        let idf: Vec<f32> = <DefaultTFIDFEngine as TFIDFEngine<f32>>::idf_vec(&[1], 1);
        let freq = TermFrequency::from_normalized("xyzzy quux");
        let vec = <DefaultTFIDFEngine as TFIDFEngine<f32>>::tfidf_vec(&freq, &vocabulary, &idf);
        assert!(vec.is_zero());
        assert_eq!(vec.len(), 1);
    }
}
