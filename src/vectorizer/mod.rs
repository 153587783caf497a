pub mod compare;
pub mod evaluate;
pub mod serde;
pub mod term;
pub mod tfidf;

use std::marker::PhantomData;

use indexmap::IndexSet;
use num::{Float, FromPrimitive};
use rayon::prelude::*;

use crate::{
    analyzer::Normalizer,
    corpus::TriggerEntry,
    utils::math::vector::SparseVec,
    vectorizer::{
        compare::{Compare, DefaultCompare},
        term::TermFrequency,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
    },
};

/// Fitted TF-IDF space over a phrase corpus.
///
/// Immutable once built: a corpus change means building a new space and
/// publishing it in place of the old one.
///
/// `phrases`, `answers` and `rows` are parallel sequences indexed by the
/// entry's ordinal ID.
///
/// `VectorSpace<N, E>` has the following generic parameters:
/// - `N`: weight type (f32 or f64)
/// - `E`: TF-IDF calculation engine
#[derive(Debug, Clone)]
pub struct VectorSpace<N = f32, E = DefaultTFIDFEngine>
where
    N: Float,
{
    /// term -> dimension, in order of first appearance
    pub(crate) vocabulary: IndexSet<Box<str>>,
    /// IDF weight per dimension
    pub(crate) idf: Vec<N>,
    /// one unit-length (or zero) row per entry
    pub(crate) rows: Vec<SparseVec<N>>,
    /// normalized phrase per entry
    pub(crate) phrases: Vec<String>,
    /// answer per entry
    pub(crate) answers: Vec<String>,
    pub(crate) normalizer: Normalizer,
    pub(crate) _marker: PhantomData<E>,
}

impl<N, E> VectorSpace<N, E>
where
    N: Float + FromPrimitive + Into<f64> + Send + Sync,
    E: TFIDFEngine<N>,
{
    /// The explicit empty space: no vocabulary, no rows
    pub fn empty(normalizer: Normalizer) -> Self {
        Self {
            vocabulary: IndexSet::new(),
            idf: Vec::new(),
            rows: Vec::new(),
            phrases: Vec::new(),
            answers: Vec::new(),
            normalizer,
            _marker: PhantomData,
        }
    }

    /// Fit the vocabulary and weight every entry.
    ///
    /// Phrases that normalize to nothing stay in the index as zero rows so
    /// ordinal IDs line up with `entries`; they never score above zero.
    pub fn build(entries: &[TriggerEntry], normalizer: Normalizer) -> Self {
        if entries.is_empty() {
            return Self::empty(normalizer);
        }

        let phrases: Vec<String> = entries
            .par_iter()
            .map(|entry| normalizer.normalize(&entry.raw_phrase))
            .collect();
        let freqs: Vec<TermFrequency> = phrases
            .par_iter()
            .map(|phrase| TermFrequency::from_normalized(phrase))
            .collect();

        // vocabulary and document frequency in one sequential pass
        // so dimension order is deterministic
        let mut vocabulary: IndexSet<Box<str>> = IndexSet::new();
        let mut doc_freq: Vec<u64> = Vec::new();
        for freq in &freqs {
            for term in freq.term_set_ref_str() {
                let (dim, inserted) = vocabulary.insert_full(Box::from(term));
                if inserted {
                    doc_freq.push(0);
                }
                doc_freq[dim] += 1;
            }
        }

        let idf = E::idf_vec(&doc_freq, entries.len() as u64);
        let rows: Vec<SparseVec<N>> = freqs
            .par_iter()
            .map(|freq| E::tfidf_vec(freq, &vocabulary, &idf))
            .collect();

        Self {
            vocabulary,
            idf,
            rows,
            phrases,
            answers: entries.iter().map(|entry| entry.answer.clone()).collect(),
            normalizer,
            _marker: PhantomData,
        }
    }

    /// Project raw text into this space.
    /// Terms outside the fitted vocabulary contribute nothing.
    pub fn project(&self, text: &str) -> SparseVec<N> {
        let normalized = self.normalizer.normalize(text);
        let freq = TermFrequency::from_normalized(&normalized);
        E::tfidf_vec(&freq, &self.vocabulary, &self.idf)
    }

    /// Cosine similarity of `text` against every row, in ordinal order
    pub fn similarities(&self, text: &str) -> Vec<f64> {
        self.similarities_with::<DefaultCompare>(text)
    }

    pub fn similarities_with<C>(&self, text: &str) -> Vec<f64>
    where
        C: Compare<N>,
    {
        if self.is_empty() {
            return Vec::new();
        }
        let query = self.project(text);
        if query.is_zero() {
            return vec![0.0; self.rows.len()];
        }
        self.rows
            .par_iter()
            .map(|row| C::cosine_similarity(query.raw_iter(), row.raw_iter()))
            .collect()
    }
}

impl<N, E> VectorSpace<N, E>
where
    N: Float,
{
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// number of vocabulary dimensions
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.vocabulary.contains(term)
    }

    /// Vocabulary terms in dimension order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.vocabulary.iter().map(|t| t.as_ref())
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// `(normalized phrase, answer)` of one entry
    pub fn entry(&self, index: usize) -> Option<(&str, &str)> {
        Some((self.phrases.get(index)?.as_str(), self.answers.get(index)?.as_str()))
    }

    pub fn row(&self, index: usize) -> Option<&SparseVec<N>> {
        self.rows.get(index)
    }

    pub fn idf(&self) -> &[N] {
        &self.idf
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<TriggerEntry> {
        pairs.iter().map(|(p, a)| TriggerEntry::new(*p, *a)).collect()
    }

    #[test]
    fn empty_entries_give_empty_space() {
        let space: VectorSpace = VectorSpace::build(&[], Normalizer::new());
        assert!(space.is_empty());
        assert_eq!(space.vocab_size(), 0);
        assert!(space.similarities("anything").is_empty());
    }

    #[test]
    fn rows_line_up_with_entries() {
        let e = entries(&[("refund policy", "A"), ("the", "B"), ("shipping times", "C")]);
        let space: VectorSpace = VectorSpace::build(&e, Normalizer::new());
        assert_eq!(space.len(), 3);
        assert_eq!(space.phrases().len(), 3);
        assert_eq!(space.answers().len(), 3);
        // "the" normalizes to nothing
        assert_eq!(space.entry(1), Some(("", "B")));
        assert!(space.row(1).is_some_and(|r| r.is_zero()));
    }

    #[test]
    fn vocabulary_in_first_appearance_order() {
        let e = entries(&[("refund policy", "A"), ("policy shipping", "B")]);
        let space: VectorSpace<f64> = VectorSpace::build(&e, Normalizer::new());
        assert_eq!(space.terms().collect::<Vec<_>>(), vec!["refund", "policy", "shipping"]);
        assert!(space.contains_term("policy"));
        assert!(!space.contains_term("the"));
    }

    #[test]
    fn rows_are_unit_length_or_zero() {
        let e = entries(&[("refund policy", "A"), ("policy", "B"), ("...", "C")]);
        let space: VectorSpace<f64> = VectorSpace::build(&e, Normalizer::new());
        for row in &space.rows {
            assert!(row.is_well_formed());
            let n = row.norm();
            assert!(n == 0.0 || (n - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn shared_term_weighs_less() {
        let e = entries(&[("refund policy", "A"), ("shipping policy", "B")]);
        let space: VectorSpace<f64> = VectorSpace::build(&e, Normalizer::new());
        let row = space.row(0).unwrap();
        // dim 0 = refund (df 1), dim 1 = policy (df 2)
        assert!(row.get(0) > row.get(1));
    }

    #[test]
    fn out_of_vocabulary_query_projects_to_zero() {
        let e = entries(&[("refund policy", "A")]);
        let space: VectorSpace = VectorSpace::build(&e, Normalizer::new());
        assert!(space.project("xyzzy quux plugh").is_zero());
        assert_eq!(space.similarities("xyzzy quux plugh"), vec![0.0]);
    }

    #[test]
    fn identical_builds_are_identical() {
        let e = entries(&[("refund policy", "A"), ("hello", "B"), ("refund", "C")]);
        let a: VectorSpace<f64> = VectorSpace::build(&e, Normalizer::new());
        let b: VectorSpace<f64> = VectorSpace::build(&e, Normalizer::new());
        assert_eq!(a.terms().collect::<Vec<_>>(), b.terms().collect::<Vec<_>>());
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.similarities("refund"), b.similarities("refund"));
    }
}
