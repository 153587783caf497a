//! This crate is a keyword responder: it answers chat messages with canned
//! replies by matching them against a TF-IDF index of trigger phrases.

pub mod analyzer;
pub mod config;
pub mod corpus;
pub mod error;
pub mod responder;
pub mod utils;
pub mod vectorizer;

/// Responder
/// The top-level struct of this crate. It owns the published phrase index
/// and answers messages against it.
///
/// Internally, it holds:
/// - The current `Snapshot` (vector space + rebuild time) behind an `Arc`
/// - The `Matcher` with its confidence threshold
/// - The time of the last refresh attempt
///
/// Rebuilds load and fit a new index without blocking queries; the new
/// snapshot replaces the old one in a single pointer swap.
/// A failed load keeps the previous index.
///
/// # Thread Safety
/// `Responder` is `Send + Sync` and is meant to be shared behind an `Arc`.
pub use responder::{RebuildReport, Responder, Snapshot, Status};

/// Phrase Vector Space
/// A fitted TF-IDF space over the trigger phrases.
/// It holds the vocabulary, the IDF weights, one L2-normalized sparse row
/// per phrase and the parallel phrase/answer sequences.
///
/// `VectorSpace<N, E>` has the following generic parameters:
/// - `N`: weight type (e.g., f32, f64)
/// - `E`: TF-IDF calculation engine type (e.g., DefaultTFIDFEngine)
///
/// # Serialization
/// Supported.
/// Deserialize through `VectorSpaceData`, which validates the parallel
/// sequences before turning it back into a `VectorSpace`.
pub use vectorizer::VectorSpace;

/// Vector Space Data Structure for Serialization
pub use vectorizer::serde::VectorSpaceData;

/// Term Frequency structure
/// Counts of each term within one normalized phrase.
///
/// Used as base data for TF (Term Frequency) calculation.
pub use vectorizer::term::TermFrequency;

/// TF IDF Calculation Engine Trait
/// A trait that defines the behavior of a TF-IDF calculation engine.
///
/// A default implementation, `DefaultTFIDFEngine`, is provided and uses raw
/// counts, smoothed IDF and L2 normalization.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};

/// Vector comparison (dot product / cosine similarity) over sparse vectors
pub use vectorizer::compare::{Compare, DefaultCompare};

/// Matcher and match results
/// - `Matcher`: picks the best answer above the confidence threshold
/// - `MatchResult`: answer, score and ordinal of the winning entry, or "no match"
/// - `Hits` / `HitEntry`: ranked candidates for diagnostics
pub use vectorizer::evaluate::scoring::{HitEntry, Hits, MatchResult, Matcher, DEFAULT_THRESHOLD};

/// Text normalizer (lowercase, alphanumeric words, English stop words removed)
pub use analyzer::Normalizer;

/// Corpus rows, trigger entries and the loaders that produce them
/// - `CorpusLoader`: source of `(keywords, answer)` rows
/// - `HttpCsvLoader`: CSV over HTTP (e.g. a Google Sheet export)
/// - `FileCsvLoader`: CSV from a local file
/// - `StaticLoader`: rows held in memory
pub use corpus::{
    expand_rows,
    source::{FileCsvLoader, HttpCsvLoader, StaticLoader},
    CorpusLoader, CorpusRow, TriggerEntry,
};

/// Configuration (defaults, optional TOML file, `RESPONDER_*` environment)
pub use crate::config::ResponderConfig;

/// Error types
pub use error::{LoadError, ResponderError, Result};
