//! Text normalization shared by indexing and querying.

pub mod stop_words;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Turns raw text into the canonical form that phrases are compared in:
/// lowercased, split into alphanumeric words, stop words removed,
/// rejoined with single spaces.
///
/// The same normalizer must be used for building an index and for
/// querying it; `VectorSpace` keeps the one it was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normalizer {
    stop_words: HashSet<Box<str>>,
}

impl Normalizer {
    /// Normalizer with the English stop-word list
    pub fn new() -> Self {
        Self::with_stop_words(stop_words::ENGLISH.iter().copied())
    }

    /// Normalizer with a custom stop-word list.
    /// Stop words are matched after lowercasing.
    pub fn with_stop_words<I, T>(words: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            stop_words: words
                .into_iter()
                .map(|w| Box::from(w.as_ref().to_lowercase()))
                .collect(),
        }
    }

    /// Normalizer that keeps every word
    pub fn without_stop_words() -> Self {
        Self {
            stop_words: HashSet::new(),
        }
    }

    #[inline]
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }

    /// Surviving tokens in original order
    pub fn tokens(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| !token.is_empty())
            .filter(|token| !self.is_stop_word(token))
            .map(|token| token.to_string())
            .collect()
    }

    /// Canonical form of `text`; empty when nothing survives
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_drops_stop_words() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("What is the Refund Policy?"), "refund policy");
    }

    #[test]
    fn punctuation_never_survives() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("!!! ... ,,,"), "");
        assert_eq!(n.normalize("hello, world!"), "hello world");
        assert_eq!(n.normalize("e-mail"), "e mail");
    }

    #[test]
    fn contractions_leave_no_fragments() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("I don't know"), "know");
        assert_eq!(n.normalize("you're late"), "late");
    }

    #[test]
    fn empty_and_whitespace_input() {
        let n = Normalizer::new();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("   \t\n"), "");
    }

    #[test]
    fn non_ascii_input() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("Café  Über"), "café über");
        assert_eq!(n.normalize("日本語"), "日本語");
        assert_eq!(n.normalize("🎉🎉"), "");
    }

    #[test]
    fn keeps_digits_and_order() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("order 66 status"), "order 66 status");
        assert_eq!(n.normalize("status order"), "status order");
    }

    #[test]
    fn is_deterministic() {
        let n = Normalizer::new();
        let text = "The quick brown fox, at the bank";
        assert_eq!(n.normalize(text), n.normalize(text));
    }

    #[test]
    fn custom_stop_words() {
        let n = Normalizer::with_stop_words(["Please"]);
        assert_eq!(n.normalize("please help me"), "help me");
        assert_eq!(Normalizer::without_stop_words().normalize("the end"), "the end");
    }
}
