pub mod csv;
pub mod source;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// One raw row of the trigger table.
/// `keywords` is a comma-separated list sharing a single `answer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRow {
    pub keywords: String,
    pub answer: String,
}

impl CorpusRow {
    pub fn new(keywords: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            answer: answer.into(),
        }
    }
}

/// One (phrase, answer) pair before normalization.
/// Its position in the expanded sequence is its ordinal ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerEntry {
    pub raw_phrase: String,
    pub answer: String,
}

impl TriggerEntry {
    pub fn new(raw_phrase: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            raw_phrase: raw_phrase.into(),
            answer: answer.into(),
        }
    }
}

/// Expand table rows into trigger entries.
/// Each row yields one entry per comma-separated keyword (trimmed),
/// all carrying the row's answer. Rows without an answer are skipped.
pub fn expand_rows(rows: &[CorpusRow]) -> Vec<TriggerEntry> {
    rows.iter()
        .filter(|row| !row.answer.trim().is_empty())
        .flat_map(|row| {
            row.keywords
                .split(',')
                .map(move |keyword| TriggerEntry::new(keyword.trim(), row.answer.as_str()))
        })
        .collect()
}

/// Source of corpus rows.
///
/// A load either yields the complete table or fails; a partial table is
/// never returned. `Ok` with no rows is a legitimately empty corpus.
pub trait CorpusLoader: Send + Sync {
    fn load(&self) -> Result<Vec<CorpusRow>, LoadError>;

    /// Human readable name of the source, for logs
    fn describe(&self) -> String {
        "corpus".to_string()
    }
}

impl<L> CorpusLoader for Box<L>
where
    L: CorpusLoader + ?Sized,
{
    fn load(&self) -> Result<Vec<CorpusRow>, LoadError> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_keyword_row_expands_in_order() {
        let rows = vec![CorpusRow::new("hi, hello, hey", "Hello there!")];
        let entries = expand_rows(&rows);
        let phrases: Vec<&str> = entries.iter().map(|e| e.raw_phrase.as_str()).collect();
        assert_eq!(phrases, vec!["hi", "hello", "hey"]);
        assert!(entries.iter().all(|e| e.answer == "Hello there!"));
    }

    #[test]
    fn rows_without_answer_are_skipped() {
        let rows = vec![
            CorpusRow::new("refund", ""),
            CorpusRow::new("shipping", "  "),
            CorpusRow::new("hours", "9 to 5"),
        ];
        let entries = expand_rows(&rows);
        assert_eq!(entries, vec![TriggerEntry::new("hours", "9 to 5")]);
    }

    #[test]
    fn empty_keywords_are_kept() {
        let rows = vec![CorpusRow::new("a,,b", "x")];
        let entries = expand_rows(&rows);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].raw_phrase, "");
    }

    #[test]
    fn entries_keep_row_order() {
        let rows = vec![CorpusRow::new("one", "1"), CorpusRow::new("two, three", "2")];
        let answers: Vec<String> = expand_rows(&rows).into_iter().map(|e| e.answer).collect();
        assert_eq!(answers, vec!["1", "2", "2"]);
    }
}
