use std::fmt::{self, Debug, Display};

use num::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::vectorizer::{tfidf::TFIDFEngine, VectorSpace};

/// Confidence a match must strictly exceed unless configured otherwise
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Outcome of matching one message.
/// "No match" is `answer == None` with a score of 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub answer: Option<String>,
    pub score: f64,
    /// ordinal ID of the winning entry
    pub index: Option<usize>,
}

impl MatchResult {
    pub fn none() -> Self {
        Self {
            answer: None,
            score: 0.0,
            index: None,
        }
    }

    #[inline]
    pub fn is_match(&self) -> bool {
        self.answer.is_some()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }
}

/// One scored candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitEntry {
    pub index: usize,
    pub phrase: String,
    pub answer: String,
    pub score: f64,
}

/// Structure to store ranked candidates
#[derive(Clone, Default, PartialEq)]
pub struct Hits {
    pub list: Vec<HitEntry>,
}

impl Hits {
    pub fn new(list: Vec<HitEntry>) -> Self {
        Hits { list }
    }

    /// Sort by descending score, lower ordinal first on ties
    pub fn sort_by_score_desc(&mut self) -> &mut Self {
        self.list.retain(|hit| !hit.score.is_nan());
        self.list
            .sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.index.cmp(&b.index)));
        self
    }

    pub fn truncate(&mut self, k: usize) -> &mut Self {
        self.list.truncate(k);
        self
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn best(&self) -> Option<&HitEntry> {
        self.list.first()
    }
}

impl Debug for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for hit in &self.list {
                writeln!(f, "    #{} {:?}: {:.6}", hit.index, hit.phrase, hit.score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list()
                .entries(self.list.iter().map(|h| (h.index, h.score)))
                .finish()
        }
    }
}

impl Display for Hits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rank, hit) in self.list.iter().enumerate() {
            writeln!(
                f,
                "{:>2}. {:.4}  [{}] {} -> {}",
                rank + 1,
                hit.score,
                hit.index,
                hit.phrase,
                hit.answer
            )?;
        }
        Ok(())
    }
}

/// Picks the best answer for a message.
/// Owns the confidence threshold so callers never re-check scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    threshold: f64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl Matcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Best answer whose similarity is strictly above the threshold.
    ///
    /// Ties go to the lowest ordinal ID. Never fails: an empty space, an
    /// empty query or a query made only of unknown words is "no match".
    pub fn find_best_match<N, E>(&self, query: &str, space: &VectorSpace<N, E>) -> MatchResult
    where
        N: Float + FromPrimitive + Into<f64> + Send + Sync,
        E: TFIDFEngine<N>,
    {
        if space.is_empty() {
            return MatchResult::none();
        }
        let scores = space.similarities(query);
        let mut best: Option<(usize, f64)> = None;
        for (index, &score) in scores.iter().enumerate() {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ if score.is_nan() => {}
                _ => best = Some((index, score)),
            }
        }
        match best {
            Some((index, score)) if score > self.threshold => {
                debug!(query, index, score, "matched");
                MatchResult {
                    answer: space.answers.get(index).cloned(),
                    score,
                    index: Some(index),
                }
            }
            _ => MatchResult::none(),
        }
    }

    /// Top `k` candidates regardless of the threshold
    pub fn rank<N, E>(&self, query: &str, space: &VectorSpace<N, E>, k: usize) -> Hits
    where
        N: Float + FromPrimitive + Into<f64> + Send + Sync,
        E: TFIDFEngine<N>,
    {
        let list = space
            .similarities(query)
            .into_iter()
            .enumerate()
            .map(|(index, score)| HitEntry {
                index,
                phrase: space.phrases[index].clone(),
                answer: space.answers[index].clone(),
                score,
            })
            .collect();
        let mut hits = Hits::new(list);
        hits.sort_by_score_desc().truncate(k);
        hits
    }
}
