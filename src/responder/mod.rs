//! Owner of the published phrase index.
//!
//! Readers clone the current `Arc<Snapshot>` and score against it without
//! holding any lock. A rebuild loads and builds a new snapshot off to the
//! side and only takes the write lock to swap the pointer, so queries never
//! wait on corpus I/O and never observe a half-built index.

pub mod status;

use std::{
    fs,
    io::{BufReader, BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    analyzer::Normalizer,
    config::ResponderConfig,
    corpus::{expand_rows, CorpusLoader, CorpusRow},
    error::Result,
    vectorizer::{
        evaluate::scoring::{Hits, MatchResult, Matcher},
        serde::VectorSpaceData,
        VectorSpace,
    },
};

pub use status::Status;

/// One published generation of the index
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub space: VectorSpace,
    /// when the corpus behind `space` was loaded; `None` before the first rebuild
    pub built_at: Option<DateTime<Utc>>,
}

/// Summary of a successful rebuild
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildReport {
    /// table rows received from the loader
    pub rows: usize,
    /// phrases indexed after keyword expansion
    pub entries: usize,
    pub vocab_size: usize,
    pub built_at: DateTime<Utc>,
    pub elapsed: Duration,
}

/// On-disk form of a snapshot
#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    built_at: Option<DateTime<Utc>>,
    space: VectorSpaceData<f32>,
}

pub struct Responder {
    current: RwLock<Arc<Snapshot>>,
    last_attempt: Mutex<Option<DateTime<Utc>>>,
    matcher: Matcher,
    normalizer: Normalizer,
    refresh_interval: Duration,
}

impl Responder {
    /// Responder with an empty index and the English normalizer
    pub fn new(matcher: Matcher, refresh_interval: Duration) -> Self {
        Self::with_normalizer(matcher, refresh_interval, Normalizer::new())
    }

    pub fn with_normalizer(matcher: Matcher, refresh_interval: Duration, normalizer: Normalizer) -> Self {
        let empty = Snapshot {
            space: VectorSpace::empty(normalizer.clone()),
            built_at: None,
        };
        Self {
            current: RwLock::new(Arc::new(empty)),
            last_attempt: Mutex::new(None),
            matcher,
            normalizer,
            refresh_interval,
        }
    }

    pub fn from_config(config: &ResponderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(Matcher::new(config.threshold), config.refresh_interval()))
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// The currently published snapshot.
    /// Stays valid (and unchanged) even if a rebuild swaps in a newer one.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        // snapshots are immutable, a poisoned lock still holds a whole one
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, snapshot: Snapshot) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(snapshot);
    }

    /// Best canned answer for an incoming message
    pub fn query(&self, text: &str) -> MatchResult {
        let snapshot = self.snapshot();
        if snapshot.space.is_empty() {
            warn!("no phrases loaded, cannot match");
            return MatchResult::none();
        }
        self.matcher.find_best_match(text, &snapshot.space)
    }

    /// Top `k` candidates with scores, for diagnostics
    pub fn rank(&self, text: &str, k: usize) -> Hits {
        self.matcher.rank(text, &self.snapshot().space, k)
    }

    /// Pull the corpus and publish a freshly built index.
    ///
    /// When the loader fails the published index is left as it was and the
    /// error is returned.
    pub fn rebuild<L>(&self, loader: &L) -> Result<RebuildReport>
    where
        L: CorpusLoader + ?Sized,
    {
        self.mark_attempt();
        self.load_and_publish(loader)
    }

    /// Rebuild when no attempt was made within the refresh interval.
    /// Returns `None` when the index is still fresh.
    pub fn refresh_if_stale<L>(&self, loader: &L) -> Option<Result<RebuildReport>>
    where
        L: CorpusLoader + ?Sized,
    {
        {
            // check and claim under one lock so concurrent callers
            // do not all hit the source
            let mut last_attempt = self.last_attempt.lock().unwrap_or_else(PoisonError::into_inner);
            if !self.is_due(*last_attempt, Utc::now()) {
                return None;
            }
            *last_attempt = Some(Utc::now());
        }
        Some(self.load_and_publish(loader))
    }

    pub fn is_refresh_due(&self) -> bool {
        self.is_due(self.last_attempt(), Utc::now())
    }

    fn is_due(&self, last_attempt: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_attempt {
            None => true,
            Some(last) => match now.signed_duration_since(last).to_std() {
                Ok(elapsed) => elapsed >= self.refresh_interval,
                // clock went backwards
                Err(_) => false,
            },
        }
    }

    fn mark_attempt(&self) {
        *self.last_attempt.lock().unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
    }

    fn last_attempt(&self) -> Option<DateTime<Utc>> {
        *self.last_attempt.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_and_publish<L>(&self, loader: &L) -> Result<RebuildReport>
    where
        L: CorpusLoader + ?Sized,
    {
        let source = loader.describe();
        match loader.load() {
            Ok(rows) => Ok(self.rebuild_from_rows(&rows)),
            Err(err) => {
                warn!(%source, error = %err, "corpus load failed, keeping previous index");
                Err(err.into())
            }
        }
    }

    /// Build and publish an index from rows already in hand
    pub fn rebuild_from_rows(&self, rows: &[CorpusRow]) -> RebuildReport {
        let started = Instant::now();
        let built_at = Utc::now();
        let entries = expand_rows(rows);
        let space: VectorSpace = VectorSpace::build(&entries, self.normalizer.clone());
        let report = RebuildReport {
            rows: rows.len(),
            entries: space.len(),
            vocab_size: space.vocab_size(),
            built_at,
            elapsed: started.elapsed(),
        };
        self.publish(Snapshot {
            space,
            built_at: Some(built_at),
        });
        if report.entries == 0 {
            info!(rows = report.rows, "phrase index reset, no data available");
        } else {
            info!(
                rows = report.rows,
                entries = report.entries,
                vocab = report.vocab_size,
                elapsed_ms = report.elapsed.as_millis() as u64,
                "phrase index rebuilt"
            );
        }
        report
    }

    pub fn status(&self) -> Status {
        let snapshot = self.snapshot();
        let last_attempt = self.last_attempt();
        let next_refresh_due = last_attempt.and_then(|last| {
            chrono::Duration::from_std(self.refresh_interval)
                .ok()
                .and_then(|interval| last.checked_add_signed(interval))
        });
        let answer_count = snapshot
            .space
            .answers()
            .iter()
            .collect::<indexmap::IndexSet<_>>()
            .len();
        Status {
            entry_count: snapshot.space.len(),
            answer_count,
            vocab_size: snapshot.space.vocab_size(),
            last_rebuild: snapshot.built_at,
            last_attempt,
            next_refresh_due,
            refresh_interval: self.refresh_interval,
            threshold: self.matcher.threshold(),
        }
    }

    /// Each answer with the normalized phrases that trigger it,
    /// in order of first appearance
    pub fn keyword_listing(&self) -> IndexMap<String, Vec<String>> {
        let snapshot = self.snapshot();
        let mut listing: IndexMap<String, Vec<String>> = IndexMap::new();
        for (phrase, answer) in snapshot.space.phrases().iter().zip(snapshot.space.answers()) {
            listing.entry(answer.clone()).or_default().push(phrase.clone());
        }
        listing
    }

    /// Write the published index to `path` (CBOR)
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot();
        let file = SnapshotFile {
            built_at: snapshot.built_at,
            space: snapshot.space.to_data(),
        };
        // write beside the target, then rename over it
        let tmp = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(fs::File::create(&tmp)?);
            serde_cbor::to_writer(&mut writer, &file)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), entries = snapshot.space.len(), "snapshot saved");
        Ok(())
    }

    /// Publish an index previously written by `save_snapshot`.
    /// Returns the number of restored phrases.
    pub fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let reader = BufReader::new(fs::File::open(path)?);
        let file: SnapshotFile = serde_cbor::from_reader(reader)?;
        let space: VectorSpace = file.space.into_vector_space()?;
        let entries = space.len();
        self.publish(Snapshot {
            space,
            built_at: file.built_at,
        });
        info!(path = %path.display(), entries, "restored phrase index from snapshot");
        Ok(entries)
    }
}
