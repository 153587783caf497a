use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the published index, for status reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Status {
    /// number of indexed phrases
    pub entry_count: usize,
    /// number of distinct answers
    pub answer_count: usize,
    pub vocab_size: usize,
    /// last successful rebuild
    pub last_rebuild: Option<DateTime<Utc>>,
    /// last rebuild attempt, successful or not
    pub last_attempt: Option<DateTime<Utc>>,
    /// when `refresh_if_stale` will next pull the corpus
    pub next_refresh_due: Option<DateTime<Utc>>,
    pub refresh_interval: Duration,
    pub threshold: f64,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn time(t: &Option<DateTime<Utc>>) -> String {
            t.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "never".to_string())
        }
        writeln!(f, "Phrases in database: {}", self.entry_count)?;
        writeln!(f, "Distinct answers: {}", self.answer_count)?;
        writeln!(f, "Vocabulary size: {}", self.vocab_size)?;
        writeln!(f, "Last refresh: {}", time(&self.last_rebuild))?;
        writeln!(f, "Next refresh due: {}", match self.next_refresh_due {
            Some(_) => time(&self.next_refresh_due),
            None => "now".to_string(),
        })?;
        writeln!(f, "Refresh interval: {} seconds", self.refresh_interval.as_secs())?;
        write!(f, "Match threshold: {}", self.threshold)
    }
}
