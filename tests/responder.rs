use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use keyword_responder::{
    CorpusLoader, CorpusRow, FileCsvLoader, LoadError, MatchResult, Matcher, Normalizer,
    Responder, ResponderError, StaticLoader, TriggerEntry, VectorSpace,
};

fn faq() -> StaticLoader {
    StaticLoader::from_pairs(&[
        ("refund policy", "See our refund page"),
        ("hi, hello, hey", "Hello there!"),
        ("shipping times, delivery", "Orders ship within 2 days"),
    ])
}

fn responder() -> Responder {
    let r = Responder::new(Matcher::default(), Duration::from_secs(600));
    r.rebuild(&faq()).unwrap();
    r
}

/// Serves `rows` until `fail` is switched on
struct FlakyLoader {
    rows: Vec<CorpusRow>,
    fail: AtomicBool,
}

impl CorpusLoader for FlakyLoader {
    fn load(&self) -> Result<Vec<CorpusRow>, LoadError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(LoadError::Status { status: 503 })
        } else {
            Ok(self.rows.clone())
        }
    }
}

#[test]
fn exact_phrase_is_answered() {
    let r = responder();
    let result = r.query("refund policy");
    assert_eq!(result.answer(), Some("See our refund page"));
    assert!(result.score > 0.3);
}

#[test]
fn unrelated_message_gets_no_answer() {
    assert_eq!(responder().query("xyzzy quux plugh"), MatchResult::none());
}

#[test]
fn stop_words_do_not_change_the_match() {
    let r = responder();
    let plain = r.query("refund policy");
    let padded = r.query("What is the refund policy?");
    assert_eq!(plain.answer(), padded.answer());
    assert!((plain.score - padded.score).abs() < 1e-9);
}

#[test]
fn every_keyword_of_a_row_selects_its_answer() {
    let r = responder();
    for greeting in ["hi", "hello", "hey", "HEY!"] {
        assert_eq!(r.query(greeting).answer(), Some("Hello there!"), "{greeting}");
    }
    assert_eq!(r.status().entry_count, 6);
}

#[test]
fn matching_is_deterministic() {
    let r = responder();
    let first = r.query("when will my delivery arrive");
    for _ in 0..10 {
        assert_eq!(r.query("when will my delivery arrive"), first);
    }
}

#[test]
fn identical_phrases_go_to_the_first_entry() {
    let entries = vec![
        TriggerEntry::new("opening hours", "first"),
        TriggerEntry::new("opening hours", "second"),
    ];
    let space: VectorSpace = VectorSpace::build(&entries, Normalizer::new());
    let result = Matcher::default().find_best_match("opening hours", &space);
    assert_eq!(result.answer(), Some("first"));
    assert_eq!(result.index, Some(0));
}

#[test]
fn failed_rebuild_leaves_answers_unchanged() {
    let loader = FlakyLoader {
        rows: vec![CorpusRow::new("refund policy", "See our refund page")],
        fail: AtomicBool::new(false),
    };
    let r = Responder::new(Matcher::default(), Duration::from_secs(600));
    r.rebuild(&loader).unwrap();
    let before = r.query("refund policy");

    loader.fail.store(true, Ordering::SeqCst);
    let err = r.rebuild(&loader).unwrap_err();
    assert!(matches!(err, ResponderError::Load(LoadError::Status { status: 503 })));
    assert_eq!(r.query("refund policy"), before);
    assert_eq!(r.status().entry_count, 1);
}

#[test]
fn empty_table_clears_the_index() {
    let r = responder();
    r.rebuild(&StaticLoader::default()).unwrap();
    assert_eq!(r.query("hello"), MatchResult::none());
    assert_eq!(r.status().entry_count, 0);
}

#[test]
fn queries_during_rebuilds_see_a_whole_index() {
    let r = Arc::new(responder());
    let old = StaticLoader::from_pairs(&[("hello", "old")]);
    let new = StaticLoader::from_pairs(&[("hello", "new"), ("refund", "refund page")]);

    let writer = {
        let r = Arc::clone(&r);
        thread::spawn(move || {
            for i in 0..50 {
                let loader = if i % 2 == 0 { &old } else { &new };
                r.rebuild(loader).unwrap();
            }
        })
    };
    for _ in 0..200 {
        let snapshot = r.snapshot();
        // phrase and answer sequences always come from the same build
        let space = &snapshot.space;
        assert_eq!(space.phrases().len(), space.answers().len());
        assert_eq!(space.len(), space.answers().len());
        let answer = r.query("hello").answer;
        assert!(matches!(
            answer.as_deref(),
            Some("old") | Some("new") | Some("Hello there!")
        ));
    }
    writer.join().unwrap();
}

#[test]
fn csv_file_drives_the_index() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "Keywords,Answer,Notes\n\
         \"refund policy, refunds\",\"See our refund page, it has details\",x\n\
         opening hours,\"We are open 9-5, \"\"Mon-Fri\"\"\"\n\
         no answer here,\n"
    )
    .unwrap();

    let r = Responder::new(Matcher::default(), Duration::from_secs(600));
    let report = r.rebuild(&FileCsvLoader::new(file.path())).unwrap();
    assert_eq!(report.rows, 2);
    assert_eq!(report.entries, 3);
    assert_eq!(r.query("refunds").answer(), Some("See our refund page, it has details"));
    assert_eq!(r.query("opening hours?").answer(), Some("We are open 9-5, \"Mon-Fri\""));
}

#[test]
fn single_column_table_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "Keywords\nhello\n").unwrap();
    let r = responder();
    let err = r.rebuild(&FileCsvLoader::new(file.path())).unwrap_err();
    assert!(matches!(err, ResponderError::Load(LoadError::TooFewColumns { found: 1 })));
    assert_eq!(r.query("hello").answer(), Some("Hello there!"));
}

#[test]
fn snapshot_restores_the_same_answers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("phrases.cbor");
    let r = responder();
    r.save_snapshot(&path).unwrap();

    let restored = Responder::new(Matcher::default(), Duration::from_secs(600));
    restored.load_snapshot(&path).unwrap();
    for q in ["refund policy", "hey", "delivery", "nothing relevant"] {
        assert_eq!(restored.query(q), r.query(q), "{q}");
    }
    assert_eq!(restored.keyword_listing(), r.keyword_listing());
}

#[test]
fn keyword_listing_shows_normalized_phrases() {
    let listing = responder().keyword_listing();
    assert_eq!(
        listing.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["See our refund page", "Hello there!", "Orders ship within 2 days"]
    );
    assert_eq!(listing["Orders ship within 2 days"], vec!["shipping times", "delivery"]);
}

#[test]
fn test_ranking_lists_candidates() {
    let hits = responder().rank("refund", 3);
    assert_eq!(hits.len(), 3);
    let best = hits.best().unwrap();
    assert_eq!(best.answer, "See our refund page");
    assert!(hits.list.windows(2).all(|w| w[0].score >= w[1].score));
}
