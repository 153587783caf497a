use std::{
    error::Error,
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::Parser;
use keyword_responder::{
    CorpusLoader, FileCsvLoader, HttpCsvLoader, LoadError, Responder, ResponderConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Answers chat messages read from stdin with canned replies
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Config file (defaults to ./responder.toml when present)
    #[arg(long)]
    config: Option<String>,
    /// Local CSV trigger table
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Google Sheet id whose CSV export holds the trigger table
    #[arg(long)]
    sheet_id: Option<String>,
    /// Similarity a match must strictly exceed
    #[arg(long)]
    threshold: Option<f64>,
}

/// Candidates shown by `:test`
const TEST_TOP_K: usize = 5;

fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = ResponderConfig::load_from(args.config.as_deref())?;
    if let Some(csv) = args.csv {
        config.csv_path = Some(csv);
    }
    if let Some(sheet_id) = args.sheet_id {
        config.sheet_id = Some(sheet_id);
    }
    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    config.validate()?;

    // stdout carries the answers, logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let loader = select_loader(&config)?;
    let responder = Responder::from_config(&config)?;
    info!(source = %loader.describe(), threshold = config.threshold, "starting keyword responder");

    match responder.rebuild(&*loader) {
        Ok(_) => save_snapshot(&responder, &config),
        Err(err) => match &config.snapshot_path {
            Some(path) if path.exists() => {
                warn!(error = %err, "initial load failed, falling back to snapshot");
                responder.load_snapshot(path)?;
            }
            _ => warn!(error = %err, "initial load failed, starting with an empty index"),
        },
    }

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if let Some(command) = message.strip_prefix(':') {
            run_command(command, &responder, &*loader, &config, &mut out)?;
            continue;
        }

        if let Some(Ok(_)) = responder.refresh_if_stale(&*loader) {
            save_snapshot(&responder, &config);
        }
        if let Some(answer) = responder.query(message).answer {
            writeln!(out, "{}", answer)?;
        }
        out.flush()?;
    }
    Ok(())
}

/// Local file first, then the sheet
fn select_loader(config: &ResponderConfig) -> Result<Box<dyn CorpusLoader>, LoadError> {
    if let Some(path) = &config.csv_path {
        return Ok(Box::new(FileCsvLoader::new(path)));
    }
    match &config.sheet_id {
        Some(sheet_id) => Ok(Box::new(HttpCsvLoader::for_sheet(sheet_id, config.request_timeout())?)),
        None => Err(LoadError::MissingSource),
    }
}

fn save_snapshot(responder: &Responder, config: &ResponderConfig) {
    if let Some(path) = &config.snapshot_path {
        if let Err(err) = responder.save_snapshot(path) {
            warn!(path = %path.display(), error = %err, "could not save snapshot");
        }
    }
}

fn run_command(
    command: &str,
    responder: &Responder,
    loader: &dyn CorpusLoader,
    config: &ResponderConfig,
    out: &mut impl Write,
) -> io::Result<()> {
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
    match name {
        "refresh" => match responder.rebuild(loader) {
            Ok(report) => {
                save_snapshot(responder, config);
                writeln!(
                    out,
                    "Refreshed: {} phrases from {} rows, {} terms ({} ms)",
                    report.entries,
                    report.rows,
                    report.vocab_size,
                    report.elapsed.as_millis()
                )?;
            }
            Err(err) => writeln!(out, "Refresh failed, keeping previous data: {}", err)?,
        },
        "status" => writeln!(out, "{}", responder.status())?,
        "keywords" => {
            let listing = responder.keyword_listing();
            if listing.is_empty() {
                writeln!(out, "No keywords loaded")?;
            }
            for (answer, phrases) in &listing {
                writeln!(out, "{}", answer)?;
                for phrase in phrases {
                    writeln!(out, "  - {}", phrase)?;
                }
            }
        }
        "test" => {
            let query = rest.trim();
            let result = responder.query(query);
            match result.answer() {
                Some(answer) => writeln!(out, "Match ({:.4}): {}", result.score, answer)?,
                None => writeln!(
                    out,
                    "No match above threshold {}",
                    responder.matcher().threshold()
                )?,
            }
            write!(out, "{}", responder.rank(query, TEST_TOP_K))?;
        }
        _ => writeln!(out, "Unknown command :{} (try :refresh, :status, :keywords, :test <query>)", name)?,
    }
    out.flush()
}
