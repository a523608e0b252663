//! review-polarity — CLI entrypoint.
//!
//! Usage:
//!   review-polarity train [--positive DIR] [--negative DIR] [--index-dir DIR]
//!   review-polarity score "This is awful movie!" [--trace] [--json]
//!   review-polarity interactive [--train]
//!   review-polarity export [--out vocabulary.csv]
//!   review-polarity serve [--addr 127.0.0.1:8000]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use review_polarity::api::{self, AppState};
use review_polarity::config::AppConfig;
use review_polarity::export;
use review_polarity::train;
use review_polarity::{IndexPair, ScoreReport, SentimentError};

#[derive(Parser)]
#[command(name = "review-polarity")]
#[command(about = "Score text polarity against word counts from labeled review corpora", long_about = None)]
struct Cli {
    /// Config file (TOML); defaults to $POLARITY_CONFIG_PATH or config/polarity.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build both indices from the corpus directories and persist them
    Train {
        #[arg(long)]
        positive: Option<PathBuf>,
        #[arg(long)]
        negative: Option<PathBuf>,
        #[arg(long)]
        index_dir: Option<PathBuf>,
        /// Document file extension ("" for every file)
        #[arg(long)]
        extension: Option<String>,
    },
    /// Score one text against the persisted indices
    Score {
        text: String,
        /// Print each word's contribution
        #[arg(long)]
        trace: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read comments from stdin, one per line, and score each
    Interactive {
        /// Retrain from the corpus directories before prompting
        #[arg(long)]
        train: bool,
    },
    /// Write the combined vocabulary as CSV
    Export {
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    review_polarity::logging::init(cli.log_json);

    let cfg = match &cli.config {
        Some(p) => AppConfig::load_from(p)?,
        None => AppConfig::load_default()?,
    };

    match cli.command {
        Commands::Train {
            positive,
            negative,
            index_dir,
            extension,
        } => {
            let mut cfg = cfg;
            if let Some(p) = positive {
                cfg.corpus.positive_dir = p;
            }
            if let Some(n) = negative {
                cfg.corpus.negative_dir = n;
            }
            if let Some(d) = index_dir {
                cfg.index.dir = d;
            }
            if let Some(e) = extension {
                cfg.corpus.extension = e;
            }
            run_train(&cfg).await
        }
        Commands::Score { text, trace, json } => run_score(&cfg, &text, trace, json),
        Commands::Interactive { train } => run_interactive(&cfg, train).await,
        Commands::Export { out } => run_export(&cfg, out),
        Commands::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            let state = AppState::from_config(&cfg)?;
            api::serve(&addr, state).await
        }
    }
}

async fn run_train(cfg: &AppConfig) -> Result<()> {
    let outcome = train::train_and_persist(cfg).await?;
    println!(
        "trained: positive {} docs / {} words, negative {} docs / {} words -> {}",
        outcome.positive.documents,
        outcome.positive.index.len(),
        outcome.negative.documents,
        outcome.negative.index.len(),
        cfg.index.dir.display()
    );
    Ok(())
}

fn load_indices(cfg: &AppConfig) -> Result<IndexPair> {
    cfg.store()
        .load_pair()
        .with_context(|| format!("loading indices from {}", cfg.index.dir.display()))
}

fn run_score(cfg: &AppConfig, text: &str, trace: bool, json: bool) -> Result<()> {
    let pair = load_indices(cfg)?;
    let report = pair.score_with_trace(text)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, trace);
    }
    Ok(())
}

async fn run_interactive(cfg: &AppConfig, retrain: bool) -> Result<()> {
    let pair = if retrain {
        train::train_and_persist(cfg).await?.into_pair()
    } else {
        load_indices(cfg)?
    };
    info!(
        positive = pair.positive.len(),
        negative = pair.negative.len(),
        "indices ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        write!(stdout, "Enter comment: ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match pair.score_with_trace(&line) {
            Ok(report) => print_report(&report, true),
            Err(SentimentError::InvalidInput) => eprintln!("{}", SentimentError::InvalidInput),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn run_export(cfg: &AppConfig, out: Option<PathBuf>) -> Result<()> {
    let pair = load_indices(cfg)?;
    let rows = match &out {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            export::write_csv(&pair, io::BufWriter::new(file))?
        }
        None => export::write_csv(&pair, io::stdout().lock())?,
    };
    info!(rows, out = ?out, "vocabulary exported");
    Ok(())
}

fn print_report(report: &ScoreReport, trace: bool) {
    if trace {
        for c in &report.trace {
            println!(
                "{:<20} {:>+.4}  (pos {}, neg {})",
                c.word, c.contribution, c.positive, c.negative
            );
        }
        println!("==");
    }
    println!(
        "This text is {}, sentiment = {:.4}",
        report.polarity, report.score
    );
}
