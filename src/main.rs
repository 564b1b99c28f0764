//! bitsim CLI
//!
//! Benchmarks binary word embeddings against human similarity judgments and
//! answers exact nearest-neighbor queries.
//!
//! # Usage
//!
//! ```bash
//! # Spearman correlation on every dataset in ./datasets
//! bitsim evaluate vectors_256.txt
//!
//! # 10 nearest words to each query word
//! bitsim topk vectors_256.txt -k 10 queen paris
//!
//! # Header and coverage of an embedding file
//! bitsim stats vectors_256.txt
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bitsim::{EvalConfig, QueryOutcome, QuerySession, Radix};

#[derive(Parser)]
#[command(name = "bitsim")]
#[command(about = "Evaluate and query binary word embeddings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spearman correlation against every judgment dataset
    ///
    /// Embedding file header: `<bits>`.
    Evaluate {
        /// Embedding file
        embedding: PathBuf,

        /// Directory of `word1 word2 score` files [env: BITSIM_DATASETS_DIR, default: datasets/]
        #[arg(short, long)]
        datasets: Option<PathBuf>,

        /// Judgments read per dataset [env: BITSIM_MAX_LINES, default: 3500]
        #[arg(long)]
        max_lines: Option<usize>,

        /// Radix of the vector blocks (dec or hex)
        #[arg(long)]
        radix: Option<Radix>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Exact k nearest neighbors of each query word
    ///
    /// Embedding file header: `<word_count> <bits>`.
    Topk {
        /// Embedding file
        embedding: PathBuf,

        /// Number of neighbors
        #[arg(short = 'k', long, default_value = "10")]
        k: usize,

        /// Query words
        #[arg(required = true)]
        words: Vec<String>,

        /// Radix of the vector blocks (dec or hex)
        #[arg(long, default_value = "dec")]
        radix: Radix,
    },

    /// Display statistics about a `<word_count> <bits>` embedding file
    Stats {
        /// Embedding file
        embedding: PathBuf,

        /// Radix of the vector blocks (dec or hex)
        #[arg(long, default_value = "dec")]
        radix: Radix,
    },
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            embedding,
            datasets,
            max_lines,
            radix,
            json,
        } => {
            let config = EvalConfig::from_env().with_overrides(datasets, max_lines, radix);
            tracing::info!("Evaluating {:?} against {:?}", embedding, config.datasets_dir);

            let report = bitsim::evaluate_embedding(&embedding, &config)?;

            if json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.render_timings());
                print!("{}", report.render_table());
            }
        }

        Commands::Topk {
            embedding,
            k,
            words,
            radix,
        } => {
            let session = QuerySession::open(&embedding, radix)?;
            println!("load_vectors(): {:.6}s", session.load_time.as_secs_f64());

            for word in &words {
                let (outcome, elapsed) = session.query(word, k);
                match outcome {
                    QueryOutcome::Found(neighbors) => {
                        println!("{} ({} nearest):", word, neighbors.len());
                        for (neighbor, score) in neighbors {
                            println!("  {:<20} {:.4}", neighbor, score);
                        }
                    }
                    QueryOutcome::OutOfVocabulary => {
                        println!("{}: out of vocabulary", word);
                    }
                }
                println!("  Query time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);
            }
        }

        Commands::Stats { embedding, radix } => {
            let session = QuerySession::open(&embedding, radix)?;
            let store = &session.store;
            let stats = store.stats();

            println!("Embedding File: {:?}", embedding);
            println!("  Bits: {}", store.bits());
            println!("  Blocks per vector: {}", store.blocks_per_vector());
            println!("  Words: {}", session.vocab.len());
            println!("  Vectors: {}", store.present());
            println!("  Records: {}", stats.records);
            println!("  Malformed records: {}", stats.malformed);
            println!("  Duplicate records: {}", stats.duplicates);
            println!("  Load time: {:.3}s", session.load_time.as_secs_f64());
        }
    }

    Ok(())
}
