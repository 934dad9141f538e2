//! Rank Book - Binary Entry Point
//!
//! Reads `+ price qty` / `- rank` / `= qty` commands from a file or stdin,
//! replays them against a book, then executes a final market buy and
//! prints its cost. Logs go to stderr; stdout carries only the cost.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;
use rank_book::config::{AppConfig, LogConfig, LogFormat};
use rank_book::{CommandProcessor, OrderBook};
use tracing::info;

#[derive(Parser)]
#[command(name = "rank-book", about = "Replay order commands against a rank book")]
struct Cli {
    #[arg(short, long, default_value = "rank-book.toml")]
    config_path: PathBuf,

    /// Override the treap priority seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Command file; reads stdin when omitted
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,
}

fn init_logging(cfg: &LogConfig) {
    match cfg.format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_max_level(cfg.level)
                .with_current_span(true)
                .with_writer(io::stderr)
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::fmt()
                .compact()
                .with_max_level(cfg.level)
                .with_writer(io::stderr)
                .init();
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config_path).expect("could not load config");
    if let Some(seed) = cli.seed {
        config.book.seed = seed;
    }

    init_logging(&config.logger);
    info!(?config, "starting replay");

    let book = OrderBook::with_capacity(config.book.side, config.book.seed, config.book.capacity);
    let mut processor = CommandProcessor::new(book, config.replay.max_commands);

    let replay = match &cli.input {
        Some(path) => {
            let file = File::open(path).expect("could not open command file");
            processor.run(BufReader::new(file))
        }
        None => processor.run(io::stdin().lock()),
    };
    replay.expect("could not read command stream");

    let report = processor.finish(config.replay.final_quantity);
    if let Ok(root) = processor.book().state_root_hex() {
        info!(state_root = %root, resting = processor.book().len(), "book state");
    }

    println!("{}", report.cost);
}
