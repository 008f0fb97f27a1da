//! markov-gen - build a word chain from text files and print random sentences.

use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use markov_gen_core::{ChainConfig, ChainModel};

#[derive(Parser)]
#[command(name = "markov-gen")]
#[command(about = "Generate random sentences from a Markov chain built over text files")]
struct Cli {
    /// Corpus files, ingested in order as one continuous stream
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of sentences to print
    #[arg(short = 'n', long, default_value_t = 5)]
    count: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum words per sentence (0 disables the bound)
    #[arg(long, default_value_t = 200)]
    max_words: usize,

    /// Print the chain before the sentences
    #[arg(long)]
    dump: bool,
}

impl Cli {
    fn chain_config(&self) -> anyhow::Result<ChainConfig> {
        let mut config = ChainConfig::new(self.seed);
        // 0 means unbounded
        config.set_max_words(Some(self.max_words).filter(|&max| max > 0))?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut model = ChainModel::with_config(cli.chain_config()?);

    // Unreadable files are skipped, the others still merge into the chain
    for file in &cli.files {
        match model.ingest_file(file) {
            Ok(summary) => info!(
                "Loaded {}: {} lines, {} tokens",
                file.display(),
                summary.lines,
                summary.tokens
            ),
            Err(e) => warn!("{e}"),
        }
    }

    if cli.dump {
        println!("{model}");
    }

    for sentence in model.generate_sentences(cli.count) {
        println!("{sentence}");
    }

    Ok(())
}
