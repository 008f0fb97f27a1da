//! Markov chain text generation library.
//!
//! This crate builds a first-order Markov chain over whitespace-delimited
//! words and walks it to produce pseudo-random sentences:
//! - Ingestion of tokens, lines, readers and files into one continuous chain
//! - Sentence-boundary detection on trailing `.`, `!`, `?` (and `$`)
//! - Weighted follower sampling with an optionally seeded randomness source
//! - A human-readable dump of the chain for diagnostics
//!
//! # Example
//! ```
//! use markov_gen_core::model::chain_model::ChainModel;
//!
//! let mut model = ChainModel::seeded(7);
//! model.ingest_line("Hello there.");
//! assert_eq!(model.generate_sentence(), "Hello there.");
//! assert_eq!(model.to_string(), "{__$=[Hello], Hello=[there.]}");
//! ```

/// Chain model, keys, follower lists and settings.
pub mod model;

/// Error type shared by the crate.
pub mod error;

/// I/O utilities (line reading, corpus folder helpers).
pub mod io;

pub use error::{ChainError, Result};
pub use model::chain_model::{ChainModel, ChainStats, SourceSummary};
pub use model::config::ChainConfig;
pub use model::token::{Token, ends_with_sentence_mark};
