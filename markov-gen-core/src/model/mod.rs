//! Top-level module for the Markov chain text generator.
//!
//! This module provides:
//! - The chain itself and its ingestion/generation logic (`ChainModel`)
//! - The key type of the chain, with the sentence-start marker (`Token`)
//! - Per-key follower lists with weighted sampling (`Followers`)
//! - Model settings (`ChainConfig`)

/// First-order word chain.
///
/// Handles token, line and source ingestion, follower sampling,
/// sentence generation and the human-readable chain dump.
pub mod chain_model;

/// Chain keys and sentence-boundary detection.
pub mod token;

/// Follower list of a single key.
///
/// Append-only, sampled by index.
mod followers;

/// Settings applied when building a `ChainModel` (seed, sentence length bound).
pub mod config;
