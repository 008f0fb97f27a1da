use crate::error::{ChainError, Result};

/// Settings applied when a `ChainModel` is built.
///
/// # Responsibilities
/// - Choose between an OS-seeded and a reproducible randomness source (`seed`)
/// - Optionally bound the length of generated sentences (`max_words`)
///
/// # Invariants
/// - `max_words`, when set, is at least 1
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainConfig {
	/// Seed for the randomness source. `None` seeds from the OS.
	pub seed: Option<u64>,

	/// Upper bound on tokens per generated sentence. `None` walks until a
	/// sentence mark or a dead end.
	max_words: Option<usize>,
}

impl ChainConfig {
	/// Configuration with the given seed (`None` seeds from the OS) and no length bound.
	pub fn new(seed: Option<u64>) -> Self {
		Self { seed, max_words: None }
	}

	/// Configuration with a fixed seed and no length bound.
	pub fn seeded(seed: u64) -> Self {
		Self::new(Some(seed))
	}

	/// Returns the sentence length bound.
	pub fn max_words(&self) -> Option<usize> {
		self.max_words
	}

	/// Sets the sentence length bound. `None` removes it.
	///
	/// # Errors
	/// Returns `ChainError::InvalidConfig` for `Some(0)`.
	pub fn set_max_words(&mut self, max_words: Option<usize>) -> Result<()> {
		if max_words == Some(0) {
			return Err(ChainError::InvalidConfig("max_words must be at least 1".to_owned()));
		}
		self.max_words = max_words;
		Ok(())
	}
}
