use rand::Rng;
use rand::prelude::IndexedRandom;

/// Ordered list of the tokens observed right after one key.
///
/// Conceptually, these are the outgoing edges of a node in the chain.
/// Duplicates are kept: a follower recorded N times is N times as likely
/// to be sampled as one recorded once.
///
/// ## Invariants
/// - The list is append-only
/// - Insertion order is preserved
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Followers {
	words: Vec<String>,
}

impl Followers {
	/// Creates an empty follower list.
	pub fn new() -> Self {
		Self { words: Vec::new() }
	}

	/// Records one occurrence of `word` after the key.
	pub fn push(&mut self, word: &str) {
		self.words.push(word.to_owned());
	}

	/// Picks a follower uniformly by index.
	///
	/// Returns `None` if nothing was ever recorded.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.words.choose(rng).map(String::as_str)
	}

	/// All recorded followers, in insertion order.
	pub fn as_slice(&self) -> &[String] {
		&self.words
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}
}
