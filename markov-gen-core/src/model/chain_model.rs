use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use log::{debug, trace};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::config::ChainConfig;
use super::followers::Followers;
use super::token::{START_LABEL, Token, ends_with_sentence_mark};
use crate::error::{ChainError, Result};
use crate::io::{read_file, read_lines};

/// First-order Markov chain over whitespace-delimited words.
///
/// The `ChainModel` records, for every word, the words seen right after it,
/// and keeps a separate bucket for the words that opened a sentence.
/// Sentences are generated by walking from that bucket until a word ending
/// with a sentence mark is reached.
///
/// # Responsibilities
/// - Fold tokens, lines and whole sources into the chain
/// - Carry the ingestion cursor across lines and sources
/// - Sample followers and generate sentences
///
/// # Invariants
/// - The start marker is always a key, even on an empty model
/// - Follower lists only grow; generation never touches them
/// - Every word key has at least one follower
pub struct ChainModel {
	/// Words that began a sentence (followers of `Token::Start`)
	starts: Followers,

	/// Mapping from a word to the words observed after it
	words: HashMap<String, Followers>,

	/// Last ingested token, the key for the next one
	cursor: Token,

	config: ChainConfig,

	rng: StdRng,
}

/// Counts reported after ingesting one source.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceSummary {
	/// Non-empty lines ingested
	pub lines: usize,
	/// Tokens ingested
	pub tokens: usize,
}

/// Size of the chain, for diagnostics.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainStats {
	/// Number of keys, start marker included
	pub keys: usize,
	/// Length of the start marker's follower list
	pub sentence_starts: usize,
	/// Total followers recorded under word keys
	pub transitions: usize,
}

impl ChainModel {
	/// Creates an empty model seeded from the OS, with no sentence length bound.
	pub fn new() -> Self {
		Self::with_config(ChainConfig::default())
	}

	/// Creates an empty model whose sentences are reproducible for a given corpus.
	pub fn seeded(seed: u64) -> Self {
		Self::with_config(ChainConfig::seeded(seed))
	}

	/// Creates an empty model from explicit settings.
	pub fn with_config(config: ChainConfig) -> Self {
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		Self {
			starts: Followers::new(),
			words: HashMap::new(),
			cursor: Token::Start,
			config,
			rng,
		}
	}

	pub fn config(&self) -> &ChainConfig {
		&self.config
	}

	/// Returns the last ingested token (`Token::Start` before any input).
	pub fn cursor(&self) -> &Token {
		&self.cursor
	}

	/// Adds one token to the chain.
	///
	/// If the cursor closes a sentence the token becomes a sentence start,
	/// otherwise it is appended after the cursor. The token then becomes the
	/// cursor. Empty tokens are ignored.
	pub fn ingest_token(&mut self, token: &str) {
		if token.is_empty() {
			return;
		}

		if self.cursor.ends_sentence() {
			self.starts.push(token);
		} else if let Token::Word(previous) = &self.cursor {
			self.words.entry(previous.clone()).or_default().push(token);
		}

		self.cursor = Token::word(token);
	}

	/// Splits a line on ASCII whitespace runs and ingests every token in order.
	///
	/// Other whitespace, such as a no-break space, stays inside the token.
	/// Returns the number of tokens ingested (0 for blank lines).
	/// The cursor is kept across lines: only sentence marks start a new sentence.
	pub fn ingest_line(&mut self, line: &str) -> usize {
		let mut count = 0;
		for token in line.split_ascii_whitespace() {
			self.ingest_token(token);
			count += 1;
		}
		count
	}

	/// Ingests a sequence of raw lines, skipping blank ones.
	///
	/// Can be called once per corpus: all sources share the same cursor and
	/// mapping, so they merge into one chain.
	pub fn ingest_lines<I, S>(&mut self, lines: I) -> SourceSummary
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut summary = SourceSummary::default();
		for line in lines {
			let tokens = self.ingest_line(line.as_ref());
			if tokens > 0 {
				summary.lines += 1;
				summary.tokens += tokens;
			}
		}
		summary
	}

	/// Reads `reader` to the end, then ingests its lines.
	///
	/// # Errors
	/// Returns `ChainError::SourceUnavailable` if the reader fails or is not
	/// UTF-8. Nothing from that source is ingested in this case.
	pub fn ingest_reader<R: Read>(&mut self, reader: R, source_name: &str) -> Result<SourceSummary> {
		let lines = read_lines(reader).map_err(|e| ChainError::source_unavailable(source_name, e))?;
		let summary = self.ingest_lines(&lines);
		debug!("Ingested {}: {} lines, {} tokens", source_name, summary.lines, summary.tokens);
		Ok(summary)
	}

	/// Reads a text file and ingests its lines.
	///
	/// # Errors
	/// Returns `ChainError::SourceUnavailable` if the file cannot be opened
	/// or read. The model is left as it was.
	pub fn ingest_file<P: AsRef<Path>>(&mut self, path: P) -> Result<SourceSummary> {
		let path = path.as_ref();
		let source_name = path.display().to_string();
		let lines = read_file(path).map_err(|e| ChainError::source_unavailable(&source_name, e))?;
		let summary = self.ingest_lines(&lines);
		debug!("Ingested {}: {} lines, {} tokens", source_name, summary.lines, summary.tokens);
		Ok(summary)
	}

	/// Returns the follower list stored under `key`.
	///
	/// The start marker always has a list, possibly empty. Unknown words
	/// return `None`.
	pub fn followers(&self, key: &Token) -> Option<&[String]> {
		match key {
			Token::Start => Some(self.starts.as_slice()),
			Token::Word(word) => self.words.get(word).map(Followers::as_slice),
		}
	}

	/// Picks a random follower of `key`, weighted by occurrence.
	///
	/// Returns `None` when `key` is unknown or has no followers. This is a
	/// dead end of the chain, not an error.
	pub fn sample_follower(&mut self, key: &Token) -> Option<&str> {
		let followers = match key {
			Token::Start => &self.starts,
			Token::Word(word) => self.words.get(word)?,
		};
		followers.sample(&mut self.rng)
	}

	/// Generates one sentence by walking the chain from the start marker.
	///
	/// # Behavior
	/// - Returns an empty string if no sentence start was ever ingested.
	/// - Stops after a word ending with a sentence mark.
	/// - Stops early at a word without followers.
	/// - Stops after `max_words` words when the config sets a bound.
	pub fn generate_sentence(&mut self) -> String {
		if self.starts.is_empty() {
			return String::new();
		}
		let Some(first) = self.starts.sample(&mut self.rng) else {
			return String::new();
		};
		let mut sentence = vec![first.to_owned()];

		loop {
			// Should not panic, `sentence` is never empty
			let current = &sentence[sentence.len() - 1];
			if ends_with_sentence_mark(current) {
				break;
			}
			if self.config.max_words().is_some_and(|max| sentence.len() >= max) {
				break;
			}
			let next = match self.words.get(current.as_str()) {
				Some(followers) => followers.sample(&mut self.rng),
				None => None,
			};
			match next {
				Some(word) => sentence.push(word.to_owned()),
				None => break,
			}
		}

		let sentence = sentence.join(" ");
		trace!("Generated: {}", sentence);
		sentence
	}

	/// Generates `count` sentences.
	pub fn generate_sentences(&mut self, count: usize) -> Vec<String> {
		(0..count).map(|_| self.generate_sentence()).collect()
	}

	/// Number of keys in the chain, start marker included.
	pub fn key_count(&self) -> usize {
		self.words.len() + 1
	}

	/// All keys: the start marker first, then words in lexicographic order.
	pub fn keys(&self) -> Vec<Token> {
		let mut words: Vec<&String> = self.words.keys().collect();
		words.sort();

		let mut keys = Vec::with_capacity(words.len() + 1);
		keys.push(Token::Start);
		keys.extend(words.into_iter().map(|word| Token::Word(word.clone())));
		keys
	}

	pub fn stats(&self) -> ChainStats {
		ChainStats {
			keys: self.key_count(),
			sentence_starts: self.starts.len(),
			transitions: self.words.values().map(Followers::len).sum(),
		}
	}
}

impl Default for ChainModel {
	fn default() -> Self {
		Self::new()
	}
}

/// Human-readable dump of the chain: `{__$=[Hello], Hello=[there.]}`.
impl fmt::Display for ChainModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{{{}=[{}]", START_LABEL, self.starts.as_slice().join(", "))?;

		let mut words: Vec<&String> = self.words.keys().collect();
		words.sort();
		for word in words {
			write!(f, ", {}=[{}]", word, self.words[word].as_slice().join(", "))?;
		}

		f.write_str("}")
	}
}

impl fmt::Debug for ChainModel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChainModel")
			.field("stats", &self.stats())
			.field("cursor", &self.cursor)
			.field("config", &self.config)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TEST_SENTENCE: &str = "Hello there.";

	fn hello_there() -> ChainModel {
		let mut model = ChainModel::seeded(17);
		model.ingest_line(TEST_SENTENCE);
		model
	}

	#[test]
	fn fresh_model_has_only_the_start_marker() {
		let model = ChainModel::new();
		assert_eq!(model.key_count(), 1);
		assert_eq!(model.keys(), [Token::Start]);
		assert_eq!(model.followers(&Token::Start), Some(&[][..]));
		assert_eq!(model.cursor(), &Token::Start);
		assert_eq!(model.to_string(), "{__$=[]}");
	}

	#[test]
	fn hello_there_builds_two_keys() {
		let model = hello_there();
		assert_eq!(model.key_count(), 2);
		assert_eq!(model.keys(), [Token::Start, Token::word("Hello")]);
		assert_eq!(model.followers(&Token::Start).unwrap(), ["Hello"]);
		assert_eq!(model.followers(&Token::word("Hello")).unwrap(), ["there."]);
		assert_eq!(model.followers(&Token::word("there.")), None);
		assert_eq!(model.to_string(), "{__$=[Hello], Hello=[there.]}");
	}

	#[test]
	fn hello_there_generates_itself() {
		let mut model = hello_there();
		for _ in 0..10 {
			assert_eq!(model.generate_sentence(), TEST_SENTENCE);
		}
	}

	#[test]
	fn sample_follower_without_branching() {
		let mut model = hello_there();
		for _ in 0..10 {
			assert_eq!(model.sample_follower(&Token::Start), Some("Hello"));
			assert_eq!(model.sample_follower(&Token::word("Hello")), Some("there."));
		}
	}

	#[test]
	fn sample_follower_dead_ends() {
		let mut model = hello_there();
		assert_eq!(model.sample_follower(&Token::word("there.")), None);
		assert_eq!(model.sample_follower(&Token::word("unknown")), None);
		assert_eq!(ChainModel::new().sample_follower(&Token::Start), None);
	}

	#[test]
	fn ingest_token_resets_after_sentence_mark() {
		let mut model = ChainModel::new();
		model.ingest_token("Hello");
		assert_eq!(model.followers(&Token::Start).unwrap()[0], "Hello");
		model.ingest_token("there.");
		assert_eq!(model.followers(&Token::word("Hello")).unwrap()[0], "there.");
		model.ingest_token("A");
		assert!(model.followers(&Token::Start).unwrap().contains(&"A".to_owned()));
		assert_eq!(model.followers(&Token::word("there.")), None);
		assert_eq!(model.cursor(), &Token::word("A"));
	}

	#[test]
	fn followers_keep_ingestion_order() {
		let mut model = ChainModel::new();
		for token in ["the", "cat", "the", "dog", "the", "cat", "sat."] {
			model.ingest_token(token);
		}
		assert_eq!(model.followers(&Token::word("the")).unwrap(), ["cat", "dog", "cat"]);
		assert_eq!(model.followers(&Token::word("cat")).unwrap(), ["the", "sat."]);
	}

	#[test]
	fn empty_token_is_ignored() {
		let mut model = ChainModel::new();
		model.ingest_token("");
		assert_eq!(model.key_count(), 1);
		assert_eq!(model.cursor(), &Token::Start);
	}

	#[test]
	fn blank_line_changes_nothing() {
		let mut model = ChainModel::new();
		assert_eq!(model.ingest_line(" \t\n  \t "), 0);
		assert_eq!(model.ingest_line(""), 0);
		assert_eq!(model.to_string(), "{__$=[]}");
		assert_eq!(model.generate_sentence(), "");
	}

	#[test]
	fn messy_whitespace_is_split() {
		let mut model = ChainModel::seeded(5);
		assert_eq!(model.ingest_line("  \t\n Hello   \n \t  there. \n\t\n "), 2);
		assert_eq!(model.generate_sentence(), TEST_SENTENCE);
	}

	#[test]
	fn no_break_space_stays_inside_a_token() {
		let mut model = ChainModel::seeded(6);
		assert_eq!(model.ingest_line("Hello\u{a0}there."), 1);
		assert_eq!(model.to_string(), "{__$=[Hello\u{a0}there.]}");
		assert_eq!(model.generate_sentence(), "Hello\u{a0}there.");
	}

	#[test]
	fn ascii_whitespace_kinds_all_split() {
		let mut model = ChainModel::new();
		assert_eq!(model.ingest_line("a\tb\rc\x0Cd."), 4);
		assert_eq!(model.followers(&Token::word("c")).unwrap(), ["d."]);
	}

	#[test]
	fn lines_do_not_reset_the_cursor() {
		let mut model = ChainModel::new();
		let summary = model.ingest_lines(["Now is", "", "the winter.", "   "]);
		assert_eq!(summary, SourceSummary { lines: 2, tokens: 4 });
		assert_eq!(model.followers(&Token::word("is")).unwrap(), ["the"]);
		assert_eq!(model.followers(&Token::Start).unwrap(), ["Now"]);
	}

	#[test]
	fn long_line_round_trips() {
		let long_line = "Now is the winter of our discontent; made glorious summer by these sons Of York.";
		let mut model = ChainModel::seeded(9);
		model.ingest_line(long_line);
		assert_eq!(model.generate_sentence(), long_line);
	}

	#[test]
	fn internal_mark_splits_sentences() {
		let mut model = ChainModel::seeded(11);
		model.ingest_line("Stop. Go on");
		assert_eq!(model.followers(&Token::Start).unwrap(), ["Stop.", "Go"]);
		assert_eq!(model.followers(&Token::word("Go")).unwrap(), ["on"]);

		// Both starts are reachable, "Go on" ends at a dead end
		let mut seen: Vec<String> = model.generate_sentences(64);
		seen.sort();
		seen.dedup();
		assert_eq!(seen, ["Go on", "Stop."]);
	}

	#[test]
	fn trailing_words_without_mark_stop_at_dead_end() {
		let mut model = ChainModel::seeded(2);
		model.ingest_line("no mark here");
		assert_eq!(model.generate_sentence(), "no mark here");
	}

	#[test]
	fn max_words_bounds_cycles() {
		let mut config = ChainConfig::seeded(4);
		config.set_max_words(Some(5)).unwrap();
		let mut model = ChainModel::with_config(config);
		model.ingest_line("a b a b");

		let sentence = model.generate_sentence();
		assert_eq!(sentence, "a b a b a");
	}

	#[test]
	fn dollar_sign_closes_a_sentence() {
		let mut model = ChainModel::new();
		model.ingest_line("costs 5$ today");
		assert_eq!(model.followers(&Token::Start).unwrap(), ["costs", "today"]);
	}

	#[test]
	fn forged_start_label_is_a_plain_word() {
		let mut model = ChainModel::new();
		model.ingest_line("__$ then more");
		// "__$" ends with the sentinel, so "then" starts a sentence
		assert_eq!(model.followers(&Token::Start).unwrap(), ["__$", "then"]);
		assert_eq!(model.followers(&Token::word("__$")), None);
	}

	#[test]
	fn same_seed_same_sentences() {
		let corpus = ["The cat sat. The dog ran. A cat ran off.", "The dog sat down. A dog sat."];
		let mut first = ChainModel::seeded(99);
		let mut second = ChainModel::seeded(99);
		first.ingest_lines(corpus);
		second.ingest_lines(corpus);

		assert_eq!(first.generate_sentences(20), second.generate_sentences(20));
	}

	#[test]
	fn stats_count_keys_and_transitions() {
		let mut model = ChainModel::new();
		model.ingest_lines(["The cat sat. The dog sat."]);
		assert_eq!(
			model.stats(),
			ChainStats { keys: 4, sentence_starts: 2, transitions: 4 }
		);
	}
}
