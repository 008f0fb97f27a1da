use std::fmt;

/// Character used when the start marker is rendered (`__$`).
///
/// It is also part of `SENTENCE_MARKS`, so a word ending with it closes a sentence.
pub const START_SENTINEL: char = '$';

/// Trailing characters that terminate a sentence.
pub const SENTENCE_MARKS: [char; 4] = ['.', '!', '?', START_SENTINEL];

/// Rendering of `Token::Start` in chain dumps.
pub const START_LABEL: &str = "__$";

/// Key of the chain mapping.
///
/// `Start` is the sentence-start marker. It is a separate variant so no
/// input text, whatever its bytes, can ever address the start bucket.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
	Start,
	Word(String),
}

impl Token {
	/// Builds a word token.
	pub fn word(text: &str) -> Self {
		Token::Word(text.to_owned())
	}

	/// Returns the word text, or `None` for the start marker.
	pub fn as_word(&self) -> Option<&str> {
		match self {
			Token::Start => None,
			Token::Word(text) => Some(text),
		}
	}

	/// Whether the token closes a sentence.
	///
	/// The start marker always does: whatever comes after it begins a sentence.
	pub fn ends_sentence(&self) -> bool {
		match self {
			Token::Start => true,
			Token::Word(text) => ends_with_sentence_mark(text),
		}
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Token::Start => f.write_str(START_LABEL),
			Token::Word(text) => f.write_str(text),
		}
	}
}

/// Returns `true` if the last character of `word` is a sentence mark.
///
/// An empty word never ends a sentence.
pub fn ends_with_sentence_mark(word: &str) -> bool {
	word.chars()
		.next_back()
		.is_some_and(|last| SENTENCE_MARKS.contains(&last))
}
