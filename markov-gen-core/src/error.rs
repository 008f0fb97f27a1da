//! Error types for chain ingestion and configuration.

use thiserror::Error;

/// Main error type for chain operations.
///
/// Generation never fails: dead ends and empty models are encoded in
/// the returned sentence instead.
#[derive(Debug, Error)]
pub enum ChainError {
	#[error("Could not open {source_name}: {source}")]
	SourceUnavailable {
		source_name: String,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),
}

impl ChainError {
	/// Wraps an I/O failure on a named text source.
	pub fn source_unavailable(source_name: impl Into<String>, source: std::io::Error) -> Self {
		ChainError::SourceUnavailable { source_name: source_name.into(), source }
	}
}

/// Result type for chain operations.
pub type Result<T> = std::result::Result<T, ChainError>;
