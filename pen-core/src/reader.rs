use std::io;
use std::path::Path;

use crate::model::corpus::{Token, token};

/// Splitting policy for the line-oriented token reader.
///
/// # Fields
/// - `line_break_token`: when set, this token is emitted at the end of
///   every line, so line structure survives tokenization. When unset,
///   line ends are plain whitespace.
/// - `keep_empty_tokens`: when set, runs of whitespace produce empty
///   tokens instead of being collapsed.
#[derive(Clone, Debug)]
pub struct ReaderConfig {
	pub line_break_token: Option<Token>,
	pub keep_empty_tokens: bool,
}

impl Default for ReaderConfig {
	fn default() -> Self {
		Self {
			line_break_token: None,
			keep_empty_tokens: false,
		}
	}
}

/// Splits text into tokens, line by line, under `config`.
pub fn tokens_from_str(text: &str, config: &ReaderConfig) -> Vec<Token> {
	let mut tokens = Vec::new();

	for line in text.lines() {
		if config.keep_empty_tokens {
			tokens.extend(line.split(char::is_whitespace).map(token));
		} else {
			tokens.extend(line.split_whitespace().map(token));
		}
		if let Some(break_token) = &config.line_break_token {
			tokens.push(break_token.clone());
		}
	}

	tokens
}

/// Reads a text file and tokenizes it under `config`.
pub fn tokens_from_file<P: AsRef<Path>>(
	filepath: P,
	config: &ReaderConfig,
) -> io::Result<Vec<Token>> {
	Ok(tokens_from_str(&crate::io::read_text(filepath)?, config))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_on_whitespace_by_default() {
		let tokens = tokens_from_str("the cat\n sat \n", &ReaderConfig::default());
		assert_eq!(tokens, vec![token("the"), token("cat"), token("sat")]);
	}

	#[test]
	fn keeps_line_breaks_when_asked() {
		let config = ReaderConfig {
			line_break_token: Some(token("<nl>")),
			keep_empty_tokens: false,
		};
		let tokens = tokens_from_str("the cat\nsat", &config);
		assert_eq!(
			tokens,
			vec![token("the"), token("cat"), token("<nl>"), token("sat"), token("<nl>")]
		);
	}

	#[test]
	fn keeps_empty_tokens_when_asked() {
		let config = ReaderConfig {
			line_break_token: None,
			keep_empty_tokens: true,
		};
		let tokens = tokens_from_str("a  b", &config);
		assert_eq!(tokens, vec![token("a"), token(""), token("b")]);
	}

	#[test]
	fn empty_input_yields_no_tokens() {
		assert!(tokens_from_str("", &ReaderConfig::default()).is_empty());
	}
}
