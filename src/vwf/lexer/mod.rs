//! Lexing for VWF documents: comment stripping plus logos tokenization.
//!
//! Comments are a prefix-only construct in VWF, legal before the first
//! stanza and nowhere else, so they are stripped here before the tokenizer
//! ever runs.

pub mod tokens;

pub use tokens::Token;

use logos::Logos;
use std::ops::Range;

use crate::vwf::error::ParseError;

/// Strip leading whitespace and `/* ... */` or `// ...` comments, stopping
/// at the first other content. An unterminated block comment is fatal.
pub fn strip_leading_comments(input: &str) -> Result<&str, ParseError> {
    let mut rest = input;
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("/*") {
            match after.find("*/") {
                Some(end) => rest = &after[end + 2..],
                None => return Err(ParseError::UnterminatedComment),
            }
        } else if let Some(after) = rest.strip_prefix("//") {
            match after.find('\n') {
                Some(end) => rest = &after[end + 1..],
                None => rest = "",
            }
        } else {
            return Ok(rest);
        }
    }
}

/// Tokenize a string, keeping each token's byte range in the source.
pub fn tokenize_with_spans(source: &str) -> Result<Vec<(Token, Range<usize>)>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                return Err(ParseError::InvalidToken {
                    offset: lexer.span().start,
                })
            }
        }
    }

    Ok(tokens)
}

/// Convenience function to tokenize a string, dropping spans.
///
/// Invalid characters are dropped too; use [`tokenize_with_spans`] when the
/// input is untrusted.
pub fn tokenize(source: &str) -> Vec<Token> {
    Token::lexer(source)
        .filter_map(|result| result.ok())
        .collect()
}
