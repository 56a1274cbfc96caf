//! From text to a typed document.
//!
//! [`parse_stanzas`] runs the lexical pipeline (ASCII gate, comment strip,
//! tokenize, stanza grammar) and returns the generic stanza list.
//! [`parse_vwf`] continues from there, extracting and validating the header,
//! signals, display lines and time bars into a [`Document`].

pub mod display_line;
pub mod document;
pub(crate) mod extract;
pub mod grammar;
pub mod header;
pub mod signal;

pub use display_line::{DisplayLine, Radix};
pub use document::{parse_vwf, Document};
pub use header::Header;
pub use signal::{Direction, Signal};

use chumsky::Parser;

use crate::vwf::error::ParseError;
use crate::vwf::lexer;
use crate::vwf::stanza::Stanza;

/// Parse VWF text into the generic stanza list.
///
/// Input must be ASCII; a leading comment run is stripped before
/// tokenization. Any lexical or grammatical failure aborts the parse.
pub fn parse_stanzas(input: &str) -> Result<Vec<Stanza>, ParseError> {
    if !input.is_ascii() {
        return Err(ParseError::NonAscii);
    }
    let stripped = lexer::strip_leading_comments(input)?;
    let base = input.len() - stripped.len();
    let tokens = lexer::tokenize_with_spans(stripped).map_err(|error| match error {
        ParseError::InvalidToken { offset } => ParseError::InvalidToken {
            offset: base + offset,
        },
        other => other,
    })?;
    grammar::document()
        .parse(tokens)
        .map_err(|errors| grammar::syntax_error(base, errors))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_ascii_rejected_before_lexing() {
        assert_eq!(parse_stanzas("HÉADER { };"), Err(ParseError::NonAscii));
    }

    #[test]
    fn test_comment_prefix_skipped() {
        let stanzas = parse_stanzas("/* generated */\n// by hand\nA = 1;;").unwrap();
        assert_eq!(stanzas.len(), 1);
    }

    #[test]
    fn test_invalid_token_offset_includes_comment_prefix() {
        let result = parse_stanzas("/* c */ @");
        assert_eq!(result, Err(ParseError::InvalidToken { offset: 8 }));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let result = parse_stanzas("A = ;");
        assert!(matches!(result, Err(ParseError::Syntax { .. })));
    }
}
