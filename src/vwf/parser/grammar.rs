//! The stanza grammar, implemented with chumsky over the lexer's tokens.
//!
//! Productions:
//!
//! ```text
//! block           := identifier [ "(" value ")" ] "{" stanza* "}"
//! assignment      := identifier "=" (array | value) ";"
//! level_statement := "LEVEL" (integer | "X") "FOR" decimal ";"
//! document        := stanza* ";"
//! ```

use chumsky::error::SimpleReason;
use chumsky::prelude::*;
use std::ops::Range;

use crate::vwf::error::ParseError;
use crate::vwf::lexer::Token;
use crate::vwf::stanza::{Assignment, Block, LevelStatement, RawLevel, Stanza, Value};

/// Type alias for token with span
type TokenSpan = (Token, Range<usize>);

/// Type alias for parser error
type ParserError = Simple<TokenSpan>;

/// Match a specific token, ignoring the span.
fn token(t: Token) -> impl Parser<TokenSpan, (), Error = ParserError> + Clone {
    filter(move |(tok, _): &TokenSpan| *tok == t).ignored()
}

fn ident() -> impl Parser<TokenSpan, String, Error = ParserError> + Clone {
    filter_map(|span, (tok, range): TokenSpan| match tok {
        Token::Ident(name) => Ok(name),
        other => Err(Simple::expected_input_found(
            span,
            Vec::new(),
            Some((other, range)),
        )),
    })
}

fn decimal() -> impl Parser<TokenSpan, f64, Error = ParserError> + Clone {
    filter_map(|span: Range<usize>, (tok, range): TokenSpan| match tok {
        Token::Decimal(text) => text
            .parse::<f64>()
            .map_err(|e| Simple::custom(span.clone(), format!("invalid decimal literal: {}", e))),
        other => Err(Simple::expected_input_found(
            span,
            Vec::new(),
            Some((other, range)),
        )),
    })
}

/// One scalar value: string, decimal, integer or identifier.
fn value() -> impl Parser<TokenSpan, Value, Error = ParserError> + Clone {
    filter_map(|span: Range<usize>, (tok, range): TokenSpan| match tok {
        Token::Str(s) => Ok(Value::Str(s)),
        Token::Decimal(text) => text
            .parse::<f64>()
            .map(Value::Decimal)
            .map_err(|e| Simple::custom(span.clone(), format!("invalid decimal literal: {}", e))),
        Token::Integer(text) => text
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| Simple::custom(span.clone(), format!("integer out of range: {}", e))),
        Token::Ident(name) => Ok(Value::Ident(name)),
        other => Err(Simple::expected_input_found(
            span,
            Vec::new(),
            Some((other, range)),
        )),
    })
}

fn level_value() -> impl Parser<TokenSpan, RawLevel, Error = ParserError> + Clone {
    filter_map(|span: Range<usize>, (tok, range): TokenSpan| match tok {
        Token::Integer(text) => text
            .parse::<i64>()
            .map(RawLevel::Int)
            .map_err(|e| Simple::custom(span.clone(), format!("integer out of range: {}", e))),
        Token::Ident(name) if name == "X" => Ok(RawLevel::X),
        other => Err(Simple::expected_input_found(
            span,
            Vec::new(),
            Some((other, range)),
        )),
    })
}

/// A single stanza: a block, an assignment or a level statement.
pub fn stanza() -> impl Parser<TokenSpan, Stanza, Error = ParserError> {
    recursive(|stanza| {
        let index = token(Token::OpenParen)
            .ignore_then(value())
            .then_ignore(token(Token::CloseParen));

        let block = ident()
            .then(index.or_not())
            .then(
                stanza
                    .repeated()
                    .delimited_by(token(Token::OpenBrace), token(Token::CloseBrace)),
            )
            .map(|((name, index), contents)| {
                Stanza::Block(Block {
                    name,
                    index,
                    contents,
                })
            });

        // An array is two or more comma-separated values; one value stays scalar.
        let array_or_value = value()
            .separated_by(token(Token::Comma))
            .at_least(1)
            .map(|mut items: Vec<Value>| {
                if items.len() == 1 {
                    items.remove(0)
                } else {
                    Value::Tuple(items)
                }
            });

        let assignment = ident()
            .then_ignore(token(Token::Equals))
            .then(array_or_value)
            .then_ignore(token(Token::Semicolon))
            .map(|(key, value)| Stanza::Assignment(Assignment { key, value }));

        let level_statement = token(Token::Level)
            .ignore_then(level_value())
            .then_ignore(token(Token::For))
            .then(decimal())
            .then_ignore(token(Token::Semicolon))
            .map(|(level, duration)| Stanza::Level(LevelStatement { level, duration }));

        level_statement.or(block).or(assignment)
    })
}

/// A whole document: any number of stanzas closed by a single terminator.
pub fn document() -> impl Parser<TokenSpan, Vec<Stanza>, Error = ParserError> {
    stanza()
        .repeated()
        .then_ignore(token(Token::Semicolon))
        .then_ignore(end())
}

/// Collapse chumsky errors into one [`ParseError::Syntax`].
///
/// `base` is the byte offset of the tokenized text inside the original
/// input (the length of the stripped comment prefix).
pub(crate) fn syntax_error(base: usize, errors: Vec<ParserError>) -> ParseError {
    let mut parts = Vec::new();
    for error in &errors {
        match error.reason() {
            SimpleReason::Custom(message) => parts.push(message.clone()),
            _ => match error.found() {
                Some((token, range)) => {
                    parts.push(format!("unexpected {} at byte {}", token, base + range.start))
                }
                None => parts.push("unexpected end of input".to_owned()),
            },
        }
    }
    ParseError::Syntax {
        message: parts.join("; "),
    }
}
