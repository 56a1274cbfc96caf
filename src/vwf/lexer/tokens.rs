//! Token definitions for the VWF surface syntax.
//!
//! Tokens are defined with the logos derive macro. Value-alternative
//! priority (string, then decimal, then integer, then identifier) falls out
//! of longest-match tokenization: a decimal always carries a literal point,
//! and the `LEVEL`/`FOR` keywords only beat the identifier rule on an exact
//! match, so `LEVELS` stays an identifier.

use logos::Logos;
use std::fmt;

/// All tokens of the VWF grammar.
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("LEVEL")]
    Level,
    #[token("FOR")]
    For,

    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("=")]
    Equals,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,

    // Quoted strings may span lines; no escape sequences are processed.
    #[regex(r#""[^"]*""#, |lex| {
        let slice = lex.slice();
        slice[1..slice.len() - 1].to_owned()
    })]
    Str(String),

    #[regex(r"-?[0-9]+\.[0-9]*", |lex| lex.slice().to_owned(), priority = 3)]
    Decimal(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().to_owned())]
    Integer(String),

    #[regex(r"[A-Za-z]+(_[A-Za-z]+)*", |lex| lex.slice().to_owned())]
    Ident(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Level => write!(f, "\"LEVEL\""),
            Token::For => write!(f, "\"FOR\""),
            Token::OpenParen => write!(f, "\"(\""),
            Token::CloseParen => write!(f, "\")\""),
            Token::OpenBrace => write!(f, "\"{{\""),
            Token::CloseBrace => write!(f, "\"}}\""),
            Token::Equals => write!(f, "\"=\""),
            Token::Semicolon => write!(f, "\";\""),
            Token::Comma => write!(f, "\",\""),
            Token::Str(s) => write!(f, "string \"{}\"", s),
            Token::Decimal(text) => write!(f, "decimal {}", text),
            Token::Integer(text) => write!(f, "integer {}", text),
            Token::Ident(name) => write!(f, "identifier {}", name),
        }
    }
}
