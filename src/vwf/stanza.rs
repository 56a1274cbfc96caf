//! The generic stanza model produced by the VWF grammar.
//!
//! A VWF document is a sequence of stanzas: nested blocks, key/value
//! assignments, and level statements. The stanza tree is never mutated after
//! parsing; document extraction only partitions it into typed pieces.

use serde::Serialize;
use std::fmt;

/// An attribute value: a scalar or an ordered tuple of scalars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Str(String),
    Int(i64),
    Decimal(f64),
    Ident(String),
    Tuple(Vec<Value>),
}

/// The shape of a [`Value`], used by schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueKind {
    Str,
    Int,
    Decimal,
    Ident,
    Tuple,
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Str(_) => ValueKind::Str,
            Value::Int(_) => ValueKind::Int,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Ident(_) => ValueKind::Ident,
            Value::Tuple(_) => ValueKind::Tuple,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Ident(name) => write!(f, "{}", name),
            Value::Tuple(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Str => "string",
            ValueKind::Int => "integer",
            ValueKind::Decimal => "decimal",
            ValueKind::Ident => "identifier",
            ValueKind::Tuple => "tuple",
        };
        write!(f, "{}", name)
    }
}

/// The level operand of a `LEVEL ... FOR ...;` statement, as written.
///
/// The grammar admits any integer here; the level-list flattener owns the
/// {0, 1, X} domain check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RawLevel {
    Int(i64),
    X,
}

impl fmt::Display for RawLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLevel::Int(n) => write!(f, "{}", n),
            RawLevel::X => write!(f, "X"),
        }
    }
}

/// `LEVEL <level> FOR <duration>;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelStatement {
    pub level: RawLevel,
    pub duration: f64,
}

/// `<name> [ "(" <index> ")" ] "{" <contents> "}"`
///
/// An absent index is distinct from any present index value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub name: String,
    pub index: Option<Value>,
    pub contents: Vec<Stanza>,
}

/// `<key> = <value> ;`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub key: String,
    pub value: Value,
}

/// One grammar-level unit of a VWF document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Stanza {
    Block(Block),
    Assignment(Assignment),
    Level(LevelStatement),
}

impl Stanza {
    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            Stanza::Block(block) => {
                write!(f, "{}{}", pad, block.name)?;
                if let Some(index) = &block.index {
                    write!(f, "({})", index)?;
                }
                writeln!(f, " {{")?;
                for stanza in &block.contents {
                    stanza.fmt_indented(f, depth + 1)?;
                }
                writeln!(f, "{}}}", pad)
            }
            Stanza::Assignment(assignment) => {
                writeln!(f, "{}{} = {};", pad, assignment.key, assignment.value)
            }
            Stanza::Level(statement) => writeln!(
                f,
                "{}LEVEL {} FOR {};",
                pad, statement.level, statement.duration
            ),
        }
    }
}

impl fmt::Display for Stanza {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}
