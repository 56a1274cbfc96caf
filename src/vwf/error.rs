//! Error types for VWF parsing and rendering.
//!
//! Two classes of failure exist. [`ParseError`] covers malformed input:
//! grammar violations, schema mismatches, cross-reference failures and the
//! unaccepted-header case. [`InvariantViolation`] covers conditions that
//! valid grammar output should make unreachable; it surfaces from rendering
//! as [`RenderError::Invariant`]. Both classes are fatal for the whole
//! document; there is no partial success.

use std::fmt;

use crate::vwf::stanza::ValueKind;

/// A malformed VWF document. Always aborts the entire parse.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The input contains bytes outside the ASCII range.
    NonAscii,
    /// A leading `/* ... */` comment is never closed.
    UnterminatedComment,
    /// A character no token can start with.
    InvalidToken { offset: usize },
    /// The token sequence does not match the stanza grammar.
    Syntax { message: String },
    /// The document does not start with an unindexed `HEADER` block.
    MissingHeader { message: String },
    /// The header parsed but violates the fixed-configuration invariant.
    UnacceptedHeader { message: String },
    DuplicateKey { block: String, key: String },
    UnknownKey { block: String, key: String },
    KeyType {
        block: String,
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },
    MissingKeys { block: String, keys: Vec<String> },
    /// A key is present with the right shape but an out-of-domain value.
    FieldValue {
        block: String,
        key: String,
        message: String,
    },
    /// A block still has children after all recognized ones were extracted.
    LeftoverContents { block: String },
    /// A block index is missing, present where forbidden, non-string, or duplicated.
    BlockIndex { block: String, message: String },
    /// A signal's cross-field invariants do not hold.
    SignalInvariant { name: String, message: String },
    /// A signal has no matching transition list.
    UnmatchedSignal { name: String },
    /// A transition list names a signal that does not exist.
    UnmatchedTransitionList { name: String },
    /// The display-line entries do not form a consistent forest.
    DisplayTree { message: String },
    /// Display-line entries never reached from any root.
    OrphanDisplayLines { indexes: Vec<i64> },
    /// Top-level stanzas remained after every extraction pass.
    UnexpectedStanzas { count: usize },
}

impl std::error::Error for ParseError {}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NonAscii => write!(f, "malformed VWF file: non-ASCII content"),
            ParseError::UnterminatedComment => {
                write!(f, "malformed VWF file: unterminated comment")
            }
            ParseError::InvalidToken { offset } => {
                write!(f, "malformed VWF file: invalid token at byte {}", offset)
            }
            ParseError::Syntax { message } => write!(f, "malformed VWF file: {}", message),
            ParseError::MissingHeader { message } => {
                write!(f, "malformed VWF file: {}", message)
            }
            ParseError::UnacceptedHeader { message } => {
                write!(f, "unaccepted header: {}", message)
            }
            ParseError::DuplicateKey { block, key } => {
                write!(f, "duplicate key {} in {} block", key, block)
            }
            ParseError::UnknownKey { block, key } => {
                write!(f, "unknown key {} in {} block", key, block)
            }
            ParseError::KeyType {
                block,
                key,
                expected,
                found,
            } => write!(
                f,
                "key {} in {} block has {} value, expected {}",
                key, block, found, expected
            ),
            ParseError::MissingKeys { block, keys } => {
                write!(f, "{} block is missing mandatory keys: {}", block, keys.join(", "))
            }
            ParseError::FieldValue {
                block,
                key,
                message,
            } => write!(f, "key {} in {} block: {}", key, block, message),
            ParseError::LeftoverContents { block } => {
                write!(f, "unparsed contents left in {} block", block)
            }
            ParseError::BlockIndex { block, message } => {
                write!(f, "{} block index: {}", block, message)
            }
            ParseError::SignalInvariant { name, message } => {
                write!(f, "signal \"{}\": {}", name, message)
            }
            ParseError::UnmatchedSignal { name } => {
                write!(f, "signal \"{}\" has no transition list", name)
            }
            ParseError::UnmatchedTransitionList { name } => {
                write!(f, "transition list for unknown signal \"{}\"", name)
            }
            ParseError::DisplayTree { message } => {
                write!(f, "display line tree: {}", message)
            }
            ParseError::OrphanDisplayLines { indexes } => {
                let list: Vec<String> = indexes.iter().map(|i| i.to_string()).collect();
                write!(f, "orphan display lines with TREE_INDEX {}", list.join(", "))
            }
            ParseError::UnexpectedStanzas { count } => {
                write!(f, "unexpected unparsed blocks in VWF: {} stanzas left", count)
            }
        }
    }
}

/// A condition that valid grammar output should make unreachable.
///
/// These are programmer-facing defects, distinct from malformed input: for
/// example a transition-list stanza that is neither a level statement nor a
/// well-formed repeat group, or a clock level list leaving the {0, 1} domain.
#[derive(Debug, Clone, PartialEq)]
pub struct InvariantViolation {
    pub message: String,
}

impl InvariantViolation {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        InvariantViolation {
            message: message.into(),
        }
    }
}

impl std::error::Error for InvariantViolation {}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

/// A failure while rendering a parsed document.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A display line's channel names no declared signal.
    UnknownChannel { channel: String },
    Invariant(InvariantViolation),
}

impl From<InvariantViolation> for RenderError {
    fn from(violation: InvariantViolation) -> Self {
        RenderError::Invariant(violation)
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::UnknownChannel { .. } => None,
            RenderError::Invariant(violation) => Some(violation),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnknownChannel { channel } => {
                write!(f, "display line references unknown channel \"{}\"", channel)
            }
            RenderError::Invariant(violation) => write!(f, "{}", violation),
        }
    }
}
