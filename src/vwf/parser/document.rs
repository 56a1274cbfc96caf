//! The typed VWF document and the all-or-nothing parse that builds it.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::vwf::error::ParseError;
use crate::vwf::parser::display_line::{extract_display_lines, DisplayLine};
use crate::vwf::parser::extract::{partition_blocks, partition_indexed_blocks};
use crate::vwf::parser::header::{split_header, Header};
use crate::vwf::parser::parse_stanzas;
use crate::vwf::parser::signal::{extract_signals, Signal};
use crate::vwf::stanza::Stanza;

/// A fully validated VWF document. Immutable once constructed.
///
/// `time_bars` holds the children of every `TIME_BAR` block unexamined;
/// their semantics are not interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub header: Header,
    pub signals: BTreeMap<String, Signal>,
    pub display_lines: Vec<DisplayLine>,
    pub time_bars: Vec<Vec<Stanza>>,
}

/// Parse a complete VWF document.
///
/// Construction is all-or-nothing: any validation failure at any stage
/// aborts the whole parse and no partial document is returned.
pub fn parse_vwf(input: &str) -> Result<Document, ParseError> {
    let stanzas = parse_stanzas(input)?;

    let (header, residual) = split_header(stanzas)?;
    let (signals, residual) = extract_signals(residual)?;
    let (display_lines, residual) = extract_display_lines(residual)?;
    let (time_bars, residual) = partition_blocks("TIME_BAR", residual)?;
    // GROUP blocks carry no rendering semantics; consume and discard them.
    let (_groups, residual) = partition_indexed_blocks("GROUP", residual)?;

    if !residual.is_empty() {
        return Err(ParseError::UnexpectedStanzas {
            count: residual.len(),
        });
    }

    Ok(Document {
        header,
        signals,
        display_lines,
        time_bars,
    })
}
