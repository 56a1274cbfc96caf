//! Signal extraction: schema validation, cross-field invariants, and the
//! join between `SIGNAL` and `TRANSITION_LIST` blocks.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::vwf::error::ParseError;
use crate::vwf::parser::extract::{
    expect_ident, expect_int, expect_str, partition_attributes, partition_indexed_blocks,
    validate_attributes,
};
use crate::vwf::stanza::{Stanza, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Input,
    Output,
    Bidir,
}

/// A declared signal joined with its transition list.
///
/// Width and parent are mutually constrained: a signal of width > 1 is
/// bus-shaped and can have no parent; a width-1 signal may name the bus it
/// is a bit member of.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub direction: Direction,
    pub value_type: String,
    pub width: u32,
    pub parent: Option<String>,
    pub transition_list: Stanza,
}

const MANDATORY: &[(&str, ValueKind)] = &[
    ("VALUE_TYPE", ValueKind::Ident),
    ("SIGNAL_TYPE", ValueKind::Ident),
    ("WIDTH", ValueKind::Int),
    ("LSB_INDEX", ValueKind::Int),
    ("DIRECTION", ValueKind::Ident),
    ("PARENT", ValueKind::Str),
];

struct SignalShape {
    direction: Direction,
    value_type: String,
    width: u32,
    parent: Option<String>,
}

fn parse_signal(name: &str, contents: Vec<Stanza>) -> Result<SignalShape, ParseError> {
    let block_name = format!("SIGNAL(\"{}\")", name);
    let (attributes, residual) = partition_attributes(&block_name, contents)?;
    validate_attributes(&block_name, &attributes, MANDATORY, &[])?;
    if !residual.is_empty() {
        return Err(ParseError::LeftoverContents { block: block_name });
    }

    let invariant = |message: String| ParseError::SignalInvariant {
        name: name.to_owned(),
        message,
    };

    let value_type = expect_ident(&attributes, &block_name, "VALUE_TYPE")?;
    if value_type != "NINE_LEVEL_BIT" {
        return Err(invariant(format!("unsupported VALUE_TYPE {}", value_type)));
    }

    let signal_type = expect_ident(&attributes, &block_name, "SIGNAL_TYPE")?;
    let is_bus = match signal_type {
        "SINGLE_BIT" => false,
        "BUS" => true,
        other => return Err(invariant(format!("unsupported SIGNAL_TYPE {}", other))),
    };

    let width = expect_int(&attributes, &block_name, "WIDTH")?;
    if width < 1 {
        return Err(invariant(format!("WIDTH must be positive, found {}", width)));
    }
    let width = u32::try_from(width)
        .map_err(|_| invariant(format!("WIDTH out of range: {}", width)))?;
    if is_bus != (width != 1) {
        return Err(invariant(format!(
            "SIGNAL_TYPE {} does not match WIDTH {}",
            signal_type, width
        )));
    }

    let lsb_index = expect_int(&attributes, &block_name, "LSB_INDEX")?;
    let expected_lsb = if is_bus { 0 } else { -1 };
    if lsb_index != expected_lsb {
        return Err(invariant(format!(
            "LSB_INDEX must be {} for {}, found {}",
            expected_lsb, signal_type, lsb_index
        )));
    }

    let parent = expect_str(&attributes, &block_name, "PARENT")?;
    let parent = if parent.is_empty() {
        None
    } else {
        Some(parent.to_owned())
    };
    if width > 1 && parent.is_some() {
        return Err(invariant("a bus signal cannot have a parent".to_owned()));
    }

    let direction = match expect_ident(&attributes, &block_name, "DIRECTION")? {
        "INPUT" => Direction::Input,
        "OUTPUT" => Direction::Output,
        "BIDIR" => Direction::Bidir,
        other => return Err(invariant(format!("unsupported DIRECTION {}", other))),
    };

    Ok(SignalShape {
        direction,
        value_type: value_type.to_owned(),
        width,
        parent,
    })
}

/// Extract every `SIGNAL` and `TRANSITION_LIST` block and join them by name.
///
/// Every signal must have exactly one transition-list entry whose body is
/// exactly one stanza; an unmatched entry in either direction is fatal.
pub(crate) fn extract_signals(
    stanzas: Vec<Stanza>,
) -> Result<(BTreeMap<String, Signal>, Vec<Stanza>), ParseError> {
    let (signal_blocks, residual) = partition_indexed_blocks("SIGNAL", stanzas)?;
    let (mut transition_blocks, residual) = partition_indexed_blocks("TRANSITION_LIST", residual)?;

    for name in transition_blocks.keys() {
        if !signal_blocks.contains_key(name) {
            return Err(ParseError::UnmatchedTransitionList { name: name.clone() });
        }
    }

    let mut signals = BTreeMap::new();
    for (name, contents) in signal_blocks {
        let shape = parse_signal(&name, contents)?;
        let transition_contents = transition_blocks
            .remove(&name)
            .ok_or_else(|| ParseError::UnmatchedSignal { name: name.clone() })?;
        let mut stanzas = transition_contents.into_iter();
        let transition_list = match (stanzas.next(), stanzas.next()) {
            (Some(stanza), None) => stanza,
            _ => {
                return Err(ParseError::SignalInvariant {
                    name,
                    message: "TRANSITION_LIST must contain exactly one stanza".to_owned(),
                })
            }
        };
        signals.insert(
            name,
            Signal {
                direction: shape.direction,
                value_type: shape.value_type,
                width: shape.width,
                parent: shape.parent,
                transition_list,
            },
        );
    }

    Ok((signals, residual))
}
