//! Display-line extraction and forest reconstruction.
//!
//! `DISPLAY_LINE` blocks arrive as a flat list carrying their own tree
//! coordinates (`TREE_INDEX`, `TREE_LEVEL`, `PARENT`, `CHILDREN`).
//! Reconstruction reads them from an arena keyed by `TREE_INDEX` and tracks
//! a visited set; entries the traversal never reaches are orphans and
//! reject the whole document.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::vwf::error::ParseError;
use crate::vwf::parser::extract::{
    expect_ident, expect_int, expect_str, partition_attributes, partition_blocks,
    validate_attributes,
};
use crate::vwf::stanza::{Stanza, Value, ValueKind};

/// The value-interpretation mode for a bus's rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Radix {
    Unsigned,
    Signed,
    Hexadecimal,
    Binary,
    Ascii,
}

impl Radix {
    fn from_ident(name: &str) -> Option<Radix> {
        match name {
            "Unsigned" => Some(Radix::Unsigned),
            "Signed" => Some(Radix::Signed),
            "Hexadecimal" => Some(Radix::Hexadecimal),
            "Binary" => Some(Radix::Binary),
            "ASCII" => Some(Radix::Ascii),
            _ => None,
        }
    }
}

/// A renderable row bound to one signal channel.
///
/// `children` is `None` for a leaf (single-bit or whole-bus source) and
/// `Some` for a bus-expansion node whose children are the individual bit
/// lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayLine {
    pub channel: String,
    pub radix: Radix,
    pub expanded: bool,
    pub children: Option<Vec<DisplayLine>>,
}

const MANDATORY: &[(&str, ValueKind)] = &[
    ("CHANNEL", ValueKind::Str),
    ("EXPAND_STATUS", ValueKind::Ident),
    ("RADIX", ValueKind::Ident),
    ("TREE_INDEX", ValueKind::Int),
    ("TREE_LEVEL", ValueKind::Int),
];

const OPTIONAL: &[(&str, ValueKind)] = &[("PARENT", ValueKind::Int), ("CHILDREN", ValueKind::Tuple)];

struct Entry {
    channel: String,
    radix: Radix,
    expanded: bool,
    tree_level: i64,
    parent: Option<i64>,
    children: Option<Vec<i64>>,
}

fn parse_entry(contents: Vec<Stanza>) -> Result<(i64, Entry), ParseError> {
    let (attributes, residual) = partition_attributes("DISPLAY_LINE", contents)?;
    validate_attributes("DISPLAY_LINE", &attributes, MANDATORY, OPTIONAL)?;
    if !residual.is_empty() {
        return Err(ParseError::LeftoverContents {
            block: "DISPLAY_LINE".to_owned(),
        });
    }

    let field = |key: &str, message: String| ParseError::FieldValue {
        block: "DISPLAY_LINE".to_owned(),
        key: key.to_owned(),
        message,
    };

    let radix_name = expect_ident(&attributes, "DISPLAY_LINE", "RADIX")?;
    let radix = Radix::from_ident(radix_name)
        .ok_or_else(|| field("RADIX", format!("unknown radix {}", radix_name)))?;

    let expanded = match expect_ident(&attributes, "DISPLAY_LINE", "EXPAND_STATUS")? {
        "EXPANDED" => true,
        "COLLAPSED" => false,
        other => {
            return Err(field(
                "EXPAND_STATUS",
                format!("expected EXPANDED or COLLAPSED, found {}", other),
            ))
        }
    };

    let parent = match attributes.get("PARENT") {
        Some(Value::Int(parent)) => Some(*parent),
        _ => None,
    };
    let children = match attributes.get("CHILDREN") {
        Some(Value::Tuple(items)) => {
            let mut indexes = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Int(index) => indexes.push(*index),
                    other => {
                        return Err(field(
                            "CHILDREN",
                            format!("expected a tuple of integers, found {}", other),
                        ))
                    }
                }
            }
            Some(indexes)
        }
        _ => None,
    };

    let index = expect_int(&attributes, "DISPLAY_LINE", "TREE_INDEX")?;
    let entry = Entry {
        channel: expect_str(&attributes, "DISPLAY_LINE", "CHANNEL")?.to_owned(),
        radix,
        expanded,
        tree_level: expect_int(&attributes, "DISPLAY_LINE", "TREE_LEVEL")?,
        parent,
        children,
    };
    Ok((index, entry))
}

fn convert(
    index: i64,
    expected_parent: Option<i64>,
    depth: i64,
    entries: &BTreeMap<i64, Entry>,
    visited: &mut BTreeSet<i64>,
) -> Result<DisplayLine, ParseError> {
    let entry = entries.get(&index).ok_or_else(|| ParseError::DisplayTree {
        message: format!("CHILDREN references unknown TREE_INDEX {}", index),
    })?;
    if !visited.insert(index) {
        return Err(ParseError::DisplayTree {
            message: format!("TREE_INDEX {} is reached more than once", index),
        });
    }
    if entry.tree_level != depth {
        return Err(ParseError::DisplayTree {
            message: format!(
                "TREE_INDEX {} has TREE_LEVEL {}, expected {}",
                index, entry.tree_level, depth
            ),
        });
    }
    if entry.parent != expected_parent {
        return Err(ParseError::DisplayTree {
            message: format!(
                "TREE_INDEX {} declares parent {:?}, expected {:?}",
                index, entry.parent, expected_parent
            ),
        });
    }

    let children = match &entry.children {
        Some(indexes) => {
            let mut lines = Vec::with_capacity(indexes.len());
            for &child in indexes {
                lines.push(convert(child, Some(index), depth + 1, entries, visited)?);
            }
            Some(lines)
        }
        None => None,
    };

    Ok(DisplayLine {
        channel: entry.channel.clone(),
        radix: entry.radix,
        expanded: entry.expanded,
        children,
    })
}

/// Extract every `DISPLAY_LINE` block and reconstruct the forest.
pub(crate) fn extract_display_lines(
    stanzas: Vec<Stanza>,
) -> Result<(Vec<DisplayLine>, Vec<Stanza>), ParseError> {
    let (blocks, residual) = partition_blocks("DISPLAY_LINE", stanzas)?;

    let mut entries = BTreeMap::new();
    let mut roots = Vec::new();
    for contents in blocks {
        let (index, entry) = parse_entry(contents)?;
        if entries.contains_key(&index) {
            return Err(ParseError::DisplayTree {
                message: format!("duplicate TREE_INDEX {}", index),
            });
        }
        if entry.parent.is_none() {
            roots.push(index);
        }
        entries.insert(index, entry);
    }

    let mut visited = BTreeSet::new();
    let mut forest = Vec::with_capacity(roots.len());
    for root in roots {
        forest.push(convert(root, None, 0, &entries, &mut visited)?);
    }

    let orphans: Vec<i64> = entries
        .keys()
        .filter(|index| !visited.contains(index))
        .copied()
        .collect();
    if !orphans.is_empty() {
        return Err(ParseError::OrphanDisplayLines { indexes: orphans });
    }

    Ok((forest, residual))
}
