//! Pure partition helpers over stanza lists.
//!
//! Every extraction pass returns an (extracted, residual) pair instead of
//! deleting from a shared list, so later passes always see exactly what the
//! earlier ones left behind.

use std::collections::BTreeMap;

use crate::vwf::error::ParseError;
use crate::vwf::stanza::{Stanza, Value, ValueKind};

pub(crate) type AttrMap = BTreeMap<String, Value>;

/// Split a block's direct children into an attribute map and the residual
/// stanzas. Duplicate keys are fatal.
pub(crate) fn partition_attributes(
    block_name: &str,
    contents: Vec<Stanza>,
) -> Result<(AttrMap, Vec<Stanza>), ParseError> {
    let mut attributes = AttrMap::new();
    let mut residual = Vec::new();
    for stanza in contents {
        match stanza {
            Stanza::Assignment(assignment) => {
                if attributes.contains_key(&assignment.key) {
                    return Err(ParseError::DuplicateKey {
                        block: block_name.to_owned(),
                        key: assignment.key,
                    });
                }
                attributes.insert(assignment.key, assignment.value);
            }
            other => residual.push(other),
        }
    }
    Ok((attributes, residual))
}

/// Check an attribute map against an exact schema: every key must be listed
/// as mandatory or optional with a matching value kind, and every mandatory
/// key must be present.
pub(crate) fn validate_attributes(
    block_name: &str,
    attributes: &AttrMap,
    mandatory: &[(&str, ValueKind)],
    optional: &[(&str, ValueKind)],
) -> Result<(), ParseError> {
    for (key, value) in attributes {
        let expected = mandatory
            .iter()
            .chain(optional)
            .find(|(name, _)| *name == key.as_str())
            .map(|(_, kind)| *kind);
        match expected {
            None => {
                return Err(ParseError::UnknownKey {
                    block: block_name.to_owned(),
                    key: key.clone(),
                })
            }
            Some(kind) if value.kind() != kind => {
                return Err(ParseError::KeyType {
                    block: block_name.to_owned(),
                    key: key.clone(),
                    expected: kind,
                    found: value.kind(),
                })
            }
            Some(_) => {}
        }
    }

    let missing: Vec<String> = mandatory
        .iter()
        .filter(|(name, _)| !attributes.contains_key(*name))
        .map(|(name, _)| (*name).to_owned())
        .collect();
    if !missing.is_empty() {
        return Err(ParseError::MissingKeys {
            block: block_name.to_owned(),
            keys: missing,
        });
    }
    Ok(())
}

fn expect<'a, T>(
    attributes: &'a AttrMap,
    block: &str,
    key: &str,
    kind: ValueKind,
    pick: impl Fn(&'a Value) -> Option<T>,
) -> Result<T, ParseError> {
    match attributes.get(key) {
        Some(value) => pick(value).ok_or_else(|| ParseError::KeyType {
            block: block.to_owned(),
            key: key.to_owned(),
            expected: kind,
            found: value.kind(),
        }),
        None => Err(ParseError::MissingKeys {
            block: block.to_owned(),
            keys: vec![key.to_owned()],
        }),
    }
}

pub(crate) fn expect_int(attributes: &AttrMap, block: &str, key: &str) -> Result<i64, ParseError> {
    expect(attributes, block, key, ValueKind::Int, |value| match value {
        Value::Int(n) => Some(*n),
        _ => None,
    })
}

pub(crate) fn expect_decimal(
    attributes: &AttrMap,
    block: &str,
    key: &str,
) -> Result<f64, ParseError> {
    expect(attributes, block, key, ValueKind::Decimal, |value| {
        match value {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    })
}

pub(crate) fn expect_ident<'a>(
    attributes: &'a AttrMap,
    block: &str,
    key: &str,
) -> Result<&'a str, ParseError> {
    expect(attributes, block, key, ValueKind::Ident, |value| {
        match value {
            Value::Ident(name) => Some(name.as_str()),
            _ => None,
        }
    })
}

pub(crate) fn expect_str<'a>(
    attributes: &'a AttrMap,
    block: &str,
    key: &str,
) -> Result<&'a str, ParseError> {
    expect(attributes, block, key, ValueKind::Str, |value| match value {
        Value::Str(s) => Some(s.as_str()),
        _ => None,
    })
}

/// Partition out every block with the given name, keyed by its index.
/// Matching blocks must carry a string index; duplicates are fatal.
pub(crate) fn partition_indexed_blocks(
    name: &str,
    stanzas: Vec<Stanza>,
) -> Result<(BTreeMap<String, Vec<Stanza>>, Vec<Stanza>), ParseError> {
    let mut blocks = BTreeMap::new();
    let mut residual = Vec::new();
    for stanza in stanzas {
        match stanza {
            Stanza::Block(block) if block.name == name => {
                let index = match block.index {
                    Some(Value::Str(index)) => index,
                    Some(other) => {
                        return Err(ParseError::BlockIndex {
                            block: name.to_owned(),
                            message: format!("expected string index, found {}", other),
                        })
                    }
                    None => {
                        return Err(ParseError::BlockIndex {
                            block: name.to_owned(),
                            message: "expected string index, found none".to_owned(),
                        })
                    }
                };
                if blocks.contains_key(&index) {
                    return Err(ParseError::BlockIndex {
                        block: name.to_owned(),
                        message: format!("duplicate index \"{}\"", index),
                    });
                }
                blocks.insert(index, block.contents);
            }
            other => residual.push(other),
        }
    }
    Ok((blocks, residual))
}

/// Partition out every block with the given name, in document order.
/// Matching blocks must not carry an index.
pub(crate) fn partition_blocks(
    name: &str,
    stanzas: Vec<Stanza>,
) -> Result<(Vec<Vec<Stanza>>, Vec<Stanza>), ParseError> {
    let mut blocks = Vec::new();
    let mut residual = Vec::new();
    for stanza in stanzas {
        match stanza {
            Stanza::Block(block) if block.name == name => {
                if let Some(index) = block.index {
                    return Err(ParseError::BlockIndex {
                        block: name.to_owned(),
                        message: format!("unexpected index {}", index),
                    });
                }
                blocks.push(block.contents);
            }
            other => residual.push(other),
        }
    }
    Ok((blocks, residual))
}
