//! Level lists: flattening transition lists, bus synchronization and
//! viewport cropping.
//!
//! A level list is the transient `(duration, level)` form of a transition
//! list. Nothing owns one long-term; the renderer recomputes them per line.

use serde::Serialize;
use std::fmt;

use crate::vwf::error::InvariantViolation;
use crate::vwf::stanza::{RawLevel, Stanza, Value};

/// One signal level: low, high or unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Zero,
    One,
    X,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Zero => write!(f, "0"),
            Level::One => write!(f, "1"),
            Level::X => write!(f, "X"),
        }
    }
}

/// Flatten a transition-list stanza into one ordered `(duration, level)`
/// sequence.
///
/// The stanza must be a level statement or an unindexed `NODE` repeat group
/// whose first child is a `REPEAT` count; anything else is an invariant
/// violation, since the grammar and extractor should have precluded it. The
/// replicated sequence keeps repeat boundaries as-is: adjacent equal levels
/// are never merged.
pub fn flatten_transition(stanza: &Stanza) -> Result<Vec<(f64, Level)>, InvariantViolation> {
    match stanza {
        Stanza::Level(statement) => {
            let level = match statement.level {
                RawLevel::Int(0) => Level::Zero,
                RawLevel::Int(1) => Level::One,
                RawLevel::X => Level::X,
                RawLevel::Int(other) => {
                    return Err(InvariantViolation::new(format!(
                        "level statement outside {{0, 1, X}}: {}",
                        other
                    )))
                }
            };
            if statement.duration <= 0.0 {
                return Err(InvariantViolation::new(format!(
                    "level statement duration must be positive, found {}",
                    statement.duration
                )));
            }
            Ok(vec![(statement.duration, level)])
        }
        Stanza::Block(block) if block.name == "NODE" && block.index.is_none() => {
            let repeat = match block.contents.first() {
                Some(Stanza::Assignment(assignment)) if assignment.key == "REPEAT" => {
                    match assignment.value {
                        Value::Int(count) => count,
                        _ => {
                            return Err(InvariantViolation::new(format!(
                                "REPEAT value is not an integer: {}",
                                assignment.value
                            )))
                        }
                    }
                }
                _ => {
                    return Err(InvariantViolation::new(
                        "NODE block does not start with a REPEAT assignment",
                    ))
                }
            };
            let repeat = usize::try_from(repeat).map_err(|_| {
                InvariantViolation::new(format!("negative REPEAT count: {}", repeat))
            })?;

            let mut inner = Vec::new();
            for stanza in &block.contents[1..] {
                inner.extend(flatten_transition(stanza)?);
            }
            let mut result = Vec::with_capacity(inner.len() * repeat);
            for _ in 0..repeat {
                result.extend(inner.iter().cloned());
            }
            Ok(result)
        }
        other => Err(InvariantViolation::new(format!(
            "stanza is not a transition-list entry:\n{}",
            other
        ))),
    }
}

/// Synchronize N independent level lists into one duration-aligned
/// composite sequence.
///
/// Each step consumes the minimum remaining head duration across all lists
/// and emits `(step, levels)`; a head whose remainder reaches exactly zero
/// is dropped. The loop stops when any list is exhausted, so lists of
/// unequal total duration only yield the common prefix.
pub fn zip_level_lists(
    lists: &[Vec<(f64, Level)>],
) -> Result<Vec<(f64, Vec<Level>)>, InvariantViolation> {
    if lists.is_empty() {
        return Err(InvariantViolation::new("zip of zero level lists"));
    }

    struct Cursor<'a> {
        entries: &'a [(f64, Level)],
        index: usize,
        remaining: f64,
    }

    let mut cursors: Vec<Cursor> = lists
        .iter()
        .map(|entries| Cursor {
            entries,
            index: 0,
            remaining: entries.first().map_or(0.0, |entry| entry.0),
        })
        .collect();

    let mut result = Vec::new();
    while cursors.iter().all(|cursor| cursor.index < cursor.entries.len()) {
        let step = cursors
            .iter()
            .map(|cursor| cursor.remaining)
            .fold(f64::INFINITY, f64::min);
        let levels: Vec<Level> = cursors
            .iter()
            .map(|cursor| cursor.entries[cursor.index].1)
            .collect();
        result.push((step, levels));

        for cursor in &mut cursors {
            cursor.remaining -= step;
            if cursor.remaining == 0.0 {
                cursor.index += 1;
                if let Some(entry) = cursor.entries.get(cursor.index) {
                    cursor.remaining = entry.0;
                }
            }
        }
    }
    Ok(result)
}

/// Crop a level list to a `(start, end)` time window.
///
/// Entries entirely before `start` are dropped, the entry straddling it is
/// truncated to the overlap, and total retained duration is capped at
/// `end - start`. A list retaining zero duration comes back empty.
pub fn crop_level_list<T: Clone>(levels: &[(f64, T)], viewport: (f64, f64)) -> Vec<(f64, T)> {
    let mut start = viewport.0;
    let mut duration = viewport.1 - viewport.0;
    let mut result = Vec::new();
    for (time, level) in levels {
        let mut time = *time;
        if start > 0.0 {
            start -= time;
            if start >= 0.0 {
                continue;
            }
            time = -start;
        }
        if time > duration {
            time = duration;
        }
        if duration == 0.0 {
            break;
        }
        result.push((time, level.clone()));
        duration -= time;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vwf::stanza::{Assignment, Block, LevelStatement};

    fn level(level: RawLevel, duration: f64) -> Stanza {
        Stanza::Level(LevelStatement { level, duration })
    }

    fn node(repeat: i64, contents: Vec<Stanza>) -> Stanza {
        let mut body = vec![Stanza::Assignment(Assignment {
            key: "REPEAT".into(),
            value: Value::Int(repeat),
        })];
        body.extend(contents);
        Stanza::Block(Block {
            name: "NODE".into(),
            index: None,
            contents: body,
        })
    }

    #[test]
    fn test_single_statement() {
        let flat = flatten_transition(&level(RawLevel::Int(1), 25.0)).unwrap();
        assert_eq!(flat, vec![(25.0, Level::One)]);
    }

    #[test]
    fn test_repeat_zero_is_empty() {
        let stanza = node(0, vec![level(RawLevel::Int(1), 5.0)]);
        assert_eq!(flatten_transition(&stanza).unwrap(), vec![]);
    }

    #[test]
    fn test_repeat_never_merges_boundaries() {
        let stanza = node(
            2,
            vec![level(RawLevel::Int(1), 5.0), level(RawLevel::Int(1), 5.0)],
        );
        let flat = flatten_transition(&stanza).unwrap();
        assert_eq!(flat, vec![(5.0, Level::One); 4]);
    }

    #[test]
    fn test_nested_repeat_groups() {
        let inner = node(2, vec![level(RawLevel::Int(0), 1.0)]);
        let outer = node(3, vec![inner, level(RawLevel::X, 2.0)]);
        let flat = flatten_transition(&outer).unwrap();
        assert_eq!(flat.len(), 9);
        assert_eq!(flat[2], (2.0, Level::X));
    }

    #[test]
    fn test_out_of_domain_level_is_invariant_violation() {
        assert!(flatten_transition(&level(RawLevel::Int(2), 5.0)).is_err());
    }

    #[test]
    fn test_nonpositive_duration_is_invariant_violation() {
        assert!(flatten_transition(&level(RawLevel::Int(0), 0.0)).is_err());
        assert!(flatten_transition(&level(RawLevel::Int(0), -1.0)).is_err());
    }

    #[test]
    fn test_negative_repeat_is_invariant_violation() {
        let stanza = node(-1, vec![level(RawLevel::Int(0), 1.0)]);
        assert!(flatten_transition(&stanza).is_err());
    }

    #[test]
    fn test_malformed_node_is_invariant_violation() {
        let stanza = Stanza::Block(Block {
            name: "NODE".into(),
            index: None,
            contents: vec![level(RawLevel::Int(0), 1.0)],
        });
        assert!(flatten_transition(&stanza).is_err());
        let stanza = Stanza::Assignment(Assignment {
            key: "REPEAT".into(),
            value: Value::Int(1),
        });
        assert!(flatten_transition(&stanza).is_err());
    }

    #[test]
    fn test_zip_exhaustion() {
        let a = vec![(3.0, Level::Zero), (2.0, Level::One)];
        let b = vec![(1.0, Level::Zero), (4.0, Level::One)];
        let zipped = zip_level_lists(&[a, b]).unwrap();
        assert_eq!(
            zipped,
            vec![
                (1.0, vec![Level::Zero, Level::Zero]),
                (2.0, vec![Level::Zero, Level::One]),
                (2.0, vec![Level::One, Level::One]),
            ]
        );
    }

    #[test]
    fn test_zip_stops_at_shortest_list() {
        let a = vec![(10.0, Level::One)];
        let b = vec![(4.0, Level::Zero), (2.0, Level::One)];
        let zipped = zip_level_lists(&[a, b]).unwrap();
        let total: f64 = zipped.iter().map(|(time, _)| time).sum();
        assert_eq!(total, 6.0);
    }

    #[test]
    fn test_zip_single_list() {
        let a = vec![(5.0, Level::X)];
        let zipped = zip_level_lists(&[a]).unwrap();
        assert_eq!(zipped, vec![(5.0, vec![Level::X])]);
    }

    #[test]
    fn test_zip_empty_input_is_invariant_violation() {
        assert!(zip_level_lists(&[]).is_err());
    }

    #[test]
    fn test_crop_boundaries() {
        let levels = vec![(10.0, Level::Zero), (10.0, Level::One)];
        assert_eq!(
            crop_level_list(&levels, (5.0, 12.0)),
            vec![(5.0, Level::Zero), (2.0, Level::One)]
        );
    }

    #[test]
    fn test_crop_past_end_is_empty() {
        let levels = vec![(10.0, Level::Zero), (10.0, Level::One)];
        assert_eq!(crop_level_list(&levels, (25.0, 30.0)), vec![]);
    }

    #[test]
    fn test_crop_entire_list() {
        let levels = vec![(10.0, Level::Zero), (10.0, Level::One)];
        assert_eq!(crop_level_list(&levels, (0.0, 20.0)), levels);
    }

    #[test]
    fn test_crop_zero_width_window() {
        let levels = vec![(10.0, Level::Zero)];
        assert_eq!(crop_level_list(&levels, (5.0, 5.0)), vec![]);
    }
}
