//! Clock-line special casing: no-slope rendering and the help-line
//! directive listing clock edge timestamps.

use std::collections::BTreeMap;

use crate::vwf::error::{InvariantViolation, RenderError};
use crate::vwf::level::{crop_level_list, flatten_transition, Level};
use crate::vwf::parser::display_line::DisplayLine;
use crate::vwf::parser::signal::Signal;
use crate::vwf::render::config::{ClockEdge, RenderConfig};
use crate::vwf::render::{bit_glyph, format_time};

/// Render a clock level list without slopes: the first level explicitly,
/// every later one as a plain edge glyph.
///
/// Levels must stay in {0, 1} and strictly alternate; a repeated or
/// out-of-domain level is an invariant violation.
pub(crate) fn render_clock_level_list(
    levels: &[(f64, Level)],
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let levels = match config.viewport {
        Some(viewport) => crop_level_list(levels, viewport),
        None => levels.to_vec(),
    };
    let Some(((first_time, first_level), rest)) = levels.split_first() else {
        return Ok(String::new());
    };

    let mut result = format_time(*first_time, config);
    result.push(bit_glyph(*first_level)?);

    let mut last_level = *first_level;
    for (time, level) in rest {
        if !matches!(level, Level::Zero | Level::One) || *level == last_level {
            return Err(InvariantViolation::new(format!(
                "clock level list does not alternate: {} follows {}",
                level, last_level
            ))
            .into());
        }
        result.push(' ');
        result.push_str(&format_time(*time, config));
        result.push('C');
        last_level = *level;
    }
    Ok(result)
}

/// Build the `\vertlines` helper-marker directive.
///
/// Every display line in the forest is scanned regardless of expansion;
/// lines matching the clock-node pattern must be leaves. Edge timestamps
/// are entry-start times whose level equals the target edge, sorted and
/// de-duplicated, then optionally filtered strictly inside the viewport and
/// shifted to viewport-relative coordinates.
pub(crate) fn render_clock_help_lines(
    display_lines: &[DisplayLine],
    signals: &BTreeMap<String, Signal>,
    config: &RenderConfig,
) -> Result<Option<String>, RenderError> {
    let Some(edge) = config.clock_lines else {
        return Ok(None);
    };
    let target = match edge {
        ClockEdge::Rising => Level::One,
        ClockEdge::Falling => Level::Zero,
    };

    let mut times: Vec<f64> = Vec::new();
    for line in display_lines {
        collect_edges(line, signals, config, target, &mut times)?;
    }
    times.sort_by(f64::total_cmp);
    times.dedup();

    if let Some((start, end)) = config.viewport {
        times = times
            .into_iter()
            .filter(|time| start < *time && *time < end)
            .map(|time| time - start)
            .collect();
    }

    let arg: Vec<String> = times
        .into_iter()
        .map(|time| format_time(time, config))
        .collect();
    Ok(Some(format!("\\vertlines[help lines]{{{}}}", arg.join(","))))
}

fn collect_edges(
    line: &DisplayLine,
    signals: &BTreeMap<String, Signal>,
    config: &RenderConfig,
    target: Level,
    times: &mut Vec<f64>,
) -> Result<(), RenderError> {
    if config.clock_node.matches(&line.channel) {
        if line.children.is_some() {
            return Err(InvariantViolation::new(format!(
                "clock node \"{}\" is a bus-expansion line",
                line.channel
            ))
            .into());
        }
        let signal = signals
            .get(&line.channel)
            .ok_or_else(|| RenderError::UnknownChannel {
                channel: line.channel.clone(),
            })?;
        let mut accum = 0.0;
        for (time, level) in flatten_transition(&signal.transition_list)? {
            if level == target {
                times.push(accum);
            }
            accum += time;
        }
    }
    for child in line.children.iter().flatten() {
        collect_edges(child, signals, config, target, times)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_config() -> RenderConfig {
        RenderConfig {
            scale: 1.0,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_no_slope_rendering() {
        let levels = vec![
            (100.0, Level::Zero),
            (100.0, Level::One),
            (100.0, Level::Zero),
        ];
        let content = render_clock_level_list(&levels, &clock_config()).unwrap();
        assert_eq!(content, "100L 100C 100C");
    }

    #[test]
    fn test_first_level_high() {
        let levels = vec![(50.0, Level::One), (50.0, Level::Zero)];
        let content = render_clock_level_list(&levels, &clock_config()).unwrap();
        assert_eq!(content, "50H 50C");
    }

    #[test]
    fn test_repeated_level_rejected() {
        let levels = vec![(100.0, Level::One), (100.0, Level::One)];
        assert!(matches!(
            render_clock_level_list(&levels, &clock_config()),
            Err(RenderError::Invariant(_))
        ));
    }

    #[test]
    fn test_unknown_level_rejected() {
        let levels = vec![(100.0, Level::Zero), (100.0, Level::X)];
        assert!(render_clock_level_list(&levels, &clock_config()).is_err());
    }

    #[test]
    fn test_empty_after_crop() {
        let mut config = clock_config();
        config.viewport = Some((500.0, 600.0));
        let levels = vec![(100.0, Level::Zero)];
        assert_eq!(render_clock_level_list(&levels, &config).unwrap(), "");
    }
}
