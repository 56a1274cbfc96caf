//! The rendering engine: from a parsed document to tikz-timing glyph rows.
//!
//! For each display line selected for output the engine gathers level
//! lists, synchronizes bus bits, crops to the viewport, picks a value
//! renderer and emits `formatted-time + glyph` tokens. Clock lines get
//! no-slope special casing and feed the auxiliary help-line directive.

pub mod clock;
pub mod config;
pub mod value;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::vwf::error::{InvariantViolation, RenderError};
use crate::vwf::level::{crop_level_list, flatten_transition, zip_level_lists, Level};
use crate::vwf::parser::display_line::DisplayLine;
use crate::vwf::parser::signal::Signal;
use crate::vwf::parser::Document;
use crate::vwf::render::config::RenderConfig;
use crate::vwf::render::value::{create_renderer, ValueRenderer};

/// One rendered row: a name cell, a content cell of glyph tokens, and any
/// style tags contributed by matching custom-style rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedRow {
    pub name: String,
    pub content: String,
    pub styles: Vec<String>,
}

/// The rendering result: ordered rows plus the optional help-line directive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutput {
    pub rows: Vec<RenderedRow>,
    pub help_lines: Option<String>,
}

/// Render every selected display line of a document.
pub fn render_document(
    document: &Document,
    config: &RenderConfig,
) -> Result<RenderOutput, RenderError> {
    let mut rows = Vec::new();
    for line in select_lines(&document.display_lines) {
        let content = render_display_line(line, &document.signals, config)?;
        rows.push(RenderedRow {
            name: render_line_name(&line.channel),
            content,
            styles: collect_styles(line, config),
        });
    }
    let help_lines = clock::render_clock_help_lines(&document.display_lines, &document.signals, config)?;
    Ok(RenderOutput { rows, help_lines })
}

/// Pre-order traversal of the forest; children are visited only when the
/// parent is expanded.
fn select_lines(display_lines: &[DisplayLine]) -> Vec<&DisplayLine> {
    fn visit<'a>(line: &'a DisplayLine, selected: &mut Vec<&'a DisplayLine>) {
        selected.push(line);
        if line.expanded {
            for child in line.children.iter().flatten() {
                visit(child, selected);
            }
        }
    }
    let mut selected = Vec::new();
    for line in display_lines {
        visit(line, &mut selected);
    }
    selected
}

/// Level lists gathered for one display line, before synchronization.
enum LineLevels {
    Bit(Vec<(f64, Level)>),
    Bus(Vec<Vec<(f64, Level)>>),
}

/// The synchronized per-line sequence the glyph emitter consumes.
enum Prepared {
    Bit(Vec<(f64, Level)>),
    Bus(Vec<(f64, Vec<Level>)>),
}

fn get_level_list(
    line: &DisplayLine,
    signals: &BTreeMap<String, Signal>,
) -> Result<Vec<(f64, Level)>, RenderError> {
    if line.children.is_some() {
        return Err(InvariantViolation::new(format!(
            "level list requested for bus-expansion line \"{}\"",
            line.channel
        ))
        .into());
    }
    let signal = signals
        .get(&line.channel)
        .ok_or_else(|| RenderError::UnknownChannel {
            channel: line.channel.clone(),
        })?;
    Ok(flatten_transition(&signal.transition_list)?)
}

/// Gather the level list(s) for a display line.
///
/// A bus-expansion node yields one list per child in child order. A leaf
/// matching the clock-node pattern is always scalar; one matching the
/// bit-as-bus pattern becomes a one-element bus; anything else is scalar.
fn get_line_level_lists(
    line: &DisplayLine,
    signals: &BTreeMap<String, Signal>,
    config: &RenderConfig,
) -> Result<LineLevels, RenderError> {
    if let Some(children) = &line.children {
        let mut lists = Vec::with_capacity(children.len());
        for child in children {
            lists.push(get_level_list(child, signals)?);
        }
        return Ok(LineLevels::Bus(lists));
    }
    if config.clock_node.matches(&line.channel) {
        return Ok(LineLevels::Bit(get_level_list(line, signals)?));
    }
    if config.render_bit_as_bus.matches(&line.channel) {
        return Ok(LineLevels::Bus(vec![get_level_list(line, signals)?]));
    }
    Ok(LineLevels::Bit(get_level_list(line, signals)?))
}

/// Zip a bus's lists into one composite sequence and run each value through
/// the unknown-value hook. The hook is the extension point for
/// propagation/joining policy and currently passes values through.
fn prepare_level_list(levels: LineLevels) -> Result<Prepared, RenderError> {
    match levels {
        LineLevels::Bit(list) => Ok(Prepared::Bit(list)),
        LineLevels::Bus(lists) => {
            let zipped = zip_level_lists(&lists)?;
            let zipped = zipped
                .into_iter()
                .map(|(time, word)| (time, map_unknown(word)))
                .collect();
            Ok(Prepared::Bus(zipped))
        }
    }
}

fn map_unknown(word: Vec<Level>) -> Vec<Level> {
    word
}

/// The fixed glyph for a scalar level. Only 0 and 1 have one.
pub(crate) fn bit_glyph(level: Level) -> Result<char, InvariantViolation> {
    match level {
        Level::Zero => Ok('L'),
        Level::One => Ok('H'),
        Level::X => Err(InvariantViolation::new(
            "scalar level list contains an unknown level",
        )),
    }
}

/// Render one composite value as a data glyph, suppressing the text when
/// the entry is too short for it at the configured character width.
fn word_glyph(
    time: f64,
    word: &[Level],
    renderer: &dyn ValueRenderer,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let mut content = renderer.render(word)?;
    let length = content.len().min(config.render_hide_char_limit) as f64;
    let length = length * config.render_hide_char_scale + config.render_hide_margin;
    if time / config.scale < length {
        content = String::new();
    }
    Ok(format!("D{{{}}}", content))
}

/// Divide by the scale factor and format as decimal text with trailing
/// zeros (and a trailing bare point) stripped.
///
/// Fixed-digit rounding with carried error (`time_digits`) is intentionally
/// not implemented.
pub(crate) fn format_time(time: f64, config: &RenderConfig) -> String {
    let mut result = format!("{:.6}", time / config.scale);
    while result.ends_with('0') {
        result.pop();
    }
    if result.ends_with('.') {
        result.pop();
    }
    result
}

fn render_level_list(
    prepared: Prepared,
    line: &DisplayLine,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    match prepared {
        Prepared::Bit(levels) => {
            let levels = match config.viewport {
                Some(viewport) => crop_level_list(&levels, viewport),
                None => levels,
            };
            let mut tokens = Vec::with_capacity(levels.len());
            for (time, level) in levels {
                let mut token = format_time(time, config);
                token.push(bit_glyph(level)?);
                tokens.push(token);
            }
            Ok(tokens.join(" "))
        }
        Prepared::Bus(levels) => {
            let levels = match config.viewport {
                Some(viewport) => crop_level_list(&levels, viewport),
                None => levels,
            };
            let renderer = create_renderer(line, config);
            let mut tokens = Vec::with_capacity(levels.len());
            for (time, word) in levels {
                let mut token = format_time(time, config);
                token.push_str(&word_glyph(time, &word, renderer.as_ref(), config)?);
                tokens.push(token);
            }
            Ok(tokens.join(" "))
        }
    }
}

/// Render one display line into its content cell.
fn render_display_line(
    line: &DisplayLine,
    signals: &BTreeMap<String, Signal>,
    config: &RenderConfig,
) -> Result<String, RenderError> {
    let levels = get_line_level_lists(line, signals, config)?;
    let is_clock_bit = matches!(&levels, LineLevels::Bit(_))
        && config.clock_node.matches(&line.channel)
        && config.clock_no_slope;
    match prepare_level_list(levels)? {
        Prepared::Bit(levels) if is_clock_bit => clock::render_clock_level_list(&levels, config),
        prepared => render_level_list(prepared, line, config),
    }
}

/// Derive the name cell from the channel identifier, escaping characters
/// TeX treats specially.
fn render_line_name(channel: &str) -> String {
    let mut name = String::with_capacity(channel.len());
    for c in channel.chars() {
        match c {
            '#' | '$' | '%' | '&' | '_' | '{' | '}' => {
                name.push('\\');
                name.push(c);
            }
            '\\' => name.push_str("\\textbackslash{}"),
            '~' => name.push_str("\\textasciitilde{}"),
            '^' => name.push_str("\\textasciicircum{}"),
            _ => name.push(c),
        }
    }
    name
}

/// Collect style tags from every matching custom-style rule, in rule order.
fn collect_styles(line: &DisplayLine, config: &RenderConfig) -> Vec<String> {
    let mut styles = Vec::new();
    for (pattern, tags) in &config.custom_styles {
        if pattern.matches(&line.channel) {
            styles.extend(tags.iter().cloned());
        }
    }
    styles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vwf::parser::display_line::Radix;

    fn leaf(channel: &str, radix: Radix) -> DisplayLine {
        DisplayLine {
            channel: channel.into(),
            radix,
            expanded: true,
            children: None,
        }
    }

    fn plain_config() -> RenderConfig {
        RenderConfig {
            scale: 1.0,
            clock_lines: None,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn test_select_lines_honors_expansion() {
        let forest = vec![
            DisplayLine {
                channel: "bus".into(),
                radix: Radix::Hexadecimal,
                expanded: false,
                children: Some(vec![leaf("bus[0]", Radix::Binary)]),
            },
            leaf("clk", Radix::Binary),
        ];
        let selected = select_lines(&forest);
        let channels: Vec<&str> = selected.iter().map(|line| line.channel.as_str()).collect();
        assert_eq!(channels, vec!["bus", "clk"]);
    }

    #[test]
    fn test_select_lines_expands_children_in_order() {
        let forest = vec![DisplayLine {
            channel: "bus".into(),
            radix: Radix::Hexadecimal,
            expanded: true,
            children: Some(vec![
                leaf("bus[1]", Radix::Binary),
                leaf("bus[0]", Radix::Binary),
            ]),
        }];
        let channels: Vec<&str> = select_lines(&forest)
            .iter()
            .map(|line| line.channel.as_str())
            .collect();
        assert_eq!(channels, vec!["bus", "bus[1]", "bus[0]"]);
    }

    #[test]
    fn test_format_time_strips_trailing_zeros() {
        let config = plain_config();
        assert_eq!(format_time(100.0, &config), "100");
        assert_eq!(format_time(12.5, &config), "12.5");
        assert_eq!(format_time(0.0, &config), "0");
        let scaled = RenderConfig {
            scale: 2.0,
            ..plain_config()
        };
        assert_eq!(format_time(25.0, &scaled), "12.5");
    }

    #[test]
    fn test_bit_glyphs() {
        assert_eq!(bit_glyph(Level::Zero).unwrap(), 'L');
        assert_eq!(bit_glyph(Level::One).unwrap(), 'H');
        assert!(bit_glyph(Level::X).is_err());
    }

    #[test]
    fn test_word_glyph_suppresses_short_entries() {
        let config = plain_config();
        let renderer = create_renderer(&leaf("bus", Radix::Hexadecimal), &config);
        // "0x3" is 3 chars: needs 3 * 1.0 + 1.0 = 4 time units at scale 1.
        let wide = word_glyph(10.0, &[Level::One, Level::One], renderer.as_ref(), &config).unwrap();
        assert_eq!(wide, "D{0x3}");
        let narrow = word_glyph(3.0, &[Level::One, Level::One], renderer.as_ref(), &config).unwrap();
        assert_eq!(narrow, "D{}");
    }

    #[test]
    fn test_render_line_name_escapes_tex() {
        assert_eq!(render_line_name("data_bus[3]"), "data\\_bus[3]");
        assert_eq!(render_line_name("a&b"), "a\\&b");
        assert_eq!(render_line_name("clk"), "clk");
    }

    #[test]
    fn test_collect_styles_in_rule_order() {
        let mut config = plain_config();
        config.custom_styles = vec![
            (
                config::Pattern::AnyOf(vec!["clk".into(), "rst".into()]),
                vec!["red".into()],
            ),
            (config::Pattern::Exact("clk".into()), vec!["thick".into()]),
            (config::Pattern::Exact("other".into()), vec!["blue".into()]),
        ];
        let styles = collect_styles(&leaf("clk", Radix::Binary), &config);
        assert_eq!(styles, vec!["red", "thick"]);
    }
}
