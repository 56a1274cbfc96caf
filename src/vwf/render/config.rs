//! Render configuration: the option set, channel patterns and callbacks.

use std::fmt;

use crate::vwf::parser::display_line::DisplayLine;
use crate::vwf::render::value::ValueRenderer;

/// A channel-name pattern used to select lines for special treatment
/// (clock node, bit-as-bus, custom renderers, custom styles).
pub enum Pattern {
    /// Never matches.
    None,
    /// Matches one exact channel name.
    Exact(String),
    /// Matches any name in the set.
    AnyOf(Vec<String>),
    /// Matches when the predicate accepts the name.
    Predicate(Box<dyn Fn(&str) -> bool>),
}

impl Pattern {
    pub fn matches(&self, channel: &str) -> bool {
        match self {
            Pattern::None => false,
            Pattern::Exact(name) => name == channel,
            Pattern::AnyOf(names) => names.iter().any(|name| name == channel),
            Pattern::Predicate(predicate) => predicate(channel),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::None => write!(f, "Pattern::None"),
            Pattern::Exact(name) => write!(f, "Pattern::Exact({:?})", name),
            Pattern::AnyOf(names) => write!(f, "Pattern::AnyOf({:?})", names),
            Pattern::Predicate(_) => write!(f, "Pattern::Predicate(..)"),
        }
    }
}

/// Which clock transition the helper-marker pass records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEdge {
    Rising,
    Falling,
}

/// Builds a [`ValueRenderer`] for a matched display line.
pub type RendererFactory = Box<dyn Fn(&DisplayLine, &RenderConfig) -> Box<dyn ValueRenderer>>;

/// All options recognized by the rendering engine.
///
/// `disable_propagation_in_binary` and `join_unknown` are carried for the
/// unknown-value extension point but currently change nothing; the same goes
/// for `time_digits`, whose fixed-digit rounding is not implemented.
/// `extra_args` is opaque here: the surrounding typesetting wrapper builds
/// its option list from it.
pub struct RenderConfig {
    /// Divisor applied to every duration before emitting it.
    pub scale: f64,
    /// Optional `(start, end)` crop window.
    pub viewport: Option<(f64, f64)>,
    pub clock_node: Pattern,
    pub clock_no_slope: bool,
    /// Helper-marker edge selection; `None` disables the directive.
    pub clock_lines: Option<ClockEdge>,
    pub render_bit_as_bus: Pattern,
    pub render_hex_prefix: bool,
    pub render_hex_uppercase: bool,
    pub render_hex_zero_padding: bool,
    pub render_hide_char_scale: f64,
    pub render_hide_char_limit: usize,
    pub render_hide_margin: f64,
    pub disable_propagation_in_binary: bool,
    pub join_unknown: bool,
    /// Ordered renderer overrides; the first matching pattern wins.
    pub custom_renderers: Vec<(Pattern, RendererFactory)>,
    /// Ordered style rules; every matching rule contributes its tags.
    pub custom_styles: Vec<(Pattern, Vec<String>)>,
    pub extra_args: Vec<String>,
    pub time_digits: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            scale: 1.0 / 42.0,
            viewport: None,
            clock_node: Pattern::Exact("clk".to_owned()),
            clock_no_slope: true,
            clock_lines: Some(ClockEdge::Rising),
            render_bit_as_bus: Pattern::None,
            render_hex_prefix: true,
            render_hex_uppercase: true,
            render_hex_zero_padding: true,
            render_hide_char_scale: 1.0,
            render_hide_char_limit: 16,
            render_hide_margin: 1.0,
            disable_propagation_in_binary: false,
            join_unknown: false,
            custom_renderers: Vec::new(),
            custom_styles: Vec::new(),
            extra_args: Vec::new(),
            time_digits: None,
        }
    }
}
