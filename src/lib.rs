//! # vwf2tikz
//!
//! A converter from Quartus vector waveform files (VWF) to tikz-timing rows.
//!
//! The pipeline has two halves: parsing a VWF document into a typed model
//! ([`parse_vwf`]), and rendering selected display lines of that model into
//! time-stamped glyph rows ([`render_document`]).
//!
//! ```text
//! HEADER { VERSION = 1; TIME_UNIT = ns; ... }
//! SIGNAL("clk") { ... }
//! TRANSITION_LIST("clk") { NODE { REPEAT = 5; LEVEL 0 FOR 100.0; LEVEL 1 FOR 100.0; } }
//! DISPLAY_LINE { CHANNEL = "clk"; ... }
//! ;
//! ```
//!
//! becomes rows such as `100L 100C 100C ...` ready for a tikz-timing table.

pub mod vwf;

pub use vwf::error::{InvariantViolation, ParseError, RenderError};
pub use vwf::level::{crop_level_list, flatten_transition, zip_level_lists, Level};
pub use vwf::parser::{parse_stanzas, parse_vwf, Direction, DisplayLine, Document, Header, Radix, Signal};
pub use vwf::processor::{process_file, process_str, OutputFormat, ProcessingError, ProcessingSpec, ProcessingStage};
pub use vwf::render::config::{ClockEdge, Pattern, RenderConfig, RendererFactory};
pub use vwf::render::value::ValueRenderer;
pub use vwf::render::{render_document, RenderOutput, RenderedRow};
pub use vwf::stanza::{Assignment, Block, LevelStatement, RawLevel, Stanza, Value, ValueKind};
