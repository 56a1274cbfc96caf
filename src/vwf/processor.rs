//! File processing API for inspecting the VWF pipeline.
//!
//! A processing spec names a pipeline stage (stanzas, document, rows) and an
//! output format (simple, json), parsed from strings like `"stanzas-json"`.
//! Rendering uses the default [`RenderConfig`]; callers wanting custom
//! options use [`parse_vwf`] and [`render_document`] directly.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::vwf::error::{ParseError, RenderError};
use crate::vwf::parser::signal::Direction;
use crate::vwf::parser::{parse_stanzas, parse_vwf, Document};
use crate::vwf::render::config::RenderConfig;
use crate::vwf::render::{render_document, RenderOutput};

/// Which pipeline stage to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    Stanzas,
    Document,
    Rows,
}

/// How to format the extracted stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Simple,
    Json,
}

/// A complete processing specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingSpec {
    pub stage: ProcessingStage,
    pub format: OutputFormat,
}

impl ProcessingSpec {
    /// Parse a spec string like `"stanzas-simple"` or `"rows-json"`.
    pub fn from_string(spec: &str) -> Result<Self, ProcessingError> {
        let Some((stage, format)) = spec.split_once('-') else {
            return Err(ProcessingError::InvalidSpec(spec.to_owned()));
        };
        let stage = match stage {
            "stanzas" => ProcessingStage::Stanzas,
            "document" => ProcessingStage::Document,
            "rows" => ProcessingStage::Rows,
            other => return Err(ProcessingError::InvalidStage(other.to_owned())),
        };
        let format = match format {
            "simple" => OutputFormat::Simple,
            "json" => OutputFormat::Json,
            other => return Err(ProcessingError::InvalidFormat(other.to_owned())),
        };
        Ok(ProcessingSpec { stage, format })
    }

    /// Every valid spec, for help output and exhaustive tests.
    pub fn available_specs() -> Vec<ProcessingSpec> {
        let stages = [
            ProcessingStage::Stanzas,
            ProcessingStage::Document,
            ProcessingStage::Rows,
        ];
        let formats = [OutputFormat::Simple, OutputFormat::Json];
        stages
            .iter()
            .flat_map(|stage| {
                formats.iter().map(|format| ProcessingSpec {
                    stage: *stage,
                    format: *format,
                })
            })
            .collect()
    }
}

/// Errors from the processing API.
#[derive(Debug)]
pub enum ProcessingError {
    InvalidSpec(String),
    InvalidStage(String),
    InvalidFormat(String),
    Parse(ParseError),
    Render(RenderError),
    Io(String),
}

impl From<ParseError> for ProcessingError {
    fn from(error: ParseError) -> Self {
        ProcessingError::Parse(error)
    }
}

impl From<RenderError> for ProcessingError {
    fn from(error: RenderError) -> Self {
        ProcessingError::Render(error)
    }
}

impl std::error::Error for ProcessingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessingError::Parse(error) => Some(error),
            ProcessingError::Render(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingError::InvalidSpec(spec) => write!(f, "invalid processing spec: {}", spec),
            ProcessingError::InvalidStage(stage) => write!(f, "invalid stage: {}", stage),
            ProcessingError::InvalidFormat(format) => write!(f, "invalid format: {}", format),
            ProcessingError::Parse(error) => write!(f, "{}", error),
            ProcessingError::Render(error) => write!(f, "{}", error),
            ProcessingError::Io(message) => write!(f, "IO error: {}", message),
        }
    }
}

/// Process VWF text according to the given spec.
pub fn process_str(content: &str, spec: &ProcessingSpec) -> Result<String, ProcessingError> {
    match spec.stage {
        ProcessingStage::Stanzas => {
            let stanzas = parse_stanzas(content)?;
            match spec.format {
                OutputFormat::Simple => {
                    Ok(stanzas.iter().map(ToString::to_string).collect())
                }
                OutputFormat::Json => to_json(&stanzas),
            }
        }
        ProcessingStage::Document => {
            let document = parse_vwf(content)?;
            match spec.format {
                OutputFormat::Simple => Ok(format_document_simple(&document)),
                OutputFormat::Json => to_json(&document),
            }
        }
        ProcessingStage::Rows => {
            let document = parse_vwf(content)?;
            let output = render_document(&document, &RenderConfig::default())?;
            match spec.format {
                OutputFormat::Simple => Ok(format_rows_simple(&output)),
                OutputFormat::Json => to_json(&output),
            }
        }
    }
}

/// Process a VWF file according to the given spec.
pub fn process_file<P: AsRef<Path>>(
    path: P,
    spec: &ProcessingSpec,
) -> Result<String, ProcessingError> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|error| ProcessingError::Io(error.to_string()))?;
    process_str(&content, spec)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ProcessingError> {
    serde_json::to_string_pretty(value).map_err(|error| ProcessingError::Io(error.to_string()))
}

fn format_document_simple(document: &Document) -> String {
    let mut out = format!(
        "simulation time: {} {}\n",
        document.header.simulation_time, document.header.time_unit
    );
    for (name, signal) in &document.signals {
        let direction = match signal.direction {
            Direction::Input => "input",
            Direction::Output => "output",
            Direction::Bidir => "bidir",
        };
        out.push_str(&format!(
            "signal \"{}\": {} width {}\n",
            name, direction, signal.width
        ));
    }
    out.push_str(&format!(
        "display lines: {} roots, time bars: {}\n",
        document.display_lines.len(),
        document.time_bars.len()
    ));
    out
}

fn format_rows_simple(output: &RenderOutput) -> String {
    let mut out = String::new();
    for row in &output.rows {
        out.push_str(&format!("{} & {} \\\\\n", row.name, row.content));
    }
    if let Some(help_lines) = &output.help_lines {
        out.push_str(help_lines);
        out.push('\n');
    }
    out
}
