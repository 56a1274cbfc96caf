//! Header extraction and the fixed-configuration invariant.

use serde::Serialize;

use crate::vwf::error::ParseError;
use crate::vwf::parser::extract::{
    expect_decimal, expect_ident, expect_int, partition_attributes, validate_attributes,
};
use crate::vwf::stanza::{Stanza, Value, ValueKind};

/// The validated `HEADER` block of a VWF document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub version: i64,
    pub time_unit: String,
    pub data_offset: f64,
    pub data_duration: f64,
    pub simulation_time: f64,
    pub grid_phase: f64,
    pub grid_period: f64,
    pub grid_duty_cycle: i64,
    pub print_options: Option<String>,
}

const MANDATORY: &[(&str, ValueKind)] = &[
    ("VERSION", ValueKind::Int),
    ("TIME_UNIT", ValueKind::Ident),
    ("DATA_OFFSET", ValueKind::Decimal),
    ("DATA_DURATION", ValueKind::Decimal),
    ("SIMULATION_TIME", ValueKind::Decimal),
    ("GRID_PHASE", ValueKind::Decimal),
    ("GRID_PERIOD", ValueKind::Decimal),
    ("GRID_DUTY_CYCLE", ValueKind::Int),
];

const OPTIONAL: &[(&str, ValueKind)] = &[("PRINT_OPTIONS", ValueKind::Str)];

/// Take the header off the front of the stanza list.
///
/// The first stanza must be an unindexed `HEADER` block, and the parsed
/// header must satisfy the fixed-configuration invariant: version 1, time
/// unit `ns`, zero data offset, data duration equal to simulation time, and
/// a 50% grid duty cycle.
pub(crate) fn split_header(
    mut stanzas: Vec<Stanza>,
) -> Result<(Header, Vec<Stanza>), ParseError> {
    if stanzas.is_empty() {
        return Err(ParseError::MissingHeader {
            message: "document has no stanzas".to_owned(),
        });
    }
    let block = match stanzas.remove(0) {
        Stanza::Block(block) if block.name == "HEADER" && block.index.is_none() => block,
        other => {
            return Err(ParseError::MissingHeader {
                message: format!("first stanza is not a header block:\n{}", other),
            })
        }
    };

    let (attributes, residual) = partition_attributes("HEADER", block.contents)?;
    validate_attributes("HEADER", &attributes, MANDATORY, OPTIONAL)?;
    if !residual.is_empty() {
        return Err(ParseError::LeftoverContents {
            block: "HEADER".to_owned(),
        });
    }

    let print_options = match attributes.get("PRINT_OPTIONS") {
        Some(Value::Str(s)) => Some(s.clone()),
        _ => None,
    };
    let header = Header {
        version: expect_int(&attributes, "HEADER", "VERSION")?,
        time_unit: expect_ident(&attributes, "HEADER", "TIME_UNIT")?.to_owned(),
        data_offset: expect_decimal(&attributes, "HEADER", "DATA_OFFSET")?,
        data_duration: expect_decimal(&attributes, "HEADER", "DATA_DURATION")?,
        simulation_time: expect_decimal(&attributes, "HEADER", "SIMULATION_TIME")?,
        grid_phase: expect_decimal(&attributes, "HEADER", "GRID_PHASE")?,
        grid_period: expect_decimal(&attributes, "HEADER", "GRID_PERIOD")?,
        grid_duty_cycle: expect_int(&attributes, "HEADER", "GRID_DUTY_CYCLE")?,
        print_options,
    };

    let accepted = header.version == 1
        && header.time_unit == "ns"
        && header.data_offset == 0.0
        && header.data_duration == header.simulation_time
        && header.grid_duty_cycle == 50;
    if !accepted {
        return Err(ParseError::UnacceptedHeader {
            message: format!(
                "VERSION={} TIME_UNIT={} DATA_OFFSET={} DATA_DURATION={} \
                 SIMULATION_TIME={} GRID_DUTY_CYCLE={}",
                header.version,
                header.time_unit,
                header.data_offset,
                header.data_duration,
                header.simulation_time,
                header.grid_duty_cycle
            ),
        });
    }

    Ok((header, stanzas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vwf::parser::parse_stanzas;

    fn header_stanzas(body: &str) -> Vec<Stanza> {
        parse_stanzas(&format!("HEADER {{ {} }};", body)).unwrap()
    }

    const GOOD: &str = "VERSION = 1; TIME_UNIT = ns; DATA_OFFSET = 0.0; \
                        DATA_DURATION = 1000.0; SIMULATION_TIME = 1000.0; \
                        GRID_PHASE = 0.0; GRID_PERIOD = 100.0; GRID_DUTY_CYCLE = 50;";

    #[test]
    fn test_accepts_fixed_configuration() {
        let (header, residual) = split_header(header_stanzas(GOOD)).unwrap();
        assert_eq!(header.version, 1);
        assert_eq!(header.time_unit, "ns");
        assert_eq!(header.print_options, None);
        assert!(residual.is_empty());
    }

    #[test]
    fn test_optional_print_options() {
        let body = format!("{} PRINT_OPTIONS = \"fit_to_page\";", GOOD);
        let (header, _) = split_header(header_stanzas(&body)).unwrap();
        assert_eq!(header.print_options.as_deref(), Some("fit_to_page"));
    }

    #[test]
    fn test_first_stanza_must_be_header() {
        let stanzas = parse_stanzas("NODE { };").unwrap();
        assert!(matches!(
            split_header(stanzas),
            Err(ParseError::MissingHeader { .. })
        ));
    }

    #[test]
    fn test_indexed_header_rejected() {
        let stanzas = parse_stanzas(&format!("HEADER(\"x\") {{ {} }};", GOOD)).unwrap();
        assert!(matches!(
            split_header(stanzas),
            Err(ParseError::MissingHeader { .. })
        ));
    }

    #[test]
    fn test_leftover_contents_rejected() {
        let body = format!("{} NODE {{ }}", GOOD);
        assert!(matches!(
            split_header(header_stanzas(&body)),
            Err(ParseError::LeftoverContents { .. })
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let body = format!("{} EXTRA = 1;", GOOD);
        assert!(matches!(
            split_header(header_stanzas(&body)),
            Err(ParseError::UnknownKey { .. })
        ));
    }
}
