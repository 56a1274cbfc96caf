//! Document-level parsing tests: extraction, joins and rejection cases
//! over complete VWF sources.

use rstest::rstest;
use vwf2tikz::{parse_vwf, Direction, ParseError, Radix};

fn header(body: &str) -> String {
    format!("HEADER {{ {} }}", body)
}

const HEADER_BODY: &str = "VERSION = 1; TIME_UNIT = ns; DATA_OFFSET = 0.0; \
                           DATA_DURATION = 800.0; SIMULATION_TIME = 800.0; \
                           GRID_PHASE = 0.0; GRID_PERIOD = 200.0; GRID_DUTY_CYCLE = 50;";

fn bit_signal(name: &str, parent: &str) -> String {
    format!(
        "SIGNAL(\"{name}\") {{ VALUE_TYPE = NINE_LEVEL_BIT; SIGNAL_TYPE = SINGLE_BIT; \
         WIDTH = 1; LSB_INDEX = -1; DIRECTION = INPUT; PARENT = \"{parent}\"; }}"
    )
}

fn bus_signal(name: &str, width: u32) -> String {
    format!(
        "SIGNAL(\"{name}\") {{ VALUE_TYPE = NINE_LEVEL_BIT; SIGNAL_TYPE = BUS; \
         WIDTH = {width}; LSB_INDEX = 0; DIRECTION = OUTPUT; PARENT = \"\"; }}"
    )
}

fn transitions(name: &str, body: &str) -> String {
    format!("TRANSITION_LIST(\"{name}\") {{ {body} }}")
}

fn sample_document_with(extra: &[&str]) -> String {
    let mut stanzas = vec![
        "/* counter testbench */".to_owned(),
        header(HEADER_BODY),
        bit_signal("clk", ""),
        transitions(
            "clk",
            "NODE { REPEAT = 4; LEVEL 0 FOR 100.0; LEVEL 1 FOR 100.0; }",
        ),
        bus_signal("count", 2),
        transitions("count", "LEVEL X FOR 800.0;"),
        bit_signal("count[1]", "count"),
        transitions(
            "count[1]",
            "NODE { REPEAT = 1; LEVEL 0 FOR 400.0; LEVEL 1 FOR 400.0; }",
        ),
        bit_signal("count[0]", "count"),
        transitions(
            "count[0]",
            "NODE { REPEAT = 2; LEVEL 0 FOR 200.0; LEVEL 1 FOR 200.0; }",
        ),
        "DISPLAY_LINE { CHANNEL = \"clk\"; EXPAND_STATUS = EXPANDED; RADIX = Binary; \
         TREE_INDEX = 0; TREE_LEVEL = 0; }"
            .to_owned(),
        "DISPLAY_LINE { CHANNEL = \"count\"; EXPAND_STATUS = COLLAPSED; RADIX = Hexadecimal; \
         TREE_INDEX = 1; TREE_LEVEL = 0; CHILDREN = 2, 3; }"
            .to_owned(),
        "DISPLAY_LINE { CHANNEL = \"count[1]\"; EXPAND_STATUS = COLLAPSED; RADIX = Binary; \
         TREE_INDEX = 2; TREE_LEVEL = 1; PARENT = 1; }"
            .to_owned(),
        "DISPLAY_LINE { CHANNEL = \"count[0]\"; EXPAND_STATUS = COLLAPSED; RADIX = Binary; \
         TREE_INDEX = 3; TREE_LEVEL = 1; PARENT = 1; }"
            .to_owned(),
        "TIME_BAR { TIME = 400.0; MASTER = TRUE; }".to_owned(),
    ];
    stanzas.extend(extra.iter().map(|stanza| (*stanza).to_owned()));
    stanzas.push(";".to_owned());
    stanzas.join("\n")
}

fn sample_document() -> String {
    sample_document_with(&[])
}

#[test]
fn test_sample_document_extraction() {
    let document = parse_vwf(&sample_document()).unwrap();

    assert_eq!(document.header.simulation_time, 800.0);
    assert_eq!(document.signals.len(), 4);
    assert_eq!(document.signals["clk"].direction, Direction::Input);
    assert_eq!(document.signals["count"].width, 2);
    assert_eq!(document.signals["count[0]"].parent.as_deref(), Some("count"));
    assert_eq!(document.time_bars.len(), 1);

    assert_eq!(document.display_lines.len(), 2);
    let clk = &document.display_lines[0];
    assert_eq!(clk.channel, "clk");
    assert_eq!(clk.radix, Radix::Binary);
    assert_eq!(clk.children, None);

    let count = &document.display_lines[1];
    assert_eq!(count.channel, "count");
    assert_eq!(count.radix, Radix::Hexadecimal);
    assert!(!count.expanded);
    let children = count.children.as_ref().unwrap();
    let channels: Vec<&str> = children.iter().map(|child| child.channel.as_str()).collect();
    assert_eq!(channels, vec!["count[1]", "count[0]"]);
}

#[test]
fn test_non_ascii_input_rejected() {
    let source = sample_document().replace("counter", "compteur à");
    assert_eq!(parse_vwf(&source), Err(ParseError::NonAscii));
}

#[rstest]
#[case("VERSION = 2;", "VERSION = 1;")]
#[case("TIME_UNIT = us;", "TIME_UNIT = ns;")]
#[case("DATA_OFFSET = 1.0;", "DATA_OFFSET = 0.0;")]
#[case("DATA_DURATION = 500.0;", "DATA_DURATION = 800.0;")]
#[case("GRID_DUTY_CYCLE = 60;", "GRID_DUTY_CYCLE = 50;")]
fn test_header_clauses_rejected_independently(#[case] bad: &str, #[case] good: &str) {
    let source = sample_document().replace(good, bad);
    assert!(matches!(
        parse_vwf(&source),
        Err(ParseError::UnacceptedHeader { .. })
    ));
}

#[test]
fn test_header_missing_key_rejected() {
    let source = sample_document().replace("VERSION = 1;", "");
    assert_eq!(
        parse_vwf(&source),
        Err(ParseError::MissingKeys {
            block: "HEADER".into(),
            keys: vec!["VERSION".into()],
        })
    );
}

#[test]
fn test_header_wrong_value_type_rejected() {
    let source = sample_document().replace("VERSION = 1;", "VERSION = \"1\";");
    assert!(matches!(parse_vwf(&source), Err(ParseError::KeyType { .. })));
}

#[test]
fn test_header_unknown_key_rejected() {
    let source = sample_document().replace("VERSION = 1;", "VERSION = 1; COLOR = red;");
    assert!(matches!(
        parse_vwf(&source),
        Err(ParseError::UnknownKey { .. })
    ));
}

#[test]
fn test_duplicate_signal_rejected() {
    let source = sample_document().replace("SIGNAL(\"count[0]\")", "SIGNAL(\"clk\")");
    assert!(matches!(
        parse_vwf(&source),
        Err(ParseError::BlockIndex { .. })
    ));
}

#[test]
fn test_unmatched_transition_list_rejected() {
    let extra = transitions("ghost", "LEVEL 0 FOR 1.0;");
    let source = sample_document_with(&[&extra]);
    assert!(matches!(
        parse_vwf(&source),
        Err(ParseError::UnmatchedTransitionList { .. })
    ));
}

#[test]
fn test_orphan_display_line_rejected() {
    let orphan = "DISPLAY_LINE { CHANNEL = \"lost\"; EXPAND_STATUS = COLLAPSED; \
                  RADIX = Binary; TREE_INDEX = 9; TREE_LEVEL = 1; PARENT = 0; }";
    let source = sample_document_with(&[orphan]);
    assert!(matches!(
        parse_vwf(&source),
        Err(ParseError::OrphanDisplayLines { indexes }) if indexes == vec![9]
    ));
}

#[test]
fn test_unparsed_top_level_block_rejected() {
    let source = sample_document_with(&["WATCHER { A = 1; }"]);
    assert!(matches!(
        parse_vwf(&source),
        Err(ParseError::UnexpectedStanzas { count: 1 })
    ));
}
