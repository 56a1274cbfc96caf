//! Per-radix value renderers for synchronized bus values.
//!
//! Renderer selection walks the configured custom overrides in declaration
//! order first; the fixed per-radix dispatch below is the fallback. There is
//! no registry: one renderer type per radix, constructed on demand.

use crate::vwf::error::InvariantViolation;
use crate::vwf::level::Level;
use crate::vwf::parser::display_line::{DisplayLine, Radix};
use crate::vwf::render::config::RenderConfig;

/// Turns one synchronized bus value (MSB first) into display text.
pub trait ValueRenderer {
    fn render(&self, bits: &[Level]) -> Result<String, InvariantViolation>;
}

/// Interpret a bit tuple as an unsigned integer, most-significant bit first.
///
/// Unknown bits have no numeric value; hitting one is an invariant
/// violation for every numeric radix.
pub(crate) fn bits_to_int(bits: &[Level]) -> Result<u128, InvariantViolation> {
    let mut accum: u128 = 0;
    for bit in bits {
        let bit = match bit {
            Level::Zero => 0,
            Level::One => 1,
            Level::X => {
                return Err(InvariantViolation::new(
                    "unknown bit in a numeric bus value",
                ))
            }
        };
        accum = accum * 2 + bit;
    }
    Ok(accum)
}

struct UnsignedRenderer;

impl ValueRenderer for UnsignedRenderer {
    fn render(&self, bits: &[Level]) -> Result<String, InvariantViolation> {
        Ok(bits_to_int(bits)?.to_string())
    }
}

struct SignedRenderer;

impl ValueRenderer for SignedRenderer {
    fn render(&self, bits: &[Level]) -> Result<String, InvariantViolation> {
        let mut value = bits_to_int(bits)? as i128;
        if bits.first() == Some(&Level::One) {
            value -= 1i128 << bits.len();
        }
        Ok(value.to_string())
    }
}

struct HexRenderer {
    zero_padding: bool,
    uppercase: bool,
    prefix: bool,
}

impl ValueRenderer for HexRenderer {
    fn render(&self, bits: &[Level]) -> Result<String, InvariantViolation> {
        let mut text = format!("{:x}", bits_to_int(bits)?);
        if self.zero_padding {
            while text.len() * 4 < bits.len() {
                text.insert(0, '0');
            }
        }
        if self.uppercase {
            text = text.to_uppercase();
        }
        if self.prefix {
            text.insert_str(0, "0x");
        }
        Ok(text)
    }
}

struct BinaryRenderer;

impl ValueRenderer for BinaryRenderer {
    fn render(&self, bits: &[Level]) -> Result<String, InvariantViolation> {
        Ok(bits.iter().map(Level::to_string).collect())
    }
}

// Control-code names for ASCII 0..=31, as the waveform editor displays them
// (code 26 is shown as S2, not SUB).
const CONTROL_NAMES: &[&str] = &[
    "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "BEL", "BS", "HT", "LF", "VT", "FF", "CR",
    "SO", "SI", "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", "CAN", "EM", "S2", "ESC",
    "FS", "GS", "RS", "US",
];

struct AsciiRenderer;

impl ValueRenderer for AsciiRenderer {
    fn render(&self, bits: &[Level]) -> Result<String, InvariantViolation> {
        let code = bits_to_int(bits)?;
        if code >= 128 {
            return Err(InvariantViolation::new(format!(
                "value {} is outside the 7-bit ASCII range",
                code
            )));
        }
        let code = code as usize;
        if code < CONTROL_NAMES.len() {
            return Ok(CONTROL_NAMES[code].to_owned());
        }
        if code == 127 {
            return Ok("DEL".to_owned());
        }
        Ok(format!("'{}'", code as u8 as char))
    }
}

/// Construct the renderer for a display line: the first matching custom
/// override wins, otherwise dispatch on the line's declared radix.
pub(crate) fn create_renderer(line: &DisplayLine, config: &RenderConfig) -> Box<dyn ValueRenderer> {
    for (pattern, factory) in &config.custom_renderers {
        if pattern.matches(&line.channel) {
            return factory(line, config);
        }
    }
    match line.radix {
        Radix::Unsigned => Box::new(UnsignedRenderer),
        Radix::Signed => Box::new(SignedRenderer),
        Radix::Hexadecimal => Box::new(HexRenderer {
            zero_padding: config.render_hex_zero_padding,
            uppercase: config.render_hex_uppercase,
            prefix: config.render_hex_prefix,
        }),
        Radix::Binary => Box::new(BinaryRenderer),
        Radix::Ascii => Box::new(AsciiRenderer),
    }
}
