use std::fmt;

use thiserror::Error;

use crate::parse_util;

/// Rules of Conway's Game of Life.
pub const B3S23: RuleSet = RuleSet::new(0b1000, 0b1100);

/// A birth/survival rule as written in pattern files.
///
/// # Representation
/// ```notrust
/// |------birth------|
/// 0000_0000_0000_0000_0000_0000_0000_0000
///                     |----survival-----|
/// ```
///
/// The simulator only ever runs [`B3S23`]. Other rules can be read so that pattern files
/// declaring them are rejected with a useful message.
///
/// See: https://conwaylife.com/wiki/Rulestring
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    rule: u32,
}

impl Default for RuleSet {
    fn default() -> Self {
        B3S23
    }
}

impl RuleSet {
    /// Create a new `RuleSet` for the given births and survivals. For both `b` and `s`, bit `i`
    /// set means `i` neighbors are included. Any bit past the 8th is ignored.
    pub const fn new(b: u16, s: u16) -> Self {
        let b = b & 0x1FF;
        let s = s & 0x1FF;

        Self {
            rule: (b as u32) << 16 | s as u32,
        }
    }

    pub fn births(&self) -> u16 {
        ((self.rule & 0x1FF0000) >> 0x10) as u16
    }

    pub fn survivals(&self) -> u16 {
        (self.rule & 0x1FF) as u16
    }

    pub fn is_life(&self) -> bool {
        *self == B3S23
    }

    /// Fails unless this is Conway's rule
    pub fn ensure_life(self) -> Result<Self, RuleError> {
        if self.is_life() {
            Ok(self)
        } else {
            Err(RuleError::Unsupported {
                rule: self.to_string(),
            })
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |mask: u16| -> String {
            (0..=8u8)
                .filter(|i| mask & (1 << i) != 0)
                .map(|i| (b'0' + i) as char)
                .collect()
        };

        write!(f, "B{}/S{}", digits(self.births()), digits(self.survivals()))
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({self})")
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Parse error: {0}")]
    Parse(#[from] parse_util::ParseError),

    #[error("Expected a rule, found end of input")]
    Missing,

    #[error("Invalid neighbor count '{got}'")]
    InvalidDigit { got: char },

    #[error("Only B3/S23 is supported, found {rule}")]
    Unsupported { rule: String },
}

/// Parse header rules that look like `B3/S23`, `b3s23` or `23/3`.
pub(crate) fn parse_rule(bytes: &[u8]) -> Result<(RuleSet, &[u8]), RuleError> {
    let (Some(token), bytes) = parse_util::take_until_ws(bytes) else {
        return Err(RuleError::Missing);
    };

    let rule = match token {
        [b'b' | b'B', rest @ ..] => {
            let split = rest
                .iter()
                .position(|&b| b == b's' || b == b'S')
                .ok_or(parse_util::ParseError::UnexpectedEof { exp: 'S' })?;

            let (b, s) = rest.split_at(split);
            let b = b.strip_suffix(b"/").unwrap_or(b);

            RuleSet::new(bytes_to_num(b)?, bytes_to_num(&s[1..])?)
        }
        _ => parse_nameless_rule(token)?,
    };

    Ok((rule, bytes))
}

/// Parse rules that look like `23/3`, survivals first. These show up in RLE `#r` lines.
pub(crate) fn parse_nameless_rule(token: &[u8]) -> Result<RuleSet, RuleError> {
    let (Some(s), rest) = parse_util::take_until(b'/', token) else {
        return Err(RuleError::Missing);
    };

    let b = parse_util::expect(b'/', rest)?;

    Ok(RuleSet::new(bytes_to_num(b)?, bytes_to_num(s)?))
}

/// Convert the human readable birth/survival digits to a packed bit representation
fn bytes_to_num(bytes: &[u8]) -> Result<u16, RuleError> {
    let mut n = 0;

    for &b in bytes {
        if !matches!(b, b'0'..=b'8') {
            return Err(RuleError::InvalidDigit { got: b as char });
        }

        n |= 1 << (b - b'0');
    }

    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::B3S23;
    use super::parse_nameless_rule;
    use super::parse_rule;

    #[test]
    fn named_rule_forms() {
        for s in ["B3/S23", "b3s23", "B3S23"] {
            let (rule, rest) = parse_rule(s.as_bytes()).unwrap();

            assert_eq!(rule, B3S23, "{s}");
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn rule_leaves_trailing_input() {
        let (rule, rest) = parse_rule(b"B3/S23\n3o!").unwrap();

        assert!(rule.is_life());
        assert_eq!(rest, b"\n3o!");
    }

    #[test]
    fn nameless_rule_is_survival_first() {
        let rule = parse_nameless_rule(b"23/3").unwrap();

        assert_eq!(rule, B3S23);
    }

    #[test]
    fn highlife_is_rejected() {
        let (rule, _) = parse_rule(b"B36/S23").unwrap();

        assert_eq!(rule.to_string(), "B36/S23");
        assert!(rule.ensure_life().is_err());
    }

    #[test]
    fn bad_digit() {
        assert!(parse_rule(b"B9/S23").is_err());
        assert!(parse_rule(b"").is_err());
    }
}
