use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::parse_util;
use crate::parse_util::ConvertError;
use crate::parse_util::ParseError;
use crate::parse_util::convert;
use crate::rule_set;
use crate::rule_set::RuleError;
use crate::rule_set::RuleSet;

#[derive(Default)]
pub struct RleFile<'a> {
    pub name: Option<&'a [u8]>,
    pub author: Option<&'a [u8]>,

    /// `(rows, cols)` as declared by the header line
    pub size: Option<(usize, usize)>,
    pub set: RuleSet,
}

#[derive(Debug, Error)]
pub enum RleError {
    #[error("Comment line error: {0}")]
    CommentLine(#[from] RleCommentLineError),

    #[error("Header line error: {0}")]
    HeaderLine(#[from] RleHeaderLineError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] RleEncodingError),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Parse the RLE file format, calling `f(row, col)` for every live cell. Rows grow downward.
/// Assumes the bytes are valid Ascii.
///
/// See: https://conwaylife.com/wiki/Run_Length_Encoded
pub fn read_rle<F>(mut bytes: &'_ [u8], mut f: F) -> Result<RleFile<'_>, RleError>
where
    F: FnMut(usize, usize),
{
    let mut file = RleFile::default();

    // Parse as many comment lines as possible
    loop {
        let bytes_ws = parse_util::take_ws(bytes);
        let res = read_line_comment(bytes_ws)?;
        let (Some(line), rest) = res else { break };

        match line {
            RleCommentLine::Comment => {}
            RleCommentLine::Name { name } => {
                if file.name.is_some() {
                    warn!("RLE file name already defined. Using latest");
                }

                file.name = Some(name);
            }
            RleCommentLine::Author { author } => {
                if file.author.is_some() {
                    warn!("RLE author already defined. Using latest");
                }

                file.author = Some(author);
            }
            RleCommentLine::RuleSet { set } => {
                file.set = set;
            }
        }

        bytes = rest;
    }

    bytes = parse_util::take_ws(bytes);

    // Parse header line, if it's present
    let res = read_line_header(bytes)?;
    if let (Some(header), rest) = res {
        let RleHeaderLine { cols, rows, set } = header;

        file.size = Some((rows, cols));
        if let Some(set) = set {
            file.set = set;
        }

        bytes = rest;
    }

    file.set.ensure_life()?;

    // Parse encoding
    let bounds = file.size;
    read_encoding(bytes, |row, col| {
        if let Some((rows, cols)) = bounds {
            if row >= rows || col >= cols {
                return Err(RleEncodingError::OutOfBounds { row, col });
            }
        }

        f(row, col);

        Ok(())
    })?;

    Ok(file)
}

enum RleCommentLine<'a> {
    Comment,
    Name { name: &'a [u8] },
    Author { author: &'a [u8] },
    RuleSet { set: RuleSet },
}

#[derive(Debug, Error)]
pub enum RleCommentLineError {
    #[error("No comment type")]
    NoType,

    #[error("Empty name line")]
    EmptyName,

    #[error("Empty author line")]
    EmptyAuthor,

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Invalid comment type, found '{got}'")]
    InvalidType { got: char },
}

/// Take the rest of the line, without any trailing `\r`. `None` if the line is blank.
fn take_line(bytes: &[u8]) -> (Option<&[u8]>, &[u8]) {
    let bytes = parse_util::take_blank(bytes);
    let end = bytes.iter().position(|&b| b == b'\n').unwrap_or(bytes.len());

    let line = bytes[..end].trim_ascii_end();
    let rest = parse_util::skip_line(bytes);

    if line.is_empty() {
        (None, rest)
    } else {
        (Some(line), rest)
    }
}

/// Attempt to parse a comment line, otherwise leaves `bytes` as-is.
fn read_line_comment(
    bytes: &'_ [u8],
) -> Result<(Option<RleCommentLine<'_>>, &'_ [u8]), RleCommentLineError> {
    let Ok(bytes) = parse_util::expect(b'#', bytes) else {
        return Ok((None, bytes));
    };

    let (Some(b), bytes) = parse_util::take_1(bytes) else {
        return Err(RleCommentLineError::NoType);
    };

    match b {
        // Comment line
        b'C' | b'c' => Ok((Some(RleCommentLine::Comment), parse_util::skip_line(bytes))),

        // Pattern name
        b'N' => {
            let (Some(name), bytes) = take_line(bytes) else {
                return Err(RleCommentLineError::EmptyName);
            };

            let line = RleCommentLine::Name { name };

            Ok((Some(line), bytes))
        }

        // Pattern author
        b'O' => {
            let (Some(author), bytes) = take_line(bytes) else {
                return Err(RleCommentLineError::EmptyAuthor);
            };

            let line = RleCommentLine::Author { author };

            Ok((Some(line), bytes))
        }

        // Pattern offsets only make sense on an infinite plane; patterns are always centered here
        b'R' | b'P' => {
            debug!("Ignoring RLE offset line");

            Ok((Some(RleCommentLine::Comment), parse_util::skip_line(bytes)))
        }

        // Pattern rules
        b'r' => {
            let (Some(rule), bytes) = take_line(bytes) else {
                return Err(RuleError::Missing.into());
            };

            let set = rule_set::parse_nameless_rule(rule)
                .or_else(|_| rule_set::parse_rule(rule).map(|(set, _)| set))?;

            Ok((Some(RleCommentLine::RuleSet { set }), bytes))
        }

        b => Err(RleCommentLineError::InvalidType { got: b as char }),
    }
}

struct RleHeaderLine {
    cols: usize,
    rows: usize,
    set: Option<RuleSet>,
}

#[derive(Debug, Error)]
pub enum RleHeaderLineError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Invalid token: expected ',' or '\\n', found '{got}'")]
    InvalidToken { got: char },

    #[error("Invalid rule: {0}")]
    InvalidRule(#[from] RuleError),

    #[error("Invalid size: {0}")]
    InvalidCoord(#[from] RleCoordError),
}

/// Attempt to parse a header line, otherwise leaves `bytes` as-is.
fn read_line_header(bytes: &[u8]) -> Result<(Option<RleHeaderLine>, &[u8]), RleHeaderLineError> {
    if parse_util::peek_1(bytes) != Some(b'x') {
        return Ok((None, bytes));
    }

    let ((cols, rows), bytes) = read_coordinates(bytes)?;

    let (b, bytes) = parse_util::take_1(bytes);

    match b {
        Some(b',') => {
            let bytes = parse_util::take_blank(bytes);
            let bytes = parse_util::expect_slice("rule".as_bytes(), bytes)?;
            let bytes = parse_util::take_blank(bytes);
            let bytes = parse_util::expect(b'=', bytes)?;
            let bytes = parse_util::take_blank(bytes);

            let (rule, bytes) = rule_set::parse_rule(bytes)?;

            let line = RleHeaderLine {
                cols,
                rows,
                set: Some(rule),
            };

            Ok((Some(line), parse_util::skip_line(bytes)))
        }
        Some(b'\n') | None => {
            let line = RleHeaderLine {
                cols,
                rows,
                set: None,
            };

            Ok((Some(line), bytes))
        }
        Some(b) => Err(RleHeaderLineError::InvalidToken { got: b as char }),
    }
}

#[derive(Debug, Error)]
pub enum RleEncodingError {
    #[error("Unexpected EOF")]
    UnexpectedEof,

    #[error("Failed to convert run length: {0}")]
    RunLength(#[from] ConvertError),

    #[error("Unrecognized byte: 0x{got:0X}")]
    UnrecognizedByte { got: u8 },

    #[error("Live cell at row {row}, column {col} lies outside the declared size")]
    OutOfBounds { row: usize, col: usize },

    #[error("Run of {rep} from {at} goes past {max}", max = MAX_EXTENT)]
    RunTooLong { at: usize, rep: usize },
}

/// Largest row or column a pattern may reach, far beyond any terminal
pub const MAX_EXTENT: usize = 1 << 16;

/// Move `at` forward by a run of `rep`, staying within [`MAX_EXTENT`]
fn advance(at: usize, rep: usize) -> Result<usize, RleEncodingError> {
    at.checked_add(rep)
        .filter(|&end| end <= MAX_EXTENT)
        .ok_or(RleEncodingError::RunTooLong { at, rep })
}

fn read_encoding<F>(mut bytes: &[u8], mut f: F) -> Result<(), RleEncodingError>
where
    F: FnMut(usize, usize) -> Result<(), RleEncodingError>,
{
    let mut rep: usize = 1;

    let (mut row, mut col) = (0, 0);

    loop {
        let Some(b) = parse_util::peek_1(bytes) else {
            return Err(RleEncodingError::UnexpectedEof);
        };

        match b {
            w if w.is_ascii_whitespace() => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;
            }

            // End of input
            b'!' => break,

            // Dead cell
            b'b' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                col = advance(col, rep)?;

                rep = 1;
            }

            // Live cell
            b'o' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                let end = advance(col, rep)?;

                for c in col..end {
                    f(row, c)?;
                }

                col = end;

                rep = 1;
            }

            // End of line
            b'$' => {
                let (_, rest) = parse_util::take_1(bytes);
                bytes = rest;

                row = advance(row, rep)?;
                col = 0;

                rep = 1;
            }

            n if n.is_ascii_digit() => {
                let (Some(n), rest) = parse_util::take_until_fn(|b| !b.is_ascii_digit(), bytes)
                else {
                    // Digits run to the end of the input
                    return Err(RleEncodingError::UnexpectedEof);
                };
                bytes = rest;

                rep = convert(n)?;
            }

            b => return Err(RleEncodingError::UnrecognizedByte { got: b }),
        }
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum RleCoordError {
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),

    #[error("Expected x coordinate, found end of input")]
    NoX,

    #[error("Failed to parse x coordinate: {0}")]
    ParseX(#[source] ConvertError),

    #[error("Expected y coordinate, found end of input")]
    NoY,

    #[error("Failed to parse y coordinate: {0}")]
    ParseY(#[source] ConvertError),
}

fn read_coordinates(bytes: &[u8]) -> Result<((usize, usize), &[u8]), RleCoordError> {
    let bytes = parse_util::expect(b'x', bytes)?;
    let bytes = parse_util::take_blank(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_blank(bytes);

    let (Some(x_bytes), bytes) = parse_util::take_with(b',', bytes) else {
        return Err(RleCoordError::NoX);
    };
    let x: usize = convert(x_bytes).map_err(RleCoordError::ParseX)?;

    let bytes = parse_util::take_blank(bytes);
    let bytes = parse_util::expect(b'y', bytes)?;
    let bytes = parse_util::take_blank(bytes);
    let bytes = parse_util::expect(b'=', bytes)?;
    let bytes = parse_util::take_blank(bytes);

    // Coordinates can be terminated with either `,`, `\n` or the end of input.
    let end = bytes
        .iter()
        .position(|&b| b == b',' || b == b'\n')
        .unwrap_or(bytes.len());
    if end == 0 {
        return Err(RleCoordError::NoY);
    }

    let (y_bytes, bytes) = bytes.split_at(end);
    let y: usize = convert(y_bytes).map_err(RleCoordError::ParseY)?;

    Ok(((x, y), bytes))
}

#[cfg(test)]
mod test {
    use super::RleEncodingError;
    use super::RleError;
    use super::read_rle;

    fn cells(bytes: &[u8]) -> Vec<(usize, usize)> {
        let mut v = Vec::new();
        read_rle(bytes, |r, c| v.push((r, c))).unwrap();
        v
    }

    #[test]
    fn read_coordinates() {
        let bytes = b"x = 1, y = 1\n";
        let ((x, y), rest) = super::read_coordinates(bytes.as_slice()).unwrap();

        assert_eq!((x, y), (1, 1));
        assert_eq!(rest, b"\n");
    }

    #[test]
    fn glider_rows_grow_downward() {
        let v = cells(b"x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!");

        assert_eq!(v, vec![(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]);
    }

    #[test]
    fn metadata_lines() {
        let bytes = b"#N Blinker\n#O John Conway\n#C A period 2 oscillator\nx = 3, y = 1\n3o!";
        let file = read_rle(bytes, |_, _| {}).unwrap();

        assert_eq!(file.name, Some(b"Blinker".as_slice()));
        assert_eq!(file.author, Some(b"John Conway".as_slice()));
        assert_eq!(file.size, Some((1, 3)));
    }

    #[test]
    fn crlf_name_is_trimmed() {
        let file = read_rle(b"#N Block\r\nx = 2, y = 2\r\n2o$2o!", |_, _| {}).unwrap();

        assert_eq!(file.name, Some(b"Block".as_slice()));
    }

    #[test]
    fn run_of_blank_rows() {
        let v = cells(b"o3$o!");

        assert_eq!(v, vec![(0, 0), (3, 0)]);
    }

    #[test]
    fn other_rules_are_rejected() {
        let res = read_rle(b"x = 3, y = 1, rule = B36/S23\n3o!", |_, _| {});

        assert!(matches!(res, Err(RleError::Rule(_))));

        let res = read_rle(b"#r 23/36\n3o!", |_, _| {});

        assert!(matches!(res, Err(RleError::Rule(_))));
    }

    #[test]
    fn cells_outside_header_size() {
        let res = read_rle(b"x = 2, y = 1\n3o!", |_, _| {});

        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::OutOfBounds { row: 0, col: 2 }))
        ));
    }

    #[test]
    fn overlong_runs() {
        for bytes in [
            b"18446744073709551615b2b!".as_slice(),
            b"18446744073709551615$2$o!",
            b"4294967296o!",
            b"65536bo!",
        ] {
            let mut n = 0;
            let res = read_rle(bytes, |_, _| n += 1);

            assert!(
                matches!(
                    res,
                    Err(RleError::Encoding(RleEncodingError::RunTooLong { .. }))
                ),
                "{:?}",
                String::from_utf8_lossy(bytes)
            );
            assert_eq!(n, 0);
        }

        // A run that ends exactly at the limit is fine
        assert_eq!(cells(b"65535bo!"), vec![(0, 65535)]);
    }

    #[test]
    fn missing_terminator() {
        let res = read_rle(b"x = 3, y = 1\n3o", |_, _| {});

        assert!(matches!(
            res,
            Err(RleError::Encoding(RleEncodingError::UnexpectedEof))
        ));
    }
}
