use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{Result, VizError};
use crate::tile::Tile;

/// Score attached to a frame. Integer and float literals are kept apart so
/// the footer prints the score the way the simulation wrote it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Score {
    Int(i64),
    Float(f64),
}

impl Score {
    pub fn value(&self) -> f64 {
        match self {
            Score::Int(v) => *v as f64,
            Score::Float(v) => *v,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Int(v) => write!(f, "{}", v),
            Score::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Formats like Python 2's `str(float)`: 12 significant digits, exponent
/// form outside `1e-4 ..= 1e12`, and a trailing `.0` on whole numbers.
fn format_float(v: f64) -> String {
    if v.is_nan() {
        return String::from("nan");
    }
    if v.is_infinite() {
        return String::from(if v > 0.0 { "inf" } else { "-inf" });
    }

    let sci = format!("{:.11e}", v);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exp < -4 || exp >= 12 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let fixed = format!("{:.*}", (11 - exp) as usize, v);
        let fixed = trim_fraction(&fixed);
        if fixed.contains('.') {
            fixed.to_string()
        } else {
            format!("{}.0", fixed)
        }
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub score: Score,
    pub grid: Vec<Vec<Tile>>,
}

impl Frame {
    pub fn new(score: Score, grid: Vec<Vec<Tile>>) -> Self {
        Frame {
            score: score,
            grid: grid,
        }
    }

    /// Column count of the longest row. Rows are not required to agree.
    pub fn width(&self) -> usize {
        self.grid.iter().map(|row| row.len()).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.grid.len()
    }

    /// Every cell as `(column, row, tile)`, row-major.
    pub fn tiles(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.grid.iter().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, tile)| (x, y, *tile))
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("expected {expected} at column {}, found {}", .offset + 1, describe(.found))]
pub struct ParseError {
    pub offset: usize,
    pub expected: &'static str,
    pub found: Option<char>,
}

fn describe(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("{:?}", c),
        None => String::from("end of line"),
    }
}

/// Parses one frame record: `(score, [['p', 'w', ...], ...])`.
///
/// Rows and the grid may be lists or tuples, strings may use either quote
/// style, and trailing commas are accepted.
pub fn parse_frame(line: &str) -> std::result::Result<Frame, ParseError> {
    let mut cursor = Cursor::new(line);

    cursor.skip_ws();
    cursor.expect('(', "'('")?;
    cursor.skip_ws();
    let score = cursor.score()?;
    cursor.skip_ws();
    cursor.expect(',', "','")?;
    cursor.skip_ws();
    let grid = cursor.sequence(|c| c.sequence(Cursor::tile))?;
    cursor.skip_ws();
    if cursor.peek() == Some(',') {
        cursor.bump();
        cursor.skip_ws();
    }
    cursor.expect(')', "')'")?;
    cursor.skip_ws();
    if cursor.peek().is_some() {
        return Err(cursor.error("end of line"));
    }

    Ok(Frame::new(score, grid))
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Cursor { src: src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn error(&self, expected: &'static str) -> ParseError {
        ParseError {
            offset: self.pos,
            expected: expected,
            found: self.peek(),
        }
    }

    fn expect(&mut self, c: char, expected: &'static str) -> std::result::Result<(), ParseError> {
        if self.peek() == Some(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn score(&mut self) -> std::result::Result<Score, ParseError> {
        let start = self.pos;
        if let Some('+') | Some('-') = self.peek() {
            self.bump();
        }

        let mut is_float = false;
        let mut digits = 0;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => digits += 1,
                '.' => is_float = true,
                'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if let Some('+') | Some('-') = self.peek() {
                        self.bump();
                    }
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let text = &self.src[start..self.pos];
        let parsed = if digits == 0 {
            None
        } else if is_float {
            text.parse::<f64>().ok().map(Score::Float)
        } else {
            text.parse::<i64>().ok().map(Score::Int)
        };

        parsed.ok_or(ParseError {
            offset: start,
            expected: "a numeric score",
            found: self.src[start..].chars().next(),
        })
    }

    /// A bracketed, comma separated sequence: `[a, b]` or `(a, b)`.
    fn sequence<T>(
        &mut self,
        mut item: impl FnMut(&mut Self) -> std::result::Result<T, ParseError>,
    ) -> std::result::Result<Vec<T>, ParseError> {
        let close = match self.peek() {
            Some('[') => ']',
            Some('(') => ')',
            _ => return Err(self.error("'[' or '('")),
        };
        self.bump();

        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(items);
            }
            items.push(item(self)?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                _ => {
                    return Err(self.error(if close == ']' {
                        "',' or ']'"
                    } else {
                        "',' or ')'"
                    }))
                }
            }
        }
    }

    fn tile(&mut self) -> std::result::Result<Tile, ParseError> {
        let quote = match self.peek() {
            Some(q @ '\'') | Some(q @ '"') => q,
            _ => return Err(self.error("a quoted tile code")),
        };
        self.bump();

        let code = match self.peek() {
            Some(c) if c != quote => c,
            _ => return Err(self.error("a single-character tile code")),
        };
        self.bump();

        if self.peek() != Some(quote) {
            return Err(self.error("closing quote after a single-character tile code"));
        }
        self.bump();

        Ok(Tile::from_code(code))
    }
}

/// Frames read from a log file, in file order.
#[derive(Clone, Debug, Default)]
pub struct FrameLog {
    pub frames: Vec<Frame>,
    pub skipped: usize,
}

impl FrameLog {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<FrameLog> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| VizError::io(path, e))?;
        let log = FrameLog::parse(&text);
        debug!(
            path = %path.display(),
            frames = log.frames.len(),
            skipped = log.skipped,
            "read frame log"
        );
        Ok(log)
    }

    /// Parses every non-blank line. Malformed records are skipped with a
    /// warning rather than failing the whole log.
    pub fn parse(text: &str) -> FrameLog {
        let mut log = FrameLog::default();
        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_frame(line) {
                Ok(frame) => log.frames.push(frame),
                Err(source) => {
                    let err = VizError::Parse {
                        line: i + 1,
                        source: source,
                    };
                    warn!("skipping frame record: {}", err);
                    log.skipped += 1;
                }
            }
        }
        log
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
