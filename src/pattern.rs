use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::parse_rle;
use crate::parse_rle::RleError;

/// A fixed arrangement of live cells inside a `rows` by `cols` bounding box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    name: String,
    rows: usize,
    cols: usize,

    /// `(row, col)` offsets of live cells, relative to the top left of the box
    cells: Vec<(usize, usize)>,
}

impl Pattern {
    /// Decode a pattern from RLE text.
    ///
    /// The box is taken from the header line when there is one, otherwise it's the extent of the
    /// live cells. Without a `#N` line the pattern is called `untitled`.
    pub fn from_rle(bytes: &[u8]) -> Result<Self, RleError> {
        let mut cells = Vec::new();
        let file = parse_rle::read_rle(bytes, |row, col| cells.push((row, col)))?;

        let (rows, cols) = file.size.unwrap_or_else(|| {
            cells.iter().fold((0, 0), |(rows, cols), &(r, c)| {
                (rows.max(r + 1), cols.max(c + 1))
            })
        });

        let name = file
            .name
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .unwrap_or_else(|| "untitled".to_string());

        Ok(Self {
            name,
            rows,
            cols,
            cells,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.len()
    }

    /// Loose name comparison: case, spaces, dashes and underscores are ignored.
    pub fn is_named(&self, name: &str) -> bool {
        normalize(&self.name) == normalize(name)
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The built-in patterns
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    Glider,
    Blinker,
    Toad,
    Beacon,
    Pulsar,
    GliderGun,
}

impl Preset {
    /// Menu order. Preset `i` is bound to key `i + 1`.
    pub const ALL: [Preset; 6] = [
        Preset::Glider,
        Preset::Blinker,
        Preset::Toad,
        Preset::Beacon,
        Preset::Pulsar,
        Preset::GliderGun,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Glider => "glider",
            Preset::Blinker => "blinker",
            Preset::Toad => "toad",
            Preset::Beacon => "beacon",
            Preset::Pulsar => "pulsar",
            Preset::GliderGun => "glider-gun",
        }
    }

    /// RLE source of the preset
    pub fn rle(self) -> &'static str {
        match self {
            Preset::Glider => GLIDER,
            Preset::Blinker => BLINKER,
            Preset::Toad => TOAD,
            Preset::Beacon => BEACON,
            Preset::Pulsar => PULSAR,
            Preset::GliderGun => GLIDER_GUN,
        }
    }

    pub fn pattern(self) -> Pattern {
        // The sources are constants covered by tests.
        match Pattern::from_rle(self.rle().as_bytes()) {
            Ok(pattern) => pattern,
            Err(e) => unreachable!("built-in pattern {} is invalid: {e}", self.name()),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("Unknown pattern \"{0}\"")]
pub struct UnknownPreset(pub String);

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "glider" => Ok(Preset::Glider),
            "blinker" => Ok(Preset::Blinker),
            "toad" => Ok(Preset::Toad),
            "beacon" => Ok(Preset::Beacon),
            "pulsar" => Ok(Preset::Pulsar),
            "glidergun" | "gun" | "gosperglidergun" => Ok(Preset::GliderGun),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

const GLIDER: &str = "\
#N glider
#C Moves one cell down and to the right every 4 generations.
x = 3, y = 3, rule = B3/S23
bo$2bo$3o!
";

const BLINKER: &str = "\
#N blinker
x = 3, y = 1, rule = B3/S23
3o!
";

const TOAD: &str = "\
#N toad
x = 4, y = 2, rule = B3/S23
b3o$3o!
";

const BEACON: &str = "\
#N beacon
x = 4, y = 4, rule = B3/S23
2o$2o$2b2o$2b2o!
";

const PULSAR: &str = "\
#N pulsar
x = 13, y = 13, rule = B3/S23
2b3o3b3o2$o4bobo4bo$o4bobo4bo$o4bobo4bo$2b3o3b3o2$2b3o3b3o$o4bobo4bo$
o4bobo4bo$o4bobo4bo2$2b3o3b3o!
";

const GLIDER_GUN: &str = "\
#N glider-gun
#O Bill Gosper
x = 36, y = 9, rule = B3/S23
24bo$22bobo$12b2o6b2o12b2o$11bo3bo4b2o12b2o$2o8bo5bo3b2o$2o8bo3bob2o4b
obo$10bo5bo7bo$11bo3bo$12b2o!
";
