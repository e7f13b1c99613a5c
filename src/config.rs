use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::pattern::Preset;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 10;
pub const DEFAULT_SPEED: u8 = 5;

/// Cell sizes are in braille dots
pub const MIN_CELL_SIZE: usize = 1;
pub const MAX_CELL_SIZE: usize = 8;
pub const DEFAULT_CELL_SIZE: usize = 2;

/// Chance of a cell being alive after randomizing
pub const DEFAULT_DENSITY: f64 = 0.3;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Speed must be between {min} and {max}, got {0}", min = MIN_SPEED, max = MAX_SPEED)]
    Speed(u8),

    #[error(
        "Cell size must be between {min} and {max}, got {0}",
        min = MIN_CELL_SIZE,
        max = MAX_CELL_SIZE
    )]
    CellSize(usize),

    #[error("Density must be between 0 and 1, got {0}")]
    Density(f64),
}

/// Game of Life on a torus, in your terminal
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Generations per second
    #[arg(short, long, default_value_t = DEFAULT_SPEED)]
    pub speed: u8,

    /// Side length of a cell, in braille dots
    #[arg(short, long, default_value_t = DEFAULT_CELL_SIZE)]
    pub cell_size: usize,

    /// Fraction of cells alive after randomizing
    #[arg(short, long, default_value_t = DEFAULT_DENSITY)]
    pub density: f64,

    /// Seed for the random number generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Preset to load on startup: glider, blinker, toad, beacon, pulsar or glider-gun
    #[arg(short, long)]
    pub pattern: Option<Preset>,

    /// RLE pattern file, loaded on startup and bound to `f`
    #[arg(short = 'f', long)]
    pub pattern_file: Option<PathBuf>,

    /// Draw cells edge to edge, without a gap between them
    #[arg(long)]
    pub no_gaps: bool,

    /// Write logs to this file. Filtered with `RUST_LOG`
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Validated simulator settings
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub speed: u8,
    pub cell_size: usize,
    pub density: f64,
    pub seed: Option<u64>,
    pub gaps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            cell_size: DEFAULT_CELL_SIZE,
            density: DEFAULT_DENSITY,
            seed: None,
            gaps: true,
        }
    }
}

impl Settings {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(MIN_SPEED..=MAX_SPEED).contains(&self.speed) {
            return Err(ConfigError::Speed(self.speed));
        }

        if !(MIN_CELL_SIZE..=MAX_CELL_SIZE).contains(&self.cell_size) {
            return Err(ConfigError::CellSize(self.cell_size));
        }

        if !(0.0..=1.0).contains(&self.density) {
            return Err(ConfigError::Density(self.density));
        }

        Ok(self)
    }
}

impl TryFrom<&Args> for Settings {
    type Error = ConfigError;

    fn try_from(args: &Args) -> Result<Self, Self::Error> {
        Settings {
            speed: args.speed,
            cell_size: args.cell_size,
            density: args.density,
            seed: args.seed,
            gaps: !args.no_gaps,
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;
    use super::ConfigError;
    use super::Settings;
    use crate::pattern::Preset;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["torus-life"]);
        let settings = Settings::try_from(&args).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(args.pattern.is_none());
    }

    #[test]
    fn flags() {
        let args = Args::parse_from([
            "torus-life",
            "--speed",
            "10",
            "-c",
            "4",
            "--density",
            "0.5",
            "--seed",
            "42",
            "--pattern",
            "gliderGun",
            "--no-gaps",
        ]);
        let settings = Settings::try_from(&args).unwrap();

        assert_eq!(settings.speed, 10);
        assert_eq!(settings.cell_size, 4);
        assert_eq!(settings.seed, Some(42));
        assert!(!settings.gaps);
        assert_eq!(args.pattern, Some(Preset::GliderGun));
    }

    #[test]
    fn out_of_range() {
        let bad = |f: fn(&mut Settings)| {
            let mut s = Settings::default();
            f(&mut s);
            s.validate().unwrap_err()
        };

        assert_eq!(bad(|s| s.speed = 0), ConfigError::Speed(0));
        assert_eq!(bad(|s| s.speed = 11), ConfigError::Speed(11));
        assert_eq!(bad(|s| s.cell_size = 9), ConfigError::CellSize(9));
        assert_eq!(bad(|s| s.density = 1.5), ConfigError::Density(1.5));
    }

    #[test]
    fn unknown_pattern_is_rejected() {
        assert!(Args::try_parse_from(["torus-life", "--pattern", "lwss"]).is_err());
    }
}
