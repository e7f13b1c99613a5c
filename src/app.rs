use std::time::Duration;
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::ScreenSize;
use crate::camera::Camera;
use crate::config::MAX_CELL_SIZE;
use crate::config::MAX_SPEED;
use crate::config::MIN_CELL_SIZE;
use crate::config::MIN_SPEED;
use crate::config::Settings;
use crate::events::Command;
use crate::grid::Grid;
use crate::pacer::Pacer;
use crate::pattern::Pattern;
use crate::pattern::Preset;

/// What the event loop should do after a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// The simulator: a grid, the state of the controls, and the view onto it.
pub struct App {
    grid: Grid,
    camera: Camera,
    pacer: Pacer,
    rng: StdRng,

    generation: u64,
    running: bool,
    speed: u8,
    cell_size: usize,
    density: f64,
    gaps: bool,

    /// Pattern read from disk at startup, if any
    custom: Option<Pattern>,

    /// Name of the last pattern loaded, for the status line
    loaded: Option<String>,
}

impl App {
    /// Create a paused simulator with an empty grid filling a `cols` by `rows` terminal.
    pub fn new(settings: Settings, cols: ScreenSize, rows: ScreenSize) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let speed = settings.speed.clamp(MIN_SPEED, MAX_SPEED);
        let cell_size = settings.cell_size.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);

        let camera = Camera::for_terminal(cols, rows);
        let (grid_rows, grid_cols) = camera.grid_dims(cell_size);

        info!(grid_rows, grid_cols, speed, cell_size, "Simulator created");

        Self {
            grid: Grid::new(grid_rows, grid_cols),
            camera,
            pacer: Pacer::new(speed as u32),
            rng,
            generation: 0,
            running: false,
            speed,
            cell_size,
            density: settings.density,
            gaps: settings.gaps,
            custom: None,
            loaded: None,
        }
    }

    /// Make `pattern` available to [`App::load_pattern`] and [`Command::LoadFile`].
    pub fn with_custom_pattern(mut self, pattern: Pattern) -> Self {
        self.custom = Some(pattern);
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn cell_size(&self) -> usize {
        self.cell_size
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }

        self.running = true;
        self.pacer.restart();
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle_running(&mut self) {
        if self.running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Advance one generation, whether or not the simulation is running
    pub fn step_once(&mut self) {
        self.grid.step();
        self.generation += 1;
    }

    /// Pause, empty the grid and restart the generation count
    pub fn reset(&mut self) {
        self.pause();
        self.generation = 0;
        self.grid.clear();
        self.loaded = None;
    }

    /// Pause and empty the grid. The generation count is kept.
    pub fn clear(&mut self) {
        self.pause();
        self.grid.clear();
        self.loaded = None;
    }

    /// Pause and fill the grid at random with the configured density
    pub fn randomize(&mut self) {
        self.pause();
        self.generation = 0;
        self.grid.randomize(self.density, &mut self.rng);
        self.loaded = None;
    }

    /// Clear the grid and stamp the pattern called `name` in the middle.
    ///
    /// Names are looked up among the presets first, then the custom pattern. Returns `false`
    /// and leaves everything as-is if nothing matches.
    pub fn load_pattern(&mut self, name: &str) -> bool {
        let pattern = match name.parse::<Preset>() {
            Ok(preset) => preset.pattern(),
            Err(_) => match self.custom.as_ref().filter(|p| p.is_named(name)) {
                Some(pattern) => pattern.clone(),
                None => {
                    warn!(name, "Unknown pattern");
                    return false;
                }
            },
        };

        self.stamp(&pattern);

        true
    }

    /// Load the custom pattern. Returns `false` if there is none.
    pub fn load_custom(&mut self) -> bool {
        let Some(pattern) = self.custom.clone() else {
            warn!("No pattern file was given");
            return false;
        };

        self.stamp(&pattern);

        true
    }

    fn stamp(&mut self, pattern: &Pattern) {
        self.clear();
        self.grid.stamp(pattern);
        self.loaded = Some(pattern.name().to_string());

        if pattern.rows() > self.grid.rows() || pattern.cols() > self.grid.cols() {
            debug!(pattern = pattern.name(), "Pattern clipped to the grid");
        }
    }

    pub fn set_speed(&mut self, speed: u8) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
        self.pacer.set_fps(self.speed as u32);
    }

    /// Change the cell size. The grid is rebuilt empty at its new dimensions.
    pub fn set_cell_size(&mut self, cell_size: usize) {
        self.cell_size = cell_size.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE);
        self.rebuild_grid();
    }

    /// The terminal changed size. The grid is rebuilt empty at its new dimensions.
    pub fn resize(&mut self, cols: ScreenSize, rows: ScreenSize) {
        self.camera = Camera::for_terminal(cols, rows);
        self.rebuild_grid();
    }

    fn rebuild_grid(&mut self) {
        let (rows, cols) = self.camera.grid_dims(self.cell_size);
        self.grid.resize(rows, cols);
        self.loaded = None;

        debug!(rows, cols, "Grid rebuilt");
    }

    /// Flip a cell. Out of range coordinates are ignored.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> bool {
        self.grid.toggle(row, col)
    }

    /// Run a generation if one is due. Returns whether the grid changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.running || !self.pacer.tick(now) {
            return false;
        }

        self.step_once();

        true
    }

    /// How long until the next generation is due, or `None` while paused
    pub fn time_left(&self, now: Instant) -> Option<Duration> {
        self.running.then(|| self.pacer.time_left(now))
    }

    pub fn apply(&mut self, command: Command) -> Flow {
        debug!(?command, "Applying command");

        match command {
            Command::Exit => return Flow::Exit,
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::TogglePlay => self.toggle_running(),
            Command::Step => self.step_once(),
            Command::Reset => self.reset(),
            Command::Clear => self.clear(),
            Command::Randomize => self.randomize(),
            Command::Speed(delta) => {
                self.set_speed(self.speed.saturating_add_signed(delta));
            }
            Command::CellSize(delta) => {
                self.set_cell_size(self.cell_size.saturating_add_signed(delta as isize));
            }
            Command::ToggleGaps => self.gaps = !self.gaps,
            Command::LoadPreset(preset) => {
                self.load_pattern(preset.name());
            }
            Command::LoadFile => {
                self.load_custom();
            }
            Command::ToggleAt { col, row } => {
                if let Some((r, c)) = self.camera.cell_at(col, row, self.cell_size) {
                    self.toggle_cell(r, c);
                }
            }
            Command::Resize { cols, rows } => self.resize(cols, rows),
        }

        Flow::Continue
    }

    /// Draw the grid and return the braille frame
    pub fn frame(&mut self) -> &str {
        self.camera.reset();
        self.camera.draw(&self.grid, self.cell_size, self.gaps);
        self.camera.render()
    }

    /// One line summary of the simulation state
    pub fn status(&self) -> String {
        let state = if self.running { "running" } else { "paused" };

        let mut s = format!(
            "gen {} | pop {} | speed {} | cell {} | {}x{} | {state}",
            self.generation,
            self.grid.population(),
            self.speed,
            self.cell_size,
            self.grid.cols(),
            self.grid.rows(),
        );

        if let Some(name) = &self.loaded {
            s.push_str(" | ");
            s.push_str(name);
        }

        s
    }
}
