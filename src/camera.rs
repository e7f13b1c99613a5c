use crate::ScreenSize;
use crate::grid::Grid;

/// Hex values of braille dots
///
/// ```text
///  1   8
///  2  10
///  4  20
/// 40  80
/// ```
///
/// Where the base blank pattern is codepoint `0x2800` (or U+2800)
///
/// To get other configurations, just add the numbers above.
const BRAILLE_EMPTY: u32 = 0x2800;

/// Rows at the bottom of the terminal kept for the status line
pub const STATUS_ROWS: ScreenSize = 1;

/// Turns a [`Grid`] into braille text.
///
/// The camera works in dots: a terminal character is 2 dots wide and 4 dots tall. Every grid cell
/// is drawn as a square of `cell_size` dots, starting from the top left of the screen.
pub struct Camera {
    /// The dot buffer
    cb: Vec<bool>,

    /// The frame buffer.
    fb: String,

    /// Codepoints. This allows us to construct the framebuffer more easily
    cp: Vec<u32>,

    /// Width of the dot buffer
    w: usize,

    /// Height of the dot buffer
    h: usize,
}

impl Camera {
    /// Create a camera covering a terminal of `cols` by `rows` characters, minus the status line.
    pub fn for_terminal(cols: ScreenSize, rows: ScreenSize) -> Self {
        let (w, h) = Self::dots_for(cols, rows);

        Self::new(w, h)
    }

    /// Create a camera with a `w` by `h` dot buffer
    pub fn new(w: usize, h: usize) -> Self {
        // Let `w` and `h` refer to width and height of the dot buffer. Then `bw = ceil(w / 2)`
        // and `bh = ceil(h / 4)` are the width and height of braille characters of our framebuffer
        // (that is, not accounting for the trailing newlines expected at the end of each line).
        let (bw, bh) = (w.div_ceil(2), h.div_ceil(4));

        // Each braille character is 3 bytes, and newlines one byte.
        let fb = String::with_capacity(3 * (bw * bh) + bh);

        Self {
            cb: vec![false; w * h],
            fb,
            cp: vec![BRAILLE_EMPTY; bw * bh],
            w,
            h,
        }
    }

    /// Dot dimensions available on a terminal of `cols` by `rows` characters
    pub fn dots_for(cols: ScreenSize, rows: ScreenSize) -> (usize, usize) {
        let rows = rows.saturating_sub(STATUS_ROWS);

        (cols as usize * 2, rows as usize * 4)
    }

    /// Number of `(rows, cols)` of cells that fit on screen at the given cell size
    pub fn grid_dims(&self, cell_size: usize) -> (usize, usize) {
        let s = cell_size.max(1);

        (self.h / s, self.w / s)
    }

    /// The grid cell under the centre dot of terminal character `(col, row)`.
    pub fn cell_at(
        &self,
        col: ScreenSize,
        row: ScreenSize,
        cell_size: usize,
    ) -> Option<(usize, usize)> {
        let s = cell_size.max(1);
        let (x, y) = (col as usize * 2 + 1, row as usize * 4 + 2);

        let (rows, cols) = self.grid_dims(s);
        let (r, c) = (y / s, x / s);

        (r < rows && c < cols).then_some((r, c))
    }

    /// Turns on a single pixel of the framebuffer. Out of range pixels are ignored.
    pub fn draw_pixel(&mut self, x: usize, y: usize) {
        if x < self.w && y < self.h {
            let i = self.xy_from(x, y);

            self.cb[i] = true;
        }
    }

    /// Turns on a square of `s` by `s` pixels with its top left corner at `(x, y)`, clipped to
    /// the framebuffer.
    pub fn draw_square(&mut self, x: usize, y: usize, s: usize) {
        for dy in 0..s {
            for dx in 0..s {
                self.draw_pixel(x + dx, y + dy);
            }
        }
    }

    /// Draw every live cell of `grid`.
    ///
    /// With `gaps`, cells of size 3 and up keep a one dot dark border on their top and left
    /// edges, which reads as a grid between neighboring cells.
    pub fn draw(&mut self, grid: &Grid, cell_size: usize, gaps: bool) {
        let s = cell_size.max(1);
        let inset = usize::from(gaps && s >= 3);

        for (row, col) in grid.live_cells() {
            self.draw_square(col * s + inset, row * s + inset, s - inset);
        }
    }

    /// Reset the cell buffer
    pub fn reset(&mut self) {
        self.cb.fill(false);
    }

    /// Fundamentally, we have a framebuffer of every pixel on our screen, and we ask ourselves "Is
    /// this pixel on or off?".
    pub fn render(&mut self) -> &str {
        let bw = self.w.div_ceil(2);

        // compute new codepoints
        self.cp.fill(BRAILLE_EMPTY);

        for (n, &px) in self.cb.iter().enumerate() {
            if px {
                let (x, y) = self.xy_to(n);
                self.cp[(y / 4) * bw + (x / 2)] += Self::get_hex_value(x, y);
            }
        }

        // update framebuffer
        self.fb.clear();

        for (i, &c) in self.cp.iter().enumerate() {
            if i > 0 && i % bw == 0 {
                self.fb.push('\n');
            }

            // Every sum of dot values stays within U+2800..=U+28FF
            self.fb.push(char::from_u32(c).unwrap_or(' '));
        }

        if !self.cp.is_empty() {
            self.fb.push('\n');
        }

        &self.fb
    }

    fn xy_to(&self, n: usize) -> (usize, usize) {
        (n % self.w, n / self.w)
    }

    fn xy_from(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    fn get_hex_value(x: usize, y: usize) -> u32 {
        match (x % 2, y % 4) {
            (0, 0) => 0x1,
            (1, 0) => 0x8,
            (0, 1) => 0x2,
            (1, 1) => 0x10,
            (0, 2) => 0x4,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => unreachable!(),
        }
    }
}
