use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DimensionError {
    #[error("Image dimensions must be positive, got {width}x{height}")]
    NonPositive { width: i64, height: i64 },
    #[error("Pixel buffer holds {actual} pixels, expected {expected}")]
    PixelCountMismatch { expected: usize, actual: usize },
    #[error("Image of {width}x{height} pixels does not fit the bitmap size fields")]
    TooLarge { width: usize, height: usize },
    #[error("Cell ({row}, {column}) lies outside a {width}x{height} grid")]
    CellOutOfBounds {
        row: usize,
        column: usize,
        width: usize,
        height: usize,
    },
}

/// One pixel, stored logically as (r, g, b).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// On-disk channel order.
    pub fn to_bgr(self) -> [u8; 3] {
        [self.b, self.g, self.r]
    }

    pub fn from_bgr(bytes: [u8; 3]) -> Self {
        Self::new(bytes[2], bytes[1], bytes[0])
    }
}

/// The 8 neighbor offsets as (row, column), (0, 0) excluded.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Row-major `width * height` buffer of colors, addressed as a torus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl PixelGrid {
    pub fn new(width: usize, height: usize, pixels: Vec<Color>) -> Result<Self, DimensionError> {
        if width == 0 || height == 0 {
            return Err(DimensionError::NonPositive {
                width: width as i64,
                height: height as i64,
            });
        }
        let expected = width
            .checked_mul(height)
            .ok_or(DimensionError::TooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(DimensionError::PixelCountMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: usize, height: usize, color: Color) -> Result<Self, DimensionError> {
        let len = width
            .checked_mul(height)
            .ok_or(DimensionError::TooLarge { width, height })?;
        Self::new(width, height, vec![color; len])
    }

    /// Builds a white grid with the given `(row, column)` cells painted black.
    pub fn from_cells<I>(width: usize, height: usize, cells: I) -> Result<Self, DimensionError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut grid = Self::filled(width, height, Color::WHITE)?;
        for (row, column) in cells {
            if row >= height || column >= width {
                return Err(DimensionError::CellOutOfBounds {
                    row,
                    column,
                    width,
                    height,
                });
            }
            grid.set(row, column, Color::BLACK);
        }
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    pub fn index(&self, row: usize, column: usize) -> usize {
        row * self.width + column
    }

    #[inline]
    pub fn coords(&self, idx: usize) -> (usize, usize) {
        (idx / self.width, idx % self.width)
    }

    #[inline]
    pub fn get(&self, row: usize, column: usize) -> Color {
        self.pixels[self.index(row, column)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, column: usize, color: Color) {
        let idx = self.index(row, column);
        self.pixels[idx] = color;
    }

    /// Rows from top to bottom.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, Color> {
        self.pixels.chunks_exact(self.width)
    }

    /// Coordinate reached from `(row, column)` by the given offset, wrapping on both axes.
    #[inline]
    pub fn wrap(
        &self,
        row: usize,
        column: usize,
        row_offset: isize,
        column_offset: isize,
    ) -> (usize, usize) {
        let r = (row as isize + row_offset).rem_euclid(self.height as isize) as usize;
        let c = (column as isize + column_offset).rem_euclid(self.width as isize) as usize;
        (r, c)
    }

    /// The 8 toroidal neighbors of a cell. On grids narrower than 3 cells the
    /// same coordinate can appear more than once.
    pub fn neighbors(&self, row: usize, column: usize) -> [(usize, usize); 8] {
        NEIGHBOR_OFFSETS.map(|(dr, dc)| self.wrap(row, column, dr, dc))
    }

    /// Number of pure black pixels.
    pub fn live_count(&self) -> usize {
        self.pixels.iter().filter(|&&p| p == Color::BLACK).count()
    }
}
