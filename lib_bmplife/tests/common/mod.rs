#![allow(dead_code)]

use lib_bmplife::{Color, Image, PixelGrid};

pub const BLOCK: [(usize, usize); 4] = [(1, 1), (1, 2), (2, 1), (2, 2)];
pub const BLINKER_HORIZONTAL: [(usize, usize); 3] = [(2, 1), (2, 2), (2, 3)];
pub const BLINKER_VERTICAL: [(usize, usize); 3] = [(1, 2), (2, 2), (3, 2)];
pub const GLIDER: [(usize, usize); 5] = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];

pub fn pattern(width: usize, height: usize, cells: &[(usize, usize)]) -> PixelGrid {
    PixelGrid::from_cells(width, height, cells.iter().copied()).unwrap()
}

pub fn pattern_image(width: usize, height: usize, cells: &[(usize, usize)]) -> Image {
    Image::from_grid(pattern(width, height, cells)).unwrap()
}

/// Deterministic black and white noise.
pub fn checker_noise(width: usize, height: usize, seed: usize) -> Vec<Color> {
    (0..width * height)
        .map(|i| {
            if (i * 7 + seed * 13 + i / 3) % 5 < 2 {
                Color::BLACK
            } else {
                Color::WHITE
            }
        })
        .collect()
}
