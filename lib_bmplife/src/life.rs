//! Conway's Game of Life over a bitmap: black pixels are live cells, white
//! pixels are dead ones, and the grid wraps around on both axes.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bitmap::Image;
use crate::grid::{Color, PixelGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Alive,
    Dead,
}

impl CellState {
    pub fn color(self) -> Color {
        match self {
            CellState::Alive => Color::BLACK,
            CellState::Dead => Color::WHITE,
        }
    }

    #[inline]
    pub fn is_alive(self) -> bool {
        self == CellState::Alive
    }
}

/// A pixel that is neither pure black nor pure white.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[error(
    "Unsupported color ({}, {}, {}) at row {}, column {}",
    .color.r, .color.g, .color.b, .row, .column
)]
pub struct UnsupportedColorError {
    pub row: usize,
    pub column: usize,
    pub color: Color,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// The next generation is pixel-identical to the previous one.
    pub stable: bool,
    /// The next generation has no live cells.
    pub extinct: bool,
    pub live_cells: usize,
    pub births: usize,
    pub deaths: usize,
    /// Pixels that were treated as dead because of their color.
    pub unsupported: Vec<UnsupportedColorError>,
}

pub fn classify(
    color: Color,
    row: usize,
    column: usize,
) -> Result<CellState, UnsupportedColorError> {
    match color {
        Color::BLACK => Ok(CellState::Alive),
        Color::WHITE => Ok(CellState::Dead),
        color => Err(UnsupportedColorError { row, column, color }),
    }
}

/// Survival on 2 or 3 neighbors, birth on exactly 3.
#[inline]
pub fn next_state(current: CellState, alive_neighbors: usize) -> CellState {
    match (current, alive_neighbors) {
        (CellState::Alive, 2) | (CellState::Alive, 3) => CellState::Alive,
        (CellState::Dead, 3) => CellState::Alive,
        _ => CellState::Dead,
    }
}

/// Computes the next generation. Neighbor counts only ever read `grid`,
/// the result is written into a separate buffer.
pub fn step(grid: &PixelGrid) -> (PixelGrid, StepReport) {
    let mut report = StepReport::default();

    let states: Vec<CellState> = grid
        .pixels()
        .iter()
        .enumerate()
        .map(|(idx, &color)| {
            let (row, column) = grid.coords(idx);
            classify(color, row, column).unwrap_or_else(|err| {
                warn!("{}, treating it as dead", err);
                report.unsupported.push(err);
                CellState::Dead
            })
        })
        .collect();

    let mut next = grid.clone();
    for (idx, &current) in states.iter().enumerate() {
        let (row, column) = grid.coords(idx);
        let alive_neighbors = grid
            .neighbors(row, column)
            .iter()
            .filter(|&&(r, c)| states[grid.index(r, c)].is_alive())
            .count();

        let state = next_state(current, alive_neighbors);
        match (current, state) {
            (CellState::Dead, CellState::Alive) => report.births += 1,
            (CellState::Alive, CellState::Dead) => report.deaths += 1,
            _ => {}
        }
        if state.is_alive() {
            report.live_cells += 1;
        }
        next.set(row, column, state.color());
    }

    report.stable = next.pixels() == grid.pixels();
    report.extinct = report.live_cells == 0;
    debug!(
        "Step: {} live, {} births, {} deaths, stable={}, extinct={}",
        report.live_cells, report.births, report.deaths, report.stable, report.extinct
    );

    (next, report)
}

/// Steps an image in place of its previous generation; headers carry over.
pub fn step_image(mut image: Image) -> (Image, StepReport) {
    let (next, report) = step(image.pixels());
    let previous = image.swap_generation(next);
    drop(previous);
    (image, report)
}
