//! Built-in sample matrices used when no collection has been saved yet.

use crate::color::Color;
use crate::models::{BitmapMatrix, Grid};

const HEART: [&str; 8] = [
    ".RR...RR...",
    "RRRR.RRRR..",
    "RRRRRRRRR..",
    "RRRRRRRRR..",
    ".RRRRRRR...",
    "..RRRRR....",
    "...RRR.....",
    "....R......",
];

const GHOST: [&str; 13] = [
    "....BBBBBB....",
    "..BBBBBBBBBB..",
    ".BBBBBBBBBBBB.",
    "BBBBBBBBBBBBBB",
    "BBBWWBBBBWWBBB",
    "BBWWPWBBWWPWBB",
    "BBWWPWBBWWPWBB",
    "BBBWWBBBBWWBBB",
    "BBBBBBBBBBBBBB",
    "BBBBBBBBBBBBBB",
    "BBBBBBBBBBBBBB",
    "BB.BB.BB.BB.BB",
    "B...B..B..B..B",
];

/// Expand a character pattern into a `width`x`height` grid. Rows past the
/// end of the pattern stay empty.
fn from_pattern(width: usize, height: usize, pattern: &[&str], key: &[(char, Color)]) -> Grid {
    let mut grid = vec![vec![None; width]; height];
    for (y, row) in pattern.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            grid[y][x] = key.iter().find(|(k, _)| *k == ch).map(|(_, c)| *c);
        }
    }
    grid
}

/// Red heart, 11x10.
pub fn heart() -> BitmapMatrix {
    let red = Color::rgb(0xef, 0x44, 0x44);
    let grid = from_pattern(11, 10, &HEART, &[('R', red)]);
    BitmapMatrix::from_parts("Heart".to_string(), 11, 10, grid)
        .expect("heart pattern matches its dimensions")
}

/// Blue arcade ghost, 14x14.
pub fn ghost() -> BitmapMatrix {
    let key = [
        ('B', Color::rgb(0x3b, 0x82, 0xf6)),
        ('W', Color::rgb(0xff, 0xff, 0xff)),
        ('P', Color::rgb(0x00, 0x00, 0x00)),
    ];
    let grid = from_pattern(14, 14, &GHOST, &key);
    BitmapMatrix::from_parts("Ghost".to_string(), 14, 14, grid)
        .expect("ghost pattern matches its dimensions")
}

/// The default collection: heart, then ghost.
pub fn default_collection() -> Vec<BitmapMatrix> {
    vec![heart(), ghost()]
}
