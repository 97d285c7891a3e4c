//! ANSI terminal output for the pixel wall.
//!
//! Frames are rendered with true-color half blocks (two surface rows per
//! text line). Matrix previews use two spaces per cell so the grid keeps a
//! square aspect in most terminal fonts.

use image::{Rgba, RgbaImage};

use crate::models::BitmapMatrix;
use crate::sequencer::{Phase, Sequencer};

/// ANSI escape sequence to reset all formatting
pub const ANSI_RESET: &str = "\x1b[0m";
/// Move the cursor to the top-left corner
pub const CURSOR_HOME: &str = "\x1b[H";
/// Clear the whole screen
pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Background used for transparent pixels and empty preview cells.
const TRANSPARENT_BG: &str = "\x1b[48;5;236m";
const TRANSPARENT_FG: &str = "\x1b[38;5;236m";

/// Convert an RGBA color to an ANSI 24-bit background escape sequence.
///
/// Transparent colors (alpha = 0) render as dark gray.
///
/// # Examples
///
/// ```
/// use pixeldrop::terminal::color_to_ansi_bg;
/// use image::Rgba;
///
/// assert_eq!(color_to_ansi_bg(Rgba([255, 0, 0, 255])), "\x1b[48;2;255;0;0m");
/// assert_eq!(color_to_ansi_bg(Rgba([0, 0, 0, 0])), "\x1b[48;5;236m");
/// ```
pub fn color_to_ansi_bg(rgba: Rgba<u8>) -> String {
    if rgba[3] == 0 {
        TRANSPARENT_BG.to_string()
    } else {
        format!("\x1b[48;2;{};{};{}m", rgba[0], rgba[1], rgba[2])
    }
}

fn color_to_ansi_fg(rgba: Rgba<u8>) -> String {
    if rgba[3] == 0 {
        TRANSPARENT_FG.to_string()
    } else {
        format!("\x1b[38;2;{};{};{}m", rgba[0], rgba[1], rgba[2])
    }
}

/// Render an RGBA image as half-block text.
///
/// Each character is a "▀" whose foreground is the upper pixel and whose
/// background is the lower one. An odd final row pairs with transparency.
pub fn render_image_ansi(image: &RgbaImage) -> String {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return String::new();
    }

    let mut output = String::new();
    for y in (0..height).step_by(2) {
        for x in 0..width {
            let top = *image.get_pixel(x, y);
            let bottom = if y + 1 < height {
                *image.get_pixel(x, y + 1)
            } else {
                Rgba([0, 0, 0, 0])
            };
            output.push_str(&color_to_ansi_bg(bottom));
            output.push_str(&color_to_ansi_fg(top));
            output.push('▀');
        }
        output.push_str(ANSI_RESET);
        output.push('\n');
    }
    output
}

/// Render a matrix cell by cell, two columns per cell.
///
/// Used by `show` and `convert --preview`, mirroring the converter's
/// preview grid.
pub fn render_matrix_ansi(matrix: &BitmapMatrix) -> String {
    let mut output = String::new();
    for row in matrix.grid() {
        for cell in row {
            match cell {
                Some(color) => output.push_str(&color_to_ansi_bg(color.rgba())),
                None => output.push_str(TRANSPARENT_BG),
            }
            output.push_str("  ");
        }
        output.push_str(ANSI_RESET);
        output.push('\n');
    }
    output
}

/// One-line status: name, position in the collection, progress and phase.
pub fn info_line(sequencer: &Sequencer) -> String {
    let Some(matrix) = sequencer.active_matrix() else {
        return "(empty collection)".to_string();
    };
    let state = if sequencer.is_paused() {
        "paused"
    } else {
        match sequencer.phase() {
            Phase::Building => "building",
            Phase::Waiting { .. } => "waiting",
        }
    };
    format!(
        "{} ({}/{}) {}x{}  {:>3.0}%  [{}]",
        matrix.name(),
        sequencer.active_index() + 1,
        sequencer.collection_len(),
        matrix.width(),
        matrix.height(),
        sequencer.progress(),
        state
    )
}

/// Full animation frame: cursor home, picture, then the status line.
///
/// The status line is cleared to end-of-line so shorter text does not
/// leave stale characters behind.
pub fn compose_frame(image: &RgbaImage, status: Option<&str>) -> String {
    let mut output = String::from(CURSOR_HOME);
    output.push_str(&render_image_ansi(image));
    if let Some(status) = status {
        output.push_str(status);
        output.push_str("\x1b[K\n");
    }
    output
}
