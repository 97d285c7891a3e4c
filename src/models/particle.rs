//! Falling-pixel types.

use crate::color::Color;

/// A non-empty cell of the active matrix that has not been dropped yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPixel {
    pub x: u32,
    pub y: u32,
    pub color: Color,
}

/// A pixel in flight.
///
/// `x` is a fixed grid column; `y` is a fractional row that starts above
/// the surface and increases until it reaches `target_y`.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: u32,
    pub y: f64,
    pub target_y: u32,
    pub color: Color,
    /// Rows per reference frame
    pub velocity: f64,
    pub landed: bool,
}

impl Particle {
    /// Create a resting particle for `pixel`, starting `offset` rows above row 0.
    pub fn spawn(pixel: PendingPixel, offset: f64) -> Self {
        Self {
            x: pixel.x,
            y: -offset,
            target_y: pixel.y,
            color: pixel.color,
            velocity: 0.0,
            landed: false,
        }
    }
}
