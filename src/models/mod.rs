//! Data models for Pixeldrop (matrices, landed layer, particles)

mod matrix;
mod particle;

pub use matrix::{
    import_matrix_file, matrix_from_value, parse_matrix, BitmapMatrix, Cell, Grid, LandedGrid,
    MatrixError, MatrixFile,
};
pub use particle::{Particle, PendingPixel};
