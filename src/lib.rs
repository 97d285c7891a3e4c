//! Pixeldrop - a falling-pixel wall for pixel art
//!
//! This library provides functionality to:
//! - Drop the cells of a bitmap matrix into place under gravity, one
//!   shuffled pixel at a time, and cycle through a collection of matrices
//! - Render the wall onto any drawing surface (images, terminals, canvases)
//! - Convert raster images into matrices and keep a persisted collection

pub mod cli;
pub mod color;
pub mod config;
pub mod frame_loop;
pub mod gif;
pub mod models;
pub mod output;
pub mod particle;
pub mod quantize;
pub mod renderer;
pub mod rng;
pub mod samples;
pub mod sequencer;
pub mod store;
pub mod terminal;

#[cfg(feature = "wasm")]
pub mod wasm;
