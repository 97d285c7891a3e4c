//! Animated GIF export of recorded wall frames.

use crate::output::{ensure_parent, OutputError};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Encode `frames` as a GIF into any writer.
///
/// GIF delays are stored in centiseconds, so `frame_ms` is rounded down to
/// a multiple of 10 (minimum 10).
pub fn encode_gif<W: Write>(
    writer: W,
    frames: &[RgbaImage],
    frame_ms: u32,
    loop_anim: bool,
) -> Result<(), OutputError> {
    let mut encoder = GifEncoder::new(writer);
    encoder.set_repeat(if loop_anim { Repeat::Infinite } else { Repeat::Finite(0) })?;

    let delay_cs = (frame_ms / 10).max(1);
    for image in frames {
        let delay = Delay::from_numer_denom_ms(delay_cs * 10, 1);
        encoder.encode_frame(Frame::from_parts(image.clone(), 0, 0, delay))?;
    }
    Ok(())
}

/// Write `frames` to a GIF file. An empty frame list writes nothing.
pub fn render_gif(
    frames: &[RgbaImage],
    frame_ms: u32,
    loop_anim: bool,
    path: &Path,
) -> Result<(), OutputError> {
    if frames.is_empty() {
        return Ok(());
    }
    ensure_parent(path)?;
    let writer = BufWriter::new(File::create(path)?);
    encode_gif(writer, frames, frame_ms, loop_anim)?;
    log::debug!("wrote {} frames to {}", frames.len(), path.display());
    Ok(())
}
