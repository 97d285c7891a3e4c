//! Render command: record the drop animation offline

use std::path::Path;
use std::process::ExitCode;

use crate::config::PixelDropConfig;
use crate::frame_loop::{run, CancelToken, RecordingHost};
use crate::gif::render_gif;
use crate::models::{import_matrix_file, BitmapMatrix};
use crate::output::save_png;
use crate::sequencer::Sequencer;

use super::{
    make_rng, open_collection, resolve_or_report, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderFormat {
    Gif,
    Png,
}

fn render_format(path: &Path) -> Option<RenderFormat> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "gif" => Some(RenderFormat::Gif),
        "png" => Some(RenderFormat::Png),
        _ => None,
    }
}

/// Matrices to record: one file, one collection entry, or the whole
/// collection.
fn select_matrices(
    config: &PixelDropConfig,
    matrix: Option<&str>,
    input: Option<&Path>,
) -> Result<Vec<BitmapMatrix>, ExitCode> {
    if let Some(path) = input {
        return match import_matrix_file(path) {
            Ok(m) => Ok(vec![m]),
            Err(e) => {
                eprintln!("Error: Cannot load '{}': {}", path.display(), e);
                Err(ExitCode::from(EXIT_ERROR))
            }
        };
    }

    let collection = open_collection(config);
    match matrix {
        Some(target) => {
            let index = resolve_or_report(&collection, target)?;
            Ok(vec![collection.items()[index].clone()])
        }
        None => Ok(collection.into_items()),
    }
}

/// Execute the render command
pub fn run_render(
    config: &PixelDropConfig,
    output: &Path,
    matrix: Option<&str>,
    input: Option<&Path>,
    width: u32,
    height: u32,
    fps: u32,
) -> ExitCode {
    let Some(format) = render_format(output) else {
        eprintln!("Error: Output must end in .gif or .png, got '{}'", output.display());
        return ExitCode::from(EXIT_INVALID_ARGS);
    };
    if width == 0 || height == 0 {
        eprintln!("Error: --width and --height must be positive");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let matrices = match select_matrices(config, matrix, input) {
        Ok(m) => m,
        Err(code) => return code,
    };
    if matrices.is_empty() {
        eprintln!("Error: Nothing to render");
        return ExitCode::from(EXIT_ERROR);
    }

    let frame_ms = 1000.0 / fps as f64;
    let count = matrices.len() as u64;
    // Hold the finished picture as long as the wall would
    let tail = (config.wall.hold_ms as f64 / frame_ms).round() as u32;
    let mut sequencer = Sequencer::new(matrices, config.sequencer_config(), make_rng(config));
    let mut host = RecordingHost::new(width, height, frame_ms, count).with_tail(tail);
    let summary = run(&mut sequencer, &mut host, &config.render_params(), &CancelToken::new());
    let frames = host.into_frames();
    log::info!("recorded {} frames of {} matrices", summary.frames, summary.settled);

    let result = match format {
        RenderFormat::Gif => render_gif(&frames, frame_ms.round() as u32, true, output),
        RenderFormat::Png => match frames.last() {
            Some(last) => save_png(last, output),
            None => Ok(()),
        },
    };
    if let Err(e) = result {
        eprintln!("Error: Failed to write '{}': {}", output.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!("Saved {} ({} frames)", output.display(), frames.len());
    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_format() {
        assert_eq!(render_format(Path::new("wall.gif")), Some(RenderFormat::Gif));
        assert_eq!(render_format(Path::new("out/Final.PNG")), Some(RenderFormat::Png));
        assert_eq!(render_format(Path::new("wall.mp4")), None);
        assert_eq!(render_format(Path::new("wall")), None);
    }
}
