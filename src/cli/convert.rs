//! Convert command: images to matrices

use std::path::Path;
use std::process::ExitCode;

use crate::config::PixelDropConfig;
use crate::output::{export_matrix, export_path};
use crate::quantize::{quantize_files, QuantizeOptions, MAX_WIDTH, MIN_WIDTH};
use crate::terminal::render_matrix_ansi;

use super::{expand_inputs, open_collection, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the convert command
pub fn run_convert(
    config: &PixelDropConfig,
    inputs: &[String],
    width: Option<u32>,
    threshold: Option<u8>,
    name: Option<&str>,
    preview: bool,
    add: bool,
    output: Option<&Path>,
) -> ExitCode {
    let mut options: QuantizeOptions = config.quantize_options();
    if let Some(width) = width {
        if !(MIN_WIDTH..=MAX_WIDTH).contains(&width) {
            eprintln!("Error: --width must be between {} and {}", MIN_WIDTH, MAX_WIDTH);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        options.width = width;
    }
    if let Some(threshold) = threshold {
        options.alpha_threshold = threshold;
    }

    let files = expand_inputs(inputs);
    if files.is_empty() {
        eprintln!("Error: No input images found");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }
    if name.is_some() && files.len() > 1 {
        eprintln!("Error: --name can only be used with a single input image");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut converted = Vec::new();
    let mut failed = 0;
    for (path, result) in quantize_files(&files, &options) {
        match result {
            Ok(matrix) => converted.push(match name {
                Some(name) => matrix.with_name(name),
                None => matrix,
            }),
            Err(e) => {
                // No preview and no partial matrix for a failed conversion
                eprintln!("Error: Cannot convert '{}': {}", path.display(), e);
                failed += 1;
            }
        }
    }

    let show_preview = preview || (!add && output.is_none());
    for matrix in &converted {
        if show_preview {
            println!(
                "{} ({}x{}, {} pixels)",
                matrix.name(),
                matrix.width(),
                matrix.height(),
                matrix.filled_count()
            );
            print!("{}", render_matrix_ansi(matrix));
        }

        if let Some(output) = output {
            // Several results always go into a directory
            let target = if converted.len() > 1 && !output.is_dir() {
                output.join(matrix.export_file_name())
            } else {
                export_path(matrix, Some(output))
            };
            if let Err(e) = export_matrix(matrix, &target) {
                eprintln!("Error: Failed to write '{}': {}", target.display(), e);
                failed += 1;
                continue;
            }
            println!("Saved {}", target.display());
        }
    }

    if add && !converted.is_empty() {
        let mut collection = open_collection(config);
        for matrix in converted.iter().cloned() {
            let name = matrix.name().to_string();
            if let Err(e) = collection.add(matrix) {
                eprintln!("Error: Failed to save the collection: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
            println!("Added '{}' ({} in collection)", name, collection.len());
        }
    }

    if failed > 0 {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
