//! Collection management commands: list, show, import, export, remove

use std::path::Path;
use std::process::ExitCode;

use crate::config::PixelDropConfig;
use crate::models::import_matrix_file;
use crate::output::{export_matrix, export_path};
use crate::terminal::render_matrix_ansi;

use super::{
    expand_inputs, is_json_file, open_collection, resolve_or_report, store_dir, EXIT_ERROR,
    EXIT_INVALID_ARGS, EXIT_SUCCESS,
};

/// Execute the list command
pub fn run_list(config: &PixelDropConfig) -> ExitCode {
    let collection = open_collection(config);
    for (i, matrix) in collection.items().iter().enumerate() {
        println!(
            "{:>3}. {} ({}x{}, {} pixels)",
            i + 1,
            matrix.name(),
            matrix.width(),
            matrix.height(),
            matrix.filled_count()
        );
    }
    log::debug!("store: {}", store_dir(config).display());
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the show command
///
/// `target` is a matrix file when it names an existing `.json` file,
/// otherwise a list number or name in the collection.
pub fn run_show(config: &PixelDropConfig, target: &str) -> ExitCode {
    let path = Path::new(target);
    let matrix = if is_json_file(path) && path.is_file() {
        match import_matrix_file(path) {
            Ok(m) => m,
            Err(e) => {
                eprintln!("Error: Cannot load '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        let collection = open_collection(config);
        match resolve_or_report(&collection, target) {
            Ok(index) => collection.items()[index].clone(),
            Err(code) => return code,
        }
    };

    println!("{} ({}x{})", matrix.name(), matrix.width(), matrix.height());
    print!("{}", render_matrix_ansi(&matrix));
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the import command
///
/// Each file is validated on its own; a rejected file does not stop the
/// others from being imported.
pub fn run_import(config: &PixelDropConfig, patterns: &[String]) -> ExitCode {
    let files = expand_inputs(patterns);
    if files.is_empty() {
        eprintln!("Error: No files to import");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut collection = open_collection(config);
    let mut failed = 0;
    for file in &files {
        let matrix = match import_matrix_file(file) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("rejected import of {}: {}", file.display(), e);
                eprintln!("Error: Failed to import '{}': {}", file.display(), e);
                failed += 1;
                continue;
            }
        };
        let name = matrix.name().to_string();
        if let Err(e) = collection.add(matrix) {
            eprintln!("Error: Failed to save the collection: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
        println!("Imported '{}'", name);
    }

    if failed > 0 {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Execute the export command
pub fn run_export(
    config: &PixelDropConfig,
    target: Option<&str>,
    output: Option<&Path>,
) -> ExitCode {
    let collection = open_collection(config);
    let indices: Vec<usize> = match target {
        Some(target) => match resolve_or_report(&collection, target) {
            Ok(index) => vec![index],
            Err(code) => return code,
        },
        None => (0..collection.len()).collect(),
    };

    for index in indices.iter().copied() {
        let matrix = &collection.items()[index];
        let path = match output {
            // Exporting everything into one file name would overwrite
            Some(out) if indices.len() > 1 && !out.is_dir() => {
                out.join(matrix.export_file_name())
            }
            _ => export_path(matrix, output),
        };
        if let Err(e) = export_matrix(matrix, &path) {
            eprintln!("Error: Failed to write '{}': {}", path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
        println!("Exported '{}' to {}", matrix.name(), path.display());
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the remove command
pub fn run_remove(config: &PixelDropConfig, target: &str) -> ExitCode {
    let mut collection = open_collection(config);
    let index = match resolve_or_report(&collection, target) {
        Ok(index) => index,
        Err(code) => return code,
    };
    if !collection.can_remove() {
        eprintln!("Error: Cannot remove the last matrix in the collection");
        return ExitCode::from(EXIT_ERROR);
    }

    match collection.remove(index) {
        Ok(Some(removed)) => {
            println!("Removed '{}' ({} left)", removed.name(), collection.len());
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(None) => ExitCode::from(EXIT_ERROR),
        Err(e) => {
            eprintln!("Error: Failed to save the collection: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
