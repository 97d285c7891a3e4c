//! File output: PNG frames and exported matrix documents.

use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{BitmapMatrix, MatrixError};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
    /// Matrix serialization error
    Matrix(MatrixError),
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
            OutputError::Matrix(e) => write!(f, "Export error: {}", e),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
            OutputError::Matrix(e) => Some(e),
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

impl From<MatrixError> for OutputError {
    fn from(e: MatrixError) -> Self {
        OutputError::Matrix(e)
    }
}

/// Create the parent directory of `path` if it does not exist yet.
pub(crate) fn ensure_parent(path: &Path) -> Result<(), io::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Save an RGBA image to a PNG file, creating parent directories.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    image.save(path)?;
    Ok(())
}

/// Where an exported matrix goes.
///
/// | `output_arg`            | Result                        |
/// |-------------------------|-------------------------------|
/// | none                    | `./{export_file_name}`        |
/// | existing dir or `dir/`  | `dir/{export_file_name}`      |
/// | `file.json`             | `file.json`                   |
pub fn export_path(matrix: &BitmapMatrix, output_arg: Option<&Path>) -> PathBuf {
    match output_arg {
        None => PathBuf::from(matrix.export_file_name()),
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(matrix.export_file_name())
            } else {
                output.to_path_buf()
            }
        }
    }
}

/// Write `matrix` as an exchange-format JSON document.
pub fn export_matrix(matrix: &BitmapMatrix, path: &Path) -> Result<(), OutputError> {
    ensure_parent(path)?;
    std::fs::write(path, matrix.to_json()?)?;
    Ok(())
}
