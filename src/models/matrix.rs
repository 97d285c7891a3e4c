//! Bitmap matrix types and the JSON exchange format.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use crate::color::Color;

/// A single grid cell: a color, or empty (transparent).
pub type Cell = Option<Color>;

/// Row-major grid of cells, `grid[y][x]`.
pub type Grid = Vec<Vec<Cell>>;

/// Error type for matrix import and validation
#[derive(Debug, Error)]
pub enum MatrixError {
    /// The file could not be read
    #[error("failed to read matrix file: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not valid JSON
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The document lacks one of the required fields
    #[error("invalid file format: missing width, height, or grid data")]
    MissingFields,
    /// A field has the wrong type or a cell is not a hex color
    #[error("invalid matrix data: {0}")]
    Invalid(String),
    /// Width or height is zero
    #[error("matrix dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    /// `grid.len()` disagrees with `height`
    #[error("grid has {found} rows, expected {expected}")]
    RowCount { expected: u32, found: usize },
    /// A row's length disagrees with `width`
    #[error("grid row {row} has {found} cells, expected {expected}")]
    RowWidth { row: usize, expected: u32, found: usize },
}

/// A named rectangular grid of optional colors.
///
/// The shape invariant (`grid.len() == height`, every row `== width`, both
/// positive) is checked on construction, so simulation and rendering code
/// can index freely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitmapMatrix {
    name: String,
    width: u32,
    height: u32,
    grid: Grid,
}

/// Raw exchange-format document: `{ name?, width, height, grid }`.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixFile {
    #[serde(default)]
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
    pub grid: Grid,
}

impl MatrixFile {
    /// Validate into a matrix, using `fallback_name` when the name is
    /// missing or empty.
    pub fn into_matrix(self, fallback_name: &str) -> Result<BitmapMatrix, MatrixError> {
        let name = match self.name {
            Some(n) if !n.is_empty() => n,
            _ => fallback_name.to_string(),
        };
        BitmapMatrix::from_parts(name, self.width, self.height, self.grid)
    }
}

impl BitmapMatrix {
    /// Build a matrix from rows, deriving width and height from the grid.
    pub fn new(name: impl Into<String>, grid: Grid) -> Result<Self, MatrixError> {
        let height = grid.len() as u32;
        let width = grid.first().map(|row| row.len() as u32).unwrap_or(0);
        Self::from_parts(name.into(), width, height, grid)
    }

    /// Build a matrix from explicit dimensions, checking the grid shape.
    pub fn from_parts(
        name: String,
        width: u32,
        height: u32,
        grid: Grid,
    ) -> Result<Self, MatrixError> {
        if width == 0 || height == 0 {
            return Err(MatrixError::ZeroDimension { width, height });
        }
        if grid.len() != height as usize {
            return Err(MatrixError::RowCount { expected: height, found: grid.len() });
        }
        for (row, cells) in grid.iter().enumerate() {
            if cells.len() != width as usize {
                return Err(MatrixError::RowWidth { row, expected: width, found: cells.len() });
            }
        }
        Ok(Self { name, width, height, grid })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Same grid under a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Cell at `(x, y)`, or `None` when out of bounds or empty.
    pub fn cell(&self, x: u32, y: u32) -> Cell {
        self.grid.get(y as usize).and_then(|row| row.get(x as usize)).copied().flatten()
    }

    /// Iterate over non-empty cells as `(x, y, color)` in row-major order.
    pub fn filled_cells(&self) -> impl Iterator<Item = (u32, u32, Color)> + '_ {
        self.grid.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(x, cell)| cell.map(|color| (x as u32, y as u32, color)))
        })
    }

    /// Number of non-empty cells.
    pub fn filled_count(&self) -> usize {
        self.grid.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Serialize to the exchange format.
    pub fn to_json(&self) -> Result<String, MatrixError> {
        Ok(serde_json::to_string(self)?)
    }

    /// File name used when exporting: lowercased, whitespace runs as `_`.
    pub fn export_file_name(&self) -> String {
        let stem = self.name.split_whitespace().collect::<Vec<_>>().join("_").to_lowercase();
        if stem.is_empty() {
            "matrix.json".to_string()
        } else {
            format!("{}.json", stem)
        }
    }
}

/// Parse an exchange-format document.
///
/// Requires `width`, `height` and an array-typed `grid`; a missing `name`
/// becomes `fallback_name`.
pub fn parse_matrix(json: &str, fallback_name: &str) -> Result<BitmapMatrix, MatrixError> {
    let value: Value = serde_json::from_str(json)?;
    matrix_from_value(value, fallback_name)
}

/// Validate an already-parsed JSON value as a matrix document.
pub fn matrix_from_value(value: Value, fallback_name: &str) -> Result<BitmapMatrix, MatrixError> {
    let has_required = value.get("width").is_some_and(|v| !v.is_null())
        && value.get("height").is_some_and(|v| !v.is_null())
        && value.get("grid").is_some_and(Value::is_array);
    if !has_required {
        return Err(MatrixError::MissingFields);
    }

    let file: MatrixFile =
        serde_json::from_value(value).map_err(|e| MatrixError::Invalid(e.to_string()))?;
    file.into_matrix(fallback_name)
}

/// Read and validate a matrix file; the name defaults to the file stem.
pub fn import_matrix_file(path: &Path) -> Result<BitmapMatrix, MatrixError> {
    let contents = std::fs::read_to_string(path)?;
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    parse_matrix(&contents, &stem)
}

/// Fixed-shape layer of settled cells, same dimensions as the active matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandedGrid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl LandedGrid {
    /// All-empty grid of the given size.
    pub fn empty(width: u32, height: u32) -> Self {
        Self { width, height, cells: vec![None; (width * height) as usize] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Cell {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[(y * self.width + x) as usize]
    }

    /// Write a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.cells[(y * self.width + x) as usize] = Some(color);
        }
    }

    /// Iterate over settled cells as `(x, y, color)`.
    pub fn filled_cells(&self) -> impl Iterator<Item = (u32, u32, Color)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|color| (i as u32 % width, i as u32 / width, color))
        })
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Copy out as row-major rows, comparable with [`BitmapMatrix::grid`].
    pub fn to_rows(&self) -> Grid {
        self.cells.chunks(self.width as usize).map(<[Cell]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        "#ef4444".parse().unwrap()
    }

    #[test]
    fn test_new_derives_dimensions() {
        let m = BitmapMatrix::new("dot", vec![vec![Some(red()), None]]).unwrap();
        assert_eq!((m.width(), m.height()), (2, 1));
        assert_eq!(m.filled_count(), 1);
        assert_eq!(m.cell(0, 0), Some(red()));
        assert_eq!(m.cell(1, 0), None);
        assert_eq!(m.cell(5, 5), None);
    }

    #[test]
    fn test_from_parts_rejects_bad_shape() {
        let grid = vec![vec![None, None], vec![None]];
        let err = BitmapMatrix::from_parts("x".into(), 2, 2, grid).unwrap_err();
        assert!(matches!(err, MatrixError::RowWidth { row: 1, expected: 2, found: 1 }));

        let err = BitmapMatrix::from_parts("x".into(), 1, 3, vec![vec![None]]).unwrap_err();
        assert!(matches!(err, MatrixError::RowCount { expected: 3, found: 1 }));

        let err = BitmapMatrix::new("x", vec![]).unwrap_err();
        assert!(matches!(err, MatrixError::ZeroDimension { .. }));
    }

    #[test]
    fn test_parse_matrix_defaults_name() {
        let json = r##"{"width": 2, "height": 1, "grid": [["#ff0000", null]]}"##;
        let m = parse_matrix(json, "upload").unwrap();
        assert_eq!(m.name(), "upload");

        let json = r##"{"name": "", "width": 1, "height": 1, "grid": [[null]]}"##;
        assert_eq!(parse_matrix(json, "fallback").unwrap().name(), "fallback");
    }

    #[test]
    fn test_parse_matrix_missing_fields() {
        for json in [
            r#"{"height": 1, "grid": [[null]]}"#,
            r#"{"width": 1, "grid": [[null]]}"#,
            r#"{"width": 1, "height": 1}"#,
            r#"{"width": 1, "height": 1, "grid": "nope"}"#,
            r#"[1, 2, 3]"#,
        ] {
            assert!(
                matches!(parse_matrix(json, "f"), Err(MatrixError::MissingFields)),
                "expected MissingFields for {json}"
            );
        }
    }

    #[test]
    fn test_parse_matrix_rejects_garbage() {
        assert!(matches!(parse_matrix("{not json", "f"), Err(MatrixError::Json(_))));
        let bad_color = r#"{"width": 1, "height": 1, "grid": [["red"]]}"#;
        assert!(matches!(parse_matrix(bad_color, "f"), Err(MatrixError::Invalid(_))));
        let negative = r#"{"width": -1, "height": 1, "grid": [[null]]}"#;
        assert!(matches!(parse_matrix(negative, "f"), Err(MatrixError::Invalid(_))));
        let zero = r#"{"width": 0, "height": 1, "grid": [[]]}"#;
        assert!(matches!(parse_matrix(zero, "f"), Err(MatrixError::ZeroDimension { .. })));
    }

    #[test]
    fn test_export_reimport_preserves_grid() {
        let m = BitmapMatrix::new(
            "Two Tone",
            vec![vec![Some(red()), None], vec![None, Some("#3b82f6".parse().unwrap())]],
        )
        .unwrap();
        let json = m.to_json().unwrap();
        let back = parse_matrix(&json, "ignored").unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_with_name_keeps_grid() {
        let m = BitmapMatrix::new("a", vec![vec![Some(red())]]).unwrap();
        let renamed = m.clone().with_name("b");
        assert_eq!(renamed.name(), "b");
        assert_eq!(renamed.grid(), m.grid());
    }

    #[test]
    fn test_export_file_name() {
        let m = BitmapMatrix::new("My  Pixel Art", vec![vec![None]]).unwrap();
        assert_eq!(m.export_file_name(), "my_pixel_art.json");
    }

    #[test]
    fn test_import_matrix_file_uses_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("space_invader.json");
        std::fs::write(&path, r##"{"width": 1, "height": 1, "grid": [["#00ff00"]]}"##).unwrap();
        let m = import_matrix_file(&path).unwrap();
        assert_eq!(m.name(), "space_invader");
    }

    #[test]
    fn test_landed_grid_rows() {
        let mut landed = LandedGrid::empty(2, 2);
        landed.set(1, 1, red());
        landed.set(9, 9, red());
        assert_eq!(landed.filled_count(), 1);
        assert_eq!(landed.get(1, 1), Some(red()));
        assert_eq!(landed.to_rows(), vec![vec![None, None], vec![None, Some(red())]]);
        assert_eq!(landed.filled_cells().collect::<Vec<_>>(), vec![(1, 1, red())]);
    }
}
