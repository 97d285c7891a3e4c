//! CLI integration tests for the `pixeldrop` binary.
//!
//! Every test runs the binary inside its own temp directory with a private
//! collection store, so nothing touches the user's saved collection or
//! config.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

/// A scratch workspace: cwd, config dir and store for one test.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn store(&self) -> PathBuf {
        self.path().join("store")
    }

    /// Run pixeldrop with the given arguments and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_pixeldrop"))
            .current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join("config"))
            .env("XDG_DATA_HOME", self.path().join("data"))
            .env_remove("RUST_LOG")
            .arg("--store")
            .arg(self.store())
            .args(args)
            .stdin(Stdio::null())
            .output()
            .expect("Failed to execute pixeldrop");
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        (stdout, stderr, output.status.code().unwrap_or(-1))
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    /// A 16x16 PNG with an opaque red 8x8 square in the middle.
    fn write_png(&self, name: &str) -> PathBuf {
        let path = self.path().join(name);
        let image = RgbaImage::from_fn(16, 16, |x, y| {
            if (4..12).contains(&x) && (4..12).contains(&y) {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        image.save(&path).unwrap();
        path
    }
}

const TINY_MATRIX: &str = r##"{"width": 2, "height": 1, "grid": [["#ff0000", null]]}"##;

// ============================================================================
// Collection commands
// ============================================================================

#[test]
fn test_list_fresh_store_shows_samples() {
    let ws = Workspace::new();
    let (stdout, _, code) = ws.run(&["list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("  1. Heart (11x10, 46 pixels)"), "got: {}", stdout);
    assert!(stdout.contains("  2. Ghost (14x14,"), "got: {}", stdout);
}

#[test]
fn test_show_by_name() {
    let ws = Workspace::new();
    let (stdout, _, code) = ws.run(&["show", "ghost"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("Ghost (14x14)"));
    assert!(stdout.contains("\x1b[48;2;"), "preview uses truecolor backgrounds");
}

#[test]
fn test_show_matrix_file() {
    let ws = Workspace::new();
    ws.write("tiny.json", TINY_MATRIX);
    let (stdout, _, code) = ws.run(&["show", "tiny.json"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("tiny (2x1)"));
}

#[test]
fn test_import_adds_to_collection() {
    let ws = Workspace::new();
    ws.write("tiny.json", TINY_MATRIX);
    let (stdout, _, code) = ws.run(&["import", "tiny.json"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Imported 'tiny'"));

    let (stdout, _, _) = ws.run(&["list"]);
    assert!(stdout.contains("  3. tiny (2x1, 1 pixels)"), "got: {}", stdout);
}

#[test]
fn test_import_rejects_bad_file_and_keeps_good_ones() {
    let ws = Workspace::new();
    ws.write("a_good.json", TINY_MATRIX);
    ws.write("b_bad.json", r#"{"width": 2, "height": 1}"#);
    let (stdout, stderr, code) = ws.run(&["import", "*.json"]);
    assert_eq!(code, 1);
    assert!(stdout.contains("Imported 'a_good'"));
    assert!(stderr.contains("b_bad.json"));
    assert!(stderr.contains("missing width, height, or grid data"));

    let (stdout, _, _) = ws.run(&["list"]);
    assert!(stdout.contains("a_good"));
    assert!(!stdout.contains("b_bad"));
}

#[test]
fn test_export_single_matrix() {
    let ws = Workspace::new();
    let (_, _, code) = ws.run(&["export", "heart", "-o", "out/heart-copy.json"]);
    assert_eq!(code, 0);

    let json = fs::read_to_string(ws.path().join("out/heart-copy.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["name"], "Heart");
    assert_eq!(value["width"], 11);
    assert_eq!(value["height"], 10);
    assert_eq!(value["grid"].as_array().unwrap().len(), 10);
}

#[test]
fn test_export_all_into_directory() {
    let ws = Workspace::new();
    let (_, _, code) = ws.run(&["export", "-o", "all"]);
    assert_eq!(code, 0);
    assert!(ws.path().join("all/heart.json").is_file());
    assert!(ws.path().join("all/ghost.json").is_file());
}

#[test]
fn test_export_then_import_round_trip() {
    let ws = Workspace::new();
    ws.run(&["export", "ghost", "-o", "ghost.json"]);
    let (_, _, code) = ws.run(&["import", "ghost.json"]);
    assert_eq!(code, 0);

    ws.run(&["export", "3", "-o", "again.json"]);
    let first = fs::read_to_string(ws.path().join("ghost.json")).unwrap();
    let second = fs::read_to_string(ws.path().join("again.json")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_remove_stops_at_last_matrix() {
    let ws = Workspace::new();
    let (stdout, _, code) = ws.run(&["remove", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Removed 'Heart' (1 left)"));

    let (_, stderr, code) = ws.run(&["remove", "1"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Cannot remove the last matrix"));

    let (stdout, _, _) = ws.run(&["list"]);
    assert!(stdout.contains("  1. Ghost"));
}

// ============================================================================
// Convert
// ============================================================================

#[test]
fn test_convert_writes_matrix_file() {
    let ws = Workspace::new();
    ws.write_png("square.png");
    let (stdout, _, code) = ws.run(&["convert", "square.png", "-w", "8", "-o", "square.json"]);
    assert_eq!(code, 0, "stdout: {}", stdout);

    let json = fs::read_to_string(ws.path().join("square.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["name"], "square");
    assert_eq!(value["width"], 8);
    assert_eq!(value["height"], 8);
    // The transparent border stays empty
    assert!(value["grid"][0][0].is_null());
}

#[test]
fn test_convert_add_with_name() {
    let ws = Workspace::new();
    ws.write_png("square.png");
    let (stdout, _, code) = ws.run(&["convert", "square.png", "-w", "8", "-n", "Block", "--add"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Added 'Block' (3 in collection)"));
}

#[test]
fn test_convert_rejects_width_out_of_range() {
    let ws = Workspace::new();
    ws.write_png("square.png");
    let (_, stderr, code) = ws.run(&["convert", "square.png", "-w", "4"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("--width must be between 8 and 128"));
}

#[test]
fn test_convert_unreadable_image_fails() {
    let ws = Workspace::new();
    ws.write("broken.png", "not a png");
    let (_, stderr, code) = ws.run(&["convert", "broken.png"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Cannot convert"));
}

// ============================================================================
// Render and play
// ============================================================================

const FAST: [&str; 6] = ["--hold-ms", "0", "--gravity", "1", "--spawn-rate", "500"];

#[test]
fn test_render_gif() {
    let ws = Workspace::new();
    let mut args = vec!["render", "wall.gif", "-m", "heart", "--width", "32", "--height", "32"];
    args.extend(FAST);
    let (stdout, _, code) = ws.run(&args);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("Saved wall.gif"));

    let bytes = fs::read(ws.path().join("wall.gif")).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
}

#[test]
fn test_render_png_final_frame() {
    let ws = Workspace::new();
    let mut args = vec!["render", "final.png", "-m", "1", "--width", "40", "--height", "30"];
    args.extend(FAST);
    let (_, _, code) = ws.run(&args);
    assert_eq!(code, 0);

    let image = image::open(ws.path().join("final.png")).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (40, 30));
    // Corners are background; the heart sits in the middle
    assert_eq!(image.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    assert!(image.pixels().any(|p| p[0] > 200 && p[1] < 100));
}

#[test]
fn test_render_rejects_unknown_format() {
    let ws = Workspace::new();
    let (_, stderr, code) = ws.run(&["render", "wall.mp4"]);
    assert_eq!(code, 2);
    assert!(stderr.contains(".gif or .png"));
}

#[test]
fn test_play_one_cycle_without_terminal() {
    let ws = Workspace::new();
    let mut args =
        vec!["play", "--cycles", "1", "--fps", "500", "--width", "16", "--height", "16"];
    args.extend(FAST);
    let (stdout, _, code) = ws.run(&args);
    assert_eq!(code, 0);
    // Piped output only reports completed matrices
    assert!(stdout.contains("Heart (1/2)"), "got: {:?}", stdout);
    assert!(!stdout.contains("\x1b["));
}

// ============================================================================
// Argument and config errors
// ============================================================================

#[test]
fn test_invalid_arguments_exit_2() {
    let ws = Workspace::new();
    assert_eq!(ws.run(&["convert"]).2, 2);
    assert_eq!(ws.run(&["play", "--fps", "0"]).2, 2);
    assert_eq!(ws.run(&["remove", "dragon"]).2, 2);
    assert_eq!(ws.run(&["bogus"]).2, 2);
}

#[test]
fn test_invalid_override_exit_2() {
    let ws = Workspace::new();
    let (_, stderr, code) = ws.run(&["--gravity", "0", "list"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("'wall.gravity'"));
}

#[test]
fn test_invalid_config_file_exit_2() {
    let ws = Workspace::new();
    ws.write("pixeldrop.toml", "[wall]\nfill_fraction = 2.0\n");
    let (_, stderr, code) = ws.run(&["list"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("fill_fraction"));
}

#[test]
fn test_config_file_changes_collection_key() {
    let ws = Workspace::new();
    ws.write("tiny.json", TINY_MATRIX);
    ws.write("pixeldrop.toml", "[collection]\nkey = \"sideWall\"\n");
    ws.run(&["import", "tiny.json"]);

    // The default key is untouched
    fs::remove_file(ws.path().join("pixeldrop.toml")).unwrap();
    let (stdout, _, _) = ws.run(&["list"]);
    assert!(!stdout.contains("tiny"));
}
