//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod collection;
mod convert;
mod play;
mod render;

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use glob::glob;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, PixelDropConfig};
use crate::models::BitmapMatrix;
use crate::rng::Rng;
use crate::store::{Collection, FileStore, KeyValueStore};

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Pixeldrop - a falling-pixel wall for pixel art
#[derive(Parser)]
#[command(name = "pixeldrop")]
#[command(about = "Pixeldrop - drop pixel art into place, one falling pixel at a time")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub wall: WallArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every command; they override pixeldrop.toml.
#[derive(Args, Debug, Default, Clone)]
pub struct WallArgs {
    /// Config file (default: nearest pixeldrop.toml, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Collection store directory
    #[arg(long, global = true, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Velocity gained per millisecond
    #[arg(long, global = true)]
    pub gravity: Option<f64>,

    /// Pixels released per building tick
    #[arg(long, global = true)]
    pub spawn_rate: Option<u32>,

    /// Hold after a matrix completes, in milliseconds
    #[arg(long, global = true)]
    pub hold_ms: Option<u64>,

    /// Share of the screen the art may fill (0-1]
    #[arg(long, global = true)]
    pub fill_fraction: Option<f64>,

    /// Seed for a reproducible drop order
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

impl WallArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            gravity: self.gravity,
            spawn_rate: self.spawn_rate,
            hold_ms: self.hold_ms,
            fill_fraction: self.fill_fraction,
            seed: self.seed,
            store: self.store.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Play the collection in the terminal (keys: p pause, n next, q quit, then Enter)
    Play {
        /// Frame width in pixels (one terminal column each)
        #[arg(long, default_value = "64")]
        width: u32,

        /// Frame height in pixels (two per terminal row)
        #[arg(long, default_value = "48")]
        height: u32,

        /// Target frames per second
        #[arg(long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..=1000))]
        fps: u32,

        /// Stop after this many build-and-hold cycles
        #[arg(long)]
        cycles: Option<u64>,

        /// Hide the name/progress line under the frame
        #[arg(long)]
        no_info: bool,
    },

    /// Record the drop animation to a GIF, or its final frame to a PNG
    Render {
        /// Output file (.gif or .png)
        output: PathBuf,

        /// Matrix to render: list number or name (default: the whole collection)
        #[arg(short, long)]
        matrix: Option<String>,

        /// Render a matrix file instead of the collection
        #[arg(short, long, conflicts_with = "matrix")]
        input: Option<PathBuf>,

        /// Frame width in pixels
        #[arg(long, default_value = "128")]
        width: u32,

        /// Frame height in pixels
        #[arg(long, default_value = "128")]
        height: u32,

        /// Frames per second of the recording
        #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..=100))]
        fps: u32,
    },

    /// Convert images into matrices
    Convert {
        /// Image files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Grid width in cells (8-128)
        #[arg(short, long)]
        width: Option<u32>,

        /// Keep cells whose alpha is above this value (0-255)
        #[arg(short, long)]
        threshold: Option<u8>,

        /// Matrix name (single input only; default: file name)
        #[arg(short, long)]
        name: Option<String>,

        /// Print a preview of each converted matrix
        #[arg(long)]
        preview: bool,

        /// Add the converted matrices to the collection
        #[arg(long)]
        add: bool,

        /// Write matrix JSON to this file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a matrix from the collection or a matrix file
    Show {
        /// List number, name, or path to a .json matrix file
        target: String,
    },

    /// List the collection
    List,

    /// Import matrix JSON files into the collection
    Import {
        /// Files or glob patterns
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Export matrices as JSON files
    Export {
        /// List number or name (default: all)
        target: Option<String>,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove a matrix from the collection (the last one cannot be removed)
    Remove {
        /// List number or name
        target: String,
    },
}

/// Load config and apply CLI overrides, reporting problems on stderr.
pub(crate) fn load_settings(args: &WallArgs) -> Result<PixelDropConfig, ExitCode> {
    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };
    merge_cli_overrides(&mut config, &args.overrides());

    let errors = config.validate();
    if !errors.is_empty() {
        for e in errors {
            eprintln!("Error: {}", e);
        }
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    Ok(config)
}

/// The store directory the configuration points at.
pub(crate) fn store_dir(config: &PixelDropConfig) -> PathBuf {
    config.collection.dir.clone().unwrap_or_else(FileStore::default_dir)
}

pub(crate) fn open_collection(config: &PixelDropConfig) -> Collection<FileStore> {
    let dir = store_dir(config);
    log::debug!("collection store: {}", dir.display());
    Collection::load(FileStore::new(dir), config.collection.key.clone())
}

pub(crate) fn make_rng(config: &PixelDropConfig) -> Rng {
    match config.wall.seed {
        Some(seed) => Rng::new(seed),
        None => Rng::from_time(),
    }
}

/// Find a matrix by 1-based list number or by name (case-insensitive).
///
/// A number outside the list is tried as a name, so a matrix called `2024`
/// stays reachable.
pub(crate) fn resolve_target(items: &[BitmapMatrix], target: &str) -> Option<usize> {
    let by_number = target
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=items.len()).contains(n))
        .map(|n| n - 1);
    by_number.or_else(|| items.iter().position(|m| m.name().eq_ignore_ascii_case(target)))
}

/// Like [`resolve_target`], printing an error when nothing matches.
pub(crate) fn resolve_or_report<S: KeyValueStore>(
    collection: &Collection<S>,
    target: &str,
) -> Result<usize, ExitCode> {
    resolve_target(collection.items(), target).ok_or_else(|| {
        eprintln!(
            "Error: No matrix '{}' in the collection (use a list number 1-{} or a name)",
            target,
            collection.len()
        );
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Expand glob patterns; plain paths pass through unchanged.
pub(crate) fn expand_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for pattern in patterns {
        let is_glob = pattern.contains(['*', '?', '[']);
        if !is_glob {
            files.push(PathBuf::from(pattern));
            continue;
        }
        match glob(pattern) {
            Ok(paths) => {
                let before = files.len();
                files.extend(paths.filter_map(Result::ok));
                if files.len() == before {
                    log::warn!("pattern '{}' matched no files", pattern);
                }
            }
            Err(e) => eprintln!("Warning: invalid pattern '{}': {}", pattern, e),
        }
    }
    files
}

fn is_json_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Run the CLI application
pub fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();
    let config = match load_settings(&cli.wall) {
        Ok(config) => config,
        Err(code) => return code,
    };

    match cli.command {
        Commands::Play { width, height, fps, cycles, no_info } => {
            play::run_play(&config, width, height, fps, cycles, !no_info)
        }
        Commands::Render { output, matrix, input, width, height, fps } => render::run_render(
            &config,
            &output,
            matrix.as_deref(),
            input.as_deref(),
            width,
            height,
            fps,
        ),
        Commands::Convert { inputs, width, threshold, name, preview, add, output } => {
            convert::run_convert(
                &config,
                &inputs,
                width,
                threshold,
                name.as_deref(),
                preview,
                add,
                output.as_deref(),
            )
        }
        Commands::Show { target } => collection::run_show(&config, &target),
        Commands::List => collection::run_list(&config),
        Commands::Import { files } => collection::run_import(&config, &files),
        Commands::Export { target, output } => {
            collection::run_export(&config, target.as_deref(), output.as_deref())
        }
        Commands::Remove { target } => collection::run_remove(&config, &target),
    }
}
