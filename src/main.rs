//! Pixeldrop - command-line player and collection manager for the pixel wall

use std::process::ExitCode;

use pixeldrop::cli;

fn main() -> ExitCode {
    cli::run()
}
