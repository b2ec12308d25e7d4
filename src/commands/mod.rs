mod check;
mod graph;
mod init;

pub use check::cmd_check;
pub use graph::cmd_graph;
pub use init::{cmd_init, cmd_init_with_fs};

use crate::api::{CheckOptions, LayerlintError, load_config_with_fs};
use crate::config::Config;
use crate::fs::{FileSystem, write_with_retry};
use crate::style;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Every rule passed.
pub const EXIT_PASS: i32 = 0;
/// At least one violation at or above the fail-on severity.
pub const EXIT_VIOLATIONS: i32 = 1;
/// Bad configuration or an unresolvable project path.
pub const EXIT_CONFIG: i32 = 2;
/// The report could not be written.
pub const EXIT_OUTPUT: i32 = 3;

/// Resolved root and validated config shared by the analysing commands.
pub struct CommandContext {
    pub path: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// Returns Err(exit_code) after printing the reason if setup fails.
    pub fn new(path: &Path, options: &CheckOptions, fs: &dyn FileSystem) -> Result<Self, i32> {
        match load_config_with_fs(path, options, fs) {
            Ok((path, config)) => Ok(Self { path, config }),
            Err(LayerlintError::PathNotFound(p)) => {
                style::error(&format!("Could not resolve path: {}", style::path(&p)));
                Err(EXIT_CONFIG)
            }
            Err(e) => {
                style::error(&e.to_string());
                Err(e.exit_code())
            }
        }
    }
}

/// Write a fully rendered report to `output`, or to stdout when `None`.
/// Nothing is written unless rendering already succeeded.
pub(crate) fn emit(fs: &dyn FileSystem, output: Option<&Path>, content: &str) -> i32 {
    let written = match output {
        Some(path) => write_with_retry(fs, path, content),
        None => write_stdout(content),
    };
    match written {
        Ok(()) => EXIT_PASS,
        Err(e) => {
            style::error(&format!("Failed to write output: {}", e));
            EXIT_OUTPUT
        }
    }
}

fn write_stdout(content: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()
}
