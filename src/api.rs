//! Library API for layerlint.
//!
//! The CLI commands print and return exit codes; these functions return
//! `Result`s so the checker can be embedded in other tools.
//!
//! # Example
//!
//! ```no_run
//! use layerlint::{check, CheckOptions};
//! use std::path::Path;
//!
//! let outcome = check(Path::new("."), CheckOptions::default())?;
//! for violation in &outcome.result.violations {
//!     println!("{}: {}", violation.kind, violation.message);
//! }
//! println!("passed: {}", outcome.passed());
//! # Ok::<(), layerlint::LayerlintError>(())
//! ```

use crate::analysis;
use crate::cache::ExtractCache;
use crate::cli::OutputFormat;
use crate::config::{Config, ConfigError, ConfigOverrides};
use crate::fs::{FileSystem, default_fs};
use crate::model::{AnalysisResult, Severity, Warning, WarningKind};
use crate::output::{JsonOutput, MarkdownOutput, OutputFormatter, Report, TextOutput};
use crate::parser::ParserRegistry;
use crate::scan::relative_path;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayerlintError {
    /// The project root could not be found or resolved.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LayerlintError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            LayerlintError::PathNotFound(_) | LayerlintError::Config(_) => 2,
            LayerlintError::Io(_) => 3,
        }
    }
}

/// Options for [`check`].
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Explicit config file. Defaults to `<root>/.layerlint.toml`.
    pub config: Option<PathBuf>,
    /// Values applied on top of the config file.
    pub overrides: ConfigOverrides,
    /// Extraction cache file; read before the scan and rewritten after it.
    pub cache: Option<PathBuf>,
}

/// A finished check: the analysis plus the threshold it is judged against.
pub struct CheckOutcome {
    pub result: AnalysisResult,
    pub fail_on: Severity,
}

impl CheckOutcome {
    pub fn report(&self) -> Report<'_> {
        Report::new(&self.result, self.fail_on)
    }

    pub fn passed(&self) -> bool {
        self.report().passed()
    }

    /// Render the full report into memory.
    pub fn render(&self, format: OutputFormat, quiet: bool, color: bool) -> std::io::Result<String> {
        let report = self.report();
        let mut buffer = Vec::new();
        match format {
            OutputFormat::Text => TextOutput::new(quiet, color).format(&report, &mut buffer)?,
            OutputFormat::Json => JsonOutput::new().format(&report, &mut buffer)?,
            OutputFormat::Markdown => MarkdownOutput::new(quiet).format(&report, &mut buffer)?,
        }
        String::from_utf8(buffer).map_err(std::io::Error::other)
    }

    pub fn to_json(&self) -> std::io::Result<String> {
        self.render(OutputFormat::Json, false, false)
    }
}

/// Resolve the project root, load the config, apply overrides and validate.
///
/// Returns the canonical root alongside the config.
pub fn load_config(
    path: &Path,
    options: &CheckOptions,
) -> Result<(PathBuf, Config), LayerlintError> {
    load_config_with_fs(path, options, default_fs())
}

pub fn load_config_with_fs(
    path: &Path,
    options: &CheckOptions,
    fs: &dyn FileSystem,
) -> Result<(PathBuf, Config), LayerlintError> {
    let root = path
        .canonicalize()
        .map_err(|_| LayerlintError::PathNotFound(path.to_path_buf()))?;
    let mut config = Config::load_with(fs, &root, options.config.as_deref())?;
    config.apply_overrides(&options.overrides)?;
    config.validate(fs, &root)?;
    Ok((root, config))
}

/// Check a project against its layer rules.
///
/// Fails only on configuration problems or an unresolvable root; unreadable
/// or unparsable files become warnings on the result.
pub fn check(path: &Path, options: CheckOptions) -> Result<CheckOutcome, LayerlintError> {
    let fs = default_fs();
    let (root, config) = load_config_with_fs(path, &options, fs)?;
    let result = check_root(&root, &config, options.cache.as_deref(), fs)?;
    Ok(CheckOutcome {
        result,
        fail_on: config.fail_on,
    })
}

/// Run the pipeline over an already resolved root and validated config.
pub fn check_root(
    root: &Path,
    config: &Config,
    cache_path: Option<&Path>,
    fs: &dyn FileSystem,
) -> Result<AnalysisResult, ConfigError> {
    let registry = ParserRegistry::with_extensions(&config.extensions);
    let mut cache_warnings = Vec::new();

    let cache = cache_path.map(|path| match ExtractCache::load(fs, path) {
        Ok(cache) => cache,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unusable cache");
            cache_warnings.push(Warning::new(
                WarningKind::Cache,
                relative_path(root, path),
                format!("ignored and rebuilt: {}", err),
            ));
            ExtractCache::default()
        }
    });

    let mut result = analysis::analyze(root, config, &registry, fs, cache.as_ref())?;

    if let Some(path) = cache_path {
        if let Err(err) = ExtractCache::from_files(&result.files).save(fs, path) {
            tracing::warn!(path = %path.display(), error = %err, "could not write cache");
            cache_warnings.push(Warning::new(
                WarningKind::Cache,
                relative_path(root, path),
                format!("could not be written: {}", err),
            ));
        }
    }

    if !cache_warnings.is_empty() {
        result.warnings.extend(cache_warnings);
        result.warnings.sort();
        result.warnings.dedup();
    }
    Ok(result)
}
