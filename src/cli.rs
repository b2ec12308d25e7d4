use crate::model::Severity;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "layerlint")]
#[command(about = "Enforce layer boundaries in TypeScript and JavaScript projects")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project root to check when no subcommand is given
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Log pipeline progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check the project against its layer rules (default)
    Check(CheckArgs),

    /// Print the resolved module graph
    Graph(GraphArgs),

    /// Generate a starter .layerlint.toml configuration file
    Init(InitArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Project root (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Report format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (defaults to <PATH>/.layerlint.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only check files matching these globs
    #[arg(long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Skip files matching these globs
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Add or replace an import alias, e.g. --alias '@/*=src/*'
    #[arg(long = "alias", value_name = "KEY=VALUE")]
    pub aliases: Vec<String>,

    /// Barrel file stem (glob allowed)
    #[arg(long)]
    pub barrel: Option<String>,

    /// Lowest severity that fails the run: info, warning or error
    #[arg(long)]
    pub fail_on: Option<Severity>,

    /// Only print violation lines and the summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Reuse extraction results stored in this file between runs
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,
}

impl Default for CheckArgs {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            format: OutputFormat::Text,
            output: None,
            config: None,
            include: Vec::new(),
            exclude: Vec::new(),
            aliases: Vec::new(),
            barrel: None,
            fail_on: None,
            quiet: false,
            cache: None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct GraphArgs {
    /// Project root (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Graph format
    #[arg(short, long, default_value = "dot")]
    pub format: GraphFormat,

    /// Write the graph to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (defaults to <PATH>/.layerlint.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Directory to create the config in
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GraphFormat {
    #[default]
    Dot,
    Json,
}
