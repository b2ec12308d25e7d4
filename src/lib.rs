pub mod analysis;
pub mod api;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod fs;
pub mod glob;
pub mod graph;
pub mod model;
pub mod output;
pub mod parser;
pub mod resolve;
pub mod scan;
pub mod style;

pub use api::{CheckOptions, CheckOutcome, LayerlintError, check, check_root, load_config};
pub use cli::Cli;
pub use commands::{cmd_check, cmd_graph, cmd_init};
pub use config::{Config, ConfigError, ConfigOverrides};
pub use model::{AnalysisResult, Severity, Violation, ViolationKind};
