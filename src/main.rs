use clap::Parser;
use layerlint::cli::{CheckArgs, Cli, Command};
use layerlint::{cmd_check, cmd_graph, cmd_init};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Some(Command::Check(args)) => cmd_check(args),
        Some(Command::Graph(args)) => cmd_graph(args),
        Some(Command::Init(args)) => cmd_init(args),
        None => cmd_check(CheckArgs {
            path: cli.path,
            ..Default::default()
        }),
    };

    std::process::exit(exit_code);
}

/// Logs go to stderr so reports on stdout stay machine-readable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "layerlint=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}
