use clap::{Parser, Subcommand};
use orgchart_cli::session::{self, SessionOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "orgchart")]
#[command(about = "Browse an organization chart one level at a time")]
struct Cli {
    /// Hierarchy file (.toml or .json). Defaults to the bundled demo.
    #[arg(long, global = true)]
    hierarchy: Option<PathBuf>,

    /// View and storage settings (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// File holding the persisted expansion record
    #[arg(long, global = true, default_value = ".orgchart_state.json")]
    state: PathBuf,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the view restored from the expansion record
    Tree,
    /// Interactive session reading commands from stdin
    Run {
        /// Do not clear the expansion record on exit
        #[arg(long)]
        keep_state: bool,
    },
    /// Validate a hierarchy and print its shape
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let options = SessionOptions {
        hierarchy: cli.hierarchy,
        config: cli.config,
        state: cli.state,
    };

    let result = match cli.command {
        Commands::Tree => session::print_tree(&options),
        Commands::Run { keep_state } => session::run_interactive(&options, keep_state).await,
        Commands::Check => session::check(&options),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(2);
    }
}
