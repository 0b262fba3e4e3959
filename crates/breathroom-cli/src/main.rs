use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "breathroom", version, about = "Breathroom guided-breathing timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a practice session; press Enter to stop and save
    Practice(commands::practice::PracticeArgs),
    /// Session log
    Log {
        #[command(subcommand)]
        action: commands::log::LogAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Breath pattern inspection
    Pattern {
        #[command(subcommand)]
        action: commands::pattern::PatternAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Diagnostics go to stderr so stdout carries only the countdown and JSON.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("BREATHROOM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Practice(args) => commands::practice::run(args),
        Commands::Log { action } => commands::log::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Pattern { action } => commands::pattern::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "breathroom", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
