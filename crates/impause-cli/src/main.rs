use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "impause-cli", version, about = "Impause CLI - pause before you buy")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reflection timer for a purchase you are considering
    Reflect(commands::reflect::ReflectArgs),
    /// Past decisions, most recent first
    History(commands::history::HistoryArgs),
    /// Spending recap from analysed bank statements
    Wrapped {
        #[command(subcommand)]
        action: commands::wrapped::WrappedAction,
    },
    /// Impause account
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Accountability buddies and notifications
    Buddy {
        #[command(subcommand)]
        action: commands::buddy::BuddyAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("IMPAUSE_LOG")
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Reflect(args) => commands::reflect::run(args).await,
        Commands::History(args) => commands::history::run(args),
        Commands::Wrapped { action } => commands::wrapped::run(action).await,
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Buddy { action } => commands::buddy::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "impause-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
