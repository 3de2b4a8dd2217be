mod commands;
mod transport;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ClientOptions;

#[derive(Parser)]
#[command(name = "dirsign", version, about = "Register and verify folder signatures")]
struct Cli {
    #[command(flatten)]
    options: ClientOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the folder with the server
    Register {
        /// User the folder is registered for
        #[arg(long, env = "USER")]
        user: String,

        /// Host the folder lives on
        #[arg(long, env = "HOSTNAME")]
        host: String,
    },

    /// Verify the folder against its registration
    Verify,

    /// Verify if the folder is registered, register it otherwise
    Check {
        /// User the folder is registered for
        #[arg(long, env = "USER")]
        user: String,

        /// Host the folder lives on
        #[arg(long, env = "HOSTNAME")]
        host: String,
    },

    /// Print the folder fingerprint
    Fingerprint,

    /// Print the SHA-256 hash of a password for the server account list
    HashPassword {
        /// Password to hash
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing (controlled by RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let opts = &cli.options;

    let result = match &cli.command {
        Commands::Register { user, host } => commands::register::run_register(opts, user, host).await,
        Commands::Verify => commands::verify::run_verify(opts).await,
        Commands::Check { user, host } => commands::check::run_check(opts, user, host).await,
        Commands::Fingerprint => commands::fingerprint::run_fingerprint(opts).await,
        Commands::HashPassword { password } => commands::hash_password::run_hash_password(password).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
