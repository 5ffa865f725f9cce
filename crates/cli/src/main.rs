//! Recipe Finder CLI - database migrations and user management.
//!
//! # Usage
//!
//! ```bash
//! # Create or update the database schema
//! rf-cli migrate
//!
//! # Create a user (password read from stdin)
//! echo 's3cret-pasta' | rf-cli users create -u julia -e julia@example.com
//!
//! # Count registered users
//! rf-cli users count
//! ```
//!
//! The database is taken from `RECIPE_FINDER_DATABASE_URL` (or
//! `DATABASE_URL`), loading `.env` if present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rf-cli")]
#[command(author, version, about = "Recipe Finder CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (users table and session store)
    Migrate,
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// Create a user; the password is read from stdin
    Create {
        /// Unique username
        #[arg(short, long)]
        username: String,

        /// Unique email address used to log in
        #[arg(short, long)]
        email: String,
    },
    /// Print the number of registered users
    Count,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Users { action } => match action {
            UsersAction::Create { username, email } => {
                commands::users::create(&username, &email).await?;
            }
            UsersAction::Count => commands::users::count().await?,
        },
    }
    Ok(())
}
