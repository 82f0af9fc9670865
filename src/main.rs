mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// cookbook - recipe management API
#[derive(Parser)]
#[command(name = "cookbook")]
#[command(about = "Recipe, tag and ingredient REST API", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create an account with staff and superuser flags set
    CreateSuperuser {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "")]
        name: String,
    },
    /// Change the role of an existing account
    SetRole {
        #[arg(long)]
        email: String,

        #[arg(value_enum)]
        role: cli::user::Role,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cookbook::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    cookbook::observability::init_observability(
        "cookbook",
        env!("CARGO_PKG_VERSION"),
        &config.observability.log_level,
        config.observability.json,
    )?;

    match cli.command {
        Commands::Serve { host, port } => cli::server::serve(config, host, port).await,
        Commands::Migrate => cli::migrate::migrate(config).await,
        Commands::User { command } => match command {
            UserCommands::CreateSuperuser {
                email,
                password,
                name,
            } => cli::user::create_superuser(config, email, password, name).await,
            UserCommands::SetRole { email, role } => cli::user::set_role(config, email, role).await,
        },
    }
}
