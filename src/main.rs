use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "palco")]
#[command(about = "Palco - points, levels, badges and rankings for a cultural events community")]
#[command(version)]
struct Cli {
    /// Working directory for config lookup (defaults to current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Path to the config file (defaults to .palco/config.toml, then ~/.palco/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the level a point total resolves to
    Level {
        points: i64,
    },

    /// Show a user's points, level, ranks and badges
    Profile {
        #[arg(long)]
        user: String,

        /// Also list the most recent ledger entries
        #[arg(long, default_value_t = 0)]
        history: usize,
    },

    /// Show the global or monthly ranking
    Ranking {
        /// global or monthly
        #[arg(long, default_value = "global")]
        kind: String,

        /// Rows to show (defaults to ranking.display_limit)
        #[arg(long)]
        limit: Option<usize>,

        /// Viewer whose own rank is always shown
        #[arg(long)]
        user: Option<String>,
    },

    /// Mark attendance for an event (going, maybe, went, none)
    Attend {
        #[arg(long)]
        user: String,

        #[arg(long)]
        event: String,

        #[arg(long)]
        status: String,
    },

    /// Record a review of an event
    Review {
        #[arg(long)]
        user: String,

        #[arg(long)]
        event: String,
    },

    /// Create or update a user profile
    User {
        #[arg(long)]
        user: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        avatar_url: Option<String>,
    },

    /// Create or update an event
    Event {
        #[arg(long)]
        id: String,

        #[arg(long)]
        title: String,

        /// Derived from the title when omitted
        #[arg(long)]
        slug: Option<String>,

        /// curatorial or vitrine
        #[arg(long)]
        highlight: Option<String>,
    },

    /// Summarize curation criteria and metadata from an event JSON file
    Curation {
        file: PathBuf,

        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let work_dir = cli.path.unwrap_or_else(|| PathBuf::from("."));

    if let Commands::Init { force } = cli.command {
        return cli::init::init_command(cli.config, force);
    }

    let config = cli::load_config(&work_dir, cli.config.as_deref())?;

    match cli.command {
        Commands::Level { points } => cli::level::level_command(&config, points)?,
        Commands::Profile { user, history } => {
            cli::profile::profile_command(&config, &user, history)?
        }
        Commands::Ranking { kind, limit, user } => {
            cli::ranking::ranking_command(&config, &kind, limit, user.as_deref())?
        }
        Commands::Attend {
            user,
            event,
            status,
        } => cli::activity::attend_command(&config, &user, &event, &status).await?,
        Commands::Review { user, event } => {
            cli::activity::review_command(&config, &user, &event)?
        }
        Commands::User {
            user,
            username,
            display_name,
            avatar_url,
        } => cli::directory::user_command(&config, &user, &username, display_name, avatar_url)?,
        Commands::Event {
            id,
            title,
            slug,
            highlight,
        } => cli::directory::event_command(&config, &id, &title, slug, highlight.as_deref())?,
        Commands::Curation { file, json } => {
            cli::curation::curation_command(&config, &file, json)?
        }
        Commands::Init { .. } => {}
    }

    Ok(())
}
