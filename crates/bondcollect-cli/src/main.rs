use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::eyre;
use commands::{connect_plex, create, investigate, Overrides};
use media_collection_config::{Config, MatchKey, PathManager};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "bondcollect")]
#[command(about = "Find the James Bond films in a Plex library and gather them into a collection")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a TOML config file (defaults to <config dir>/bondcollect/config.toml when present)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Write logs to a daily-rotated file instead of stderr.
    /// Without a value, logs go to the default log directory.
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "", global = true)]
    log_file: Option<String>,

    /// Plex server URL (overrides PLEX_URL)
    #[arg(long, value_name = "URL", global = true)]
    url: Option<String>,

    /// Library section to search (overrides PLEX_LIBRARY)
    #[arg(long, value_name = "NAME", global = true)]
    library: Option<String>,

    /// How matched movies are deduplicated
    #[arg(long, value_enum, global = true)]
    match_by: Option<MatchBy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum MatchBy {
    /// The server's rating key (distinct films with the same title stay distinct)
    RatingKey,
    /// The display title
    Title,
}

impl From<MatchBy> for MatchKey {
    fn from(value: MatchBy) -> Self {
        match value {
            MatchBy::RatingKey => MatchKey::RatingKey,
            MatchBy::Title => MatchKey::Title,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Report which Bond titles are in the library and how the server answers loose searches
    #[command(long_about = "Search the library for every official Bond title, list what was found and what is missing, run a few exploratory searches ('James Bond', '007', 'Bond'), and show the metadata of one matched movie. Makes no changes.")]
    Investigate,

    /// Tag every matched Bond movie into the collection
    #[command(long_about = "Search the library for every known Bond title (including the 1967 Casino Royale and Never Say Never Again unless --official-only is given) and add the collection tag to each match that does not already carry it. Movies that fail to update are reported and skipped.")]
    Create {
        /// Collection name (overrides COLLECTION_NAME)
        #[arg(long, value_name = "NAME")]
        collection: Option<String>,

        /// Only search the official Eon films
        #[arg(long, action = ArgAction::SetTrue)]
        official_only: bool,

        /// Show what would be tagged without changing anything
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let paths = PathManager::default();

    let log_file = cli.log_file.map(|path| {
        if path.is_empty() {
            paths.log_file()
        } else {
            PathBuf::from(path)
        }
    });
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.quiet);

    let mut config = Config::load(cli.config.as_deref(), &paths).map_err(|e| eyre!("{:#}", e))?;
    let mut overrides = Overrides {
        url: cli.url,
        library: cli.library,
        match_key: cli.match_by.map(MatchKey::from),
        ..Overrides::default()
    };

    match cli.command {
        Commands::Investigate => {
            overrides.apply(&mut config);
            investigate::run_investigate(&config, &output, || connect_plex(&config)).await
        }
        Commands::Create {
            collection,
            official_only,
            dry_run,
        } => {
            overrides.collection = collection;
            overrides.official_only = official_only;
            overrides.apply(&mut config);
            create::run_create(&config, dry_run, &output, || connect_plex(&config)).await
        }
    }
}
