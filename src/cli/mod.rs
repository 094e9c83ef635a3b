mod commands;

use {
    flipbook::{FlipbookError, Result, config::ViewerConfig},
    std::{fs::File, path::PathBuf},
};

#[derive(clap::Parser)]
#[command(name = "flipbook", version, about = "Page-turning e-book reader", long_about = None)]
pub struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Use this config file instead of the one in the user config directory
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print help
    Docs,

    /// Read a book in the terminal
    Read(commands::read::ReadArgs),

    /// Load a book and print what it contains
    Info(commands::info::InfoArgs),

    /// Inspect or change saved bookmarks
    Bookmarks(commands::bookmarks::BookmarksArgs),

    /// Generate CLI completions
    Complete(commands::complete::CompleteArgs),
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    if let Some(path) = log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| FlipbookError::Other(format!("failed to initialise logging: {e}")))
}

fn load_config(path: Option<&PathBuf>) -> Result<ViewerConfig> {
    match path {
        Some(path) => ViewerConfig::from_path(path),
        None => ViewerConfig::load_or_default(),
    }
}

pub fn app() -> Result<()> {
    let argv = <Cli as clap::Parser>::parse();

    init_logging(argv.log_file.as_ref())?;

    match argv.command {
        Commands::Docs => {
            clap_markdown::print_help_markdown::<Cli>();
            Ok(())
        }

        Commands::Read(args) => commands::read::execute(args, load_config(argv.config.as_ref())?),
        Commands::Info(args) => commands::info::execute(args, load_config(argv.config.as_ref())?),
        Commands::Bookmarks(args) => {
            commands::bookmarks::execute(args, load_config(argv.config.as_ref())?)
        }
        Commands::Complete(args) => commands::complete::execute(args),
    }
}
