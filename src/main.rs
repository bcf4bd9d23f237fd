#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{ArgGroup, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use bilisubdl::app_config::{Config, DownloadOptions, LogLevel};
use bilisubdl::app_controller::{Controller, DownloadJob, ListMode};
use bilisubdl::range_select::RangeFilter;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
struct SelectArgs {
    /// Select sections by range (e.g., `5`, `8-10`); repeatable
    #[arg(long = "section-range", value_name = "RANGE")]
    section_range: Option<Vec<String>>,

    /// Select episodes by global range across all sections (e.g., `5`, `8-10`); repeatable
    #[arg(long = "episode-range", value_name = "RANGE")]
    episode_range: Option<Vec<String>>,
}

#[derive(Parser, Debug)]
struct DlArgs {
    /// Season IDs, or episode IDs with --dlepisode
    #[arg(value_name = "ID", required = true)]
    ids: Vec<String>,

    /// Subtitle language to download (e.g., `en` for English, `zh` for Chinese)
    #[arg(short, long)]
    language: String,

    /// Output directory
    #[arg(short, long, default_value = "./")]
    output: PathBuf,

    /// Treat IDs as episode IDs and save flat into the output directory
    #[arg(long)]
    dlepisode: bool,

    /// File name format for --dlepisode (e.g. `Abc %d` = Abc 1, `Abc %02d` = Abc 01)
    #[arg(long, requires = "dlepisode")]
    filename: Option<String>,

    /// Overwrite existing subtitle files
    #[arg(short = 'w', long)]
    overwrite: bool,

    /// Suppress per-file output
    #[arg(short, long)]
    quiet: bool,

    /// Skip machine translated subtitles
    #[arg(long = "skip-machine")]
    skip_machine: bool,

    /// Skip the API extension lookup and probe .srt/.ass on disk instead
    #[arg(long = "fast-check", conflicts_with = "overwrite")]
    fast_check: bool,

    /// Record downloaded subtitle IDs in FILE and skip IDs already recorded there
    #[arg(long = "download-archive", value_name = "FILE")]
    download_archive: Option<PathBuf>,

    #[command(flatten)]
    select: SelectArgs,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("mode").args(["language", "section", "episode"])))]
struct ListArgs {
    /// Season ID
    id: String,

    /// List available subtitle languages
    #[arg(short = 'L', long, conflicts_with_all = ["section_range", "episode_range"])]
    language: bool,

    /// List sections
    #[arg(short = 'S', long)]
    section: bool,

    /// List episodes (default)
    #[arg(short = 'E', long)]
    episode: bool,

    #[command(flatten)]
    select: SelectArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download subtitles for the given season IDs
    Dl(DlArgs),

    /// Search for anime by keyword
    Search {
        /// Search keyword
        keyword: String,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show the release timeline for a day of the week (sun, mon, tue, wed, thu, fri, sat)
    Timeline {
        /// Day of the week, today if omitted
        day: Option<String>,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Show languages, sections or episodes of a season
    List(ListArgs),

    /// Generate shell completions for bilisubdl
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// bilisubdl - Bilibili subtitle downloader
#[derive(Parser, Debug)]
#[command(name = "bilisubdl")]
#[command(version)]
#[command(about = "Download subtitles from Bilibili")]
#[command(long_about = "bilisubdl downloads subtitles from the Bilibili international catalog.

EXAMPLES:
    bilisubdl dl 37738 1042594 -l th -o /path/to/output
    bilisubdl dl 37738 -l en --episode-range 1-3 --download-archive archive.txt
    bilisubdl dl --dlepisode 368729 -l en --filename \"Show %02d\"
    bilisubdl list 37738 -S
    bilisubdl search \"One Piece\" --json
    bilisubdl timeline wed")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation, filtered by the global max level
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and label for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "bilisubdl", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    config.validate()?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(&config)?;

    match cli.command {
        Commands::Dl(args) => run_dl(&controller, args).await,
        Commands::Search { keyword, json } => controller.search(&keyword, json).await,
        Commands::Timeline { day, json } => controller.timeline(day.as_deref(), json).await,
        Commands::List(args) => {
            let mode = if args.language {
                ListMode::Languages
            } else if args.section {
                ListMode::Sections
            } else {
                ListMode::Episodes
            };
            controller.list(
                &args.id,
                mode,
                &RangeFilter::from(args.select.section_range),
                &RangeFilter::from(args.select.episode_range),
            ).await
        }
        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_dl(controller: &Controller, args: DlArgs) -> Result<()> {
    let options = DownloadOptions {
        fast_check: args.fast_check,
        overwrite: args.overwrite,
        skip_machine_translation: args.skip_machine,
        archive_path: args.download_archive,
        quiet: args.quiet,
    };
    options.validate()?;

    let job = DownloadJob {
        language: args.language,
        output_dir: args.output,
        options,
        section_filter: RangeFilter::from(args.select.section_range),
        episode_filter: RangeFilter::from(args.select.episode_range),
    };

    if args.dlepisode {
        controller.download_episodes(&args.ids, args.filename.as_deref(), &job).await
    } else {
        controller.download_seasons(&args.ids, &job).await
    }
}
