//! CLI tool for svgpack container operations.

mod commands;
mod exit_codes;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use svgpack::tree::MergeStrategy;

use commands::{ExportConfig, ImportConfig, MetaAction};
use exit_codes::ExitCode;

/// Embed, inspect and extract files inside SVG documents
#[derive(Parser)]
#[command(name = "svgpack")]
#[command(author, version, about = "Embed, inspect and extract files inside SVG documents", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Suppress per-file output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed files or directories into an SVG (alias: i)
    #[command(alias = "i")]
    Import {
        /// Host SVG document
        svg: PathBuf,

        /// Files and directories to embed
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Persist the directory tree alongside the entries
        #[arg(long)]
        preserve_structure: bool,

        /// How imported paths merge with existing entries
        #[arg(long, value_enum, default_value = "preserve")]
        strategy: StrategyArg,

        /// Replace existing entries
        #[arg(long)]
        overwrite: bool,

        /// Compress payloads (base64+deflate)
        #[arg(long, short = 'z')]
        compress: bool,

        /// Abort the whole batch on the first failure
        #[arg(long)]
        abort_on_error: bool,

        /// Maximum size of a single file in bytes
        #[arg(long)]
        max_file_size: Option<u64>,

        /// Maximum combined size of the batch in bytes
        #[arg(long)]
        max_total_size: Option<u64>,
    },

    /// Extract embedded files to a directory (alias: x)
    #[command(alias = "x")]
    Export {
        /// Host SVG document
        svg: PathBuf,

        /// Logical paths or a glob pattern (default: everything)
        patterns: Vec<String>,

        /// Output directory
        #[arg(short = 'o', long, default_value = ".")]
        output: PathBuf,

        /// Remove exported entries from the SVG
        #[arg(long)]
        remove: bool,

        /// Fail the whole command on the first corrupt or missing entry
        #[arg(long)]
        strict: bool,
    },

    /// List embedded files (alias: ls)
    #[command(alias = "ls")]
    List {
        /// Host SVG document
        svg: PathBuf,

        /// Keep only entries of one media class (text, image, ...)
        #[arg(long, short = 't')]
        r#type: Option<String>,

        /// Render a full text report instead of a table
        #[arg(long)]
        report: bool,
    },

    /// Remove entries without extracting them (alias: rm)
    #[command(alias = "rm")]
    Exclude {
        /// Host SVG document
        svg: PathBuf,

        /// Logical paths to remove
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Inspect or edit container metadata
    Meta {
        /// Host SVG document
        svg: PathBuf,

        #[command(subcommand)]
        action: MetaCommands,
    },

    /// Render the changelog persisted in the container
    Changelog {
        /// Host SVG document
        svg: PathBuf,

        /// Output format: markdown, json or xml
        #[arg(long, default_value = "markdown")]
        format: String,
    },

    /// Create a fresh host SVG ready to receive entries
    Create {
        /// Path of the new SVG document
        svg: PathBuf,
    },
}

#[derive(Subcommand)]
enum MetaCommands {
    /// Set metadata keys (key=value; values parse as JSON when possible)
    Set {
        /// key=value pairs
        #[arg(required = true)]
        pairs: Vec<String>,
    },
    /// Remove metadata keys
    Remove {
        /// Keys to remove
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Reduce metadata to title, description and creator
    Clean,
    /// Drop all caller-set metadata
    Clear,
    /// Print the metadata mapping
    Show,
}

/// Output format shared by every subcommand.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Human,
    /// Machine-readable JSON
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Keep imported relative paths
    Preserve,
    /// Drop files into the root, ignoring folders
    Flat,
    /// Insert under one segment named after the source
    Nested,
    /// One segment per import source
    BySource,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Preserve => MergeStrategy::Preserve,
            StrategyArg::Flat => MergeStrategy::Flat,
            StrategyArg::Nested => MergeStrategy::Nested,
            StrategyArg::BySource => MergeStrategy::BySource,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let code = run(cli);
    code.exit();
}

fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Commands::Import {
            svg,
            paths,
            preserve_structure,
            strategy,
            overwrite,
            compress,
            abort_on_error,
            max_file_size,
            max_total_size,
        } => commands::import(&ImportConfig {
            svg: &svg,
            paths: &paths,
            preserve_structure,
            strategy: strategy.into(),
            overwrite,
            compress,
            abort_on_error,
            max_file_size,
            max_total_size,
            format: cli.format,
            quiet: cli.quiet,
        }),

        Commands::Export {
            svg,
            patterns,
            output,
            remove,
            strict,
        } => commands::export(&ExportConfig {
            svg: &svg,
            patterns: &patterns,
            output_dir: &output,
            remove,
            strict,
            format: cli.format,
        }),

        Commands::List { svg, r#type, report } => {
            commands::list(&svg, r#type.as_deref(), report, cli.format)
        }

        Commands::Exclude { svg, names } => commands::exclude(&svg, &names, cli.format),

        Commands::Meta { svg, action } => {
            let action = match &action {
                MetaCommands::Set { pairs } => MetaAction::Set(pairs),
                MetaCommands::Remove { keys } => MetaAction::Remove(keys),
                MetaCommands::Clean => MetaAction::Clean,
                MetaCommands::Clear => MetaAction::Clear,
                MetaCommands::Show => MetaAction::Show,
            };
            commands::meta(&svg, action, cli.format)
        }

        Commands::Changelog { svg, format } => commands::changelog(&svg, &format),

        Commands::Create { svg } => commands::create(&svg),
    }
}
