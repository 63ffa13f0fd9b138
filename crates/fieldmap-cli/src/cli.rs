//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fieldmap",
    version,
    about = "Resolve e-commerce spreadsheet headers to canonical fields",
    long_about = "Resolve the headers of e-commerce spreadsheet exports to canonical \
                  field codes.\n\n\
                  Headers are matched against a field dictionary by synonym, \
                  containment, keyword and similarity, with sample values as a \
                  last resort."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Resolve the header row of a CSV file.
    Resolve(ResolveArgs),

    /// List catalog fields.
    Fields(FieldsArgs),

    /// List catalog domains with their field counts.
    Domains(CatalogArgs),
}

/// Where the field dictionary comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Dictionary directory holding Fields.csv (default: FIELDMAP_DICTIONARY_DIR
    /// or the bundled dictionary).
    #[arg(long = "dictionary", value_name = "DIR", conflicts_with = "catalog_json")]
    pub dictionary: Option<PathBuf>,

    /// JSON feed of field records, used instead of a dictionary directory.
    #[arg(long = "catalog-json", value_name = "FILE")]
    pub catalog_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// CSV file whose first row holds the headers.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Data domain of the sheet (orders, products, traffic, ...).
    #[arg(long = "domain", short = 'd')]
    pub domain: String,

    /// Source platform, enables platform-specific synonyms.
    #[arg(long = "platform", short = 'p')]
    pub platform: Option<String>,

    /// Number of data rows read as sample values.
    #[arg(long = "samples", value_name = "N", default_value_t = 20)]
    pub samples: usize,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// JSON file with engine options.
    #[arg(long = "config", value_name = "FILE", conflicts_with = "strict")]
    pub config: Option<PathBuf>,

    /// Use the strict option preset.
    #[arg(long = "strict")]
    pub strict: bool,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Args, Debug)]
pub struct FieldsArgs {
    /// Only fields visible in this domain.
    #[arg(long = "domain", short = 'd')]
    pub domain: Option<String>,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
