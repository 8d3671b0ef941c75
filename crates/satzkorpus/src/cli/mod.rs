use std::path::PathBuf;

use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand, ValueEnum};

/// Top-level CLI entry point.
#[derive(Debug, Parser)]
#[command(
    name = "satzkorpus",
    version,
    author,
    about = "Build sentence corpora from historical text sources"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(global = true, short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn print_help() {
        let mut cmd = Cli::command();
        let _ = cmd.print_help();
        println!();
    }
}

/// Supported subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Segment one source document into a sentence corpus file.
    Build(BuildArgs),
    /// List the supported input formats.
    Formats,
}

/// Input format override for `build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Detect from the file extension, sniffing XML content.
    Auto,
    Text,
    Tei,
    Alto,
}

/// Sentence segmentation backends exposed through the CLI.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SegmenterKind {
    /// Rule-based splitter tuned for 19th-century German prose.
    Rules,
    /// Unicode sentence boundaries (UAX #29).
    Unicode,
}

impl SegmenterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmenterKind::Rules => "rules",
            SegmenterKind::Unicode => "unicode",
        }
    }
}

/// Corpus output serialization.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Jsonl,
}

/// Build a sentence corpus from one source document.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Source document: plain text (.txt), TEI (.xml), or ALTO pages
    /// (.zip of per-page XML, or a single page .xml).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
    /// Corpus file to write.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,
    /// Input format, overriding extension-based detection.
    #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
    pub format: FormatArg,
    /// Segmentation backend (defaults to the configured backend).
    #[arg(long, value_enum)]
    pub segmenter: Option<SegmenterKind>,
    /// Output format (defaults to the output file extension).
    #[arg(long = "output-format", value_enum)]
    pub output_format: Option<OutputFormatArg>,
}
