use std::process;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing_subscriber::{filter::LevelFilter, fmt};

use satzkorpus::cli::{BuildArgs, Cli, Commands, FormatArg, OutputFormatArg, SegmenterKind};
use satzkorpus::config::{self, AppConfigError, CorpusConfig};
use satzkorpus::corpus::{CorpusBuilder, OutputFormat, write_corpus};
use satzkorpus::error::AppError;
use satzkorpus::input::{DocumentReader, InputFormat};
use satzkorpus::segment::Segmenter;

fn main() {
    let cli = Cli::parse();
    let log_level = determine_log_level(&cli);
    init_tracing(log_level);

    if let Err(err) = run(cli) {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn init_tracing(level: LevelFilter) {
    let subscriber = fmt().with_max_level(level).with_target(false).finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("Tracing subscriber already set; skipping re-initialization.");
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let verbosity = cli.verbose;

    match cli.command {
        Some(Commands::Build(args)) => run_build(args, verbosity),
        Some(Commands::Formats) => {
            run_formats();
            Ok(())
        }
        None => {
            Cli::print_help();
            Ok(())
        }
    }
}

fn run_build(args: BuildArgs, verbosity: u8) -> Result<(), AppError> {
    let app_config = config::load()?;
    let corpus_config = CorpusConfig::from_app(&app_config)?;

    let backend = match args.segmenter {
        Some(kind) => kind.as_str().to_string(),
        None => app_config.segmenter.backend.clone(),
    };
    let segmenter = Segmenter::from_name(&backend)
        .ok_or_else(|| AppConfigError::UnknownSegmenter(backend.clone()))?;

    let output_format = resolve_output_format(&args)?;

    let reader = match explicit_format(args.format) {
        Some(format) => DocumentReader::open_as(&args.input, format, &corpus_config)?,
        None => DocumentReader::open(&args.input, &corpus_config)?,
    };
    let source = reader.file_name().to_string();

    let spinner = (verbosity == 0).then(make_spinner);
    if let Some(pb) = &spinner {
        pb.set_message(format!("segmenting {source}"));
    }

    let mut builder = CorpusBuilder::new(segmenter);
    let records = builder.build(reader)?;
    write_corpus(&args.output, output_format, &records)?;

    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    println!(
        "wrote {} sentences from {source} to {} ({output_format})",
        records.len(),
        args.output.display(),
    );
    Ok(())
}

fn run_formats() {
    println!("supported input formats:");
    for (extension, description) in InputFormat::descriptions() {
        println!("  {extension:<6} {description}");
    }
}

fn explicit_format(format: FormatArg) -> Option<InputFormat> {
    match format {
        FormatArg::Auto => None,
        FormatArg::Text => Some(InputFormat::PlainText),
        FormatArg::Tei => Some(InputFormat::Tei),
        FormatArg::Alto => Some(InputFormat::Alto),
    }
}

fn resolve_output_format(args: &BuildArgs) -> Result<OutputFormat, AppError> {
    if let Some(choice) = args.output_format {
        return Ok(match choice {
            OutputFormatArg::Csv => OutputFormat::Csv,
            OutputFormatArg::Jsonl => OutputFormat::Jsonl,
        });
    }
    OutputFormat::from_path(&args.output).ok_or_else(|| AppError::UnknownOutputFormat {
        path: args.output.clone(),
    })
}

fn determine_log_level(cli: &Cli) -> LevelFilter {
    match cli.command.as_ref() {
        // Page-skip warnings must surface even without -v.
        Some(Commands::Build(_)) => match cli.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        },
        Some(Commands::Formats) | None => match cli.verbose {
            0 => LevelFilter::OFF,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        },
    }
}

fn make_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
