use std::env;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use flexi_logger::LoggerHandle;
use lesson_press_config::{Config, LoadOptions};
use lesson_press_format::{render_report, ReportFormat};
use lesson_press_ops::{BuildOptions, OperationError, Operations};

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    let _logger = init_logger();

    match cli.command {
        Command::Build(args) => execute(args.common, args.output, true),
        Command::Check(args) => execute(args.common, None, false),
    }
}

fn execute(common: CommonArgs, output: Option<PathBuf>, write_output: bool) -> Result<i32> {
    let mut load = LoadOptions::default();
    if let Some(path) = common.config {
        load = load.with_config_path(path);
    }

    let mut config = match Config::load(load) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return Ok(2);
        }
    };

    if let Some(source) = common.source {
        config.build.source_dir = absolutize(source)?;
    }
    if let Some(output) = output {
        config.build.output_dir = absolutize(output)?;
    }
    if common.no_ignore {
        config.build.respect_ignore = false;
    }

    let format = match common.format.unwrap_or(ReportFormatValue::Plain) {
        ReportFormatValue::Plain => ReportFormat::Plain,
        ReportFormatValue::Json => ReportFormat::Json,
    };

    let ops = Operations::new(config);
    let options = BuildOptions {
        write_output,
        strict: common.strict,
    };

    match ops.build(&options) {
        Ok(outcome) => {
            if !(common.quiet && outcome.report.diagnostics.is_empty()) {
                emit(&render_report(&outcome.report, format))?;
            }
            Ok(outcome.exit_code)
        }
        Err(OperationError::Scan { path, source }) => {
            eprintln!("I/O error on {}: {}", path.display(), source);
            Ok(4)
        }
        Err(OperationError::Io { path, source }) => {
            eprintln!("I/O error on {}: {}", path.display(), source);
            Ok(4)
        }
    }
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

fn emit(content: &str) -> Result<()> {
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn init_logger() -> Option<LoggerHandle> {
    flexi_logger::Logger::try_with_env_or_str("warn")
        .ok()?
        .log_to_stderr()
        .start()
        .ok()
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "lesson content compiler",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile the corpus and write rendered pages
    Build(BuildArgs),
    /// Run the full pipeline without writing anything
    Check(CheckArgs),
}

#[derive(Args)]
struct BuildArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Override the output directory
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CommonArgs {
    /// Override the source directory
    #[arg(long, value_name = "DIR")]
    source: Option<PathBuf>,
    /// Use a specific config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Treat every collected diagnostic as fatal
    #[arg(long)]
    strict: bool,
    /// Select report output format
    #[arg(long, value_enum)]
    format: Option<ReportFormatValue>,
    /// Disable gitignore filtering during the source scan
    #[arg(long = "no-ignore")]
    no_ignore: bool,
    /// Suppress the report when nothing was collected
    #[arg(long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormatValue {
    Plain,
    Json,
}
