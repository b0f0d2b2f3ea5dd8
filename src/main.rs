/// Version injected at compile time via AZXRAY_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("AZXRAY_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use azxray::capture;
use azxray::config::Config;
use azxray::pipeline::Pipeline;
use azxray::report::{self, OutputFormat, ReportOptions};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Turn captured Azure portal batch requests into PowerShell and KQL
#[derive(Parser, Debug)]
#[command(name = "azxray", version, about, long_about = None)]
struct Args {
    /// Batch envelope JSON or HAR export to read ("-" or omitted for stdin)
    input: Option<PathBuf>,

    /// Output format (defaults to the configured format, then text)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Only print formatted KQL for Resource Graph queries
    #[arg(short, long)]
    query_only: bool,

    /// Include Resource Graph Explorer links in text output
    #[arg(short, long, overrides_with = "no_portal_links")]
    portal_links: bool,

    /// Leave portal links out even when the config enables them
    #[arg(long, overrides_with = "portal_links")]
    no_portal_links: bool,

    /// Remember --format and --portal-links as defaults
    #[arg(long)]
    save_defaults: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

impl Args {
    /// Portal link choice made on the command line, if any
    fn portal_links_flag(&self) -> Option<bool> {
        match (self.portal_links, self.no_portal_links) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("azxray {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("azxray").join("azxray.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".azxray").join("azxray.log");
    }
    PathBuf::from("azxray.log")
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    let format = config.effective_format(args.format);
    let options = ReportOptions {
        query_only: args.query_only,
        portal_links: config.effective_portal_links(args.portal_links_flag()),
    };

    if args.save_defaults {
        config.output_format = Some(format);
        config.portal_links = options.portal_links;
        config.save().context("Failed to save configuration")?;
    }

    let text = read_input(args.input.as_deref())?;
    let requests = capture::load(&text, &config.management_endpoint)
        .context("Input is neither a batch envelope nor a HAR export")?;

    tracing::info!("Loaded {} captured requests", requests.len());

    let pipeline = Pipeline::new(&config.management_endpoint);
    let outcomes = pipeline.process_all(&requests);

    let output = report::render(&outcomes, format, options).context("Failed to render output")?;
    println!("{}", output);

    Ok(())
}
