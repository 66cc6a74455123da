use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use go_ctor_lib::{GenerateConfig, GenerateReport, MissingTypePolicy, generate};
use owo_colors::OwoColorize;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "goctor",
    version,
    about = "Insert a New<Type> constructor for a Go struct"
)]
struct Cli {
    /// Go source file to rewrite in place
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Name of the type to generate a constructor for
    #[arg(long = "type", short = 't', value_name = "NAME")]
    type_name: String,

    /// Fail instead of prepending a constructor when the type is not declared
    #[arg(long)]
    strict: bool,

    /// Output the report as JSON
    #[arg(long, conflicts_with = "plain")]
    json: bool,

    /// Disable colors (plain text output)
    #[arg(long)]
    plain: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Returns the output format based on flags.
    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.plain {
            OutputFormat::Plain
        } else {
            OutputFormat::Pretty
        }
    }

    fn missing_type(&self) -> MissingTypePolicy {
        if self.strict {
            MissingTypePolicy::Fail
        } else {
            MissingTypePolicy::Prepend
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Pretty,
    Plain,
    Json,
}

/// Configuration for output styling.
struct OutputConfig {
    use_colors: bool,
}

impl OutputConfig {
    fn new(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Pretty => {
                let no_color = std::env::var("NO_COLOR").is_ok();
                let is_tty = std::io::stdout().is_terminal();
                Self {
                    use_colors: !no_color && is_tty,
                }
            }
            OutputFormat::Plain | OutputFormat::Json => Self { use_colors: false },
        }
    }
}

/// Initialize the tracing subscriber based on verbosity level.
///
/// Verbosity levels:
/// - 0 (default): WARN only
/// - 1 (-v): INFO (the rewritten file and constructor)
/// - 2 (-vv): DEBUG (parse, locate and splice stages)
/// - 3+ (-vvv): TRACE with file/line numbers
fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,go_ctor_lib=info".to_string(),
            2 => "info,go_ctor_lib=debug".to_string(),
            _ => "debug,go_ctor_lib=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_level(true)
                .with_file(verbose >= 3)
                .with_line_number(verbose >= 3)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn print_report(report: &GenerateReport, config: &OutputConfig) {
    let location = format!("{}:{}", report.path.display(), report.line);
    let signature = format!(
        "{}({}) *{}",
        report.constructor,
        report.parameters.join(", "),
        report.type_name
    );

    if config.use_colors {
        println!(
            "{} {} {}",
            "✓".green(),
            signature.bold(),
            location.dimmed()
        );
        if !report.type_found {
            println!(
                "  {} type {} is not declared in this file",
                "warning:".yellow(),
                report.type_name.cyan()
            );
        }
    } else {
        println!("{signature} {location}");
        if !report.type_found {
            println!("  warning: type {} is not declared in this file", report.type_name);
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output_format = cli.output_format();
    let output_config = OutputConfig::new(output_format);

    let config =
        GenerateConfig::new(&cli.file, &cli.type_name)?.with_missing_type(cli.missing_type());
    tracing::debug!(?config, ?output_format, "Resolved configuration");

    let report = generate(&config).wrap_err_with(|| {
        format!(
            "failed to generate {} in {}",
            config.constructor_name(),
            cli.file.display()
        )
    })?;

    match output_format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).wrap_err("failed to encode report")?;
            println!("{json}");
        }
        OutputFormat::Pretty | OutputFormat::Plain => print_report(&report, &output_config),
    }

    Ok(())
}
