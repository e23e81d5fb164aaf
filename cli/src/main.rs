mod error;

use std::{fs, io, path::PathBuf};

use anyhow::Context;
use clap::{ArgAction, ColorChoice, Parser, ValueEnum};
use tinyada::{Compiler, Options, Sink, TextSink};
use tracing_subscriber::EnvFilter;

use crate::error::ReportSink;

/// Check a TinyAda source file, reporting every diagnostic found
#[derive(Parser, Debug)]
#[command(name = "tinyada", version, about)]
struct Cli {
    /// Source file holding a single procedure
    file: PathBuf,

    /// Print the token stream instead of parsing
    #[arg(long)]
    tokens: bool,

    /// How diagnostics are shown
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// When to colour diagnostic reports
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// How deeply constructs may nest before the parser gives up on them
    #[arg(long, default_value_t = Options::default().recursion_limit)]
    recursion_limit: usize,

    /// Log more, can be repeated (overridden by RUST_LOG)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// `E: ` prefixed lines on stdout
    Text,

    /// Annotated source excerpts on stderr
    Report,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let source = fs::read(&cli.file)
        .with_context(|| format!("unable to read {}", cli.file.display()))?;

    let mut compiler = Compiler::new();
    compiler.recursion_limit = cli.recursion_limit;

    match cli.format {
        Format::Text => {
            let mut sink = TextSink::new(io::stdout());
            run(&compiler, &cli, &source, &mut sink);
        }
        Format::Report => {
            let name = cli.file.display().to_string();
            let mut sink = ReportSink::new(name, &source, cli.color);
            run(&compiler, &cli, &source, &mut sink);
        }
    }

    Ok(())
}

fn run(compiler: &Compiler, cli: &Cli, source: &[u8], sink: &mut dyn Sink) {
    if cli.tokens {
        for token in compiler.tokens(source, sink) {
            println!("{token}");
        }
        return;
    }

    let output = compiler.parse(source, sink);
    tracing::info!(
        faults = output.faults,
        warnings = output.warnings,
        "finished parsing {}",
        cli.file.display()
    );
}

/// Log to stderr, `RUST_LOG` takes precedence over the verbosity flag
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
