use std::{
    io::{self, IsTerminal},
    ops::Range,
};

use ariadne::{Color, Config, Label, ReportKind, Source};
use clap::ColorChoice;
use tinyada::{Diagnostic, Level, Sink};

type Report = ariadne::Report<'static, (String, Range<usize>)>;

/// Helper function to convert TinyAda diagnostics to a prettier format.
pub fn to_report(file: &str, diag: &Diagnostic, color: bool) -> Report {
    let (kind, label_color) = match diag.level() {
        Level::Error => (ReportKind::Error, Color::Red),
        Level::Warning => (ReportKind::Warning, Color::Yellow),
    };

    let message = diag.kind.to_string();
    Report::build(kind, file.to_string(), diag.start)
        .with_message(&message)
        .with_label(
            Label::new((file.to_string(), diag.location()))
                .with_message(message)
                .with_color(label_color),
        )
        .with_config(Config::default().with_color(color))
        .finish()
}

/// Sink rendering diagnostics as source excerpts on stderr.  Output of the
/// `print` procedure still goes to stdout.
pub struct ReportSink {
    /// File name and source text.  Every byte of the source is one character,
    /// so character offsets and byte offsets agree.
    cache: (String, Source),

    color: bool,
}

impl ReportSink {
    pub fn new(name: String, source: &[u8], color: ColorChoice) -> Self {
        let text = source.iter().map(|&b| char::from(b)).collect::<String>();
        let color = match color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stderr().is_terminal(),
        };

        ReportSink {
            cache: (name, Source::from(text)),
            color,
        }
    }
}

impl Sink for ReportSink {
    fn diagnostic(&mut self, diagnostic: Diagnostic) {
        let report = to_report(&self.cache.0, &diagnostic, self.color);
        if let Err(e) = report.eprint(&mut self.cache) {
            tracing::warn!("unable to write diagnostic report: {e}");
        }
    }

    fn print(&mut self, line: String) {
        println!("{line}");
    }
}
