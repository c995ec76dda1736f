use std::fmt::{self, Write as _};

use colored::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

/// Field the scanner and prober tag discovered hosts with.
const HOST_FIELD: &str = "host";

/// Prefixes every event with a colored level glyph, then the host it concerns (if any),
/// the message and the remaining fields.
pub struct LatticeFormatter;

impl<S, N> FormatEvent<S, N> for LatticeFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
            Level::TRACE => ("[ ]", |s| s.dimmed()),
            Level::DEBUG => ("[?]", |s| s.blue()),
            Level::INFO => ("[+]", |s| s.green().bold()),
            Level::WARN => ("[*]", |s| s.yellow().bold()),
            Level::ERROR => ("[-]", |s| s.red().bold()),
        };

        write!(writer, "{} ", color_func(symbol.into()))?;

        if *meta.level() >= Level::DEBUG {
            write!(writer, "{} ", meta.target().bright_black())?;
        }

        let mut line = EventLine::default();
        event.record(&mut line);
        writeln!(writer, "{}", line.render())
    }
}

/// The fields of one event, split into the host, the message and everything else.
#[derive(Default)]
struct EventLine {
    host: Option<String>,
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl EventLine {
    fn render(&self) -> String {
        let mut out: String = String::new();
        if let Some(host) = &self.host {
            let _ = write!(out, "{} ", host.cyan().bold());
        }
        out.push_str(&self.message);
        for (name, value) in &self.fields {
            let _ = write!(out, " {}", format!("{name}={value}").dimmed());
        }
        out
    }
}

impl Visit for EventLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            HOST_FIELD => self.host = Some(value.to_string()),
            name => self.fields.push((name, value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            HOST_FIELD => self.host = Some(format!("{value:?}")),
            name => self.fields.push((name, format!("{value:?}"))),
        }
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks info, debug or trace for our crates.
pub fn init(verbose: u8) {
    let default_level: &str = match verbose {
        0 => "info",
        1 => "lattice_core=debug,lattice_cli=debug,info",
        _ => "lattice_core=trace,lattice_cli=trace,debug",
    };
    let filter: EnvFilter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(LatticeFormatter)
        .init();
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
