//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use super::utils::{DATETIME, TIME, log_file_path, strip_ansi, utc_now};

const STAGE_TARGET: &str = "provision::stage";
const DRY_RUN_TARGET: &str = "provision::dry_run";

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends all events to the persistent
/// log file with timestamps and ANSI codes stripped.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the log file for `command`, write a run header, and return the layer.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?)
    }

    /// Truncate `path`, write a run header, and return a layer appending to it.
    pub(super) fn at(path: &Path) -> Option<Self> {
        let version =
            option_env!("PROVISION_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "==========================================\n\
             Provision {version} {}\n\
             ==========================================\n",
            utc_now(DATETIME),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = strip_ansi(&extractor.message);
        let ts = utc_now(TIME);

        let line = match (level, target) {
            (tracing::Level::INFO, STAGE_TARGET) => format!("[{ts}] ==> {msg}"),
            (tracing::Level::INFO, DRY_RUN_TARGET) => format!("[{ts}]     [dry run] {msg}"),
            (tracing::Level::ERROR, _) => format!("[{ts}]     [error] {msg}"),
            (tracing::Level::WARN, _) => format!("[{ts}]     [warn] {msg}"),
            (tracing::Level::DEBUG, _) => format!("[{ts}]     [debug] {msg}"),
            _ => format!("[{ts}]     {msg}"),
        };

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Wrap `text` in an SGR sequence when colours are on.
fn paint(ansi: bool, code: &str, text: &str) -> String {
    if ansi {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// Colour of a run-summary line, keyed on its leading outcome glyph.
fn outcome_colour(msg: &str) -> Option<&'static str> {
    match msg.split_once(' ')?.0 {
        "✓" => Some("32"),
        "○" => Some("2"),
        "~" => Some("33"),
        "✗" => Some("31"),
        _ => None,
    }
}

/// Console rendering of engine events: `==>` stage headers, indented step
/// progress, and `ERROR`/`WARN` prefixes. Colour follows the writer.
struct ProvisionFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ProvisionFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let ansi = writer.has_ansi_escapes();
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;

        let line = match (*metadata.level(), metadata.target()) {
            (tracing::Level::ERROR, _) => format!("{} {msg}", paint(ansi, "31", "ERROR")),
            (tracing::Level::WARN, _) => format!("{}  {msg}", paint(ansi, "33", "WARN")),
            (tracing::Level::INFO, STAGE_TARGET) => {
                format!("{} {}", paint(ansi, "1;34", "==>"), paint(ansi, "1", msg))
            }
            (tracing::Level::INFO, DRY_RUN_TARGET) => {
                format!("  {} {msg}", paint(ansi, "33", "[DRY RUN]"))
            }
            (tracing::Level::INFO, _) => match outcome_colour(msg) {
                Some(code) => format!("  {}", paint(ansi, code, msg)),
                None => format!("  {msg}"),
            },
            _ => format!("  {}", paint(ansi, "2", msg)),
        };
        writeln!(writer, "{line}")
    }
}

/// Where console output is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Console {
    /// Warnings and errors on stderr, everything else on stdout.
    #[default]
    Split,
    /// Everything on stderr; stdout is reserved for machine-readable output.
    Stderr,
}

impl Console {
    /// Colour only when every stream this mode writes to is a terminal.
    fn ansi(self) -> bool {
        use std::io::IsTerminal as _;
        let stderr = std::io::stderr().is_terminal();
        match self {
            Self::Split => stderr && std::io::stdout().is_terminal(),
            Self::Stderr => stderr,
        }
    }

    fn make_writer(self) -> tracing_subscriber::fmt::writer::BoxMakeWriter {
        use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt as _};
        match self {
            Self::Split => BoxMakeWriter::new(
                std::io::stderr
                    .with_max_level(tracing::Level::WARN)
                    .and(std::io::stdout.with_min_level(tracing::Level::INFO)),
            ),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output follows the verbosity flag and goes where `console` says;
/// the file layer always records `debug` and above in
/// `$XDG_CACHE_HOME/provision/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str, console: Console) {
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let console_layer = fmt::layer()
        .event_format(ProvisionFormatter)
        .with_ansi(console.ansi())
        .with_writer(console.make_writer())
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
