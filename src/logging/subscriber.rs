//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

const STAGE_TARGET: &str = "filepatch::stage";
const DRY_RUN_TARGET: &str = "filepatch::dry_run";

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

fn message_of(event: &tracing::Event<'_>) -> String {
    let mut extractor = MessageExtractor::default();
    event.record(&mut extractor);
    extractor.message
}

/// Plain-text line written to the log file for one event.
fn file_line(level: Level, target: &str, ts: &str, msg: &str) -> String {
    match (level, target) {
        (Level::INFO, STAGE_TARGET) => format!("[{ts}] ==> {msg}"),
        (Level::INFO, DRY_RUN_TARGET) => format!("[{ts}]     [dry run] {msg}"),
        (Level::ERROR, _) => format!("[{ts}]     [error] {msg}"),
        (Level::WARN, _) => format!("[{ts}]     [warn] {msg}"),
        (Level::DEBUG | Level::TRACE, _) => format!("[{ts}]     [debug] {msg}"),
        _ => format!("[{ts}]     {msg}"),
    }
}

/// A [`tracing_subscriber::Layer`] appending every event to the per-command
/// log file, ANSI codes stripped and timestamped.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `command`, write a run header and open it
    /// for appending.
    ///
    /// Returns `None` if the cache directory or file is unavailable.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version =
            option_env!("FILEPATCH_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "==========================================\n\
             filepatch {version} {command} {}\n\
             ==========================================\n",
            format_utc_datetime(),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
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
        let msg = strip_ansi(&message_of(event));
        let line = file_line(*metadata.level(), metadata.target(), &format_utc_time(), &msg);
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console formatter: `==>` stage headers, coloured warn/error prefixes and
/// `[DRY RUN]` markers.
struct PatchFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for PatchFormatter
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
        let metadata = event.metadata();
        let target = metadata.target();
        let msg = message_of(event);

        match *metadata.level() {
            Level::ERROR => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            Level::WARN => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            Level::INFO if target == STAGE_TARGET => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            Level::INFO if target == DRY_RUN_TARGET => {
                writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}")
            }
            Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes to stdout (stderr for warnings and errors) at INFO,
/// or DEBUG with `verbose`. The file layer records DEBUG and above in
/// `$XDG_CACHE_HOME/filepatch/<command>.log`. Call once at startup.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(PatchFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
