//! Console log formatting
//!
//! Every `tracing` event is rendered as a single coloured line carrying the
//! level symbol, the calling function and the source line:
//!
//! ```text
//! [*] on_ready:42 logged on as <jukebox#0001>
//! ```
//!
//! The calling function is taken from the innermost span, so handlers are
//! `#[instrument]`ed under their own names.

use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Field carrying an unrecognised level name; see [`log_msg!`].
pub const BAD_LEVEL_FIELD: &str = "bad_level";

mod ansi {
    pub const BLUE: &str = "\x1b[34m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CLEAR: &str = "\x1b[0m";
}

/// The four levels accepted by [`log_msg!`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn parse(level: &str) -> Option<Self> {
        match level {
            "debug" => Some(Severity::Debug),
            "info" => Some(Severity::Info),
            "warning" => Some(Severity::Warning),
            "error" => Some(Severity::Error),
            _ => None,
        }
    }

    pub fn from_level(level: &Level) -> Self {
        match *level {
            Level::TRACE | Level::DEBUG => Severity::Debug,
            Level::INFO => Severity::Info,
            Level::WARN => Severity::Warning,
            Level::ERROR => Severity::Error,
        }
    }

    fn color(self) -> &'static str {
        match self {
            Severity::Debug => ansi::BLUE,
            Severity::Info => ansi::GREEN,
            Severity::Warning => ansi::YELLOW,
            Severity::Error => ansi::RED,
        }
    }

    fn symbol(self) -> char {
        match self {
            Severity::Debug => '-',
            Severity::Info => '*',
            Severity::Warning => '?',
            Severity::Error => '!',
        }
    }
}

/// Where a line came from
#[derive(Debug, Clone, Copy)]
pub struct CallSite<'a> {
    pub function: &'a str,
    pub line: u32,
}

/// Render a regular log line.
pub fn render_line(severity: Severity, site: CallSite<'_>, message: &str, ansi: bool) -> String {
    if ansi {
        format!(
            "{}{}[{}] {}:{} {}{}{}",
            ansi::BOLD,
            severity.color(),
            severity.symbol(),
            site.function,
            site.line,
            ansi::DIM,
            message,
            ansi::CLEAR
        )
    } else {
        format!("[{}] {}:{} {}", severity.symbol(), site.function, site.line, message)
    }
}

/// Render the diagnostic emitted in place of a message logged with an
/// unknown level.
pub fn render_bad_level(site: CallSite<'_>, level: &str, ansi: bool) -> String {
    if ansi {
        format!(
            "{}{}[@] {}:{} {}Bad log level: \"{}\"{}",
            ansi::MAGENTA,
            ansi::BOLD,
            site.function,
            site.line,
            ansi::DIM,
            level,
            ansi::CLEAR
        )
    } else {
        format!("[@] {}:{} Bad log level: \"{}\"", site.function, site.line, level)
    }
}

/// Log with a textual level: one of `debug`, `info`, `warning`, `error`.
///
/// Any other level logs a "Bad log level" diagnostic instead of the message.
macro_rules! log_msg {
    ($level:expr, $($arg:tt)+) => {{
        let level: &str = $level;
        match $crate::logger::Severity::parse(level) {
            Some($crate::logger::Severity::Debug) => ::tracing::debug!($($arg)+),
            Some($crate::logger::Severity::Info) => ::tracing::info!($($arg)+),
            Some($crate::logger::Severity::Warning) => ::tracing::warn!($($arg)+),
            Some($crate::logger::Severity::Error) => ::tracing::error!($($arg)+),
            None => ::tracing::error!(bad_level = level, "Bad log level"),
        }
    }};
}
pub(crate) use log_msg;

/// `tracing_subscriber` event formatter producing the console layout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let function = ctx
            .event_scope()
            .and_then(|mut scope| scope.next().map(|span| span.name()))
            .unwrap_or_else(|| module_name(meta.target()));
        let site = CallSite {
            function,
            line: meta.line().unwrap_or(0),
        };

        let mut fields = LineFields::default();
        event.record(&mut fields);

        let ansi = writer.has_ansi_escapes();
        let line = match fields.bad_level {
            Some(level) => render_bad_level(site, &level, ansi),
            None => {
                let message = fields.message + &fields.extra;
                render_line(Severity::from_level(meta.level()), site, &message, ansi)
            }
        };
        writeln!(writer, "{}", line)
    }
}

/// Last path segment of an event target
fn module_name(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

#[derive(Default)]
struct LineFields {
    message: String,
    bad_level: Option<String>,
    extra: String,
}

impl Visit for LineFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            BAD_LEVEL_FIELD => self.bad_level = Some(value.to_string()),
            name => {
                let _ = write!(self.extra, " {}={}", name, value);
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            BAD_LEVEL_FIELD => self.bad_level = Some(format!("{:?}", value)),
            name => {
                let _ = write!(self.extra, " {}={:?}", name, value);
            }
        }
    }
}
