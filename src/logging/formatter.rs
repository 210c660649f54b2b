use std::fmt;
use tracing::{Event, Metadata, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

const FILE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";
const CONSOLE_TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// One bracketed log line per event:
/// `[TIME] [LEVEL] [SPAN PATH] [TARGET: FILE:LINE]: MESSAGE`
///
/// The span path lists every entered span from the outermost in, joined with
/// `/` (`validate`, `partition/cats`). Outside any span the last segment of
/// the module path stands in. The console preset drops the date and the
/// source location.
#[derive(Debug, Clone, Copy)]
pub struct BracketedFormatter {
    time_format: &'static str,
    source_location: bool,
}

impl BracketedFormatter {
    /// Full timestamp and source location, for log files
    pub fn detailed() -> Self {
        Self {
            time_format: FILE_TIME_FORMAT,
            source_location: true,
        }
    }

    /// Time of day only, no source location
    pub fn console() -> Self {
        Self {
            time_format: CONSOLE_TIME_FORMAT,
            source_location: false,
        }
    }

    fn write_location(&self, writer: &mut Writer<'_>, metadata: &Metadata<'_>) -> fmt::Result {
        match (self.source_location, metadata.file(), metadata.line()) {
            (true, Some(file), Some(line)) => {
                write!(writer, "[{}: {}:{}]", metadata.target(), file, line)
            }
            _ => write!(writer, "[{}]", metadata.target()),
        }
    }
}

impl Default for BracketedFormatter {
    fn default() -> Self {
        Self::detailed()
    }
}

fn span_path<S, N>(ctx: &FmtContext<'_, S, N>, metadata: &Metadata<'_>) -> String
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let names: Vec<&str> = ctx
        .event_scope()
        .map(|scope| scope.from_root().map(|span| span.name()).collect())
        .unwrap_or_default();
    if names.is_empty() {
        let target = metadata.target();
        target.rsplit("::").next().unwrap_or(target).to_string()
    } else {
        names.join("/")
    }
}

impl<S, N> FormatEvent<S, N> for BracketedFormatter
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
        let metadata = event.metadata();
        write!(
            writer,
            "[{}] [{:5}] [{}] ",
            chrono::Local::now().format(self.time_format),
            metadata.level(),
            span_path(ctx, metadata)
        )?;
        self.write_location(&mut writer, metadata)?;
        write!(writer, ": ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
