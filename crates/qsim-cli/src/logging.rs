//! # qsim-cli::logging
//!
//! A compact log formatter for human-readable output, and the `tracing`
//! setup shared by every subcommand.

use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{format::Writer, FormatEvent, FormatFields},
    registry::LookupSpan,
};

use crate::args::LogFormat;

/// Prints `LEVEL message` with the event's target, without the
/// span-context machinery a `tracing_subscriber::fmt::layer()`'s default
/// formatter carries. No node-id extraction or live-dashboard coloring —
/// this is a batch CLI, not an interactive viewer.
pub struct CompactFormatter;

impl<S, N> FormatEvent<S, N> for CompactFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(writer, "{:>5} ", metadata.level())?;
        if metadata.target() != "events" {
            write!(writer, "[{}] ", metadata.target())?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Initializes the global `tracing` subscriber for the whole process.
pub fn init(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    match format {
        LogFormat::Human => {
            tracing_subscriber::fmt()
                .event_format(CompactFormatter)
                .with_env_filter(env_filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}
