//! Human-readable line format with a distinct label for dry-run decisions.
//!
//! # Design
//! - Dry-run decisions are ordinary `INFO` events emitted on [`DRY_RUN_TARGET`].
//! - The formatter swaps the level label for [`DRY_RUN_LABEL`] on that target so
//!   dry-run and live lines differ only in severity label.

use std::fmt;

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Target carried by every dry-run decision event.
pub const DRY_RUN_TARGET: &str = "dry_run";

/// Severity label rendered for dry-run decision events.
pub const DRY_RUN_LABEL: &str = "DRY-RUN";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity label for an event with the given target and level.
#[must_use]
pub fn severity_label(target: &str, level: &Level) -> &'static str {
    if target == DRY_RUN_TARGET {
        return DRY_RUN_LABEL;
    }
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// `<timestamp> - <LABEL>: <fields>` event formatter.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeverityLabelFormat;

impl<S, N> FormatEvent<S, N> for SeverityLabelFormat
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
            "{} - {}: ",
            Local::now().format(TIMESTAMP_FORMAT),
            severity_label(metadata.target(), metadata.level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
