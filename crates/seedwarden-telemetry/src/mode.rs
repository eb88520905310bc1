//! Execution mode shared by every mutating component.

/// Whether decisions are executed or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Decisions are logged and executed.
    #[default]
    Live,
    /// Decisions are logged under the `DRY-RUN` label and never executed.
    DryRun,
}

impl RunMode {
    /// Build the mode from a `--dry-run` style flag.
    #[must_use]
    pub const fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Live }
    }

    /// Whether mutations must be skipped.
    #[must_use]
    pub const fn is_dry_run(self) -> bool {
        matches!(self, Self::DryRun)
    }
}

/// Log a decision at `INFO`, routed to the dry-run target when `$mode` is a dry run.
///
/// Field syntax is the same as [`tracing::info!`].
#[macro_export]
macro_rules! decision {
    ($mode:expr, $($arg:tt)+) => {
        if $crate::RunMode::is_dry_run($mode) {
            $crate::__tracing::info!(target: $crate::DRY_RUN_TARGET, $($arg)+);
        } else {
            $crate::__tracing::info!($($arg)+);
        }
    };
}
