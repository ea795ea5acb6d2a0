//! Render progress is advisory only: reporters observe column completion
//! but can never affect the output.

/// Observer for column-level render progress.
///
/// Implementations are injected by the caller and invoked by render workers,
/// so they must be `Sync`. Reporting happens once per completed output
/// column plus a final call with `1.0` after all workers joined.
pub trait ProgressReporter: Sync {
    /// Called with the completed fraction of output columns in `[0, 1]`.
    fn report(&self, fraction: f64);
}

/// Reporter that discards all progress updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _fraction: f64) {}
}
