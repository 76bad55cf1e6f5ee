//! Build stages and progress reporting.

use std::fmt;
use std::time::Duration;

/// Build stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Remove and recreate the output root.
    Clean,
    /// Scan the source tree.
    Scan,
    /// Mirror the folder structure below the output root.
    Folders,
    /// Pre-render diagrams to local images.
    Images,
    /// Per-folder markdown pages.
    Pages,
    /// Navigable site.
    Site,
    /// Aggregated markdown document.
    AggregatedMarkdown,
    /// Aggregated PDF document.
    AggregatedPdf,
    /// Per-folder PDFs.
    Pdf,
}

impl Stage {
    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Clean => "Cleaning output",
            Self::Scan => "Scanning sources",
            Self::Folders => "Creating folders",
            Self::Images => "Rendering diagrams",
            Self::Pages => "Writing pages",
            Self::Site => "Writing site",
            Self::AggregatedMarkdown => "Writing aggregated markdown",
            Self::AggregatedPdf => "Writing aggregated PDF",
            Self::Pdf => "Writing PDFs",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives build progress.
///
/// `advanced` may be called from worker threads and out of enumeration
/// order; `completed` is monotonic per stage.
pub trait Progress: Send + Sync {
    /// A stage with `total` jobs started.
    fn stage_started(&self, _stage: Stage, _total: usize) {}

    /// `completed` of `total` jobs of `stage` are done.
    fn advanced(&self, _stage: Stage, _completed: usize, _total: usize) {}

    /// A stage finished after `elapsed`.
    fn stage_finished(&self, _stage: Stage, _elapsed: Duration) {}
}

/// Progress sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}
