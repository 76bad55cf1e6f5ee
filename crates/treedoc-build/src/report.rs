//! Build timing report.

use std::time::Duration;

use crate::progress::Stage;

/// Timing of one executed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTiming {
    /// Stage.
    pub stage: Stage,
    /// Wall-clock time.
    pub elapsed: Duration,
    /// Number of items processed (folders, diagrams or files).
    pub items: usize,
}

/// Summary of a finished build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Executed stages in order.
    pub stages: Vec<StageTiming>,
    /// Total build time.
    pub total: Duration,
    /// Folders in the tree.
    pub folders: usize,
    /// Diagram sources in the tree.
    pub diagrams: usize,
}

impl BuildReport {
    pub(crate) fn record(&mut self, stage: Stage, elapsed: Duration, items: usize) {
        self.stages.push(StageTiming {
            stage,
            elapsed,
            items,
        });
    }

    /// Timing of `stage`, if it ran.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&StageTiming> {
        self.stages.iter().find(|t| t.stage == stage)
    }

    /// Whether `stage` ran.
    #[must_use]
    pub fn ran(&self, stage: Stage) -> bool {
        self.stage(stage).is_some()
    }

    /// Executed stages in order.
    pub fn executed(&self) -> impl Iterator<Item = Stage> + '_ {
        self.stages.iter().map(|t| t.stage)
    }
}
