//! Build orchestration for treedoc.
//!
//! [`Builder`] runs the enabled output stages for a [`Config`](treedoc_config::Config)
//! in a fixed order and returns a [`BuildReport`] with per-stage timings.
//! Per-node jobs of a stage run on a bounded [`WorkerPool`].
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use treedoc_build::Builder;
//! use treedoc_config::Config;
//!
//! let config = Config::load(None, None)?;
//! let report = Builder::new(&config).build()?;
//! println!("{} folders in {:?}", report.folders, report.total);
//! # Ok(())
//! # }
//! ```

mod builder;
mod error;
mod pool;
mod progress;
mod report;

pub use builder::{Builder, scan_options};
pub use error::BuildError;
pub use pool::WorkerPool;
pub use progress::{NoProgress, Progress, Stage};
pub use report::{BuildReport, StageTiming};
