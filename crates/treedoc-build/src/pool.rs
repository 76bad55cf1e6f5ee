//! Bounded worker pool for per-node jobs.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::BuildError;

/// Runs independent jobs on a fixed number of threads.
///
/// Each [`run`](Self::run) call waits for all of its jobs. The first failing
/// job's error is returned; jobs not yet started are skipped.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    threads: usize,
}

impl WorkerPool {
    /// Create a pool of `threads` workers, or one per available CPU.
    pub fn new(threads: Option<usize>) -> Result<Self, BuildError> {
        let threads = threads.unwrap_or_else(|| {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        });
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("treedoc-worker-{i}"))
            .build()?;
        tracing::debug!(threads, "Worker pool created");
        Ok(Self { pool, threads })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `job` for every item.
    ///
    /// `on_progress(completed, total)` is called after each successful job,
    /// possibly from different threads.
    pub fn run<T, J, P>(&self, items: &[T], job: J, on_progress: P) -> Result<(), BuildError>
    where
        T: Sync,
        J: Fn(&T) -> Result<(), BuildError> + Sync,
        P: Fn(usize, usize) + Sync,
    {
        let total = items.len();
        let completed = AtomicUsize::new(0);

        self.pool.install(|| {
            items.par_iter().try_for_each(|item| {
                job(item)?;
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                on_progress(done, total);
                Ok(())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_runs_every_job() {
        let pool = WorkerPool::new(Some(3)).unwrap();
        let items: Vec<usize> = (0..20).collect();
        let sum = AtomicUsize::new(0);
        let reported = Mutex::new(Vec::new());

        pool.run(
            &items,
            |i| {
                sum.fetch_add(*i, Ordering::Relaxed);
                Ok(())
            },
            |done, total| reported.lock().unwrap().push((done, total)),
        )
        .unwrap();

        assert_eq!(sum.load(Ordering::Relaxed), 190);
        let mut reported = reported.into_inner().unwrap();
        reported.sort_unstable();
        assert_eq!(reported, (1..=20).map(|d| (d, 20)).collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrency_is_bounded() {
        let pool = WorkerPool::new(Some(2)).unwrap();
        let items = vec![(); 12];
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        pool.run(
            &items,
            |_| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(5));
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            },
            |_, _| {},
        )
        .unwrap();

        assert_eq!(pool.threads(), 2);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_first_error_is_returned() {
        let pool = WorkerPool::new(Some(2)).unwrap();
        let items: Vec<usize> = (0..8).collect();

        let result = pool.run(
            &items,
            |i| {
                if *i == 5 {
                    return Err(BuildError::MissingPdfConverter);
                }
                Ok(())
            },
            |_, _| {},
        );

        assert!(matches!(result, Err(BuildError::MissingPdfConverter)));
    }

    #[test]
    fn test_empty_input() {
        let pool = WorkerPool::new(None).unwrap();
        assert!(pool.threads() >= 1);
        pool.run(&Vec::<u8>::new(), |_| Ok(()), |_, _| panic!("no progress expected"))
            .unwrap();
    }
}
