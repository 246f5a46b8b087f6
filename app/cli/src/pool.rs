//! FILENAME: app/cli/src/pool.rs
// PURPOSE: Bounded worker pool shared by the query and aggregation phases.
// CONTEXT: Results come back in submission order no matter which worker
// finished first. When no pool can be built the work runs on the caller's
// thread.

use rayon::prelude::*;
use rayon::ThreadPool;

pub struct WorkerPool {
    pool: Option<ThreadPool>,
    size: usize,
}

impl WorkerPool {
    /// Builds a pool of `size` threads, falling back to one thread, then to inline execution.
    pub fn new(size: usize) -> Self {
        let requested = size.max(1);
        let try_build = |n| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .thread_name(|i| format!("report-worker-{}", i))
                .build()
        };

        let pool = match try_build(requested) {
            Ok(pool) => Some(pool),
            Err(e) if requested > 1 => {
                log::warn!(target: "POOL", "Cannot start {} workers ({}), using one", requested, e);
                try_build(1).ok()
            }
            Err(e) => {
                log::warn!(target: "POOL", "Cannot start worker pool ({}), running inline", e);
                None
            }
        };
        let size = pool.as_ref().map_or(1, |p| p.current_num_threads());

        WorkerPool { pool, size }
    }

    /// Number of threads work is spread over.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `f` on every item. Stops handing out work after the first error and returns it;
    /// otherwise returns results in item order.
    pub fn try_map<T, R, E, F>(&self, items: &[T], f: F) -> Result<Vec<R>, E>
    where
        T: Sync,
        R: Send,
        E: Send,
        F: Fn(usize, &T) -> Result<R, E> + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| {
                items
                    .par_iter()
                    .enumerate()
                    .map(|(index, item)| f(index, item))
                    .collect()
            }),
            None => items
                .iter()
                .enumerate()
                .map(|(index, item)| f(index, item))
                .collect(),
        }
    }

    /// Infallible `try_map`.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(usize, &T) -> R + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| {
                items
                    .par_iter()
                    .enumerate()
                    .map(|(index, item)| f(index, item))
                    .collect()
            }),
            None => items
                .iter()
                .enumerate()
                .map(|(index, item)| f(index, item))
                .collect(),
        }
    }
}
