//! Fixed worker pool for batched queries.
//!
//! Each worker keeps its own transposition tables as rayon `map_init`
//! scratch; nothing is shared across threads and results come back in
//! request order.

use rayon::prelude::*;

use crate::table::Tables;

/// A fixed-size pool of solver workers
pub struct SolverPool {
    pool: rayon::ThreadPool,
}

impl SolverPool {
    /// One worker per logical CPU
    pub fn new() -> Self {
        Self::with_threads(0)
    }

    /// A fixed worker count; 0 means one per logical CPU
    pub fn with_threads(threads: usize) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .expect("failed to start solver worker threads");
        log::debug!("solver pool started with {} threads", pool.current_num_threads());
        SolverPool { pool }
    }

    /// Fan a batch out over the workers; results in request order.
    pub(crate) fn run<Q, R, F>(&self, queries: &[Q], job: F) -> Vec<R>
    where
        Q: Sync,
        R: Send,
        F: Fn(&mut Tables, &Q) -> R + Sync + Send,
    {
        self.pool.install(|| {
            queries
                .par_iter()
                .map_init(Tables::new, |tables, query| job(tables, query))
                .collect()
        })
    }
}

impl Default for SolverPool {
    fn default() -> Self {
        Self::new()
    }
}
