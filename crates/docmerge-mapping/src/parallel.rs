use std::sync::OnceLock;

use rayon::{ThreadPool, ThreadPoolBuilder};

/// Pool that `run_batch_parallel` resolves rows on. `None` when no pool could be started, in
/// which case rows are resolved on the calling thread.
static RESOLVE_POOL: OnceLock<Option<ThreadPool>> = OnceLock::new();

fn start_pool() -> Option<ThreadPool> {
    let builder = || ThreadPoolBuilder::new().thread_name(|i| format!("docmerge-resolve-{i}"));

    // Zero threads lets rayon pick: `RAYON_NUM_THREADS`, else the available parallelism.
    match builder().num_threads(0).build() {
        Ok(pool) => Some(pool),
        Err(err) => {
            log::warn!("could not start the row resolver pool ({err}); trying a single worker");
            match builder().num_threads(1).build() {
                Ok(pool) => Some(pool),
                Err(err) => {
                    log::warn!("could not start a resolver worker ({err}); resolving inline");
                    None
                }
            }
        }
    }
}

pub(crate) fn resolve_pool() -> Option<&'static ThreadPool> {
    RESOLVE_POOL.get_or_init(start_pool).as_ref()
}
