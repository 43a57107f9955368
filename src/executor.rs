//! A bounded pool of workers for independent evaluation tasks.
use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Runs side-effect-free tasks on a fixed number of worker threads.
///
/// Results are always returned in the same order as the inputs, whichever order the tasks
/// complete in.
#[derive(Debug)]
pub struct TaskExecutor {
    pool: ThreadPool,
}

impl TaskExecutor {
    /// Create an executor with the given number of workers (0 = one per available CPU)
    pub fn new(num_threads: usize) -> Result<Self> {
        let num_threads = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("mgsizing-worker-{index}"))
            .build()
            .context("Failed to build worker thread pool")?;

        Ok(Self { pool })
    }

    /// Number of worker threads
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Apply `task` to every item, blocking until all tasks are done.
    ///
    /// Element `i` of the output is the result for element `i` of the input.
    pub fn map_ordered<T, R, F>(&self, items: &[T], task: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool
            .install(|| items.par_iter().map(&task).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_num_threads() {
        assert_eq!(TaskExecutor::new(3).unwrap().num_threads(), 3);
        assert_eq!(TaskExecutor::new(0).unwrap().num_threads(), num_cpus::get());
    }

    #[test]
    fn test_map_ordered() {
        let executor = TaskExecutor::new(4).unwrap();
        let items: Vec<u64> = (0..32).collect();

        // Earlier items take longer, so they finish last
        let results = executor.map_ordered(&items, |&item| {
            thread::sleep(Duration::from_millis(32 - item));
            item * 10
        });
        assert_eq!(results, items.iter().map(|item| item * 10).collect::<Vec<_>>());
    }

    #[test]
    fn test_map_ordered_empty() {
        let executor = TaskExecutor::new(2).unwrap();
        let results: Vec<u32> = executor.map_ordered(&[] as &[u32], |item| *item);
        assert!(results.is_empty());
    }
}
