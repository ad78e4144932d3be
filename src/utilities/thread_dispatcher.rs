//! Thread dispatch for work that splits into independent units, such as solver islands.

use crossbeam_utils::thread;

/// Provides multithreading dispatch primitives and a thread count for the simulation to use.
///
/// Note that the simulation does not require a load balancing for loop implementation. All
/// that's needed is a way to run a function over disjoint items on several threads. The
/// simulation hands it whole islands, which are already coarse and independent, so a fixed
/// partition is good enough.
pub trait ThreadDispatcher {
    /// Gets the number of workers available in the thread dispatcher.
    fn thread_count(&self) -> usize;

    /// Runs `worker_body` once per item, each item on exactly one worker, and returns the results
    /// in item order.
    ///
    /// Every item is visited through its own `&mut`, so no two workers ever touch the same item.
    /// The result order never depends on scheduling.
    fn map_disjoint<T, R, F>(&self, items: &mut [T], worker_body: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(&mut T) -> R + Sync;
}

/// Dispatcher running fixed contiguous chunks of the items on scoped threads.
#[derive(Clone, Copy, Debug)]
pub struct SimpleThreadDispatcher {
    thread_count: usize,
}

impl SimpleThreadDispatcher {
    /// Creates a dispatcher using up to `thread_count` workers, including the calling thread.
    pub fn new(thread_count: usize) -> Self {
        Self {
            thread_count: thread_count.max(1),
        }
    }

    /// Creates a dispatcher sized to the machine's available parallelism.
    pub fn with_available_parallelism() -> Self {
        Self::new(std::thread::available_parallelism().map_or(1, |count| count.get()))
    }
}

impl ThreadDispatcher for SimpleThreadDispatcher {
    fn thread_count(&self) -> usize {
        self.thread_count
    }

    fn map_disjoint<T, R, F>(&self, items: &mut [T], worker_body: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(&mut T) -> R + Sync,
    {
        if items.is_empty() {
            return Vec::new();
        }
        if self.thread_count == 1 || items.len() == 1 {
            return items.iter_mut().map(&worker_body).collect();
        }

        let chunk_size = items.len().div_ceil(self.thread_count);
        let worker_body = &worker_body;
        let scope_result = thread::scope(|scope| {
            let mut chunks = items.chunks_mut(chunk_size);
            // The calling thread takes the first chunk itself.
            let first = chunks.next();
            let workers: Vec<_> = chunks
                .map(|chunk| scope.spawn(move |_| chunk.iter_mut().map(worker_body).collect::<Vec<R>>()))
                .collect();

            let mut results: Vec<R> = first
                .map(|chunk| chunk.iter_mut().map(worker_body).collect())
                .unwrap_or_default();
            for worker in workers {
                match worker.join() {
                    Ok(chunk_results) => results.extend(chunk_results),
                    Err(payload) => std::panic::resume_unwind(payload),
                }
            }
            results
        });

        match scope_result {
            Ok(results) => results,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }
}
