/// Parallel batch runner
///
/// Fans a per-file job out over a fixed-size worker pool and collects the
/// owned results on the calling thread as they complete. Workers share no
/// state: each one gets a path, returns a result through a channel, done.

use crate::error::{Error, Result};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::any::Any;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

/// Fixed-size pool sized to the machine
pub struct BatchRunner {
    pool: ThreadPool,
}

impl BatchRunner {
    /// One worker per available CPU
    pub fn new() -> Result<Self> {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_workers(workers)
    }

    fn with_workers(workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("exif-worker-{}", i))
            .build()?;
        log::debug!("Worker pool started with {} threads", workers);
        Ok(Self { pool })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `work` once per path and keep every `Some` result
    ///
    /// # Arguments
    /// * `paths` - Work items, each processed exactly once
    /// * `work` - The per-item job, must not share mutable state
    /// * `on_progress` - Called on this thread after each completion with
    ///   `(done, total)`, in completion order
    ///
    /// # Returns
    /// * Collected results in completion order
    /// * `Err(Error::WorkerPool)` if any job panicked; nothing is salvaged
    pub fn run<T, F, P>(&self, paths: &[PathBuf], work: F, mut on_progress: P) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(&Path) -> Option<T> + Sync,
        P: FnMut(usize, usize),
    {
        let total = paths.len();
        let (tx, rx) = mpsc::channel::<Option<T>>();
        let work = &work;
        let pool = &self.pool;

        thread::scope(|scope| {
            // The pool is driven from a helper thread so this one stays free
            // to collect results while jobs are still running
            let dispatcher = scope.spawn(move || {
                pool.install(|| {
                    paths.par_iter().for_each_with(tx, |tx, path| {
                        // The receiver only hangs up once we are unwinding
                        let _ = tx.send(work(path.as_path()));
                    });
                });
            });

            let mut results = Vec::new();
            let mut done = 0;
            // Ends once every sender clone is dropped: all jobs finished, or
            // the dispatcher unwound after a panic
            for result in rx.iter() {
                done += 1;
                on_progress(done, total);
                if let Some(value) = result {
                    results.push(value);
                }
            }

            dispatcher
                .join()
                .map_err(|panic| Error::WorkerPool(panic_message(panic.as_ref())))?;

            Ok(results)
        })
    }
}

/// Best-effort text of a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Single-line console progress indicator
///
/// Redraws `⏳ Processing images: done/total (pct%)` in place on stderr and
/// ends the line when the last item completes.
pub struct Progress<W: Write> {
    out: W,
}

impl Progress<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> Progress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn update(&mut self, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = done * 100 / total;
        // Progress output is best effort, a closed stderr must not stop the run
        let _ = write!(
            self.out,
            "\r⏳ Processing images: {}/{} ({}%)",
            done, total, percent
        );
        if done == total {
            let _ = writeln!(self.out);
        }
        let _ = self.out.flush();
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}
