//! # Worker Pool
//!
//! Fixed set of worker threads executing submitted closures, with a
//! deferred-result handle per task.
//!
//! ```text
//!  submit(f) ──► job queue (FIFO channel) ──► worker 0..N
//!      │                                          │
//!      └──► TaskHandle ◄── one result channel ◄───┘
//! ```
//!
//! ## Design
//!
//! - **Typed task queue**: jobs flow through a shared FIFO channel with
//!   blocking receive; the channel is the only contended resource.
//! - **One result channel per task**: `submit` returns a [`TaskHandle`]
//!   backed by a single-slot channel the executing worker fills. Completion
//!   order across handles is unspecified; callers that need all results wait
//!   on every handle before proceeding (a collection barrier).
//! - **Cancellation flag**: checked between jobs. Nothing sets it today; it
//!   exists so a future caller can abandon queued work without a redesign.
//!
//! ## Correctness Invariants
//!
//! - **Work-conserving**: every submitted job executes unless the pool is
//!   cancelled; shutdown drains the queue before workers exit.
//! - **Join exactly once**: threads are joined on `shutdown` or on drop,
//!   never both.
//! - **Panic propagation**: a worker panic is re-raised on the thread that
//!   shuts the pool down. There is no partial-failure recovery; a crashed
//!   worker aborts the run.

use std::any::Any;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

/// A unit of work: the closure to run and the channel its output lands in.
struct Job<R> {
    run: Box<dyn FnOnce() -> R + Send>,
    result: Sender<R>,
}

/// Deferred result of a submitted task.
pub struct TaskHandle<R> {
    result: Receiver<R>,
}

impl<R> TaskHandle<R> {
    /// Blocks until the task's worker stores its result.
    ///
    /// # Panics
    ///
    /// Panics if the executing worker died before producing a result, which
    /// only happens when the task itself panicked. The pool re-raises the
    /// original panic on shutdown.
    pub fn wait(self) -> R {
        self.result
            .recv()
            .expect("worker exited before producing a task result")
    }
}

/// Fixed-size pool of named worker threads.
pub struct WorkerPool<R> {
    jobs: Option<Sender<Job<R>>>,
    workers: Vec<JoinHandle<()>>,
    cancel: Arc<AtomicBool>,
}

impl<R: Send + 'static> WorkerPool<R> {
    /// Spawns `workers` threads, each blocking on the shared job queue.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is zero or the OS refuses to spawn a thread.
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "workers must be > 0");

        let (jobs, queue) = crossbeam_channel::unbounded::<Job<R>>();
        let cancel = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let queue = queue.clone();
            let cancel = Arc::clone(&cancel);
            let handle = thread::Builder::new()
                .name(format!("logmetrics-worker-{worker_id}"))
                .spawn(move || worker_loop(queue, cancel))
                .expect("failed to spawn worker thread");
            handles.push(handle);
        }

        Self {
            jobs: Some(jobs),
            workers: handles,
            cancel,
        }
    }

    /// Enqueues a task and immediately returns its deferred-result handle.
    pub fn submit<F>(&self, task: F) -> TaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
    {
        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let job = Job {
            run: Box::new(task),
            result: result_tx,
        };
        self.jobs
            .as_ref()
            .expect("pool is shut down")
            .send(job)
            .expect("no live workers to accept the job");
        TaskHandle { result: result_rx }
    }

    /// Requests that workers stop picking up queued jobs.
    ///
    /// Unused by the batch pipeline today; see the module docs.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Drains the queue, signals termination, and joins every thread.
    ///
    /// # Panics
    ///
    /// Re-raises the first worker panic, if any.
    pub fn shutdown(mut self) {
        if let Some(payload) = self.teardown() {
            panic::resume_unwind(payload);
        }
    }

    /// Closes the queue and joins all workers. Idempotent.
    fn teardown(&mut self) -> Option<Box<dyn Any + Send>> {
        // Closing the sender lets workers finish the remaining queue, then
        // observe disconnection and exit.
        drop(self.jobs.take());

        let mut first_panic = None;
        for handle in self.workers.drain(..) {
            if let Err(payload) = handle.join() {
                first_panic.get_or_insert(payload);
            }
        }
        first_panic
    }
}

impl<R> Drop for WorkerPool<R> {
    fn drop(&mut self) {
        // Early-exit error paths release the pool here; worker panics are
        // swallowed because re-raising during an unwind would abort.
        drop(self.jobs.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop<R>(queue: Receiver<Job<R>>, cancel: Arc<AtomicBool>) {
    for job in queue.iter() {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let out = (job.run)();
        // A dropped handle means the caller no longer wants the result;
        // that is not an error for the worker.
        let _ = job.result.send(out);
    }
}
