//! Fixed-size pool of named background threads.
//!
//! Jobs are pulled from one shared queue, so any idle worker picks up the next
//! task. A panicking job is logged and the worker keeps serving. Dropping the
//! pool closes the queue and joins every worker after its current job; nothing
//! in flight is cancelled.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use log::{trace, warn};

use crate::driver::DriverError;

type Job = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    queue: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Result<Self, DriverError> {
        let (queue, jobs) = mpsc::channel::<Job>();
        let jobs = Arc::new(Mutex::new(jobs));

        let mut workers = Vec::with_capacity(size);
        for i in 0..size {
            let jobs = Arc::clone(&jobs);
            workers.push(
                thread::Builder::new()
                    .name(format!("prng-worker-{}", i))
                    .spawn(move || worker_loop(&jobs))?,
            );
        }
        Ok(WorkerPool { queue: Some(queue), workers })
    }

    /// Queue `job` for the next idle worker
    pub fn execute<F>(&self, job: F) -> Result<(), DriverError>
    where
        F: FnOnce() + Send + 'static,
    {
        let queue = self.queue.as_ref().ok_or(DriverError::PoolClosed)?;
        queue.send(Box::new(job)).map_err(|_| DriverError::PoolClosed)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

fn worker_loop(jobs: &Mutex<Receiver<Job>>) {
    loop {
        // Hold the queue lock only while waiting for the next job.
        let next = match jobs.lock() {
            Ok(receiver) => receiver.recv(),
            Err(_) => return,
        };
        let Ok(job) = next else {
            trace!("worker exiting: queue closed");
            return;
        };
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            warn!("background job panicked");
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.queue.take());
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
