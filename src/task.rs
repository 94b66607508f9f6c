//! Module `task` implement the two threading primitives of the
//! catalog: linear step sequences on a named worker thread, via
//! [Runner], and a fixed pool of workers draining a task list, via
//! [execute_tasks].

use log::error;

use std::{
    cmp,
    sync::{
        atomic::{AtomicUsize, Ordering::SeqCst},
        Mutex,
    },
    thread,
};

use crate::{Error, Result};

pub use crate::util::thread::Runner;

/// Run `solver` over every task on a fixed pool of workers. Each
/// worker atomically fetches the next task index and stops at
/// exhaustion; workers join before this returns. Solver failures are
/// logged, the remaining tasks still run, and the first failure is
/// returned.
pub fn execute_tasks<T, F>(tasks: &[T], workers: usize, solver: F) -> Result<()>
where
    T: Sync,
    F: Fn(usize, &T) -> Result<()> + Sync,
{
    let workers = cmp::max(1, cmp::min(workers, tasks.len()));
    let next = AtomicUsize::new(0);
    let fail: Mutex<Option<Error>> = Mutex::new(None);

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let i = next.fetch_add(1, SeqCst);
                if i >= tasks.len() {
                    break;
                }
                if let Err(err) = solver(i, &tasks[i]) {
                    error!(target: "task", "task {}: {}", i, err);
                    fail.lock().unwrap().get_or_insert(err);
                }
            });
        }
    });

    match fail.into_inner().unwrap() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
#[path = "task_test.rs"]
mod task_test;
