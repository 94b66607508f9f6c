//! Module `thread` implement a one-shot worker thread.

use std::thread;

use crate::{err_at, Error, Result};

/// Runner type, a named thread running a single closure to completion.
///
/// Build pipelines hand a sequence of steps to a runner as one closure
/// and reclaim the result with [Runner::join]. When a runner is
/// dropped without joining, the drop implementation joins and ignores
/// the outcome, so there are no dangling threads.
pub struct Runner<T> {
    name: String,
    inner: Option<thread::JoinHandle<T>>,
}

impl<T> Drop for Runner<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.inner.take() {
            handle.join().ok();
        }
    }
}

impl<T> Runner<T> {
    /// Spawn `main_loop` on a new thread.
    pub fn spawn<F>(name: &str, main_loop: F) -> Runner<T>
    where
        F: 'static + Send + FnOnce() -> T,
        T: 'static + Send,
    {
        Runner {
            name: name.to_string(),
            inner: Some(thread::spawn(main_loop)),
        }
    }

    /// Wait for the thread to finish and return its result. A panic in
    /// the thread surfaces as `Error::ThreadFail`.
    pub fn join(mut self) -> Result<T> {
        let handle = self.inner.take().unwrap();
        match handle.join() {
            Ok(val) => Ok(val),
            Err(err) => err_at!(ThreadFail, msg: "{} fail {:?}", self.name, err),
        }
    }

    /// Return the name of this runner.
    pub fn to_name(&self) -> String {
        self.name.to_string()
    }
}

#[cfg(test)]
#[path = "thread_test.rs"]
mod thread_test;
