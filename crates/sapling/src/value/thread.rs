//! Spawned workers
//!
//! A worker runs one call on its own OS thread with a forked context and
//! hands its result back over a channel. The spawner receives a
//! [`ThreadHandle`] wrapped in [`Value::Thread`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use tracing::debug;

use crate::context::EvalContext;
use crate::error::ErrorKind;

use super::Value;

/// How often a blocked `wait` re-checks cancellation.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(5);

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a spawned worker and, once known, its result.
pub struct ThreadHandle {
    name: String,
    receiver: Receiver<Value>,
    result: Mutex<Option<Value>>,
}

impl ThreadHandle {
    /// Run `function(args...)` on a new OS thread.
    ///
    /// The argument list is copied before handoff, and the worker gets a
    /// forked context sharing the caller's interrupt flag, deadline and
    /// call hook. Returns a `Thread` value, or an error value if the OS
    /// refused to start the thread.
    pub fn spawn(ctx: &EvalContext, function: &Value, args: &[Value]) -> Value {
        let id = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
        let name = format!("sapling-worker-{id}");
        let (sender, receiver) = channel::bounded(1);

        let worker_ctx = ctx.fork();
        let function = function.clone();
        let args = args.to_vec();
        let worker_name = name.clone();

        let spawned = std::thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                debug!(thread = %worker_name, args = args.len(), "worker started");
                let result = worker_ctx.invoke(&function, args);
                debug!(thread = %worker_name, error = result.is_error(), "worker finished");
                // The handle may already be gone; nobody is waiting then.
                let _ = sender.send(result);
            });

        match spawned {
            Ok(_) => Value::Thread(Arc::new(ThreadHandle {
                name,
                receiver,
                result: Mutex::new(None),
            })),
            Err(e) => Value::error(ErrorKind::Eval, format!("failed to spawn thread: {e}")),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the worker's result is already available.
    pub fn is_finished(&self) -> bool {
        // A waiter holding the lock has not cached anything yet.
        let cached = self.result.try_lock().is_some_and(|r| r.is_some());
        cached || !self.receiver.is_empty()
    }

    /// Block until the worker's result is available.
    ///
    /// Honors the caller's cancellation: if `ctx` is interrupted or its
    /// deadline passes first, the deadline error is returned instead and
    /// the worker keeps running. Repeated waits return the same result.
    pub fn wait(&self, ctx: &EvalContext) -> Value {
        let mut cached = self.result.lock();
        if let Some(result) = cached.as_ref() {
            return result.clone();
        }
        loop {
            if let Some(err) = ctx.check() {
                return Value::from_error(err);
            }
            match self.receiver.recv_timeout(WAIT_POLL_INTERVAL) {
                Ok(result) => {
                    *cached = Some(result.clone());
                    return result;
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    let err = Value::error(
                        ErrorKind::Eval,
                        format!("{} exited without a result", self.name),
                    );
                    *cached = Some(err.clone());
                    return err;
                }
            }
        }
    }
}

impl fmt::Debug for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadHandle")
            .field("name", &self.name)
            .field("finished", &self.is_finished())
            .finish()
    }
}
