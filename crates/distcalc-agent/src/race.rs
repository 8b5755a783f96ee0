//! First-of-N completion primitive.
//!
//! `first_of` fans the same work out to N threads and returns whichever
//! outcome is published first. Outcomes go through a single-slot channel
//! with a non-blocking send, so at most one can be waiting at a time; once
//! the caller has its winner the done signal is raised and the receiver is
//! dropped, turning every later publish into a no-op. Losing threads are
//! never joined or interrupted.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, TrySendError};
use tracing::{trace, warn};

use crate::cancel::CancellationToken;

/// Error type for a race that produced no outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RaceError {
    /// Zero workers were requested.
    #[error("race requires at least one worker")]
    NoWorkers,

    /// Every worker exited without publishing.
    #[error("all {0} workers exited without an outcome")]
    Abandoned(usize),

    /// No worker published before the deadline.
    #[error("no worker finished within {0:?}")]
    TimedOut(Duration),

    /// Not a single worker thread could be started.
    #[error("failed to spawn worker: {0}")]
    Spawn(String),
}

/// Run `work` on `workers` threads and return the first published outcome.
///
/// `work` receives the worker index and the shared done signal. Returning
/// `None` means the worker withdrew (typically because the signal was
/// already raised).
///
/// # Errors
///
/// See [`RaceError`].
///
/// # Example
/// ```
/// use distcalc_agent::race::first_of;
///
/// let answer = first_of(3, None, |_, _| Some(42)).unwrap();
/// assert_eq!(answer, 42);
/// ```
pub fn first_of<T, F>(workers: usize, deadline: Option<Duration>, work: F) -> Result<T, RaceError>
where
    T: Send + 'static,
    F: Fn(usize, &CancellationToken) -> Option<T> + Send + Sync + 'static,
{
    if workers == 0 {
        return Err(RaceError::NoWorkers);
    }

    let (tx, rx) = crossbeam_channel::bounded::<T>(1);
    let done = CancellationToken::new();
    let work = Arc::new(work);
    let mut spawned = 0usize;
    let mut last_spawn_error = None;

    for index in 0..workers {
        let tx = tx.clone();
        let done = done.clone();
        let work = Arc::clone(&work);
        let handle = thread::Builder::new()
            .name(format!("compute-worker-{index}"))
            .spawn(move || {
                let Some(outcome) = work(index, &done) else {
                    trace!(worker = index, "withdrew");
                    return;
                };
                if done.is_cancelled() {
                    trace!(worker = index, "finished after winner, discarded");
                    return;
                }
                match tx.try_send(outcome) {
                    Ok(()) => trace!(worker = index, "published first"),
                    Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                        trace!(worker = index, "slot taken, discarded");
                    }
                }
            });
        match handle {
            Ok(_) => spawned += 1,
            Err(err) => {
                warn!(worker = index, error = %err, "failed to spawn worker");
                last_spawn_error = Some(err.to_string());
            }
        }
    }
    drop(tx);

    if spawned == 0 {
        return Err(RaceError::Spawn(last_spawn_error.unwrap_or_default()));
    }

    let outcome = match deadline {
        Some(limit) => rx.recv_timeout(limit).map_err(|err| match err {
            RecvTimeoutError::Timeout => RaceError::TimedOut(limit),
            RecvTimeoutError::Disconnected => RaceError::Abandoned(spawned),
        }),
        None => rx.recv().map_err(|_| RaceError::Abandoned(spawned)),
    };
    done.cancel();
    outcome
}
