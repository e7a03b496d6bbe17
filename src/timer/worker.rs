/*!
 * Supervised Worker
 *
 * Runs the guarded computation on its own thread so the caller can be
 * released at the deadline no matter what the computation is doing.
 *
 * A worker that loses the race against its deadline is detached, not
 * killed: threads cannot be terminated safely, so it keeps running until it
 * returns on its own and its result is dropped. Computations that want to
 * stop early can poll [`interrupted`].
 */

use crate::core::limits::WORKER_THREAD_PREFIX;
use crate::core::{GuardError, GuardResult, TimeoutCondition, TimerInfo};
use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

thread_local! {
    static INTERRUPT: RefCell<Option<Arc<AtomicBool>>> = const { RefCell::new(None) };
}

/// Cooperative checkpoint for guarded computations
///
/// Returns `true` on a worker whose guard has already given up on it.
/// Always `false` outside a guarded computation.
pub fn interrupted() -> bool {
    INTERRUPT.with(|flag| {
        flag.borrow()
            .as_ref()
            .map_or(false, |f| f.load(Ordering::Acquire))
    })
}

/// How the computation ended
pub(crate) enum Exit<T, E> {
    Returned(T),
    Failed(E),
    Panicked(Box<dyn Any + Send + 'static>),
}

/// First event observed by the waiting guard
pub(crate) enum Wake<T, E> {
    Exited(Exit<T, E>),
    Expired(TimeoutCondition),
    /// Worker thread ended without reporting
    Lost,
}

pub(crate) struct Worker<T, E> {
    outcome: flume::Receiver<Exit<T, E>>,
    interrupt: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl<T, E> Worker<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn spawn<F>(info: &TimerInfo, stack_size: Option<usize>, computation: F) -> GuardResult<Self>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        let (tx, outcome) = flume::bounded(1);
        let interrupt = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&interrupt);

        let mut builder = thread::Builder::new().name(format!(
            "{}{}",
            WORKER_THREAD_PREFIX,
            info.name().replace('\0', "")
        ));
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }

        let thread = builder
            .spawn(move || {
                block_timer_signal();
                INTERRUPT.with(|slot| *slot.borrow_mut() = Some(flag));

                let exit = match panic::catch_unwind(AssertUnwindSafe(computation)) {
                    Ok(Ok(value)) => Exit::Returned(value),
                    Ok(Err(e)) => Exit::Failed(e),
                    Err(payload) => Exit::Panicked(payload),
                };
                // Receiver is gone if the guard already timed out
                let _ = tx.send(exit);
            })
            .map_err(|e| GuardError::WorkerSpawn {
                timer: info.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            outcome,
            interrupt,
            thread,
        })
    }

    /// Block until the worker exits or `expiry` raises, whichever is first
    pub(crate) fn wait(&self, expiry: &flume::Receiver<TimeoutCondition>) -> Wake<T, E> {
        let first = flume::Selector::new()
            .recv(&self.outcome, |r| r.ok().map(Wake::Exited))
            .recv(expiry, |r| r.ok().map(Wake::Expired))
            .wait();

        match first {
            Some(wake) => wake,
            // One side disconnected; only the worker can end the wait now
            None => self.outcome.recv().map_or(Wake::Lost, Wake::Exited),
        }
    }

    /// Reap a worker that has reported its exit
    pub(crate) fn join(self) {
        let _ = self.thread.join();
    }

    /// Flag the worker as past its deadline
    ///
    /// Must happen before the registry slot is cleared, so the worker can
    /// never observe an empty slot while still looking live.
    pub(crate) fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Release);
    }

    /// Detach a worker that missed its deadline
    pub(crate) fn abandon(self) {
        self.interrupt();
    }
}

/// Keep SIGALRM off the worker
///
/// The alarm backend's disposition uses SA_RESTART, but calls that are
/// never restarted (nanosleep, poll, timed socket reads) would still see
/// EINTR inside the computation. Threads the computation spawns inherit
/// the mask.
#[cfg(unix)]
fn block_timer_signal() {
    use nix::sys::signal::{pthread_sigmask, SigSet, SigmaskHow, Signal};

    let mut mask = SigSet::empty();
    mask.add(Signal::SIGALRM);
    if let Err(e) = pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(&mask), None) {
        tracing::warn!(error = %e, "Could not block SIGALRM on worker");
    }
}

#[cfg(not(unix))]
fn block_timer_signal() {}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::time::Duration;

    fn info(name: &str) -> TimerInfo {
        TimerInfo::new(name, 1.0).unwrap()
    }

    #[test]
    fn test_returned_value_is_reported() {
        let (_handler, expiry) = crate::signals::TimeoutSignalHandler::bind(info("value"));
        let worker = Worker::spawn(&info("value"), None, || Ok::<_, Infallible>(42)).unwrap();

        match worker.wait(&expiry) {
            Wake::Exited(Exit::Returned(v)) => assert_eq!(v, 42),
            _ => panic!("expected a returned value"),
        }
        worker.join();
    }

    #[test]
    fn test_panic_payload_is_captured() {
        let (_handler, expiry) = crate::signals::TimeoutSignalHandler::bind(info("panics"));
        let worker: Worker<(), Infallible> =
            Worker::spawn(&info("panics"), None, || panic!("exploded")).unwrap();

        match worker.wait(&expiry) {
            Wake::Exited(Exit::Panicked(payload)) => {
                assert_eq!(panic_message(&*payload), "exploded")
            }
            _ => panic!("expected a panic"),
        }
        worker.join();
    }

    #[test]
    fn test_expiry_wins_over_slow_worker() {
        let (handler, expiry) = crate::signals::TimeoutSignalHandler::bind(info("slow"));
        let (seen_tx, seen_rx) = flume::bounded(1);
        let worker = Worker::spawn(&info("slow"), None, move || {
            while !interrupted() {
                thread::sleep(Duration::from_millis(5));
            }
            let _ = seen_tx.send(());
            Ok::<_, Infallible>(())
        })
        .unwrap();

        handler.deliver();
        assert!(matches!(worker.wait(&expiry), Wake::Expired(_)));

        worker.abandon();
        assert!(seen_rx.recv_timeout(Duration::from_secs(2)).is_ok());
    }

    #[test]
    #[serial_test::serial]
    fn test_interrupted_worker_cannot_claim_registry() {
        let (handler, expiry) = crate::signals::TimeoutSignalHandler::bind(info("outer"));
        let (claim_tx, claim_rx) = flume::bounded(1);
        let worker = Worker::spawn(&info("outer"), None, move || {
            while !interrupted() {
                thread::sleep(Duration::from_millis(5));
            }
            let claim = crate::timer::registry::ActiveSlot::claim(info("late")).map(|_| ());
            let _ = claim_tx.send(claim);
            Ok::<_, Infallible>(())
        })
        .unwrap();

        handler.deliver();
        assert!(matches!(worker.wait(&expiry), Wake::Expired(_)));
        worker.abandon();

        let claim = claim_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(
            claim,
            Err(GuardError::AbandonedCaller {
                requested: info("late")
            })
        );
        assert!(!crate::timer::registry::is_active());
    }

    #[cfg(unix)]
    #[test]
    fn test_worker_blocks_timer_signal() {
        use nix::sys::signal::{pthread_sigmask, SigSet, SigmaskHow, Signal};

        let (_handler, expiry) = crate::signals::TimeoutSignalHandler::bind(info("masked"));
        let worker = Worker::spawn(&info("masked"), None, || {
            let mut current = SigSet::empty();
            pthread_sigmask(SigmaskHow::SIG_BLOCK, None, Some(&mut current))
                .map(|_| current.contains(Signal::SIGALRM))
        })
        .unwrap();

        match worker.wait(&expiry) {
            Wake::Exited(Exit::Returned(blocked)) => assert!(blocked),
            _ => panic!("expected the mask to be readable"),
        }
        worker.join();
    }

    #[test]
    fn test_not_interrupted_outside_worker() {
        assert!(!interrupted());
    }

    #[test]
    fn test_panic_message_formats() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(&*owned), "owned");
        assert_eq!(panic_message(&*other), "<non-string panic payload>");
    }
}
