/*!
 * SIGALRM Timer Backend
 *
 * Real-time interval timer (`setitimer(ITIMER_REAL)`, single-shot) with
 * expiry delivered by SIGALRM.
 *
 * ## Delivery Path
 *
 * 1. The SIGALRM disposition is installed once per process, on first arm.
 * 2. The signal handler only writes one byte to a non-blocking self-pipe
 *    (async-signal-safe, errno preserved).
 * 3. A watcher thread reads the pipe and delivers to the handler installed
 *    for the current guarded call.
 *
 * The disposition is never restored: a signal still pending after disarm
 * must not fall back to the default action (process termination). Stale
 * wake-ups land on an empty slot, or are observed before the new deadline,
 * and are discarded.
 *
 * There is one ITIMER_REAL per process, so every `AlarmTimer` handle shares
 * the same slot.
 */

use super::traits::TimerBackend;
use crate::core::limits::{
    ALARM_EARLY_TOLERANCE, ALARM_MIN_INTERVAL, ALARM_WAKE_BUFFER, ALARM_WATCHER_THREAD,
};
use crate::core::{GuardError, GuardResult};
use crate::signals::TimeoutSignalHandler;
use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use parking_lot::Mutex;
use std::io::{self, Read};
use std::os::unix::io::AsRawFd;
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace};

/// Write end of the self-pipe, read by the signal handler
static WAKE_FD: AtomicI32 = AtomicI32::new(-1);

/// Keeps the write end open for the life of the process
static DISPOSITION: OnceLock<Result<UnixStream, String>> = OnceLock::new();

static PENDING: Mutex<Option<PendingAlarm>> = parking_lot::const_mutex(None);

/// All-zero `it_value` cancels the pending expiry
const DISARMED: libc::itimerval = libc::itimerval {
    it_interval: libc::timeval {
        tv_sec: 0,
        tv_usec: 0,
    },
    it_value: libc::timeval {
        tv_sec: 0,
        tv_usec: 0,
    },
};

/// Wake-ups discarded as stale
static DISCARDED: AtomicU64 = AtomicU64::new(0);

struct PendingAlarm {
    handler: Arc<TimeoutSignalHandler>,
    deadline: Instant,
}

extern "C" fn on_sigalrm(_: libc::c_int) {
    let fd = WAKE_FD.load(Ordering::Relaxed);
    if fd < 0 {
        return;
    }

    let saved = Errno::last_raw();
    let byte = 1u8;
    // SAFETY: write(2) is async-signal-safe and the fd is never closed
    unsafe {
        libc::write(fd, &byte as *const u8 as *const libc::c_void, 1);
    }
    Errno::set_raw(saved);
}

/// Install the SIGALRM disposition and start the watcher, once
fn install() -> GuardResult<()> {
    let installed = DISPOSITION.get_or_init(|| -> Result<UnixStream, String> {
        let (wake_rx, wake_tx) =
            UnixStream::pair().map_err(|e| format!("self-pipe: {}", e))?;
        wake_tx
            .set_nonblocking(true)
            .map_err(|e| format!("self-pipe: {}", e))?;

        thread::Builder::new()
            .name(ALARM_WATCHER_THREAD.to_string())
            .spawn(move || watch(wake_rx))
            .map_err(|e| format!("failed to start alarm watcher: {}", e))?;

        WAKE_FD.store(wake_tx.as_raw_fd(), Ordering::SeqCst);

        let action = SigAction::new(
            SigHandler::Handler(on_sigalrm),
            SaFlags::SA_RESTART,
            SigSet::empty(),
        );
        // SAFETY: the handler only performs async-signal-safe work
        unsafe { sigaction(Signal::SIGALRM, &action) }
            .map_err(|e| format!("sigaction(SIGALRM): {}", e))?;

        info!("SIGALRM disposition installed");
        Ok(wake_tx)
    });

    installed
        .as_ref()
        .map(|_| ())
        .map_err(|e| GuardError::Backend(e.clone()))
}

fn watch(mut wake: UnixStream) {
    let mut buf = [0u8; ALARM_WAKE_BUFFER];
    loop {
        match wake.read(&mut buf) {
            Ok(0) => break,
            Ok(_) => fire_pending(),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(error = %e, "Alarm watcher stopped");
                break;
            }
        }
    }
}

fn fire_pending() {
    let pending = PENDING.lock();
    match pending.as_ref() {
        Some(alarm) if Instant::now() + ALARM_EARLY_TOLERANCE >= alarm.deadline => {
            alarm.handler.deliver();
        }
        _ => {
            DISCARDED.fetch_add(1, Ordering::Relaxed);
            trace!("Discarding stale SIGALRM wake-up");
        }
    }
}

/// Single-shot `itimerval` for `value`, or `None` if it does not fit `time_t`
fn itimer_value(value: Duration) -> Option<libc::itimerval> {
    Some(libc::itimerval {
        it_interval: libc::timeval {
            tv_sec: 0,
            tv_usec: 0,
        },
        it_value: libc::timeval {
            tv_sec: libc::time_t::try_from(value.as_secs()).ok()?,
            tv_usec: libc::suseconds_t::try_from(value.subsec_micros()).ok()?,
        },
    })
}

fn set_itimer(timer: &libc::itimerval) -> GuardResult<()> {
    // SAFETY: both pointers are valid for the duration of the call
    let rc = unsafe { libc::setitimer(libc::ITIMER_REAL, timer, std::ptr::null_mut()) };
    if rc != 0 {
        return Err(GuardError::Backend(format!(
            "setitimer: {}",
            io::Error::last_os_error()
        )));
    }
    Ok(())
}

/// Process interval timer backend
#[derive(Debug, Clone, Default)]
pub struct AlarmTimer {
    _private: (),
}

impl AlarmTimer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Wake-ups discarded because no matching timer was armed
    pub fn discarded_wakeups() -> u64 {
        DISCARDED.load(Ordering::Relaxed)
    }
}

impl TimerBackend for AlarmTimer {
    fn name(&self) -> &'static str {
        "alarm"
    }

    fn arm(&self, duration: Duration, handler: Arc<TimeoutSignalHandler>) -> GuardResult<()> {
        let out_of_range = || GuardError::InvalidDuration {
            name: handler.info().name().to_string(),
            max_duration: duration.as_secs_f64(),
        };
        let timer = itimer_value(duration.max(ALARM_MIN_INTERVAL)).ok_or_else(out_of_range)?;
        let deadline = Instant::now().checked_add(duration).ok_or_else(out_of_range)?;

        install()?;

        let mut pending = PENDING.lock();
        if pending.is_some() {
            return Err(GuardError::BackendBusy(self.name().to_string()));
        }

        debug!(timer = %handler.info(), ?duration, "Alarm armed");
        *pending = Some(PendingAlarm { handler, deadline });

        if let Err(e) = set_itimer(&timer) {
            *pending = None;
            return Err(e);
        }
        Ok(())
    }

    fn disarm(&self) -> GuardResult<()> {
        let mut pending = PENDING.lock();
        let Some(alarm) = pending.take() else {
            return Ok(());
        };

        alarm.handler.uninstall();
        debug!(timer = %alarm.handler.info(), "Alarm disarmed");
        set_itimer(&DISARMED)
    }

    fn is_armed(&self) -> bool {
        PENDING.lock().is_some()
    }
}
