//! Process-wide switch for background reclamation during measurement.
//!
//! Deallocation is deterministic in Rust: outputs are freed when they are
//! dropped. Reclamation noise inside a measurement window is therefore the
//! drop of each workload output inside the timed region. While reclamation
//! is disabled the trial runner keeps outputs alive until the session ends.
//!
//! The state is a manual switch plus a count of live [`SuspendGuard`]s.
//! Guards only touch the count, so nested and overlapping suspension windows
//! always restore the state that was in effect before them.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static SWITCH_ON: AtomicBool = AtomicBool::new(true);
static SUSPEND_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Whether reclamation currently runs inside measurement windows.
pub fn is_enabled() -> bool {
    SWITCH_ON.load(Ordering::Acquire) && SUSPEND_DEPTH.load(Ordering::Acquire) == 0
}

/// Turn the manual switch on. Live guards still keep reclamation suspended.
pub fn enable() {
    SWITCH_ON.store(true, Ordering::Release);
}

/// Turn the manual switch off until [`enable`] is called.
pub fn disable() {
    SWITCH_ON.store(false, Ordering::Release);
}

/// Suspend reclamation until the returned guard is dropped.
#[must_use = "reclamation resumes as soon as the guard is dropped"]
pub fn suspend() -> SuspendGuard {
    SUSPEND_DEPTH.fetch_add(1, Ordering::AcqRel);
    SuspendGuard { _priv: () }
}

/// Scoped suspension of reclamation; released on drop, including unwinding.
#[derive(Debug)]
pub struct SuspendGuard {
    _priv: (),
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        SUSPEND_DEPTH.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Serializes tests that observe the process-wide state.
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::Mutex;
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|e| e.into_inner())
}
