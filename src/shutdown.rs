//! Signal handling for graceful shutdown.
//!
//! The handlers do exactly one thing: store `true` into an atomic flag. No
//! logging, no allocation, nothing that is unsafe in signal context. The
//! acquisition loop observes the flag at iteration boundaries and performs
//! the actual logging and teardown from ordinary code.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

/// Write-once-true flag observed by the acquisition loop.
///
/// Signal handlers write the process-wide instance; the loop only reads it.
/// Tests pass their own instances to drive the loop directly.
#[derive(Debug, Default)]
pub struct ShutdownFlag(AtomicBool);

impl ShutdownFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Requests shutdown. Safe to call from signal context.
    pub fn request(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

static SHOULD_EXIT: ShutdownFlag = ShutdownFlag::new();

/// Returns the process-wide shutdown flag.
pub fn flag() -> &'static ShutdownFlag {
    &SHOULD_EXIT
}

extern "C" fn handle_exit(_: libc::c_int) {
    SHOULD_EXIT.request();
}

/// Installs the shutdown handler for every signal we react to.
///
/// SIGINT/SIGTERM/SIGQUIT request an orderly exit. SIGSEGV/SIGABRT are
/// registered defensively so a crashing process still flips the flag before
/// it dies. `SA_RESTART` is deliberately not set: the blocking queue
/// receive must return with `EINTR` so the loop can observe the flag.
pub fn install_handlers() -> io::Result<()> {
    let signals = [
        libc::SIGINT,
        libc::SIGTERM,
        libc::SIGQUIT,
        libc::SIGSEGV,
        libc::SIGABRT,
    ];

    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handle_exit as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&mut sa.sa_mask);

        for signal in signals {
            if libc::sigaction(signal, &sa, std::ptr::null_mut()) < 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_clear() {
        let flag = ShutdownFlag::new();
        assert!(!flag.is_set());
    }

    #[test]
    fn test_request_sets_flag() {
        let flag = ShutdownFlag::new();
        flag.request();
        assert!(flag.is_set());

        // Write-once-true: further requests keep it set.
        flag.request();
        assert!(flag.is_set());
    }
}
