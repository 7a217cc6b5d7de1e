use parking_lot::{Condvar, Mutex};

/// A single-shot, manually-resettable condition.
///
/// A latch is a boolean flag guarded by a mutex, paired with a condition
/// variable. `wait` blocks until the flag is observed true under the mutex,
/// so a signal that happens before the wait is never lost, and spurious
/// wakeups are absorbed by re-checking the flag. The flag stays set until
/// `reset` clears it; every `wait` in between returns immediately.
pub struct Latch {
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl Latch {
    /// Create an unsignaled latch.
    pub fn new() -> Self {
        Self {
            signaled: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Create a latch that starts out signaled.
    pub fn signaled() -> Self {
        Self {
            signaled: Mutex::new(true),
            cond: Condvar::new(),
        }
    }

    /// Set the flag and wake at least one waiter.
    pub fn signal(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        self.cond.notify_one();
    }

    /// Set the flag and wake every waiter.
    pub fn signal_all(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        self.cond.notify_all();
    }

    /// Clear the flag. Wakes no one.
    pub fn reset(&self) {
        *self.signaled.lock() = false;
    }

    /// Block until the flag is observed true under the mutex.
    pub fn wait(&self) {
        let mut signaled = self.signaled.lock();
        while !*signaled {
            self.cond.wait(&mut signaled);
        }
    }

    /// Read the flag without blocking.
    pub fn is_signaled(&self) -> bool {
        *self.signaled.lock()
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}
