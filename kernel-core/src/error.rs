//! The four failure kinds a caller of this crate's operations can observe.

use core::fmt;

/// Errors returned by `kernel-core` operations.
///
/// A plain enum, no `&'static str` payloads — every variant is cheap to
/// construct and compare from interrupt context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelError {
    /// The PCB table has no free slot (`create_thread`, `scheduler_add`).
    TableFull,
    /// A process id or sync-object handle does not name a live object
    /// (stale handle, double free, or a handle from the wrong registry).
    InvalidProcess,
    /// The operation requires a queue to be non-empty (e.g. a barrier
    /// release with no waiters recorded) but it was empty.
    QueueEmpty,
    /// A sync primitive was used in a way its invariants forbid — a
    /// semaphore `up` pushing the count above its configured maximum, or a
    /// barrier release observing a waiter count that does not match its
    /// configured party count.
    InvariantViolation,
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            KernelError::TableFull => "PCB table has no free slot",
            KernelError::InvalidProcess => "process id does not name a live process",
            KernelError::QueueEmpty => "queue operation required a non-empty queue",
            KernelError::InvariantViolation => "synchronization primitive invariant violated",
        };
        f.write_str(msg)
    }
}

pub type KernelResult<T> = Result<T, KernelError>;
