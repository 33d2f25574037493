//! Kernel-mode synchronization primitives: condition variable, counting
//! semaphore, reusable barrier.
//!
//! All three live in fixed-size registries inside `KernelState`, indexed by
//! a `Handle` returned from their `*_init` call — the same fixed-table
//! discipline the PCB table itself uses, so none of these allocate either.
//! `lock_*` is not a fourth primitive: a lock is a binary semaphore
//! initialized to one, so `lock_acquire`/`lock_release` are just `down`/
//! `up` under different names.

pub mod barrier;
pub mod condvar;
pub mod semaphore;

pub use barrier::Barrier;
pub use condvar::Condvar;
pub use semaphore::Semaphore;

/// Index into one of the sync-object registries.
pub type Handle = usize;

/// Outcome of a blocking operation: either it completed immediately, or
/// the calling PCB was moved off `current` and onto a waiter queue and the
/// caller must schedule someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    Completed,
    Blocked,
}

/// A lock is a binary semaphore initialized to one — no new waiter-queue
/// type or state is needed to support `lock_init`/`lock_acquire`/
/// `lock_release` on top of the semaphore already defined above.
pub fn lock_init(state: &mut crate::state::KernelState) -> crate::error::KernelResult<Handle> {
    semaphore::semaphore_init(state, 1)
}

pub fn lock_acquire(
    state: &mut crate::state::KernelState,
    handle: Handle,
) -> crate::error::KernelResult<BlockOutcome> {
    semaphore::down(state, handle)
}

pub fn lock_release(
    state: &mut crate::state::KernelState,
    handle: Handle,
) -> crate::error::KernelResult<()> {
    semaphore::up(state, handle)
}

pub(crate) fn allocate_slot<T: Copy>(
    table: &mut [Option<T>; crate::MAX_SYNC_OBJECTS],
    value: T,
) -> crate::error::KernelResult<Handle> {
    for (idx, slot) in table.iter_mut().enumerate() {
        if slot.is_none() {
            *slot = Some(value);
            return Ok(idx);
        }
    }
    Err(crate::error::KernelError::TableFull)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::{create_thread, do_exit, scheduler_entry};
    use crate::state::KernelState;

    #[test]
    fn lock_is_a_binary_semaphore() {
        let mut state = KernelState::new();
        let lock = lock_init(&mut state).unwrap();
        let a = create_thread(&mut state, 0).unwrap();
        let b = create_thread(&mut state, 0).unwrap();

        scheduler_entry(&mut state).unwrap();
        assert_eq!(lock_acquire(&mut state, lock).unwrap(), BlockOutcome::Completed);
        do_exit(&mut state).unwrap();

        assert_eq!(scheduler_entry(&mut state), Some(b));
        assert_eq!(lock_acquire(&mut state, lock).unwrap(), BlockOutcome::Blocked);
        assert_eq!(state.current(), None);

        lock_release(&mut state, lock).unwrap();
        assert_eq!(scheduler_entry(&mut state), Some(b));
        let _ = a;
    }
}
