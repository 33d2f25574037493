//! Counting semaphore with a handoff release discipline: waking a waiter
//! hands the unit of capacity directly to it rather than incrementing the
//! count and letting the waiter race to decrement it again.

use crate::error::{KernelError, KernelResult};
use crate::pcb::PcbStatus;
use crate::queue::IndexQueue;
use crate::sched::scheduler_add;
use crate::state::KernelState;
use crate::sync::{allocate_slot, BlockOutcome, Handle};

#[derive(Debug, Clone, Copy)]
pub struct Semaphore {
    count: i32,
    waiters: IndexQueue,
}

impl Semaphore {
    pub const fn new(initial: i32) -> Self {
        Semaphore {
            count: initial,
            waiters: IndexQueue::new(),
        }
    }

    pub fn count(&self) -> i32 {
        self.count
    }
}

/// Registers a new semaphore and returns its handle. Rejects a negative
/// `initial` — a semaphore's count is a non-negative unit count by
/// definition, not an advisory value callers are trusted to respect.
pub fn semaphore_init(state: &mut KernelState, initial: i32) -> KernelResult<Handle> {
    if initial < 0 {
        return Err(KernelError::InvariantViolation);
    }
    allocate_slot(&mut state.semaphores, Semaphore::new(initial))
}

/// Acquires one unit of capacity, blocking the calling PCB if none is
/// available.
pub fn down(state: &mut KernelState, handle: Handle) -> KernelResult<BlockOutcome> {
    let sem = state
        .semaphores
        .get_mut(handle)
        .and_then(|s| s.as_mut())
        .ok_or(KernelError::InvalidProcess)?;

    if sem.count > 0 {
        sem.count -= 1;
        return Ok(BlockOutcome::Completed);
    }

    let id = state.current.take().ok_or(KernelError::InvalidProcess)?;
    if let Some(pcb) = state.table.get_mut(id) {
        pcb.status = PcbStatus::Blocked;
    }
    let sem = state.semaphores[handle].as_mut().unwrap();
    sem.waiters.put(&mut state.table, id.index());
    Ok(BlockOutcome::Blocked)
}

/// Releases one unit of capacity. If a waiter is queued, capacity is
/// handed directly to it (the count never changes) rather than being
/// incremented and immediately re-decremented. Always succeeds — a
/// counting semaphore has no upper bound, so releasing is never refused.
pub fn up(state: &mut KernelState, handle: Handle) -> KernelResult<()> {
    let sem = state
        .semaphores
        .get_mut(handle)
        .and_then(|s| s.as_mut())
        .ok_or(KernelError::InvalidProcess)?;

    if let Some(idx) = sem.waiters.front() {
        sem.waiters.remove(&mut state.table, idx);
        let id = state.table.id_at(idx);
        if let Some(pcb) = state.table.get_mut(id) {
            pcb.status = PcbStatus::Ready;
        }
        scheduler_add(state, id);
        return Ok(());
    }

    let sem = state.semaphores[handle].as_mut().unwrap();
    sem.count += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::{create_thread, scheduler_entry};

    #[test]
    fn down_succeeds_immediately_when_count_positive() {
        let mut state = KernelState::new();
        let sem = semaphore_init(&mut state, 1).unwrap();
        let a = create_thread(&mut state, 0).unwrap();
        scheduler_entry(&mut state).unwrap();
        assert_eq!(down(&mut state, sem).unwrap(), BlockOutcome::Completed);
        assert_eq!(state.current(), Some(a));
    }

    #[test]
    fn down_blocks_when_count_zero_then_up_wakes_waiter_via_handoff() {
        let mut state = KernelState::new();
        let sem = semaphore_init(&mut state, 0).unwrap();
        let a = create_thread(&mut state, 0).unwrap();
        scheduler_entry(&mut state).unwrap();
        assert_eq!(down(&mut state, sem).unwrap(), BlockOutcome::Blocked);
        assert_eq!(state.current(), None);

        up(&mut state, sem).unwrap();
        // Handoff: the count must still read 0, since ownership passed
        // straight to the waiter instead of round-tripping through count.
        assert_eq!(state.semaphores[sem].unwrap().count(), 0);
        assert_eq!(scheduler_entry(&mut state), Some(a));
    }

    #[test]
    fn up_with_no_waiters_always_succeeds() {
        let mut state = KernelState::new();
        let sem = semaphore_init(&mut state, 1).unwrap();
        for expected in 2..10 {
            up(&mut state, sem).unwrap();
            assert_eq!(state.semaphores[sem].unwrap().count(), expected);
        }
    }

    #[test]
    fn negative_initial_is_rejected() {
        let mut state = KernelState::new();
        assert_eq!(
            semaphore_init(&mut state, -1),
            Err(KernelError::InvariantViolation)
        );
    }

    #[test]
    fn invalid_handle_is_reported() {
        let mut state = KernelState::new();
        assert_eq!(down(&mut state, 0), Err(KernelError::InvalidProcess));
    }
}
