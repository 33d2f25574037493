//! Scheduler core: round-robin ready-queue management and the PCB
//! lifecycle operations reachable from syscalls.
//!
//! No priority dispatch, no SMP, no fairness guarantee beyond plain FIFO —
//! `priority` is carried and reported but never consulted by `dispatch`.

use crate::clamp_priority;
use crate::error::{KernelError, KernelResult};
use crate::pcb::{PcbStatus, ProcessId, ResumeAction};
use crate::state::KernelState;
use crate::sync::{semaphore, BlockOutcome};

/// Allocates a new PCB and places it on the ready queue. Folds together
/// PCB allocation with ready-queue enqueue since a created thread that
/// isn't yet runnable has no other useful state to be in.
pub fn create_thread(state: &mut KernelState, priority: i32) -> KernelResult<ProcessId> {
    let priority = clamp_priority(priority);
    let id = state.table_mut().allocate(priority)?;
    scheduler_add(state, id);
    Ok(id)
}

/// Enqueues an already-allocated, `Ready`-status PCB onto the tail of the
/// ready queue.
pub fn scheduler_add(state: &mut KernelState, id: ProcessId) {
    state.ready.put(&mut state.table, id.index());
}

/// Ensures some PCB occupies `current`, picking the head of the ready
/// queue if none does. Idempotent: calling it again while a process is
/// already current is a no-op and returns that process.
///
/// A PCB with a pending `ResumeAction` (a Mesa-semantics condvar waiter
/// that was signaled but still needs its lock back) is not handed control
/// until that action completes; if it blocks again immediately, this
/// function moves on and tries the next ready PCB instead of returning a
/// process that cannot actually run yet.
pub fn scheduler_entry(state: &mut KernelState) -> Option<ProcessId> {
    if let Some(current) = state.current {
        return Some(current);
    }

    loop {
        let idx = state.ready.get(&mut state.table)?;
        let id = state.table.id_at(idx);
        let pending = state
            .table
            .get(id)
            .map(|pcb| pcb.resume_action)
            .unwrap_or(ResumeAction::None);

        match pending {
            ResumeAction::None => {
                dispatch(state, id);
                return Some(id);
            }
            ResumeAction::ReacquireLock(lock) => {
                state.current = Some(id);
                if let Some(pcb) = state.table.get_mut(id) {
                    pcb.resume_action = ResumeAction::None;
                }
                match semaphore::down(state, lock) {
                    Ok(BlockOutcome::Completed) => {
                        let tick = state.tick;
                        if let Some(pcb) = state.table.get_mut(id) {
                            pcb.status = PcbStatus::Running;
                            pcb.last_dispatch_tick = tick;
                        }
                        return Some(id);
                    }
                    // down() already cleared `current` and re-queued `id`
                    // onto the lock's own waiter queue when it blocked.
                    Ok(BlockOutcome::Blocked) => continue,
                    Err(_) => continue,
                }
            }
        }
    }
}

fn dispatch(state: &mut KernelState, id: ProcessId) {
    let tick = state.tick;
    if let Some(pcb) = state.table.get_mut(id) {
        pcb.status = PcbStatus::Running;
        pcb.last_dispatch_tick = tick;
    }
    state.current = Some(id);
}

/// Moves whatever PCB is `current` back onto the ready queue (as `Ready`)
/// and clears `current`. The caller is responsible for calling
/// `scheduler_entry` afterwards to pick the next process to run.
pub fn put_current_running(state: &mut KernelState) {
    let Some(id) = state.current.take() else {
        return;
    };
    let tick = state.tick;
    if let Some(pcb) = state.table.get_mut(id) {
        pcb.cpu_ticks = pcb.cpu_ticks.saturating_add(tick.saturating_sub(pcb.last_dispatch_tick));
        pcb.status = PcbStatus::Ready;
    }
    state.ready.put(&mut state.table, id.index());
}

/// Cooperative yield: the running process gives up the CPU but stays
/// runnable. Returns whichever process is running afterwards (possibly the
/// same one, if the ready queue was otherwise empty).
pub fn do_yield(state: &mut KernelState) -> Option<ProcessId> {
    put_current_running(state);
    scheduler_entry(state)
}

/// The running process terminates. Per the reclamation policy this crate
/// uses, the slot is freed immediately rather than left `Exited`
/// indefinitely, since nothing else references it once it is no longer
/// `current` and was never re-enqueued.
pub fn do_exit(state: &mut KernelState) -> KernelResult<Option<ProcessId>> {
    let id = state.current.take().ok_or(KernelError::InvalidProcess)?;
    if let Some(pcb) = state.table.get_mut(id) {
        pcb.status = PcbStatus::Exited;
    }
    state.table_mut().free(id)?;
    Ok(scheduler_entry(state))
}

pub fn do_getpriority(state: &KernelState, id: ProcessId) -> KernelResult<i32> {
    state
        .table()
        .get(id)
        .map(|pcb| pcb.priority)
        .ok_or(KernelError::InvalidProcess)
}

pub fn do_setpriority(state: &mut KernelState, id: ProcessId, priority: i32) -> KernelResult<()> {
    let priority = clamp_priority(priority);
    let pcb = state
        .table_mut()
        .get_mut(id)
        .ok_or(KernelError::InvalidProcess)?;
    pcb.priority = priority;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_cycles_through_all_ready_processes() {
        let mut state = KernelState::new();
        let a = create_thread(&mut state, 0).unwrap();
        let b = create_thread(&mut state, 0).unwrap();
        let c = create_thread(&mut state, 0).unwrap();

        assert_eq!(scheduler_entry(&mut state), Some(a));
        assert_eq!(do_yield(&mut state), Some(b));
        assert_eq!(do_yield(&mut state), Some(c));
        assert_eq!(do_yield(&mut state), Some(a));
    }

    #[test]
    fn exit_frees_slot_for_reuse() {
        let mut state = KernelState::new();
        let a = create_thread(&mut state, 0).unwrap();
        scheduler_entry(&mut state).unwrap();
        assert_eq!(state.current(), Some(a));
        let next = do_exit(&mut state).unwrap();
        assert_eq!(next, None);
        assert_eq!(state.current(), None);

        let b = create_thread(&mut state, 0).unwrap();
        assert_eq!(a.index(), b.index(), "freed slot should be reused");
        assert_ne!(a, b, "reused slot must get a new id");
    }

    #[test]
    fn priority_is_clamped_and_advisory_only() {
        let mut state = KernelState::new();
        let a = create_thread(&mut state, 0).unwrap();
        let b = create_thread(&mut state, 0).unwrap();
        do_setpriority(&mut state, a, 9999).unwrap();
        assert_eq!(do_getpriority(&state, a).unwrap(), crate::PRIORITY_MAX);

        // Dispatch order is unaffected by priority: FIFO still applies.
        assert_eq!(scheduler_entry(&mut state), Some(a));
        assert_eq!(do_yield(&mut state), Some(b));
    }

    #[test]
    fn single_ready_process_is_rescheduled_to_itself() {
        let mut state = KernelState::new();
        let a = create_thread(&mut state, 0).unwrap();
        assert_eq!(scheduler_entry(&mut state), Some(a));
        assert_eq!(do_yield(&mut state), Some(a));
    }

    #[test]
    fn exit_with_no_current_process_is_reported() {
        let mut state = KernelState::new();
        assert_eq!(do_exit(&mut state), Err(KernelError::InvalidProcess));
    }
}
