//! Reusable barrier: once `parties` PCBs have called `wait`, all of them
//! are released and the barrier's generation counter advances, making it
//! immediately usable for a second round without any reinitialization.

use crate::error::{KernelError, KernelResult};
use crate::pcb::PcbStatus;
use crate::queue::IndexQueue;
use crate::sched::scheduler_add;
use crate::state::KernelState;
use crate::sync::{allocate_slot, BlockOutcome, Handle};

#[derive(Debug, Clone, Copy)]
pub struct Barrier {
    parties: u32,
    count: u32,
    generation: u32,
    waiters: IndexQueue,
}

impl Barrier {
    pub const fn new(parties: u32) -> Self {
        Barrier {
            parties,
            count: 0,
            generation: 0,
            waiters: IndexQueue::new(),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Registers a new barrier and returns its handle. Rejects `parties == 0` —
/// a barrier that no one can ever complete is a caller bug, not something
/// to defer to the first `wait`.
pub fn barrier_init(state: &mut KernelState, parties: u32) -> KernelResult<Handle> {
    if parties == 0 {
        return Err(KernelError::InvariantViolation);
    }
    allocate_slot(&mut state.barriers, Barrier::new(parties))
}

/// Arrives at the barrier. The PCB that completes the last of `parties`
/// arrivals releases every other waiter itself (in the same call) and
/// returns `Completed` without ever blocking; every earlier arrival
/// returns `Blocked` until that last arrival happens.
pub fn wait(state: &mut KernelState, handle: Handle) -> KernelResult<BlockOutcome> {
    {
        let barrier = state
            .barriers
            .get_mut(handle)
            .and_then(|b| b.as_mut())
            .ok_or(KernelError::InvalidProcess)?;
        barrier.count += 1;
        if barrier.count < barrier.parties {
            // fall through to block below
        } else {
            barrier.count = 0;
            barrier.generation = barrier.generation.wrapping_add(1);
            release_all(state, handle);
            return Ok(BlockOutcome::Completed);
        }
    }

    let id = state.current.take().ok_or(KernelError::InvalidProcess)?;
    if let Some(pcb) = state.table.get_mut(id) {
        pcb.status = PcbStatus::Blocked;
    }
    let barrier = state.barriers[handle].as_mut().unwrap();
    barrier.waiters.put(&mut state.table, id.index());
    Ok(BlockOutcome::Blocked)
}

fn release_all(state: &mut KernelState, handle: Handle) {
    loop {
        let idx = {
            let barrier = state.barriers[handle].as_mut().unwrap();
            match barrier.waiters.front() {
                Some(idx) => {
                    barrier.waiters.remove(&mut state.table, idx);
                    idx
                }
                None => break,
            }
        };
        let id = state.table.id_at(idx);
        if let Some(pcb) = state.table.get_mut(id) {
            pcb.status = PcbStatus::Ready;
        }
        scheduler_add(state, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::{create_thread, scheduler_entry};

    #[test]
    fn releases_all_once_every_party_has_arrived() {
        let mut state = KernelState::new();
        let barrier = barrier_init(&mut state, 3).unwrap();
        let a = create_thread(&mut state, 0).unwrap();
        let b = create_thread(&mut state, 0).unwrap();
        let c = create_thread(&mut state, 0).unwrap();

        scheduler_entry(&mut state).unwrap();
        assert_eq!(wait(&mut state, barrier).unwrap(), BlockOutcome::Blocked);
        scheduler_entry(&mut state).unwrap();
        assert_eq!(wait(&mut state, barrier).unwrap(), BlockOutcome::Blocked);
        assert_eq!(state.ready_len(), 1, "c still waiting to arrive");

        scheduler_entry(&mut state).unwrap();
        assert_eq!(wait(&mut state, barrier).unwrap(), BlockOutcome::Completed);
        assert_eq!(state.ready_len(), 2, "a and b released");
        let _ = (a, b, c);
    }

    #[test]
    fn is_reusable_across_generations() {
        let mut state = KernelState::new();
        let barrier = barrier_init(&mut state, 2).unwrap();
        let _a = create_thread(&mut state, 0).unwrap();
        let _b = create_thread(&mut state, 0).unwrap();

        scheduler_entry(&mut state).unwrap();
        wait(&mut state, barrier).unwrap();
        scheduler_entry(&mut state).unwrap();
        wait(&mut state, barrier).unwrap();
        assert_eq!(state.barriers[barrier].unwrap().generation(), 1);

        // Second round with the same two PCBs, now both back on ready.
        scheduler_entry(&mut state).unwrap();
        wait(&mut state, barrier).unwrap();
        scheduler_entry(&mut state).unwrap();
        let outcome = wait(&mut state, barrier).unwrap();
        assert_eq!(outcome, BlockOutcome::Completed);
        assert_eq!(state.barriers[barrier].unwrap().generation(), 2);
    }

    #[test]
    fn zero_party_barrier_is_rejected() {
        let mut state = KernelState::new();
        assert_eq!(
            barrier_init(&mut state, 0),
            Err(KernelError::InvariantViolation)
        );
    }
}
