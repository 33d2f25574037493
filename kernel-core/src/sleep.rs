//! Blocking sleep subsystem.
//!
//! A sleeping PCB sits on its own intrusive queue tagged with the tick at
//! which it should wake. `check_sleeping` is driven once per timer tick and
//! performs a single bounded pass over the sleeping queue rather than
//! repeatedly rescanning from the head, so a timer handler can never be
//! made to do unbounded work by a queue of already-due sleepers pushing
//! newly-due ones in front of it.

use crate::error::{KernelError, KernelResult};
use crate::pcb::PcbStatus;
use crate::sched::scheduler_add;
use crate::state::KernelState;

/// Moves `current` from `Running` to `Sleeping` until `state.tick() +
/// duration_ticks`. Does not itself pick a replacement process to run —
/// callers combine this with `sched::scheduler_entry` the same way
/// `do_yield` does.
pub fn do_sleep(state: &mut KernelState, duration_ticks: u64) -> KernelResult<()> {
    let id = state.current.take().ok_or(KernelError::InvalidProcess)?;
    let wake_at = state.tick.saturating_add(duration_ticks);
    if let Some(pcb) = state.table.get_mut(id) {
        pcb.status = PcbStatus::Sleeping;
        pcb.wake_tick = wake_at;
    }
    state.sleeping.put(&mut state.table, id.index());
    Ok(())
}

/// Scans the sleeping queue once, moving every PCB whose `wake_tick` has
/// arrived back onto the ready queue. Bounded to exactly `len()` items
/// observed at entry, so PCBs re-queued during the scan (there are none —
/// `scheduler_add` never touches the sleeping queue — but future callers
/// should preserve this property) cannot extend the pass.
pub fn check_sleeping(state: &mut KernelState) {
    let due_tick = state.tick;
    let passes = state.sleeping.len();
    for _ in 0..passes {
        let Some(idx) = state.sleeping.front() else {
            break;
        };
        let wake_tick = match state.table.get(state.table.id_at(idx)) {
            Some(pcb) => pcb.wake_tick,
            None => {
                // Slot was freed out from under the queue; drop it.
                state.sleeping.remove(&mut state.table, idx);
                continue;
            }
        };
        if wake_tick > due_tick {
            // Sleeping queue is not ordered by wake time, so a not-yet-due
            // entry at the front does not mean the rest are undue too;
            // move it to the queue's tail within this same bounded pass
            // rather than stopping the scan early.
            state.sleeping.remove(&mut state.table, idx);
            state.sleeping.put(&mut state.table, idx);
            continue;
        }
        state.sleeping.remove(&mut state.table, idx);
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
    use crate::sched::{create_thread, do_yield, scheduler_entry};

    #[test]
    fn sleeper_wakes_once_tick_reaches_deadline() {
        let mut state = KernelState::new();
        let a = create_thread(&mut state, 0).unwrap();
        scheduler_entry(&mut state).unwrap();
        do_sleep(&mut state, 5).unwrap();
        assert_eq!(state.current(), None);
        assert_eq!(state.sleeping_len(), 1);

        state.tick = 4;
        check_sleeping(&mut state);
        assert_eq!(state.ready_len(), 0, "not due yet");

        state.tick = 5;
        check_sleeping(&mut state);
        assert_eq!(state.ready_len(), 1, "due exactly at deadline");
        assert_eq!(scheduler_entry(&mut state), Some(a));
    }

    #[test]
    fn mixed_deadlines_each_wake_on_their_own_tick() {
        let mut state = KernelState::new();
        let a = create_thread(&mut state, 0).unwrap();
        let b = create_thread(&mut state, 0).unwrap();
        scheduler_entry(&mut state).unwrap();
        do_sleep(&mut state, 10).unwrap();
        scheduler_entry(&mut state).unwrap();
        do_sleep(&mut state, 3).unwrap();

        state.tick = 3;
        check_sleeping(&mut state);
        assert_eq!(scheduler_entry(&mut state), Some(b));
        do_yield(&mut state);

        state.tick = 10;
        check_sleeping(&mut state);
        assert_eq!(state.sleeping_len(), 0);
        let _ = a;
    }

    #[test]
    fn check_sleeping_on_empty_queue_is_a_no_op() {
        let mut state = KernelState::new();
        state.tick = 1000;
        check_sleeping(&mut state);
        assert_eq!(state.ready_len(), 0);
    }
}
