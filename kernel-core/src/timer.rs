//! Tick counter and the timer interrupt decision path.
//!
//! `on_timer_tick` implements the preemptable/non-preemptable split: the
//! register-save that happens before this is called and the `iretq`/EOI
//! that happens after are the hardware trampoline's job (an external
//! collaborator from this crate's point of view). What happens here is
//! purely the kernel-state decision of whether a context switch should
//! take place at all, and if so, to whom.

use crate::sched::{put_current_running, scheduler_entry};
use crate::sleep::check_sleeping;
use crate::state::KernelState;

/// Outcome of one timer tick, telling the caller whether the running PCB
/// changed and, if so, what the trampoline should install as the resume
/// target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No process was preempted (non-preemptable — see below — or the
    /// same process was chosen again because no other was ready).
    NoSwitch,
    /// The running process changed; the trampoline must install the new
    /// current process's saved stack pointer.
    Switched,
}

/// Advances the tick counter and decides whether to preempt.
///
/// `preemptable` tells this function whether the interrupted context was
/// eligible for preemption — the `kernel` binary computes that from the
/// interrupted PCB's syscall-nesting depth (a process executing inside a
/// syscall, i.e. with the critical-section gate held on its behalf, is not
/// preempted: the tick is still counted, but no switch happens).
pub fn on_timer_tick(state: &mut KernelState, preemptable: bool) -> TickOutcome {
    state.tick = state.tick.wrapping_add(1);
    check_sleeping(state);

    if state.current.is_none() {
        state.idle_ticks = state.idle_ticks.saturating_add(1);
    }

    if !preemptable {
        return TickOutcome::NoSwitch;
    }

    let before = state.current;
    if state.ready.is_empty() {
        // Nothing else to switch to; keep the current process running
        // (or stay idle if there wasn't one).
        return TickOutcome::NoSwitch;
    }

    put_current_running(state);
    let after = scheduler_entry(state);
    if after == before {
        TickOutcome::NoSwitch
    } else {
        TickOutcome::Switched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::{create_thread, scheduler_entry};

    #[test]
    fn tick_counter_advances_every_call() {
        let mut state = KernelState::new();
        on_timer_tick(&mut state, false);
        on_timer_tick(&mut state, false);
        assert_eq!(state.tick(), 2);
    }

    #[test]
    fn non_preemptable_tick_never_switches() {
        let mut state = KernelState::new();
        let a = create_thread(&mut state, 0).unwrap();
        let _b = create_thread(&mut state, 0).unwrap();
        scheduler_entry(&mut state).unwrap();
        assert_eq!(on_timer_tick(&mut state, false), TickOutcome::NoSwitch);
        assert_eq!(state.current(), Some(a));
    }

    #[test]
    fn preemptable_tick_switches_when_another_process_is_ready() {
        let mut state = KernelState::new();
        let a = create_thread(&mut state, 0).unwrap();
        let b = create_thread(&mut state, 0).unwrap();
        scheduler_entry(&mut state).unwrap();
        assert_eq!(state.current(), Some(a));
        assert_eq!(on_timer_tick(&mut state, true), TickOutcome::Switched);
        assert_eq!(state.current(), Some(b));
    }

    #[test]
    fn preemptable_tick_with_empty_ready_queue_keeps_running() {
        let mut state = KernelState::new();
        let a = create_thread(&mut state, 0).unwrap();
        scheduler_entry(&mut state).unwrap();
        assert_eq!(on_timer_tick(&mut state, true), TickOutcome::NoSwitch);
        assert_eq!(state.current(), Some(a));
    }

    #[test]
    fn idle_ticks_accumulate_with_nothing_running() {
        let mut state = KernelState::new();
        on_timer_tick(&mut state, true);
        on_timer_tick(&mut state, true);
        assert_eq!(state.idle_ticks(), 2);
    }
}
