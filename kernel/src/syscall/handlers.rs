//! One function per syscall number, each operating on the already-locked
//! `KernelState`. Anything that can block (`sleep`, the three `down`/
//! `wait` operations) calls `scheduler_entry` itself afterwards if the
//! operation cleared `current`, exactly the way `do_yield` does it
//! internally for the operations that already wrap it.

use kernel_core::error::KernelResult;
use kernel_core::sched::{self, scheduler_entry};
use kernel_core::sleep;
use kernel_core::state::KernelState;
use kernel_core::sync::{barrier, condvar, semaphore, BlockOutcome};
use kernel_core::ProcessId;

fn reschedule_if_blocked(state: &mut KernelState, outcome: BlockOutcome) {
    if outcome == BlockOutcome::Blocked {
        scheduler_entry(state);
    }
}

pub fn do_yield(state: &mut KernelState) -> i64 {
    sched::do_yield(state);
    0
}

pub fn do_exit(state: &mut KernelState) -> i64 {
    let _ = sched::do_exit(state);
    0
}

pub fn do_sleep(state: &mut KernelState, ticks: u64) -> KernelResult<i64> {
    sleep::do_sleep(state, ticks).map(|()| {
        scheduler_entry(state);
        0
    })
}

pub fn do_getpriority(state: &KernelState, pid: usize) -> KernelResult<i64> {
    sched::do_getpriority(state, ProcessId(pid)).map(|p| p as i64)
}

pub fn do_setpriority(state: &mut KernelState, pid: usize, priority: i32) -> KernelResult<i64> {
    sched::do_setpriority(state, ProcessId(pid), priority).map(|()| 0)
}

pub fn do_lock_init(state: &mut KernelState) -> KernelResult<i64> {
    kernel_core::sync::lock_init(state).map(|h| h as i64)
}

pub fn do_lock_acquire(state: &mut KernelState, handle: usize) -> KernelResult<i64> {
    kernel_core::sync::lock_acquire(state, handle).map(|outcome| {
        reschedule_if_blocked(state, outcome);
        0
    })
}

pub fn do_lock_release(state: &mut KernelState, handle: usize) -> KernelResult<i64> {
    kernel_core::sync::lock_release(state, handle).map(|()| 0)
}

pub fn do_condition_init(state: &mut KernelState) -> KernelResult<i64> {
    condvar::condition_init(state).map(|h| h as i64)
}

pub fn do_condition_wait(state: &mut KernelState, cond: usize, lock: usize) -> KernelResult<i64> {
    condvar::wait(state, cond, lock).map(|outcome| {
        reschedule_if_blocked(state, outcome);
        0
    })
}

pub fn do_condition_signal(state: &mut KernelState, cond: usize) -> KernelResult<i64> {
    condvar::signal(state, cond).map(|()| 0)
}

pub fn do_condition_broadcast(state: &mut KernelState, cond: usize) -> KernelResult<i64> {
    condvar::broadcast(state, cond).map(|()| 0)
}

pub fn do_semaphore_init(state: &mut KernelState, initial: i32) -> KernelResult<i64> {
    semaphore::semaphore_init(state, initial).map(|h| h as i64)
}

pub fn do_semaphore_down(state: &mut KernelState, handle: usize) -> KernelResult<i64> {
    semaphore::down(state, handle).map(|outcome| {
        reschedule_if_blocked(state, outcome);
        0
    })
}

pub fn do_semaphore_up(state: &mut KernelState, handle: usize) -> KernelResult<i64> {
    semaphore::up(state, handle).map(|()| 0)
}

pub fn do_barrier_init(state: &mut KernelState, parties: u32) -> KernelResult<i64> {
    barrier::barrier_init(state, parties).map(|h| h as i64)
}

pub fn do_barrier_wait(state: &mut KernelState, handle: usize) -> KernelResult<i64> {
    barrier::wait(state, handle).map(|outcome| {
        reschedule_if_blocked(state, outcome);
        0
    })
}
