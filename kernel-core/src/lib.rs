//! Hardware-independent core of a preemptive, round-robin kernel scheduler.
//!
//! This crate holds every invariant named in the design: the PCB table, the
//! intrusive ready/sleeping/waiter queues, the nestable critical-section
//! gate, the sleep subsystem, the timer tick decision path, and the three
//! kernel-mode synchronization primitives (condition variable, semaphore,
//! barrier). It has no notion of x86, interrupt vectors, or assembly — the
//! `kernel` binary crate in this workspace supplies those and calls into
//! `KernelState` from its interrupt and syscall trampolines.
//!
//! The crate is `no_std` in production builds but compiles with `std`
//! available under `cargo test`, so the properties below can be exercised
//! as ordinary host tests instead of only on real or emulated hardware.
#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod critical;
pub mod error;
pub mod pcb;
pub mod queue;
pub mod sched;
pub mod sleep;
pub mod state;
pub mod sync;
pub mod table;
pub mod timer;

pub use critical::CriticalGate;
pub use error::KernelError;
pub use pcb::{Pcb, PcbStatus, ProcessId, ResumeAction};
pub use queue::IndexQueue;
pub use state::KernelState;
pub use table::PcbTable;

/// Fixed capacity of the process control block table. No dynamic memory
/// allocator backs this crate — every PCB comes from this fixed-size table.
pub const MAX_PROCESSES: usize = 64;

/// Milliseconds of wall time represented by one timer tick.
pub const MS_PER_TICK: u64 = 10;

/// Lower bound of the advisory priority range. Priorities are clamped
/// into this range and only ever influence dispatch order, never
/// correctness.
pub const PRIORITY_MIN: i32 = 0;

/// Upper bound of the advisory priority range.
pub const PRIORITY_MAX: i32 = 63;

/// Priority assigned to newly-created processes absent any other
/// instruction.
pub const PRIORITY_DEFAULT: i32 = 31;

/// Fixed capacity of each synchronization-object registry (locks,
/// condition variables, semaphores, barriers are each their own table of
/// this size, indexed by the handle returned from `*_init`).
pub const MAX_SYNC_OBJECTS: usize = 32;

pub(crate) fn clamp_priority(p: i32) -> i32 {
    if p < PRIORITY_MIN {
        PRIORITY_MIN
    } else if p > PRIORITY_MAX {
        PRIORITY_MAX
    } else {
        p
    }
}
