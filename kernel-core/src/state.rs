//! `KernelState` — the single aggregate all scheduling, sleep and
//! synchronization operations act on.
//!
//! Bundling the PCB table, the ready/sleeping queues, the current-running
//! slot, the tick counter and the critical-section depth into one struct
//! (rather than scattering them as separate globals) means every operation
//! in this crate takes `&mut KernelState` and nothing else — there is
//! exactly one thing for the `kernel` binary to put behind a lock.

use heapless::Vec;

use crate::pcb::{PcbStatus, ProcessId};
use crate::queue::IndexQueue;
use crate::sync::{Barrier, Condvar, Semaphore};
use crate::table::PcbTable;
use crate::{MAX_PROCESSES, MAX_SYNC_OBJECTS};

/// Point-in-time snapshot of one PCB, for inspection only. Never consulted
/// by scheduling decisions — round-robin remains pure FIFO regardless of
/// what these numbers say.
#[derive(Debug, Clone, Copy)]
pub struct ThreadStats {
    pub id: ProcessId,
    pub status: PcbStatus,
    pub priority: i32,
    pub cpu_ticks: u64,
    pub last_dispatch_tick: u64,
}

pub struct KernelState {
    pub(crate) table: PcbTable,
    pub(crate) ready: IndexQueue,
    pub(crate) sleeping: IndexQueue,
    pub(crate) current: Option<ProcessId>,
    pub(crate) tick: u64,
    /// Ticks observed with no PCB in `current`. The `kernel` binary still
    /// spawns a real halting idle PCB so the dispatcher always has a
    /// target; this counter exists purely so "how much did we actually
    /// idle" can be inspected without depending on that idle PCB's own
    /// bookkeeping.
    pub(crate) idle_ticks: u64,
    pub(crate) semaphores: [Option<Semaphore>; MAX_SYNC_OBJECTS],
    pub(crate) condvars: [Option<Condvar>; MAX_SYNC_OBJECTS],
    pub(crate) barriers: [Option<Barrier>; MAX_SYNC_OBJECTS],
}

impl KernelState {
    pub const fn new() -> Self {
        KernelState {
            table: PcbTable::new(),
            ready: IndexQueue::new(),
            sleeping: IndexQueue::new(),
            current: None,
            tick: 0,
            idle_ticks: 0,
            semaphores: [None; MAX_SYNC_OBJECTS],
            condvars: [None; MAX_SYNC_OBJECTS],
            barriers: [None; MAX_SYNC_OBJECTS],
        }
    }

    pub fn table(&self) -> &PcbTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut PcbTable {
        &mut self.table
    }

    pub fn current(&self) -> Option<ProcessId> {
        self.current
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn idle_ticks(&self) -> u64 {
        self.idle_ticks
    }

    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub fn sleeping_len(&self) -> usize {
        self.sleeping.len()
    }

    /// Snapshot of every non-`Free` PCB's stats, in table order.
    pub fn stats(&self) -> Vec<ThreadStats, MAX_PROCESSES> {
        let mut out = Vec::new();
        for idx in 0..self.table.len_capacity() {
            let pid = ProcessId(idx);
            if let Some(pcb) = self.table.get(pid) {
                if !matches!(pcb.status, PcbStatus::Free) {
                    // Capacity equals MAX_PROCESSES, so this can never fail.
                    let _ = out.push(ThreadStats {
                        id: pcb.id,
                        status: pcb.status,
                        priority: pcb.priority,
                        cpu_ticks: pcb.cpu_ticks,
                        last_dispatch_tick: pcb.last_dispatch_tick,
                    });
                }
            }
        }
        out
    }
}

impl Default for KernelState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_empty() {
        let state = KernelState::new();
        assert_eq!(state.tick(), 0);
        assert_eq!(state.current(), None);
        assert_eq!(state.ready_len(), 0);
        assert!(state.stats().is_empty());
    }

    #[test]
    fn stats_reflects_allocated_pcbs() {
        let mut state = KernelState::new();
        let id = state.table_mut().allocate(7).unwrap();
        let stats = state.stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].id, id);
        assert_eq!(stats[0].priority, 7);
    }
}
