//! Fixed-capacity PCB allocator — the only place new process ids come from.

use crate::error::{KernelError, KernelResult};
use crate::pcb::{Pcb, PcbStatus, ProcessId};
use crate::queue::{Link, LinkedPool};
use crate::MAX_PROCESSES;

/// The fixed-size table every PCB lives in. There is no dynamic allocator
/// anywhere in this crate; a full table is a real, reportable error rather
/// than something callers can work around.
pub struct PcbTable {
    slots: [Pcb; MAX_PROCESSES],
    /// Next generation to hand out from `allocate`. Monotonic for the
    /// whole boot — never reset, never reused, independent of which slot
    /// ends up serving the allocation.
    next_pid: u64,
}

impl PcbTable {
    pub const fn new() -> Self {
        PcbTable {
            slots: [Pcb::empty(); MAX_PROCESSES],
            next_pid: 0,
        }
    }

    pub fn get(&self, id: ProcessId) -> Option<&Pcb> {
        self.slots.get(id.index())
    }

    pub fn get_mut(&mut self, id: ProcessId) -> Option<&mut Pcb> {
        self.slots.get_mut(id.index())
    }

    /// Looks up whichever `ProcessId` currently occupies a physical slot.
    /// For internal use by queue-wakeup paths, which only ever carry the
    /// raw slot an `IndexQueue` popped and need the full, correctly
    /// generationed id back before handing a process to the scheduler.
    pub(crate) fn id_at(&self, slot: usize) -> ProcessId {
        self.slots[slot].id
    }

    /// Finds a `Free` slot, marks it `Ready` and returns its id. Does not
    /// enqueue it anywhere — that is the scheduler's job.
    pub fn allocate(&mut self, priority: i32) -> KernelResult<ProcessId> {
        let generation = self.next_pid;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if matches!(slot.status, PcbStatus::Free) {
                let id = ProcessId::new(idx, generation);
                *slot = Pcb {
                    saved_sp: 0,
                    id,
                    status: PcbStatus::Ready,
                    priority,
                    link: Link::default(),
                    wake_tick: 0,
                    cpu_ticks: 0,
                    last_dispatch_tick: 0,
                    resume_action: crate::pcb::ResumeAction::None,
                };
                self.next_pid += 1;
                return Ok(id);
            }
        }
        Err(KernelError::TableFull)
    }

    /// Frees a slot that is no longer referenced by any queue. Caller must
    /// have already removed the PCB from whatever queue held it.
    pub fn free(&mut self, id: ProcessId) -> KernelResult<()> {
        let slot = self
            .slots
            .get_mut(id.index())
            .ok_or(KernelError::InvalidProcess)?;
        *slot = Pcb::empty();
        slot.id = id;
        Ok(())
    }

    pub fn len_capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for PcbTable {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkedPool for PcbTable {
    fn link_mut(&mut self, idx: usize) -> &mut Link {
        &mut self.slots[idx].link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_assigns_sequential_free_slots() {
        let mut table = PcbTable::new();
        let a = table.allocate(10).unwrap();
        let b = table.allocate(20).unwrap();
        assert_ne!(a, b);
        assert_eq!(table.get(a).unwrap().priority, 10);
        assert_eq!(table.get(b).unwrap().priority, 20);
    }

    #[test]
    fn free_then_reallocate_reuses_slot_but_not_id() {
        let mut table = PcbTable::new();
        let a = table.allocate(1).unwrap();
        table.free(a).unwrap();
        let b = table.allocate(2).unwrap();
        assert_eq!(a.index(), b.index(), "slot should be reused");
        assert_ne!(a, b, "id must never be reused within a boot");
    }

    #[test]
    fn table_full_is_reported_not_panicked() {
        let mut table = PcbTable::new();
        for _ in 0..MAX_PROCESSES {
            table.allocate(0).unwrap();
        }
        assert_eq!(table.allocate(0), Err(KernelError::TableFull));
    }
}
