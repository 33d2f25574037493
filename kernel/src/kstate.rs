//! The one place in this crate that owns `kernel-core`'s state: the global
//! `KernelState`, the per-PCB stacks backing `Pcb::saved_sp`, and the
//! interrupt-control bridge `kernel-core`'s critical-section gate drives.

use spin::Mutex;

use kernel_core::critical::{CriticalGate, InterruptControl};
use kernel_core::{KernelError, KernelState, ProcessId};

use crate::arch::x86_64::context::InterruptContext;

const STACK_SIZE: usize = 16 * 1024;

#[repr(align(16))]
struct Stack([u8; STACK_SIZE]);

/// `SYSCALL_GATE` only ever tracks nesting depth for `timer_dispatch`'s
/// preemption decision — the CPU has already cleared `IF` for the
/// duration of the interrupt handler and `iretq` restores it from the
/// saved frame, so this gate has no hardware interrupts of its own left
/// to toggle.
struct NoHardwareInterrupts;

impl InterruptControl for NoHardwareInterrupts {
    fn disable(&mut self) {}
    fn enable(&mut self) {}
}

static KERNEL_STATE: Mutex<KernelState> = Mutex::new(KernelState::new());

/// Tracks syscall-nesting depth so the timer handler can tell whether the
/// PCB it interrupted was itself in the middle of a syscall — and, if so,
/// leave it running rather than preempt it. Entered/left only by
/// `syscall_dispatch`; read (never entered) by `timer_dispatch`.
static SYSCALL_GATE: Mutex<CriticalGate> = Mutex::new(CriticalGate::new());

static mut STACKS: [Stack; kernel_core::MAX_PROCESSES] =
    [const { Stack([0; STACK_SIZE]) }; kernel_core::MAX_PROCESSES];

fn stack_top(id: ProcessId) -> u64 {
    let stacks_base = &raw const STACKS;
    unsafe {
        let stack = &(*stacks_base)[id.index()];
        stack.0.as_ptr() as u64 + STACK_SIZE as u64
    }
}

fn write_context(id: ProcessId, ctx: InterruptContext) -> usize {
    let top = stack_top(id);
    let ctx_addr = top - core::mem::size_of::<InterruptContext>() as u64;
    let ctx_ptr = ctx_addr as *mut InterruptContext;
    unsafe {
        ctx_ptr.write(ctx);
    }
    ctx_ptr as usize
}

/// Creates a new kernel thread whose first `iretq` lands at `entry`, and
/// installs its initial context so the scheduler can dispatch it like any
/// other PCB.
pub fn spawn(entry: extern "C" fn() -> !, priority: i32) -> Result<ProcessId, KernelError> {
    let mut state = KERNEL_STATE.lock();
    let id = kernel_core::sched::create_thread(&mut state, priority)?;
    let top = stack_top(id);
    let ctx = InterruptContext::new_thread(entry as u64, top);
    let saved_sp = write_context(id, ctx);
    if let Some(pcb) = state.table_mut().get_mut(id) {
        pcb.saved_sp = saved_sp;
    }
    Ok(id)
}

/// Registers a fresh binary lock before any thread exists to race over
/// it. Only called from `kstart`, single-threaded, before interrupts are
/// enabled.
pub fn with_new_lock_init() -> usize {
    let mut state = KERNEL_STATE.lock();
    kernel_core::sync::lock_init(&mut state).expect("sync object table exhausted at boot")
}

pub fn with_new_condition_init() -> usize {
    let mut state = KERNEL_STATE.lock();
    kernel_core::sync::condvar::condition_init(&mut state)
        .expect("sync object table exhausted at boot")
}

pub fn with_new_semaphore_init(initial: i32) -> usize {
    let mut state = KERNEL_STATE.lock();
    kernel_core::sync::semaphore::semaphore_init(&mut state, initial)
        .expect("sync object table exhausted at boot")
}

pub fn with_new_barrier_init(parties: u32) -> usize {
    let mut state = KERNEL_STATE.lock();
    kernel_core::sync::barrier::barrier_init(&mut state, parties)
        .expect("sync object table exhausted at boot")
}

/// Called from the IRQ0 trampoline. Saves the interrupted PCB's context,
/// asks `kernel-core` whether to preempt, and returns the context to
/// install into `rsp` before `iretq`.
pub fn on_timer_interrupt(ctx: *mut InterruptContext) -> *mut InterruptContext {
    let preemptable = !SYSCALL_GATE.lock().is_active();
    let mut state = KERNEL_STATE.lock();

    // Nothing to save if the BSP idle loop itself was interrupted — it
    // never occupies a PCB slot.
    save_current_context(&mut state, ctx);

    let outcome = kernel_core::timer::on_timer_tick(&mut state, preemptable);
    crate::arch::x86_64::pic::end_of_interrupt(0);

    match outcome {
        kernel_core::timer::TickOutcome::NoSwitch => ctx,
        kernel_core::timer::TickOutcome::Switched => resume_current(&state, ctx),
    }
}

/// Reads back whatever PCB is now `current` and returns the context
/// pointer the trampoline should install. Falls back to `fallback` if no
/// PCB is current (nothing left to run — the idle loop's own `hlt` handles
/// that case instead).
pub(crate) fn resume_current(
    state: &KernelState,
    fallback: *mut InterruptContext,
) -> *mut InterruptContext {
    match state.current().and_then(|id| state.table().get(id)) {
        Some(pcb) => pcb.saved_sp as *mut InterruptContext,
        None => fallback,
    }
}

pub(crate) fn enter_syscall() {
    let mut ctl = NoHardwareInterrupts;
    SYSCALL_GATE.lock().enter(&mut ctl);
}

pub(crate) fn leave_syscall() {
    let mut ctl = NoHardwareInterrupts;
    SYSCALL_GATE.lock().leave(&mut ctl);
}

pub(crate) fn lock() -> spin::MutexGuard<'static, KernelState> {
    KERNEL_STATE.lock()
}

/// A `KernelState` independent of the global one, for `self-test` to
/// exercise scheduling and sync logic without disturbing the real demo
/// threads already registered in `KERNEL_STATE`.
#[cfg(feature = "self-test")]
pub(crate) fn with_scratch_state<R>(f: impl FnOnce(&mut KernelState) -> R) -> R {
    let mut state = KernelState::new();
    f(&mut state)
}

pub(crate) fn save_current_context(state: &mut KernelState, ctx: *mut InterruptContext) {
    if let Some(current) = state.current() {
        if let Some(pcb) = state.table_mut().get_mut(current) {
            pcb.saved_sp = ctx as usize;
        }
    }
}
