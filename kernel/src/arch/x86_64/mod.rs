//! x86_64 architecture glue: segmentation, interrupt descriptors, the two
//! 8259/8254 legacy chips, the serial console, and the interrupt context
//! layout and trampolines that tie them to `kernel-core`.

pub mod context;
pub mod gdt;
pub mod idt;
pub mod pic;
pub mod pit;
pub mod serial;

use context::InterruptContext;

pub fn init() {
    gdt::init();
    idt::init();
    pic::init();
    pit::init();
}

/// Called with `rdi` = pointer to the interrupted PCB's freshly pushed
/// `InterruptContext`. Stores it, asks `kernel-core` whether to preempt,
/// and returns the context to resume — the interrupted one if not, or the
/// newly current PCB's if so.
#[unsafe(no_mangle)]
extern "C" fn timer_dispatch(ctx: *mut InterruptContext) -> *mut InterruptContext {
    crate::kstate::on_timer_interrupt(ctx)
}

/// Called with `rdi` = pointer to the calling PCB's freshly pushed
/// `InterruptContext`. The syscall number and arguments live in that
/// context's `rax`/`rdi`/`rsi`/`rdx`; the result is written back into
/// `rax` in place before this returns, same as the timer path, the
/// context to resume (which may belong to a different PCB if the call
/// blocked).
#[unsafe(no_mangle)]
extern "C" fn syscall_dispatch(ctx: *mut InterruptContext) -> *mut InterruptContext {
    crate::syscall::dispatch(ctx)
}
