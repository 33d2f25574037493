//! Saved-context layout and the two naked-assembly interrupt trampolines
//! that drive every context switch in this kernel: the timer tick (IRQ0,
//! hardware-driven preemption) and the syscall gate (INT 0x80,
//! software-driven). Both follow the same shape: push every general
//! purpose register on top of the frame the CPU already pushed, call a
//! Rust dispatcher with `rsp` as its argument, then load `rsp` from
//! whatever context pointer that dispatcher returns and `iretq` into it.
//! Pushing and popping in the same order keeps the two operations as
//! exact inverses of each other regardless of which PCB's stack `rsp`
//! ends up pointing at.

/// Registers the CPU pushes automatically on any interrupt or exception.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InterruptFrame {
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

impl InterruptFrame {
    pub const fn default_for_thread(rip: u64, rsp: u64) -> Self {
        InterruptFrame {
            rip,
            cs: 0x08,
            rflags: 0x202,
            rsp,
            ss: 0x10,
        }
    }
}

/// Full saved context: the general-purpose registers the trampolines push
/// by hand, sitting below the `InterruptFrame` the CPU pushed. `rsp`
/// pointing at a value of this type is what `Pcb::saved_sp` holds for
/// every PCB that is not currently `Running`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InterruptContext {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rbp: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,
    pub iret_frame: InterruptFrame,
}

impl InterruptContext {
    /// A freshly created thread's context: general-purpose registers
    /// zeroed, `iret_frame` set up so the first `iretq` jumps straight to
    /// `entry` with `stack_top` as its stack.
    pub const fn new_thread(entry: u64, stack_top: u64) -> Self {
        InterruptContext {
            r15: 0,
            r14: 0,
            r13: 0,
            r12: 0,
            r11: 0,
            r10: 0,
            r9: 0,
            r8: 0,
            rbp: 0,
            rdi: 0,
            rsi: 0,
            rdx: 0,
            rcx: 0,
            rbx: 0,
            rax: 0,
            iret_frame: InterruptFrame::default_for_thread(entry, stack_top),
        }
    }
}

/// IRQ0 entry point. Picks up the timer tick, decides whether to preempt,
/// and resumes whichever PCB is `current` afterwards (possibly the same
/// one that was interrupted).
#[unsafe(naked)]
pub unsafe extern "C" fn timer_trampoline() {
    core::arch::naked_asm!(
        "push rax",
        "push rbx",
        "push rcx",
        "push rdx",
        "push rsi",
        "push rdi",
        "push rbp",
        "push r8",
        "push r9",
        "push r10",
        "push r11",
        "push r12",
        "push r13",
        "push r14",
        "push r15",

        "mov rdi, rsp",
        "call {dispatch}",
        "mov rsp, rax",

        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop r11",
        "pop r10",
        "pop r9",
        "pop r8",
        "pop rbp",
        "pop rdi",
        "pop rsi",
        "pop rdx",
        "pop rcx",
        "pop rbx",
        "pop rax",

        "iretq",

        dispatch = sym super::timer_dispatch,
    )
}

/// INT 0x80 entry point. The full syscall surface — yield, exit, sleep,
/// priority, thread creation, and the lock/condvar/semaphore/barrier
/// operations — is dispatched from the saved context's `rax` (number) and
/// `rdi`/`rsi`/`rdx` (arguments); the return value is written back into
/// the caller's own saved `rax` before it is ever popped. No EOI: this is
/// a software interrupt, the PIC never saw it.
#[unsafe(naked)]
pub unsafe extern "C" fn syscall_trampoline() {
    core::arch::naked_asm!(
        "push rax",
        "push rbx",
        "push rcx",
        "push rdx",
        "push rsi",
        "push rdi",
        "push rbp",
        "push r8",
        "push r9",
        "push r10",
        "push r11",
        "push r12",
        "push r13",
        "push r14",
        "push r15",

        "mov rdi, rsp",
        "call {dispatch}",
        "mov rsp, rax",

        "pop r15",
        "pop r14",
        "pop r13",
        "pop r12",
        "pop r11",
        "pop r10",
        "pop r9",
        "pop r8",
        "pop rbp",
        "pop rdi",
        "pop rsi",
        "pop rdx",
        "pop rcx",
        "pop rbx",
        "pop rax",

        "iretq",

        dispatch = sym super::syscall_dispatch,
    )
}
