//! Syscall surface, entered through INT 0x80. `dispatch` is called by the
//! naked-asm trampoline in `arch::x86_64::context` with a pointer to the
//! caller's freshly pushed `InterruptContext`; it reads the syscall number
//! and arguments out of that context, performs the operation against the
//! single global `KernelState`, writes the result back into the same
//! context's `rax`, and returns whichever context should actually be
//! resumed — its own, if the call didn't block, or whatever PCB the
//! scheduler picked instead.

pub mod api;
pub mod handlers;
pub mod numbers;

use kernel_core::state::KernelState;
use numbers::*;

use crate::arch::x86_64::context::InterruptContext;

pub fn dispatch(ctx: *mut InterruptContext) -> *mut InterruptContext {
    crate::kstate::enter_syscall();

    let (number, a0, a1, a2) = unsafe {
        let c = &*ctx;
        (c.rax, c.rdi, c.rsi, c.rdx)
    };

    let resume = if number == SYS_CREATE_THREAD {
        let entry: extern "C" fn() -> ! = unsafe { core::mem::transmute(a0 as usize) };
        let result = crate::kstate::spawn(entry, a1 as i32).map(|id| id.index() as i64);
        write_result(ctx, result);
        ctx
    } else {
        let mut state = crate::kstate::lock();
        crate::kstate::save_current_context(&mut state, ctx);
        let result = run(&mut state, number, a0, a1, a2);
        write_result(ctx, result);
        crate::kstate::resume_current(&state, ctx)
    };

    crate::kstate::leave_syscall();
    resume
}

fn write_result(ctx: *mut InterruptContext, result: Result<i64, kernel_core::KernelError>) {
    let value = match result {
        Ok(v) => v,
        Err(e) => error_code(e),
    };
    unsafe {
        (*ctx).rax = value as u64;
    }
}

fn run(state: &mut KernelState, number: u64, a0: u64, a1: u64, a2: u64) -> Result<i64, kernel_core::KernelError> {
    use handlers::*;
    match number {
        SYS_YIELD => Ok(do_yield(state)),
        SYS_EXIT => Ok(do_exit(state)),
        SYS_SLEEP => do_sleep(state, a0),
        SYS_GETPRIORITY => do_getpriority(state, a0 as usize),
        SYS_SETPRIORITY => do_setpriority(state, a0 as usize, a1 as i32),
        SYS_LOCK_INIT => do_lock_init(state),
        SYS_LOCK_ACQUIRE => do_lock_acquire(state, a0 as usize),
        SYS_LOCK_RELEASE => do_lock_release(state, a0 as usize),
        SYS_CONDITION_INIT => do_condition_init(state),
        SYS_CONDITION_WAIT => do_condition_wait(state, a0 as usize, a1 as usize),
        SYS_CONDITION_SIGNAL => do_condition_signal(state, a0 as usize),
        SYS_CONDITION_BROADCAST => do_condition_broadcast(state, a0 as usize),
        SYS_SEMAPHORE_INIT => do_semaphore_init(state, a0 as i32),
        SYS_SEMAPHORE_DOWN => do_semaphore_down(state, a0 as usize),
        SYS_SEMAPHORE_UP => do_semaphore_up(state, a0 as usize),
        SYS_BARRIER_INIT => do_barrier_init(state, a0 as u32),
        SYS_BARRIER_WAIT => do_barrier_wait(state, a0 as usize),
        _ => {
            let _ = a2;
            Err(kernel_core::KernelError::InvalidProcess)
        }
    }
}
