//! Syscall numbers, read out of `rax` by `dispatch`. Arguments travel in
//! `rdi`, `rsi`, `rdx`, the same slots the System V calling convention
//! would put them in, so a userspace-style `int 0x80` stub would need no
//! translation even though this kernel never runs anything at ring 3.

pub const SYS_YIELD: u64 = 0;
pub const SYS_EXIT: u64 = 1;
pub const SYS_SLEEP: u64 = 2;
pub const SYS_GETPRIORITY: u64 = 3;
pub const SYS_SETPRIORITY: u64 = 4;
pub const SYS_CREATE_THREAD: u64 = 5;
pub const SYS_LOCK_INIT: u64 = 6;
pub const SYS_LOCK_ACQUIRE: u64 = 7;
pub const SYS_LOCK_RELEASE: u64 = 8;
pub const SYS_CONDITION_INIT: u64 = 9;
pub const SYS_CONDITION_WAIT: u64 = 10;
pub const SYS_CONDITION_SIGNAL: u64 = 11;
pub const SYS_CONDITION_BROADCAST: u64 = 12;
pub const SYS_SEMAPHORE_INIT: u64 = 13;
pub const SYS_SEMAPHORE_DOWN: u64 = 14;
pub const SYS_SEMAPHORE_UP: u64 = 15;
pub const SYS_BARRIER_INIT: u64 = 16;
pub const SYS_BARRIER_WAIT: u64 = 17;

/// Negated and returned in `rax` on failure; `0` or positive is success
/// (a handle, a priority, a process id, or a bare `0`).
pub fn error_code(err: kernel_core::KernelError) -> i64 {
    use kernel_core::KernelError::*;
    match err {
        TableFull => -1,
        InvalidProcess => -2,
        QueueEmpty => -3,
        InvariantViolation => -4,
    }
}
