#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]

use core::panic::PanicInfo;
use core::sync::atomic::{AtomicUsize, Ordering};

mod arch;
mod kstate;
mod logger;
mod syscall;
#[cfg(feature = "self-test")]
mod tests;

use syscall::api;

#[repr(C, align(16))]
struct BspStack([u8; 64 * 1024]);

#[unsafe(no_mangle)]
static mut BSP_STACK: BspStack = BspStack([0; 64 * 1024]);

/// Single-core entry point: switch off whatever stack the bootloader
/// handed us onto our own aligned one, then jump into `kstart`. No
/// multi-core bring-up — this kernel's scheduler is single-CPU.
#[unsafe(naked)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn _start() -> ! {
    core::arch::naked_asm!(
        "lea rax, [rip + BSP_STACK]",
        "add rax, {stack_size}",
        "mov rsp, rax",
        "jmp kstart",
        stack_size = const 64 * 1024,
    );
}

#[unsafe(no_mangle)]
pub extern "C" fn kstart() -> ! {
    arch::x86_64::serial::init();
    logger::init();
    log::info!("kernel starting");

    arch::x86_64::init();
    log::info!("arch init complete");

    #[cfg(feature = "self-test")]
    tests::run_all();

    spawn_demo_threads();

    x86_64::instructions::interrupts::enable();
    log::info!("interrupts enabled, entering idle loop");

    loop {
        x86_64::instructions::hlt();
    }
}

/// A handful of kernel threads exercising every synchronization primitive
/// this kernel provides, so the scheduler and sync subsystem have
/// something to actually run under a live timer.
fn spawn_demo_threads() {
    // Dispatched first, so it is the PCB the very first timer tick ever
    // hands `current` to. Keeps `scheduler_entry` from ever having to
    // report "nothing runnable" once booted, the way it legitimately can
    // on a fresh `KernelState` before any thread exists.
    let _ = kstate::spawn(idle_thread, kernel_core::PRIORITY_MIN);

    let lock = kstate::with_new_lock_init();
    LOCK_HANDLE.store(lock, Ordering::SeqCst);

    let cond = kstate::with_new_condition_init();
    COND_HANDLE.store(cond, Ordering::SeqCst);

    let sem = kstate::with_new_semaphore_init(0);
    SEM_HANDLE.store(sem, Ordering::SeqCst);

    let barrier = kstate::with_new_barrier_init(3);
    BARRIER_HANDLE.store(barrier, Ordering::SeqCst);

    let _ = kstate::spawn(producer_thread, kernel_core::PRIORITY_DEFAULT);
    let _ = kstate::spawn(consumer_thread, kernel_core::PRIORITY_DEFAULT);
    let _ = kstate::spawn(cond_waiter_thread, kernel_core::PRIORITY_DEFAULT);
    let _ = kstate::spawn(sleeper_thread, kernel_core::PRIORITY_DEFAULT);
    let _ = kstate::spawn(barrier_party_thread, kernel_core::PRIORITY_DEFAULT);
    let _ = kstate::spawn(barrier_party_thread, kernel_core::PRIORITY_DEFAULT);
    let _ = kstate::spawn(barrier_party_thread, kernel_core::PRIORITY_DEFAULT);
}

static LOCK_HANDLE: AtomicUsize = AtomicUsize::new(0);
static COND_HANDLE: AtomicUsize = AtomicUsize::new(0);
static SEM_HANDLE: AtomicUsize = AtomicUsize::new(0);
static BARRIER_HANDLE: AtomicUsize = AtomicUsize::new(0);
static SHARED_COUNTER: AtomicUsize = AtomicUsize::new(0);

extern "C" fn idle_thread() -> ! {
    loop {
        x86_64::instructions::hlt();
    }
}

extern "C" fn producer_thread() -> ! {
    let lock = LOCK_HANDLE.load(Ordering::SeqCst);
    let cond = COND_HANDLE.load(Ordering::SeqCst);
    let sem = SEM_HANDLE.load(Ordering::SeqCst);

    for i in 0..5 {
        api::sys_lock_acquire(lock);
        SHARED_COUNTER.fetch_add(1, Ordering::SeqCst);
        log::info!("producer: item {} ready", i);
        api::sys_condition_signal(cond);
        api::sys_lock_release(lock);
        api::sys_semaphore_up(sem);
        api::sys_sleep(5);
    }
    log::info!("producer exiting");
    api::sys_exit();
}

extern "C" fn consumer_thread() -> ! {
    let sem = SEM_HANDLE.load(Ordering::SeqCst);
    loop {
        api::sys_semaphore_down(sem);
        let total = SHARED_COUNTER.load(Ordering::SeqCst);
        log::info!("consumer: saw counter at {}", total);
        if total >= 5 {
            break;
        }
    }
    log::info!("consumer exiting");
    api::sys_exit();
}

extern "C" fn cond_waiter_thread() -> ! {
    let lock = LOCK_HANDLE.load(Ordering::SeqCst);
    let cond = COND_HANDLE.load(Ordering::SeqCst);

    api::sys_lock_acquire(lock);
    while SHARED_COUNTER.load(Ordering::SeqCst) < 5 {
        // Mesa semantics: a wakeup only means "recheck", not "the
        // condition now holds" — loop rather than trust a single signal.
        api::sys_condition_wait(cond, lock);
    }
    log::info!(
        "cond_waiter: observed counter reach {}",
        SHARED_COUNTER.load(Ordering::SeqCst)
    );
    api::sys_lock_release(lock);
    api::sys_exit();
}

extern "C" fn sleeper_thread() -> ! {
    for i in 0..3 {
        log::info!("sleeper: waking after tick-based sleep #{}", i);
        api::sys_sleep(20);
    }
    log::info!("sleeper exiting");
    api::sys_exit();
}

extern "C" fn barrier_party_thread() -> ! {
    let barrier = BARRIER_HANDLE.load(Ordering::SeqCst);
    log::info!("barrier party arriving");
    api::sys_barrier_wait(barrier);
    log::info!("barrier party released");
    api::sys_exit();
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    x86_64::instructions::interrupts::disable();
    if let Some(location) = info.location() {
        log::error!("PANIC at {}:{}: {}", location.file(), location.line(), info.message());
    } else {
        log::error!("PANIC: {}", info.message());
    }
    loop {
        x86_64::instructions::hlt();
    }
}
