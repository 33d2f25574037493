//! On-target smoke tests, gated behind the `self-test` feature and run
//! from `kstart` before interrupts are enabled. These exercise
//! `kernel-core` against the real global `KernelState` the way the host
//! `#[test]`s in that crate exercise a local one — the difference is
//! these run after real hardware init (GDT/IDT/PIC/PIT), so a failure
//! here can catch an integration bug the host tests can't see.

use kernel_core::sched::{create_thread, do_exit, do_yield, scheduler_entry};
use kernel_core::sync::{lock_acquire, lock_init, lock_release, BlockOutcome};

pub fn run_all() {
    log::info!("self-test: starting");
    let mut passed = 0;
    let mut failed = 0;
    for (name, result) in [
        ("round_robin_dispatch", test_round_robin_dispatch()),
        ("lock_handoff", test_lock_handoff()),
    ] {
        if result {
            log::info!("self-test: PASS {}", name);
            passed += 1;
        } else {
            log::error!("self-test: FAIL {}", name);
            failed += 1;
        }
    }
    log::info!("self-test: {} passed, {} failed", passed, failed);
}

fn test_round_robin_dispatch() -> bool {
    crate::kstate::with_scratch_state(|state| {
        let a = create_thread(state, 0).unwrap();
        let b = create_thread(state, 0).unwrap();
        let c = create_thread(state, 0).unwrap();

        scheduler_entry(state) == Some(a)
            && do_yield(state) == Some(b)
            && do_yield(state) == Some(c)
            && do_yield(state) == Some(a)
            && do_exit(state).is_ok()
            && do_exit(state).is_ok()
            && do_exit(state).is_ok()
    })
}

fn test_lock_handoff() -> bool {
    crate::kstate::with_scratch_state(|state| {
        let lock = lock_init(state).unwrap();
        let a = create_thread(state, 0).unwrap();
        let b = create_thread(state, 0).unwrap();

        scheduler_entry(state);
        let first = lock_acquire(state, lock) == Ok(BlockOutcome::Completed);
        let _ = do_exit(state);

        let dispatched_b = scheduler_entry(state) == Some(b);
        let blocked = lock_acquire(state, lock) == Ok(BlockOutcome::Blocked);
        let nobody_current = state.current().is_none();

        lock_release(state, lock).is_ok();
        let resumed_b = scheduler_entry(state) == Some(b);
        let _ = do_exit(state);

        let _ = a;
        first && dispatched_b && blocked && nobody_current && resumed_b
    })
}
