//! Multi-threaded use of the bridge from script contexts.
//!
//! Each host worker owns its own runtime and context; host-created lock
//! handles are the only thing shared between them.

use probe_script::{init_standard_objects, BootstrapPolicy, ScriptContext, ScriptRuntime};
use probe_core::Bridge;
use std::collections::HashSet;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

fn worker_context() -> ScriptContext {
    let ctx = ScriptRuntime::new().unwrap().new_context().unwrap();
    init_standard_objects(&ctx, &BootstrapPolicy::default()).unwrap();
    ctx.install_bridge("HostBridge").unwrap();
    ctx
}

#[test]
fn thread_numbers_are_constant_per_thread() {
    let barrier = Arc::new(Barrier::new(50));

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let ctx = worker_context();
                barrier.wait();
                let distinct = ctx
                    .eval::<i32>(
                        r#"
                        var seen = new Set();
                        for (var i = 0; i < 1000; i++) seen.add(HostBridge.threadNumber());
                        seen.size
                        "#,
                    )
                    .unwrap();
                assert_eq!(distinct, 1);
                ctx.eval::<f64>("HostBridge.threadNumber()").unwrap() as u64
            })
        })
        .collect();

    let numbers: HashSet<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(!numbers.is_empty());
    assert!(numbers.len() <= 50);
}

#[test]
fn shared_lock_serializes_contexts() {
    let lock = Bridge::new().create_lock();
    let log = Arc::new(Mutex::new(Vec::new()));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let lock = Arc::clone(&lock);
            let log = Arc::clone(&log);
            thread::spawn(move || {
                let ctx = worker_context();
                ctx.expose_lock("hostLock", &lock).unwrap();

                for _ in 0..50 {
                    ctx.execute("hostLock.lock(); hostLock.lock();").unwrap();
                    {
                        let mut log = log.lock().unwrap();
                        log.push((worker, "enter"));
                        log.push((worker, "exit"));
                    }
                    ctx.execute("hostLock.unlock(); hostLock.unlock();").unwrap();
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 4 * 50 * 2);
    for pair in log.chunks(2) {
        assert_eq!(pair[0].0, pair[1].0);
        assert_eq!((pair[0].1, pair[1].1), ("enter", "exit"));
    }
    assert!(!lock.is_locked().unwrap());
}

#[test]
fn script_holding_lock_blocks_other_context() {
    let lock = Bridge::new().create_lock();
    let holder = worker_context();
    holder.expose_lock("hostLock", &lock).unwrap();
    holder.execute("hostLock.lock(); hostLock.lock();").unwrap();

    let other = Arc::clone(&lock);
    let acquired = thread::spawn(move || {
        let ctx = worker_context();
        ctx.expose_lock("hostLock", &other).unwrap();
        ctx.eval::<bool>("hostLock.tryLock()").unwrap()
    })
    .join()
    .unwrap();
    assert!(!acquired);

    holder.execute("hostLock.unlock(); hostLock.unlock();").unwrap();

    let other = Arc::clone(&lock);
    let acquired = thread::spawn(move || {
        let ctx = worker_context();
        ctx.expose_lock("hostLock", &other).unwrap();
        ctx.eval::<bool>("var ok = hostLock.tryLock(); hostLock.unlock(); ok")
            .unwrap()
    })
    .join()
    .unwrap();
    assert!(acquired);
}

#[test]
fn contexts_bootstrap_independently_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(|| {
                let ctx = worker_context();
                ctx.eval::<String>("JSON.stringify({ t: typeof HostBridge.snapshot() })")
                    .unwrap()
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().unwrap(), r#"{"t":"number"}"#);
    }
}
