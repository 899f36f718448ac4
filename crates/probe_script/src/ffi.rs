//! Script-facing bridge objects
//!
//! Plain objects with native methods rather than registered classes. Native
//! closures capture only Rust state (lock handles); script values stored in
//! thread-local slots stay inside the engine heap so the garbage collector
//! sees them.

use probe_core::{clock, thread, Bridge, BridgeError, LockHandle};
use rquickjs::function::This;
use rquickjs::object::Property;
use rquickjs::{Ctx, Exception, Function, Object, Value};

/// Property holding a slot's per-thread values.
const SLOT_VALUES: &str = "__values";

fn throw(ctx: &Ctx<'_>, err: BridgeError) -> rquickjs::Error {
    Exception::throw_message(ctx, &err.to_string())
}

/// Install the bridge object as the global `name`.
pub fn install_bridge<'js>(ctx: &Ctx<'js>, name: &str) -> rquickjs::Result<()> {
    let bridge = bridge_object(ctx)?;
    ctx.globals().set(name, bridge)
}

/// Build the object exposing `createThreadLocal`, `threadNumber`,
/// `snapshot` and `createLock`.
pub fn bridge_object<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;

    object.set(
        "createThreadLocal",
        Function::new(ctx.clone(), |ctx: Ctx<'js>| thread_local_object(&ctx))?,
    )?;
    // Numbers cross as f64; u64 thread numbers and microsecond snapshots stay
    // exact below 2^53.
    object.set(
        "threadNumber",
        Function::new(ctx.clone(), || thread::thread_number() as f64)?,
    )?;
    object.set(
        "snapshot",
        Function::new(ctx.clone(), || clock::snapshot() as f64)?,
    )?;
    object.set(
        "createLock",
        Function::new(ctx.clone(), |ctx: Ctx<'js>| {
            lock_object(&ctx, Bridge::new().create_lock())
        })?,
    )?;

    Ok(object)
}

/// Script thread-local slot: `get()`, `set(value)` and `remove()`.
///
/// Values live in a hidden per-slot object keyed by thread number, the same
/// partitioning [`probe_core::ThreadLocalSlot`] uses on the host side.
pub fn thread_local_object<'js>(ctx: &Ctx<'js>) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;
    // Non-enumerable, read-only, non-configurable
    object.prop(SLOT_VALUES, Property::from(Object::new(ctx.clone())?))?;

    object.set(
        "get",
        Function::new(
            ctx.clone(),
            |ctx: Ctx<'js>, this: This<Object<'js>>| -> rquickjs::Result<Value<'js>> {
                let values: Object = this.0.get(SLOT_VALUES)?;
                let value: Value = values.get(slot_key().as_str())?;
                if value.is_undefined() {
                    Ok(Value::new_null(ctx))
                } else {
                    Ok(value)
                }
            },
        )?,
    )?;
    object.set(
        "set",
        Function::new(
            ctx.clone(),
            |this: This<Object<'js>>, value: Value<'js>| -> rquickjs::Result<()> {
                let values: Object = this.0.get(SLOT_VALUES)?;
                values.set(slot_key().as_str(), value)
            },
        )?,
    )?;
    object.set(
        "remove",
        Function::new(
            ctx.clone(),
            |this: This<Object<'js>>| -> rquickjs::Result<()> {
                let values: Object = this.0.get(SLOT_VALUES)?;
                values.remove(slot_key().as_str())
            },
        )?,
    )?;

    Ok(object)
}

fn slot_key() -> String {
    thread::thread_number().to_string()
}

/// Script view of a reentrant lock: `lock()`, `unlock()` and `tryLock()`.
pub fn lock_object<'js>(ctx: &Ctx<'js>, handle: LockHandle) -> rquickjs::Result<Object<'js>> {
    let object = Object::new(ctx.clone())?;

    let lock = LockHandle::clone(&handle);
    object.set(
        "lock",
        Function::new(ctx.clone(), move |ctx: Ctx<'js>| -> rquickjs::Result<()> {
            lock.lock().map_err(|err| throw(&ctx, err))
        })?,
    )?;

    let lock = LockHandle::clone(&handle);
    object.set(
        "unlock",
        Function::new(ctx.clone(), move |ctx: Ctx<'js>| -> rquickjs::Result<()> {
            lock.unlock().map_err(|err| throw(&ctx, err))
        })?,
    )?;

    let lock = handle;
    object.set(
        "tryLock",
        Function::new(ctx.clone(), move |ctx: Ctx<'js>| -> rquickjs::Result<bool> {
            lock.try_lock().map_err(|err| throw(&ctx, err))
        })?,
    )?;

    Ok(object)
}

#[cfg(test)]
mod tests {
    use crate::error::ScriptError;
    use crate::runtime::{ScriptContext, ScriptRuntime};
    use probe_core::{thread_number, Bridge};

    fn bridged() -> ScriptContext {
        let ctx = ScriptRuntime::new().unwrap().new_context().unwrap();
        ctx.install_bridge("HostBridge").unwrap();
        ctx
    }

    #[test]
    fn thread_number_matches_host() {
        let ctx = bridged();
        let number = ctx.eval::<f64>("HostBridge.threadNumber()").unwrap();
        assert_eq!(number as u64, thread_number());
        assert!(ctx
            .eval::<bool>("HostBridge.threadNumber() === HostBridge.threadNumber()")
            .unwrap());
    }

    #[test]
    fn snapshots_do_not_decrease() {
        let ctx = bridged();
        let ok = ctx
            .eval::<bool>(
                r#"
                var last = HostBridge.snapshot(), ok = true;
                for (var i = 0; i < 1000; i++) {
                    var next = HostBridge.snapshot();
                    if (next < last) ok = false;
                    last = next;
                }
                ok && Number.isInteger(last)
                "#,
            )
            .unwrap();
        assert!(ok);
    }

    #[test]
    fn thread_local_defaults_to_null() {
        let ctx = bridged();
        assert!(ctx
            .eval::<bool>("HostBridge.createThreadLocal().get() === null")
            .unwrap());
    }

    #[test]
    fn thread_locals_are_independent() {
        let ctx = bridged();
        let result = ctx
            .eval::<String>(
                r#"
                var a = HostBridge.createThreadLocal();
                var b = HostBridge.createThreadLocal();
                a.set({ name: 'profiler' });
                var seen = [a.get().name, String(b.get())];
                a.remove();
                seen.push(String(a.get()));
                seen.join(',')
                "#,
            )
            .unwrap();
        assert_eq!(result, "profiler,null,null");
    }

    #[test]
    fn slot_storage_is_hidden_and_fixed() {
        let ctx = bridged();
        let result = ctx
            .eval::<String>(
                r#"
                var slot = HostBridge.createThreadLocal();
                slot.set(5);
                slot.__values = {};
                delete slot.__values;
                [Object.keys(slot).indexOf('__values'), slot.get()].join(',')
                "#,
            )
            .unwrap();
        assert_eq!(result, "-1,5");
    }

    #[test]
    fn script_lock_is_reentrant() {
        let ctx = bridged();
        let result = ctx
            .eval::<bool>(
                r#"
                var lock = HostBridge.createLock();
                lock.lock();
                lock.lock();
                var again = lock.tryLock();
                lock.unlock();
                lock.unlock();
                lock.unlock();
                again
                "#,
            )
            .unwrap();
        assert!(result);
    }

    #[test]
    fn unlock_without_lock_throws() {
        let ctx = bridged();
        let err = ctx
            .execute("HostBridge.createLock().unlock();")
            .unwrap_err();
        match err {
            ScriptError::Exception { message } => {
                assert!(message.contains("does not hold"), "{message}")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unlock_failure_is_catchable() {
        let ctx = bridged();
        let caught = ctx
            .eval::<bool>(
                r#"
                var caught = false;
                try { HostBridge.createLock().unlock(); } catch (e) { caught = true; }
                caught
                "#,
            )
            .unwrap();
        assert!(caught);
    }

    #[test]
    fn exposed_lock_is_shared_with_host() {
        let ctx = bridged();
        let lock = Bridge::new().create_lock();
        ctx.expose_lock("hostLock", &lock).unwrap();

        ctx.execute("hostLock.lock(); hostLock.lock();").unwrap();
        assert_eq!(lock.hold_count().unwrap(), 2);

        ctx.execute("hostLock.unlock(); hostLock.unlock();").unwrap();
        assert!(!lock.is_locked().unwrap());
    }
}
