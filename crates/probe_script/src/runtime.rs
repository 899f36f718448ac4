//! Script runtime management
//!
//! One `ScriptRuntime` per host worker thread. Contexts start with only the
//! base objects and `eval`; the standard objects arrive through
//! [`crate::bootstrap`].

use crate::bootstrap::BootstrapState;
use crate::error::ScriptError;
use crate::ffi;
use probe_core::LockHandle;
use rquickjs::context::intrinsic;
use rquickjs::{Context, Ctx, FromJs, Function, Runtime};
use std::cell::Cell;
use std::path::Path;

/// Owner of one QuickJS runtime.
pub struct ScriptRuntime {
    runtime: Runtime,
}

impl ScriptRuntime {
    pub fn new() -> Result<Self, ScriptError> {
        let runtime = Runtime::new()?;
        Ok(Self { runtime })
    }

    /// Create a runtime whose heap may not grow past `limit` bytes.
    pub fn with_memory_limit(limit: usize) -> Result<Self, ScriptError> {
        let runtime = Self::new()?;
        runtime.runtime.set_memory_limit(limit);
        Ok(runtime)
    }

    /// Enter a new execution context on this runtime.
    pub fn new_context(&self) -> Result<ScriptContext, ScriptError> {
        let context = Context::custom::<intrinsic::Eval>(&self.runtime)?;
        tracing::debug!("script context created");
        Ok(ScriptContext {
            context: Some(context),
            state: Cell::new(BootstrapState::Uninitialized),
        })
    }
}

/// One running script unit and its top-level scope.
///
/// Every operation receives the context explicitly; there is no ambient
/// "current context".
pub struct ScriptContext {
    context: Option<Context>,
    state: Cell<BootstrapState>,
}

impl ScriptContext {
    /// Run `f` inside the context, translating engine errors.
    pub fn with<F, R>(&self, f: F) -> Result<R, ScriptError>
    where
        F: for<'js> FnOnce(&Ctx<'js>) -> rquickjs::Result<R>,
    {
        let context = self.context.as_ref().ok_or(ScriptError::NoActiveContext)?;
        context.with(|ctx| f(&ctx).map_err(|err| ScriptError::from_engine(&ctx, err)))
    }

    pub fn execute(&self, source: &str) -> Result<(), ScriptError> {
        self.with(|ctx| ctx.eval::<(), _>(source))
    }

    pub fn execute_file(&self, path: &Path) -> Result<(), ScriptError> {
        let source = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "executing script file");
        self.execute(&source)
    }

    /// Evaluate `source` and convert the completion value.
    pub fn eval<T>(&self, source: &str) -> Result<T, ScriptError>
    where
        T: for<'js> FromJs<'js>,
    {
        self.with(|ctx| ctx.eval::<T, _>(source))
    }

    /// Call a global JavaScript function by name with no arguments.
    pub fn call_function(&self, name: &str) -> Result<(), ScriptError> {
        self.with(|ctx| {
            let func: Function = ctx.globals().get(name)?;
            func.call::<_, ()>(())
        })
    }

    /// Expose the capability bridge to scripts as the global `global_name`.
    pub fn install_bridge(&self, global_name: &str) -> Result<(), ScriptError> {
        self.with(|ctx| ffi::install_bridge(ctx, global_name))?;
        tracing::debug!(global = global_name, "bridge installed");
        Ok(())
    }

    /// Expose a host-owned lock to scripts as the global `global_name`.
    ///
    /// Contexts on different threads given clones of one handle contend on the
    /// same lock.
    pub fn expose_lock(&self, global_name: &str, lock: &LockHandle) -> Result<(), ScriptError> {
        self.with(|ctx| {
            let object = ffi::lock_object(ctx, LockHandle::clone(lock))?;
            ctx.globals().set(global_name, object)
        })
    }

    /// End the execution unit. Later operations fail with
    /// [`ScriptError::NoActiveContext`].
    pub fn detach(&mut self) {
        if self.context.take().is_some() {
            tracing::debug!("script context detached");
        }
    }

    pub fn is_active(&self) -> bool {
        self.context.is_some()
    }

    pub fn state(&self) -> BootstrapState {
        self.state.get()
    }

    pub(crate) fn set_state(&self, state: BootstrapState) {
        self.state.set(state);
    }
}
