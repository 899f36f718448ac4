//! Probe Scripting Bridge
//!
//! Exposes host primitives to profiler scripts running on QuickJS.
//!
//! ## Architecture
//!
//! - **Runtime:** one QuickJS runtime per host worker thread
//! - **Bootstrap:** standard objects bound onto a context's own global scope
//! - **FFI:** the capability bridge as a plain script object
//!
//! ```ignore
//! let ctx = ScriptRuntime::new()?.new_context()?;
//! bootstrap::init_standard_objects(&ctx, &BootstrapPolicy::default())?;
//! ctx.install_bridge("HostBridge")?;
//! ctx.execute("var start = HostBridge.snapshot();")?;
//! ```

pub mod bootstrap;
mod engine;
pub mod error;
pub mod ffi;
pub mod runtime;

pub use bootstrap::{
    init_standard_objects, BootstrapError, BootstrapOutcome, BootstrapPolicy, BootstrapState,
};
pub use engine::ENGINE;
pub use error::ScriptError;
pub use runtime::{ScriptContext, ScriptRuntime};

pub use rquickjs;
