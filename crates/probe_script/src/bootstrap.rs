//! Interpreter bootstrap
//!
//! Binds the engine's standard objects (Date, RegExp, JSON, Map, Promise, BigInt, ...)
//! onto a context's own top-level scope. A context moves from
//! `Uninitialized` to `StandardObjectsBound` exactly once; repeat calls are
//! detected and do nothing.

use crate::engine::{self, ENGINE};
use crate::error::ScriptError;
use crate::runtime::ScriptContext;
use thiserror::Error;

/// Bootstrap progress of one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Uninitialized,
    StandardObjectsBound,
    /// Binding ran but verification failed; the scope is in an unknown state.
    Poisoned,
}

/// Result of a successful bootstrap call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Bound,
    AlreadyBound,
}

/// What the host permits bootstrap to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapPolicy {
    pub allow_raw_engine_access: bool,
}

impl Default for BootstrapPolicy {
    fn default() -> Self {
        Self {
            allow_raw_engine_access: true,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("raw access to the {engine} context is denied by host policy")]
    AccessDenied { engine: &'static str },

    #[error("standard object '{name}' is missing after bootstrap; {engine} may have changed its intrinsics")]
    MissingStandardObject {
        name: &'static str,
        engine: &'static str,
    },

    #[error("an earlier bootstrap of this context failed; the scope cannot be reused")]
    Poisoned,
}

/// Bind the standard objects onto `context`'s top-level scope.
///
/// Nothing is mutated when the context is detached or access is denied.
pub fn init_standard_objects(
    context: &ScriptContext,
    policy: &BootstrapPolicy,
) -> Result<BootstrapOutcome, ScriptError> {
    if !context.is_active() {
        return Err(ScriptError::NoActiveContext);
    }

    match context.state() {
        BootstrapState::StandardObjectsBound => {
            tracing::warn!("standard objects already bound; ignoring repeat bootstrap");
            return Ok(BootstrapOutcome::AlreadyBound);
        }
        BootstrapState::Poisoned => return Err(BootstrapError::Poisoned.into()),
        BootstrapState::Uninitialized => {}
    }

    if !policy.allow_raw_engine_access {
        return Err(BootstrapError::AccessDenied { engine: ENGINE }.into());
    }

    let missing = context.with(|ctx| {
        engine::bind_standard_objects(ctx);
        engine::missing_standard_global(ctx)
    });

    match missing {
        Ok(None) => {
            context.set_state(BootstrapState::StandardObjectsBound);
            tracing::debug!(engine = ENGINE, "standard objects bound to top-level scope");
            Ok(BootstrapOutcome::Bound)
        }
        Ok(Some(name)) => {
            context.set_state(BootstrapState::Poisoned);
            Err(BootstrapError::MissingStandardObject { name, engine: ENGINE }.into())
        }
        Err(err) => {
            context.set_state(BootstrapState::Poisoned);
            Err(err)
        }
    }
}
