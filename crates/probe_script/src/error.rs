use crate::bootstrap::BootstrapError;
use rquickjs::Ctx;
use thiserror::Error;

/// Errors surfaced to the host by script contexts.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("no active script context")]
    NoActiveContext,

    #[error("uncaught script exception: {message}")]
    Exception { message: String },

    #[error(transparent)]
    Engine(#[from] rquickjs::Error),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScriptError {
    /// Convert an engine error, pulling the pending exception out of `ctx`.
    pub(crate) fn from_engine(ctx: &Ctx<'_>, err: rquickjs::Error) -> Self {
        if !err.is_exception() {
            return Self::Engine(err);
        }

        let caught = ctx.catch();
        let message = if let Some(exception) = caught.as_exception() {
            exception.message().unwrap_or_default()
        } else if let Some(text) = caught.as_string() {
            text.to_string().unwrap_or_default()
        } else {
            format!("{caught:?}")
        };
        Self::Exception { message }
    }
}
