//! Raw engine access
//!
//! QuickJS has no safe way to add intrinsics to a context after it exists.
//! This is the only place that reaches through the raw context pointer, so a
//! change in the engine's intrinsic set breaks here and nowhere else.

use rquickjs::context::{intrinsic, Intrinsic};
use rquickjs::{qjs, Ctx};
use std::ptr::NonNull;

/// Engine name reported in bootstrap errors.
pub const ENGINE: &str = "QuickJS (rquickjs 0.6)";

type AddIntrinsic = unsafe fn(NonNull<qjs::JSContext>);

/// A group of standard objects and the globals it must define.
pub struct StandardObject {
    pub intrinsic: &'static str,
    add: AddIntrinsic,
    pub globals: &'static [&'static str],
}

/// Standard objects bound during bootstrap, in installation order.
///
/// The regexp compiler must precede `RegExp`.
pub const STANDARD_OBJECTS: &[StandardObject] = &[
    StandardObject {
        intrinsic: "StringNormalize",
        add: <intrinsic::StringNormalize as Intrinsic>::add_intrinsic,
        globals: &[],
    },
    StandardObject {
        intrinsic: "Date",
        add: <intrinsic::Date as Intrinsic>::add_intrinsic,
        globals: &["Date"],
    },
    StandardObject {
        intrinsic: "RegExpCompiler",
        add: <intrinsic::RegExpCompiler as Intrinsic>::add_intrinsic,
        globals: &[],
    },
    StandardObject {
        intrinsic: "RegExp",
        add: <intrinsic::RegExp as Intrinsic>::add_intrinsic,
        globals: &["RegExp"],
    },
    StandardObject {
        intrinsic: "Json",
        add: <intrinsic::Json as Intrinsic>::add_intrinsic,
        globals: &["JSON"],
    },
    StandardObject {
        intrinsic: "Proxy",
        add: <intrinsic::Proxy as Intrinsic>::add_intrinsic,
        globals: &["Proxy"],
    },
    StandardObject {
        intrinsic: "MapSet",
        add: <intrinsic::MapSet as Intrinsic>::add_intrinsic,
        globals: &["Map", "Set", "WeakMap", "WeakSet"],
    },
    StandardObject {
        intrinsic: "TypedArrays",
        add: <intrinsic::TypedArrays as Intrinsic>::add_intrinsic,
        globals: &["ArrayBuffer", "Uint8Array", "Float64Array"],
    },
    StandardObject {
        intrinsic: "Promise",
        add: <intrinsic::Promise as Intrinsic>::add_intrinsic,
        globals: &["Promise"],
    },
    StandardObject {
        intrinsic: "BigInt",
        add: <intrinsic::BigInt as Intrinsic>::add_intrinsic,
        globals: &["BigInt"],
    },
];

/// Add every standard object onto the context's own global object.
///
/// Callers must invoke this at most once per context; QuickJS re-creates the
/// constructors on each call and previously captured prototypes would go stale.
pub(crate) fn bind_standard_objects(ctx: &Ctx<'_>) {
    let raw = ctx.as_raw();
    for object in STANDARD_OBJECTS {
        tracing::trace!(intrinsic = object.intrinsic, "adding intrinsic");
        // SAFETY: `raw` belongs to `ctx`, which holds the runtime lock for the
        // duration of this call.
        unsafe { (object.add)(raw) };
    }
}

/// First expected global that does not resolve on the context's global object.
pub(crate) fn missing_standard_global(ctx: &Ctx<'_>) -> rquickjs::Result<Option<&'static str>> {
    let globals = ctx.globals();
    for object in STANDARD_OBJECTS {
        for &name in object.globals {
            if !globals.contains_key(name)? {
                return Ok(Some(name));
            }
        }
    }
    Ok(None)
}
