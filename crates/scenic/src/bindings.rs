//! Raw script-facing binding functions.
//!
//! This is the name-dispatched table an embedding registers with its
//! scripting engine: six functions covering scene lookup/selection/release
//! and item lookup/visibility/release. Arguments arrive as already-marshaled
//! [`Object`] values; handles travel through scripts as the opaque
//! [`Object::Scene`]/[`Object::Item`] variants.
//!
//! For engines with a garbage collector, the two release functions are the
//! finalizer hooks: the environment attaches a finalizer to each proxy it
//! builds around a returned handle and calls `sceneRelease` /
//! `sceneItemRelease` with the stored handle exactly once when the proxy
//! becomes unreachable. The typed proxies in [`crate::scene`] do the same
//! thing through `Drop` and need none of this.

use std::fmt;

use crate::{
    handle::{ItemId, SceneId},
    host::{HostError, SceneHost},
    object::Object,
};

/// The registered binding functions.
///
/// Display renders the script-visible name (`sceneFind`, `sceneItemSetVisible`,
/// …), which is also the name an embedding registers the function under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "camelCase")]
pub enum BindingFunction {
    /// `sceneFind(name)` — scene lookup by name; handle or none.
    SceneFind,
    /// `sceneRelease(scene)` — releases one scene acquisition.
    SceneRelease,
    /// `sceneSelect(scene)` — makes the scene active.
    SceneSelect,
    /// `sceneItemFind(scene, name)` — item lookup within a scene.
    SceneItemFind,
    /// `sceneItemRelease(item)` — releases one item acquisition.
    SceneItemRelease,
    /// `sceneItemSetVisible(item, visible)` — writes the visibility flag.
    SceneItemSetVisible,
}

impl BindingFunction {
    /// Every binding function, in registration order.
    pub const ALL: [Self; 6] = [
        Self::SceneFind,
        Self::SceneRelease,
        Self::SceneSelect,
        Self::SceneItemFind,
        Self::SceneItemRelease,
        Self::SceneItemSetVisible,
    ];

    /// Number of arguments the function takes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::SceneFind | Self::SceneRelease | Self::SceneSelect | Self::SceneItemRelease => 1,
            Self::SceneItemFind | Self::SceneItemSetVisible => 2,
        }
    }
}

/// Positional arguments for a binding call.
///
/// Uses specific variants for the only argument counts that occur; this also
/// keeps malformed calls representable so the dispatcher can reject them
/// with a proper arity error instead of the embedding having to pre-validate.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ArgValues {
    Empty,
    One(Object),
    Two(Object, Object),
}

impl ArgValues {
    /// Number of arguments carried.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::One(_) => 1,
            Self::Two(..) => 2,
        }
    }

    /// Checks that exactly one argument was passed, returning it.
    pub fn get_one_arg(self, function: BindingFunction) -> Result<Object, CallError> {
        match self {
            Self::One(a) => Ok(a),
            other => Err(CallError::Arity {
                function,
                expected: 1,
                given: other.count(),
            }),
        }
    }

    /// Checks that exactly two arguments were passed, returning them.
    pub fn get_two_args(self, function: BindingFunction) -> Result<(Object, Object), CallError> {
        match self {
            Self::Two(a, b) => Ok((a, b)),
            other => Err(CallError::Arity {
                function,
                expected: 2,
                given: other.count(),
            }),
        }
    }
}

/// Error raised by binding-call dispatch.
///
/// `Arity` and `Type` are argument-validation failures raised before any
/// host operation runs; `Host` wraps the fatal invalid-handle condition
/// reported by the host itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// Wrong number of arguments.
    Arity {
        function: BindingFunction,
        expected: usize,
        given: usize,
    },
    /// An argument had the wrong type.
    Type {
        function: BindingFunction,
        expected: &'static str,
        given: &'static str,
    },
    /// The host rejected a handle.
    Host(HostError),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arity {
                function,
                expected,
                given,
            } => {
                let plural = if *expected == 1 { "argument" } else { "arguments" };
                write!(f, "{function}() takes exactly {expected} {plural} ({given} given)")
            }
            Self::Type {
                function,
                expected,
                given,
            } => {
                write!(f, "{function}() argument must be {expected}, not {given}")
            }
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CallError {}

impl From<HostError> for CallError {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}

/// Dispatches one binding call against the host.
///
/// Argument count and types are validated before the host is touched, so a
/// rejected call has no native-side side effect. Lookup functions return the
/// acquired handle or [`Object::None`] on a miss; all other functions return
/// [`Object::None`].
pub fn call<H: SceneHost>(host: &mut H, function: BindingFunction, args: ArgValues) -> Result<Object, CallError> {
    match function {
        BindingFunction::SceneFind => scene_find(host, args),
        BindingFunction::SceneRelease => scene_release(host, args),
        BindingFunction::SceneSelect => scene_select(host, args),
        BindingFunction::SceneItemFind => scene_item_find(host, args),
        BindingFunction::SceneItemRelease => scene_item_release(host, args),
        BindingFunction::SceneItemSetVisible => scene_item_set_visible(host, args),
    }
}

/// Implementation of `sceneFind(name)`.
fn scene_find<H: SceneHost>(host: &mut H, args: ArgValues) -> Result<Object, CallError> {
    let name = expect_string(args.get_one_arg(BindingFunction::SceneFind)?, BindingFunction::SceneFind)?;
    Ok(host.scene_by_name(&name).into())
}

/// Implementation of `sceneRelease(scene)`.
fn scene_release<H: SceneHost>(host: &mut H, args: ArgValues) -> Result<Object, CallError> {
    let scene = expect_scene(
        args.get_one_arg(BindingFunction::SceneRelease)?,
        BindingFunction::SceneRelease,
    )?;
    host.release_scene(scene);
    Ok(Object::None)
}

/// Implementation of `sceneSelect(scene)`.
fn scene_select<H: SceneHost>(host: &mut H, args: ArgValues) -> Result<Object, CallError> {
    let scene = expect_scene(
        args.get_one_arg(BindingFunction::SceneSelect)?,
        BindingFunction::SceneSelect,
    )?;
    host.select_scene(scene)?;
    Ok(Object::None)
}

/// Implementation of `sceneItemFind(scene, name)`.
fn scene_item_find<H: SceneHost>(host: &mut H, args: ArgValues) -> Result<Object, CallError> {
    let (scene, name) = args.get_two_args(BindingFunction::SceneItemFind)?;
    let scene = expect_scene(scene, BindingFunction::SceneItemFind)?;
    let name = expect_string(name, BindingFunction::SceneItemFind)?;
    Ok(host.item_by_name(scene, &name).into())
}

/// Implementation of `sceneItemRelease(item)`.
fn scene_item_release<H: SceneHost>(host: &mut H, args: ArgValues) -> Result<Object, CallError> {
    let item = expect_item(
        args.get_one_arg(BindingFunction::SceneItemRelease)?,
        BindingFunction::SceneItemRelease,
    )?;
    host.release_item(item);
    Ok(Object::None)
}

/// Implementation of `sceneItemSetVisible(item, visible)`.
///
/// The visibility argument is deliberately untyped: any script value is
/// accepted and coerced with [`Object::truthy`].
fn scene_item_set_visible<H: SceneHost>(host: &mut H, args: ArgValues) -> Result<Object, CallError> {
    let (item, visible) = args.get_two_args(BindingFunction::SceneItemSetVisible)?;
    let item = expect_item(item, BindingFunction::SceneItemSetVisible)?;
    host.set_item_visible(item, visible.truthy())?;
    Ok(Object::None)
}

/// Extracts a string argument, or raises a type error naming the function.
fn expect_string(value: Object, function: BindingFunction) -> Result<String, CallError> {
    match value {
        Object::String(s) => Ok(s),
        other => Err(CallError::Type {
            function,
            expected: "string",
            given: other.type_name(),
        }),
    }
}

/// Extracts a scene handle argument.
fn expect_scene(value: Object, function: BindingFunction) -> Result<SceneId, CallError> {
    match value {
        Object::Scene(id) => Ok(id),
        other => Err(CallError::Type {
            function,
            expected: "scene",
            given: other.type_name(),
        }),
    }
}

/// Extracts a scene-item handle argument.
fn expect_item(value: Object, function: BindingFunction) -> Result<ItemId, CallError> {
    match value {
        Object::Item(id) => Ok(id),
        other => Err(CallError::Type {
            function,
            expected: "sceneitem",
            given: other.type_name(),
        }),
    }
}
