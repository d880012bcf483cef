#![doc = include_str!("../../../README.md")]
#![expect(clippy::cast_possible_truncation, reason = "registry indices stay far below u32::MAX")]

mod bindings;
mod handle;
mod host;
mod object;
mod scene;
mod session;
pub mod tracer;

pub use crate::{
    bindings::{ArgValues, BindingFunction, CallError, call},
    handle::{ItemId, SceneId},
    host::{HostError, MemoryHost, SceneHost},
    object::Object,
    scene::{SceneHandle, SceneItemHandle, find_scene},
    session::{ScriptSession, SessionEvent, TimerId},
    tracer::{NoopTracer, RecordingTracer, SessionTrace, SessionTracer, StderrTracer},
};
