//! Script-visible scene proxies.
//!
//! Each proxy owns exactly one acquired native handle and a shared reference
//! to the host cell. Dropping the proxy releases the handle — exactly once,
//! enforced by the type system rather than by a collector. Relative to the
//! original finalizer-driven design this makes release deterministic: it
//! happens at the moment the last owner goes out of scope instead of at a
//! collector-chosen point.
//!
//! Proxies hold no ownership relationship to each other: a
//! [`SceneItemHandle`] shares the host cell, never its parent
//! [`SceneHandle`], so each handle's lifetime is governed independently.

use std::{cell::RefCell, rc::Rc};

use crate::{
    handle::{ItemId, SceneId},
    host::{HostError, SceneHost},
    object::Object,
};

/// Looks up a scene by name and wraps it in a new proxy.
///
/// Stateless: no caching or deduplication is performed. Two calls with the
/// same name produce two independent proxies, each owning its own
/// acquisition. A miss returns `None` with no side effect.
#[must_use]
pub fn find_scene<H: SceneHost>(host: &Rc<RefCell<H>>, name: &str) -> Option<SceneHandle<H>> {
    let id = host.borrow_mut().scene_by_name(name)?;
    Some(SceneHandle {
        host: Rc::clone(host),
        id,
    })
}

/// A proxy owning one acquired native scene handle.
///
/// Constructed only by [`find_scene`]. While the proxy is alive its handle is
/// guaranteed valid; the handle is released exactly once when the proxy is
/// dropped.
///
/// The proxy must not be dropped while a borrow of the host cell is held —
/// release goes through the same cell.
#[derive(Debug)]
pub struct SceneHandle<H: SceneHost> {
    host: Rc<RefCell<H>>,
    id: SceneId,
}

impl<H: SceneHost> SceneHandle<H> {
    /// Looks up a scene item by name within this scene.
    ///
    /// A hit is a fresh acquisition wrapped in a new [`SceneItemHandle`]
    /// whose lifetime is independent of this proxy's. A miss returns `None`
    /// with no side effect.
    #[must_use]
    pub fn find_source(&self, name: &str) -> Option<SceneItemHandle<H>> {
        let id = self.host.borrow_mut().item_by_name(self.id, name)?;
        Some(SceneItemHandle {
            host: Rc::clone(&self.host),
            id,
        })
    }

    /// Makes this scene the active scene.
    ///
    /// Fails only if the host no longer recognizes the handle, which cannot
    /// happen through this API while the proxy is alive.
    pub fn select(&self) -> Result<(), HostError> {
        self.host.borrow_mut().select_scene(self.id)
    }

    /// The wrapped native handle.
    #[must_use]
    pub fn id(&self) -> SceneId {
        self.id
    }
}

impl<H: SceneHost> Drop for SceneHandle<H> {
    fn drop(&mut self) {
        self.host.borrow_mut().release_scene(self.id);
    }
}

/// A proxy owning one acquired native scene-item handle.
///
/// Constructed only by [`SceneHandle::find_source`]. Released exactly once
/// on drop, symmetric to [`SceneHandle`].
#[derive(Debug)]
pub struct SceneItemHandle<H: SceneHost> {
    host: Rc<RefCell<H>>,
    id: ItemId,
}

impl<H: SceneHost> SceneItemHandle<H> {
    /// Sets the item's visibility from any script value.
    ///
    /// The input is coerced with [`Object::truthy`]; the resulting boolean is
    /// written through to the host on every call (writes are idempotent on
    /// the host side but never deduplicated here). Visibility is not cached
    /// in the proxy.
    pub fn set_visible(&self, visible: &Object) -> Result<(), HostError> {
        self.host.borrow_mut().set_item_visible(self.id, visible.truthy())
    }

    /// Equivalent to `set_visible(false)`.
    pub fn hide(&self) -> Result<(), HostError> {
        self.set_visible(&Object::Bool(false))
    }

    /// Equivalent to `set_visible(true)`.
    pub fn show(&self) -> Result<(), HostError> {
        self.set_visible(&Object::Bool(true))
    }

    /// The wrapped native handle.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }
}

impl<H: SceneHost> Drop for SceneItemHandle<H> {
    fn drop(&mut self) {
        self.host.borrow_mut().release_item(self.id);
    }
}
