use std::fmt;

use indexmap::IndexMap;

use crate::handle::{ItemId, SceneId};

/// Error returned when a host operation is handed a handle the host no
/// longer recognizes.
///
/// This is the fatal/unexpected branch of the error taxonomy: a live proxy
/// guarantees its handle is valid, so an unknown handle means either an
/// embedder bug (a raw handle used after release) or external deletion on the
/// host side. The binding layer never retries; it propagates this unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostError {
    /// The scene handle does not name a live scene.
    UnknownScene(SceneId),
    /// The item handle does not name a live scene item.
    UnknownItem(ItemId),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownScene(scene) => write!(f, "unknown scene handle #{}", scene.raw()),
            Self::UnknownItem(item) => write!(f, "unknown scene item handle #{}", item.raw()),
        }
    }
}

impl std::error::Error for HostError {}

/// Boundary contract with the host application's scene graph.
///
/// This is the only interface surface the binding layer consumes. Lookups
/// acquire one reference on the named object (the host side is
/// reference-counted, so independent acquisitions of the same name coexist);
/// each successful lookup must be balanced by exactly one release call.
/// Mutators fail only when handed an unknown handle.
///
/// All operations are synchronous and non-reentrant with respect to the
/// binding layer; the host is assumed to serialize access to the native
/// graph itself.
pub trait SceneHost: fmt::Debug {
    /// Looks up a scene by name, acquiring one reference on a hit.
    ///
    /// A miss returns `None` and has no side effect.
    fn scene_by_name(&mut self, name: &str) -> Option<SceneId>;

    /// Looks up a scene item by name within the given scene, acquiring one
    /// reference on a hit.
    ///
    /// A miss returns `None` and has no side effect.
    fn item_by_name(&mut self, scene: SceneId, name: &str) -> Option<ItemId>;

    /// Makes the given scene the active scene. Idempotent.
    fn select_scene(&mut self, scene: SceneId) -> Result<(), HostError>;

    /// Sets the visibility flag of the given scene item. Idempotent, and
    /// never deduplicated by the caller.
    fn set_item_visible(&mut self, item: ItemId, visible: bool) -> Result<(), HostError>;

    /// Releases one reference acquired by [`scene_by_name`](Self::scene_by_name).
    ///
    /// Must be called exactly once per successful scene lookup.
    fn release_scene(&mut self, scene: SceneId);

    /// Releases one reference acquired by [`item_by_name`](Self::item_by_name).
    ///
    /// Must be called exactly once per successful item lookup.
    fn release_item(&mut self, item: ItemId);
}

/// A named scene in the in-memory studio model.
#[derive(Debug)]
struct SceneRecord {
    /// Live script-side acquisitions. The registry itself keeps the scene
    /// alive, so this dropping to zero does not invalidate the handle.
    refs: u32,
}

/// A named item in the in-memory studio model.
#[derive(Debug)]
struct ItemRecord {
    scene: SceneId,
    name: String,
    visible: bool,
    refs: u32,
}

/// In-memory [`SceneHost`] with reference-counted acquisition.
///
/// Models a studio host for tests and embedding experiments: a registry of
/// named scenes, each with named items carrying a visibility flag, plus the
/// bookkeeping the lifecycle properties are asserted against (live
/// acquisition counts per object, total release counters, mutator call
/// counts, the active scene).
///
/// Scenes are registered up front with [`add_scene`](Self::add_scene) /
/// [`add_item`](Self::add_item); lookups never create anything.
#[derive(Debug, Default)]
pub struct MemoryHost {
    scenes: IndexMap<String, SceneRecord>,
    items: Vec<ItemRecord>,
    active: Option<SceneId>,
    scene_releases: usize,
    item_releases: usize,
    visible_sets: usize,
}

impl MemoryHost {
    /// Creates an empty studio model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a scene, returning its handle.
    ///
    /// Registering an already-present name returns the existing scene's
    /// handle. Registration does not acquire a reference.
    pub fn add_scene(&mut self, name: &str) -> SceneId {
        let entry = self.scenes.entry(name.to_owned());
        let index = entry.index();
        entry.or_insert(SceneRecord { refs: 0 });
        SceneId::new(index as u32)
    }

    /// Registers an item under the given scene, returning its handle.
    ///
    /// # Panics
    /// Panics if the scene is not registered.
    pub fn add_item(&mut self, scene: SceneId, name: &str) -> ItemId {
        assert!(
            self.scene_index(scene).is_some(),
            "MemoryHost::add_item: unknown scene handle #{}",
            scene.raw()
        );
        self.items.push(ItemRecord {
            scene,
            name: name.to_owned(),
            visible: true,
            refs: 0,
        });
        ItemId::new((self.items.len() - 1) as u32)
    }

    /// Returns the currently active scene, if one has been selected.
    #[must_use]
    pub fn active_scene(&self) -> Option<SceneId> {
        self.active
    }

    /// Returns the visibility flag of the given item.
    ///
    /// # Panics
    /// Panics if the item is not registered.
    #[must_use]
    pub fn item_visible(&self, item: ItemId) -> bool {
        self.item_record(item).visible
    }

    /// Returns the number of live (unreleased) acquisitions of the scene.
    ///
    /// # Panics
    /// Panics if the scene is not registered.
    #[must_use]
    pub fn live_scene_refs(&self, scene: SceneId) -> u32 {
        self.scene_record(scene).refs
    }

    /// Returns the number of live (unreleased) acquisitions of the item.
    ///
    /// # Panics
    /// Panics if the item is not registered.
    #[must_use]
    pub fn live_item_refs(&self, item: ItemId) -> u32 {
        self.item_record(item).refs
    }

    /// Total scene release calls observed.
    #[must_use]
    pub fn scene_release_count(&self) -> usize {
        self.scene_releases
    }

    /// Total item release calls observed.
    #[must_use]
    pub fn item_release_count(&self) -> usize {
        self.item_releases
    }

    /// Total visibility mutator calls observed (including no-op writes).
    #[must_use]
    pub fn visible_set_count(&self) -> usize {
        self.visible_sets
    }

    fn scene_index(&self, scene: SceneId) -> Option<usize> {
        let index = scene.raw() as usize;
        (index < self.scenes.len()).then_some(index)
    }

    fn scene_record(&self, scene: SceneId) -> &SceneRecord {
        let index = self
            .scene_index(scene)
            .unwrap_or_else(|| panic!("MemoryHost: unknown scene handle #{}", scene.raw()));
        &self.scenes[index]
    }

    fn item_record(&self, item: ItemId) -> &ItemRecord {
        self.items
            .get(item.raw() as usize)
            .unwrap_or_else(|| panic!("MemoryHost: unknown scene item handle #{}", item.raw()))
    }
}

impl SceneHost for MemoryHost {
    fn scene_by_name(&mut self, name: &str) -> Option<SceneId> {
        let index = self.scenes.get_index_of(name)?;
        self.scenes[index].refs += 1;
        Some(SceneId::new(index as u32))
    }

    fn item_by_name(&mut self, scene: SceneId, name: &str) -> Option<ItemId> {
        let index = self
            .items
            .iter()
            .position(|item| item.scene == scene && item.name == name)?;
        self.items[index].refs += 1;
        Some(ItemId::new(index as u32))
    }

    fn select_scene(&mut self, scene: SceneId) -> Result<(), HostError> {
        if self.scene_index(scene).is_none() {
            return Err(HostError::UnknownScene(scene));
        }
        self.active = Some(scene);
        Ok(())
    }

    fn set_item_visible(&mut self, item: ItemId, visible: bool) -> Result<(), HostError> {
        let index = item.raw() as usize;
        let Some(record) = self.items.get_mut(index) else {
            return Err(HostError::UnknownItem(item));
        };
        record.visible = visible;
        self.visible_sets += 1;
        Ok(())
    }

    fn release_scene(&mut self, scene: SceneId) {
        let index = self
            .scene_index(scene)
            .unwrap_or_else(|| panic!("MemoryHost::release_scene: unknown scene handle #{}", scene.raw()));
        let record = &mut self.scenes[index];
        assert!(
            record.refs > 0,
            "MemoryHost::release_scene: scene #{} released more times than acquired",
            scene.raw()
        );
        record.refs -= 1;
        self.scene_releases += 1;
    }

    fn release_item(&mut self, item: ItemId) {
        let record = self
            .items
            .get_mut(item.raw() as usize)
            .unwrap_or_else(|| panic!("MemoryHost::release_item: unknown scene item handle #{}", item.raw()));
        assert!(
            record.refs > 0,
            "MemoryHost::release_item: item #{} released more times than acquired",
            item.raw()
        );
        record.refs -= 1;
        self.item_releases += 1;
    }
}
