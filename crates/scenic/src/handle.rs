/// Stable host-managed scene handle identifier.
///
/// Scene handles are opaque values minted by the host application's scene
/// registry. Acquiring one (via a successful lookup) obtains one reference on
/// the underlying native scene; the holder must release it exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SceneId(u32);

impl SceneId {
    /// Creates a scene handle from a raw integer.
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer identifier.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Stable host-managed scene-item handle identifier.
///
/// Same ownership shape as [`SceneId`]: each successful lookup acquires one
/// reference on the native scene item, released exactly once by the holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ItemId(u32);

impl ItemId {
    /// Creates a scene-item handle from a raw integer.
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer identifier.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}
