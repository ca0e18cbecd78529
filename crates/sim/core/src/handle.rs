//! Generation-tagged handles for effect holders.
//!
//! Every entity that can own effects (creatures, items, tiles, materials,
//! status-effect instances) is identified by a [`Handle`]: a slot index plus
//! a generation counter. Slots are recycled aggressively, so a handle kept
//! across a destroy/respawn cycle must be detectable as stale. Validity is
//! therefore defined as "the slot is occupied *and* the occupant's
//! generation matches", never as a bare index comparison.

use std::collections::BTreeMap;
use std::fmt;

/// Identifier for an effect holder.
///
/// Two handles are equal only when both index and generation match. A
/// released slot is reissued with a strictly greater generation, so a stale
/// handle can never alias the new occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Handle {
    pub index: u32,
    pub generation: u32,
}

impl Handle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// What sort of entity occupies a holder slot.
///
/// The core never inspects the host's entity data; it only needs a coarse
/// tag so destruction can clean up dependents (e.g. statuses owned by a
/// creature).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(strum::Display)]
pub enum HolderKind {
    Creature,
    Item,
    Tile,
    Material,
    Status,
    /// Abstract marker holders (global auras, singleton rule sources).
    Singleton,
}

/// Occupancy record for a live holder slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HolderRecord {
    pub handle: Handle,
    pub kind: HolderKind,
}

/// Issues and recycles [`Handle`]s and keeps the `index -> holder`
/// back-reference.
///
/// The allocator does not own holder data beyond the [`HolderRecord`]; the
/// mapping is lookup-only and carries no lifetime control. Resolving a
/// stale index is a normal condition and yields `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandleAllocator {
    next_index: u32,
    /// Released handles, generation already bumped, ready for reuse.
    free: Vec<Handle>,
    live: BTreeMap<u32, HolderRecord>,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a recycled handle (same index, generation + 1) if any have
    /// been released, otherwise a fresh `{ index: next, generation: 0 }`.
    pub fn allocate(&mut self) -> Handle {
        if let Some(handle) = self.free.pop() {
            return handle;
        }
        let handle = Handle::new(self.next_index, 0);
        self.next_index += 1;
        handle
    }

    /// Records the occupancy of `handle.index`.
    ///
    /// The handle must come from [`allocate`](Self::allocate); registering
    /// over a live slot is a programmer error and panics in debug builds.
    pub fn register(&mut self, handle: Handle, kind: HolderKind) {
        let prev = self.live.insert(handle.index, HolderRecord { handle, kind });
        debug_assert!(prev.is_none(), "slot {} registered twice", handle.index);
    }

    /// Releases the slot: the occupancy record is dropped and a
    /// generation-bumped handle is pushed onto the freelist.
    ///
    /// Releasing an already-stale handle is a no-op, since destruction
    /// ordering within a tick is not guaranteed.
    pub fn release(&mut self, handle: Handle) {
        if !self.is_valid(handle) {
            return;
        }
        self.live.remove(&handle.index);
        self.free.push(Handle::new(handle.index, handle.generation + 1));
    }

    /// True iff a holder is registered at `handle.index` and its recorded
    /// generation equals `handle.generation`.
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.live
            .get(&handle.index)
            .is_some_and(|rec| rec.handle.generation == handle.generation)
    }

    /// Current occupant of `index`, if any.
    pub fn resolve(&self, index: u32) -> Option<&HolderRecord> {
        self.live.get(&index)
    }

    /// Mutable occupant lookup, for hosts that retag a slot in place.
    pub fn resolve_mut(&mut self, index: u32) -> Option<&mut HolderRecord> {
        self.live.get_mut(&index)
    }

    /// Current generation registered at `index`, if the slot is occupied.
    pub fn generation_at(&self, index: u32) -> Option<u32> {
        self.live.get(&index).map(|rec| rec.handle.generation)
    }

    /// Iterates all live holder records in index order.
    pub fn iter(&self) -> impl Iterator<Item = &HolderRecord> {
        self.live.values()
    }

    /// Number of live holders.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
