//! Category- and holder-indexed effect storage.
//!
//! Internal layout: an id-keyed arena of effect instances plus one bucket
//! per `(category, slot index)` pair. Each bucket is additionally keyed by
//! the target handle's generation, so a slot-reuse event invalidates the
//! previous occupant's effects en masse: any stragglers are explicitly
//! removed before a new bucket takes the slot over.
//!
//! Mutations are not transactional across calls. Readers are expected to
//! materialize query results before mutating, which is why queries return
//! owned id lists / cloned handles rather than live iterators.

use std::collections::BTreeMap;

use crate::handle::{Handle, HandleAllocator};

use super::{Effect, EffectCategory, EffectId, PendingEffect};

/// Per-(category, slot) effect list, pinned to one holder generation.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct Bucket {
    generation: u32,
    ids: Vec<EffectId>,
}

/// Holder-indexed collection of effect instances.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectStore {
    next_id: u64,
    arena: BTreeMap<EffectId, Effect>,
    buckets: BTreeMap<EffectCategory, BTreeMap<u32, Bucket>>,
}

impl EffectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `pending` under every category its payload declares,
    /// indexed by the target holder.
    ///
    /// Returns `None` without storing anything when the target handle is
    /// stale; an effect aimed at a holder destroyed earlier the same tick
    /// is an expected race, not an error.
    pub fn apply(
        &mut self,
        allocator: &HandleAllocator,
        pending: PendingEffect,
    ) -> Option<EffectId> {
        if !allocator.is_valid(pending.target) {
            return None;
        }

        let id = EffectId(self.next_id);
        self.next_id += 1;

        let target = pending.target;
        for &category in pending.payload.categories() {
            self.claim_bucket(category, target).ids.push(id);
        }
        self.arena.insert(
            id,
            Effect {
                id,
                source: pending.source,
                target: pending.target,
                removed: false,
                payload: pending.payload,
            },
        );
        Some(id)
    }

    /// Marks the effect removed and strips it from its buckets.
    ///
    /// Removing an id twice is a no-op.
    pub fn remove(&mut self, id: EffectId) {
        let Some(mut effect) = self.arena.remove(&id) else {
            return;
        };
        effect.removed = true;
        for &category in effect.payload.categories() {
            if let Some(slots) = self.buckets.get_mut(&category)
                && let Some(bucket) = slots.get_mut(&effect.target.index)
            {
                bucket.ids.retain(|&other| other != id);
            }
        }
    }

    /// All non-removed effects of `category` attached to `holder`.
    ///
    /// Yields an empty list when the holder's generation is stale or the
    /// category has never been used.
    pub fn query(
        &self,
        allocator: &HandleAllocator,
        category: EffectCategory,
        holder: Handle,
    ) -> Vec<&Effect> {
        if !allocator.is_valid(holder) {
            return Vec::new();
        }
        let Some(bucket) = self
            .buckets
            .get(&category)
            .and_then(|slots| slots.get(&holder.index))
        else {
            return Vec::new();
        };
        if bucket.generation != holder.generation {
            return Vec::new();
        }
        bucket
            .ids
            .iter()
            .filter_map(|id| self.arena.get(id))
            .filter(|effect| !effect.removed)
            .collect()
    }

    /// Like [`query`](Self::query) but returning owned ids, for callers
    /// that mutate the store while walking the results.
    pub fn query_ids(
        &self,
        allocator: &HandleAllocator,
        category: EffectCategory,
        holder: Handle,
    ) -> Vec<EffectId> {
        self.query(allocator, category, holder)
            .into_iter()
            .map(|effect| effect.id)
            .collect()
    }

    /// Looks up a single effect by id.
    pub fn get(&self, id: EffectId) -> Option<&Effect> {
        self.arena.get(&id).filter(|effect| !effect.removed)
    }

    /// Force-removes every effect targeting `holder`, valid or stale.
    ///
    /// Used on holder destruction so a later occupant of the slot starts
    /// from a clean state even before bucket reclamation runs.
    pub fn remove_all_for(&mut self, holder: Handle) {
        let ids: Vec<EffectId> = self
            .buckets
            .get(&EffectCategory::Any)
            .and_then(|slots| slots.get(&holder.index))
            .filter(|bucket| bucket.generation == holder.generation)
            .map(|bucket| bucket.ids.clone())
            .unwrap_or_default();
        for id in ids {
            self.remove(id);
        }
    }

    /// Total number of live effects in the store.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Fetches the bucket for `(category, target.index)`, reclaiming it
    /// first when a previous occupant's generation still owns it.
    fn claim_bucket(&mut self, category: EffectCategory, target: Handle) -> &mut Bucket {
        let stale: Vec<EffectId> = self
            .buckets
            .get(&category)
            .and_then(|slots| slots.get(&target.index))
            .filter(|bucket| bucket.generation != target.generation)
            .map(|bucket| bucket.ids.clone())
            .unwrap_or_default();
        for id in stale {
            self.remove(id);
        }

        let bucket = self
            .buckets
            .entry(category)
            .or_default()
            .entry(target.index)
            .or_default();
        bucket.generation = target.generation;
        bucket
    }
}
