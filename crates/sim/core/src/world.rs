//! Explicit simulation context.
//!
//! [`World`] owns the handle allocator, the effect store, status-effect
//! instances, and the pending event queue. There is no global state:
//! "reset for a new game" is constructing a fresh `World`. Everything here
//! is single-threaded by contract; a multi-threaded host must confine the
//! world to one owning thread.

use std::collections::BTreeMap;

use crate::config::SimConfig;
use crate::effect::{Effect, EffectCategory, EffectId, EffectPayload, EffectStore, PendingEffect};
use crate::events::SimEvent;
use crate::handle::{Handle, HandleAllocator, HolderKind};
use crate::stats::{aggregate, Element, Stat, StatSheet};
use crate::status::StatusState;

/// Owning context for one simulation.
#[derive(Debug, Default)]
pub struct World {
    pub config: SimConfig,
    pub(crate) allocator: HandleAllocator,
    pub(crate) effects: EffectStore,
    /// Status instances keyed by their holder slot index.
    pub(crate) statuses: BTreeMap<u32, StatusState>,
    pub(crate) events: Vec<SimEvent>,
}

impl World {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // ===== holders =====

    /// Allocates and registers a holder slot.
    pub fn spawn_holder(&mut self, kind: HolderKind) -> Handle {
        let handle = self.allocator.allocate();
        self.allocator.register(handle, kind);
        handle
    }

    /// Destroys a holder: its effects are force-removed, any attached
    /// status instances are destroyed with it, and the handle is released.
    ///
    /// Despawning an already-stale handle is a no-op.
    pub fn despawn(&mut self, handle: Handle) {
        if !self.allocator.is_valid(handle) {
            return;
        }
        let attached = self.attached_status_handles(handle);
        for status in attached {
            self.destroy_status_instance(status);
        }
        self.effects.remove_all_for(handle);
        self.allocator.release(handle);
    }

    pub fn is_alive(&self, handle: Handle) -> bool {
        self.allocator.is_valid(handle)
    }

    pub fn holder_kind(&self, handle: Handle) -> Option<HolderKind> {
        if !self.allocator.is_valid(handle) {
            return None;
        }
        self.allocator.resolve(handle.index).map(|rec| rec.kind)
    }

    pub fn allocator(&self) -> &HandleAllocator {
        &self.allocator
    }

    // ===== effects =====

    /// Attaches an effect; `None` when the target handle is stale.
    ///
    /// A `StatusLink` beyond the per-holder status cap is also absorbed as
    /// `None`, so the cap holds no matter how the link was produced and
    /// every attached-status query stays within its fixed bound.
    pub fn apply_effect(&mut self, pending: PendingEffect) -> Option<EffectId> {
        if matches!(pending.payload, EffectPayload::StatusLink { .. })
            && self.attached_status_handles(pending.target).len() >= SimConfig::MAX_STATUS_EFFECTS
        {
            return None;
        }
        self.effects.apply(&self.allocator, pending)
    }

    pub fn remove_effect(&mut self, id: EffectId) {
        self.effects.remove(id);
    }

    /// Materialized query of non-removed effects on `holder`.
    pub fn effects_of(&self, category: EffectCategory, holder: Handle) -> Vec<&Effect> {
        self.effects.query(&self.allocator, category, holder)
    }

    pub fn effect_store(&self) -> &EffectStore {
        &self.effects
    }

    // ===== derived values =====

    /// Resolves one stat through the aggregation pipeline. Recomputed on
    /// every call; nothing is cached.
    pub fn stat(&self, holder: Handle, stat: Stat) -> f64 {
        aggregate::get_stat(&self.allocator, &self.effects, holder, stat)
    }

    pub fn stats(&self, holder: Handle) -> StatSheet {
        aggregate::get_stats(&self.allocator, &self.effects, holder)
    }

    pub fn element(&self, holder: Handle, element: Element) -> f64 {
        aggregate::get_element(&self.allocator, &self.effects, holder, element)
    }

    // ===== events =====

    pub(crate) fn push_event(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Takes all pending events in emission order.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
