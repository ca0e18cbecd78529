//! Buildup-based status effects and their combination rules.
//!
//! A status instance is itself an effect holder (it owns a [`Handle`]), so
//! the stat bonuses and penalties it grants are ordinary effects sourced by
//! the status and targeted at the creature or tile it rides on. Attachment
//! is expressed through a `StatusLink` effect on the target, which keeps
//! holder lifetime entirely arbitrated by the generation scheme: no
//! reference cycles between creature, status, and store.
//!
//! # Buildup and stacks
//!
//! Buildup accumulates continuously; the stack count is
//! `min(floor(round₂(buildup)), max_stacks)` with buildup clamped into
//! `[0, max_stacks]` before stacks are derived. Crossing an integer
//! boundary in either direction emits a [`SimEvent::StackChanged`] event.
//! A stack count of 0 does not remove the instance unless the kind's
//! removal policy says so; removal policies are explicit per kind, not a
//! convention.

use arrayvec::ArrayVec;

use crate::config::SimConfig;
use crate::effect::{EffectCategory, EffectId, EffectPayload, PendingEffect};
use crate::events::SimEvent;
use crate::handle::{Handle, HolderKind};
use crate::stats::Stat;
use crate::world::World;

/// Errors from status-effect operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    /// The target already carries the maximum number of status instances.
    #[error("status list is full (max: {max})")]
    Saturated { max: usize },

    /// The status handle no longer refers to a live instance.
    #[error("status handle {0} is stale")]
    Stale(Handle),
}

/// Kinds of status effect, each with its own stacking and removal policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(strum::Display, strum::EnumIter)]
pub enum StatusKind {
    Bleed,
    Poison,
    DefenseDown,
    Stun,
    Regen,
}

impl StatusKind {
    /// Buildup below this after a Bleed combination cancels the instance.
    const BLEED_CANCEL_THRESHOLD: f64 = 0.05;

    pub fn max_stacks(self) -> u32 {
        match self {
            StatusKind::Bleed => 5,
            StatusKind::Poison => 3,
            StatusKind::DefenseDown => 3,
            StatusKind::Stun => 1,
            StatusKind::Regen => 5,
        }
    }

    /// Turns a fresh instance survives before expiring.
    pub fn base_duration(self) -> i32 {
        match self {
            StatusKind::Bleed => 6,
            StatusKind::Poison => 8,
            StatusKind::DefenseDown => 10,
            StatusKind::Stun => 2,
            StatusKind::Regen => 5,
        }
    }

    /// Whether draining buildup to 0 removes the instance immediately.
    ///
    /// Kinds that keep a drained instance around (e.g. `DefenseDown` at 0
    /// stacks) rely on duration expiry instead.
    pub fn expires_when_drained(self) -> bool {
        match self {
            StatusKind::Bleed | StatusKind::Stun => true,
            StatusKind::Poison | StatusKind::DefenseDown | StatusKind::Regen => false,
        }
    }

    /// Whether an incoming instance of `self` merges with an attached
    /// instance of `other`. Default policy: same concrete kind.
    pub fn can_combine(self, other: StatusKind) -> bool {
        self == other
    }

    /// Merges an attached instance into an incoming seed.
    ///
    /// Default rule: keep whichever duration has more time remaining and
    /// add the buildups, clamped to `[0, max_stacks]`. A kind may yield
    /// zero results instead: Bleed cancels entirely when the combined
    /// buildup lands below its cancellation threshold.
    pub fn combine(self, attached: StatusSeed, incoming: StatusSeed) -> ArrayVec<StatusSeed, 2> {
        let mut results = ArrayVec::new();
        let merged = StatusSeed {
            kind: self,
            buildup: (attached.buildup + incoming.buildup).clamp(0.0, self.max_stacks() as f64),
            duration: attached.duration.max(incoming.duration),
        };
        if self == StatusKind::Bleed && merged.buildup < Self::BLEED_CANCEL_THRESHOLD {
            return results;
        }
        results.push(merged);
        results
    }

    /// Effects a live instance grants to its target at the given stack
    /// count. Re-applied whenever the stack count changes.
    fn contributions(self, stacks: u32) -> Vec<EffectPayload> {
        if stacks == 0 {
            return Vec::new();
        }
        match self {
            StatusKind::DefenseDown => vec![EffectPayload::StatPercent {
                stat: Stat::Defense,
                amount: -0.1 * stacks as f64,
            }],
            StatusKind::Poison => vec![EffectPayload::StatPercent {
                stat: Stat::Attack,
                amount: -0.05 * stacks as f64,
            }],
            // A stunned holder cannot accumulate turn buildup.
            StatusKind::Stun => vec![EffectPayload::StatLock {
                stat: Stat::Speed,
                min: 0.0,
                max: 0.0,
            }],
            StatusKind::Bleed | StatusKind::Regen => Vec::new(),
        }
    }
}

/// Parameters for a status instance about to be attached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusSeed {
    pub kind: StatusKind,
    pub buildup: f64,
    pub duration: i32,
}

impl StatusSeed {
    /// Seed with the kind's base duration.
    pub fn new(kind: StatusKind, buildup: f64) -> Self {
        Self {
            kind,
            buildup,
            duration: kind.base_duration(),
        }
    }
}

/// A live status-effect instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusState {
    /// The instance's own holder handle.
    pub handle: Handle,
    /// Holder the status rides on.
    pub target: Handle,
    pub kind: StatusKind,
    buildup: f64,
    /// Remaining turns; the instance is removed when this reaches 0.
    pub duration: i32,
    /// The `StatusLink` effect on the target.
    link: EffectId,
    /// Stat effects currently granted to the target.
    contributed: Vec<EffectId>,
}

impl StatusState {
    pub fn buildup(&self) -> f64 {
        self.buildup
    }

    /// `min(floor(round₂(buildup)), max_stacks)`.
    pub fn stacks(&self) -> u32 {
        stacks_for(self.kind, self.buildup)
    }
}

fn round_buildup(buildup: f64) -> f64 {
    let scale = 10f64.powi(SimConfig::BUILDUP_DECIMALS);
    (buildup * scale).round() / scale
}

fn stacks_for(kind: StatusKind, buildup: f64) -> u32 {
    let clamped = buildup.clamp(0.0, kind.max_stacks() as f64);
    (round_buildup(clamped).floor() as u32).min(kind.max_stacks())
}

/// Status-effect operations on the simulation context.
impl World {
    /// Handles of all status instances attached to `holder`.
    ///
    /// The apply path caps links at `MAX_STATUS_EFFECTS`; the `take` keeps
    /// this a query that cannot fail even over a store that bypassed it.
    pub fn attached_status_handles(
        &self,
        holder: Handle,
    ) -> ArrayVec<Handle, { SimConfig::MAX_STATUS_EFFECTS }> {
        self.effects_of(EffectCategory::StatusLink, holder)
            .into_iter()
            .filter_map(|effect| match effect.payload {
                EffectPayload::StatusLink { status } => Some(status),
                _ => None,
            })
            .take(SimConfig::MAX_STATUS_EFFECTS)
            .collect()
    }

    /// The live instance behind a status handle, if it is still current.
    pub fn status(&self, status: Handle) -> Option<&StatusState> {
        self.statuses
            .get(&status.index)
            .filter(|state| state.handle == status)
    }

    /// Applies a new status effect to `target`.
    ///
    /// All attached instances that `can_combine` with the incoming kind are
    /// folded into it in one transaction: the old instances are removed and
    /// the combination results attached fresh. With no compatible instance
    /// present the seed attaches as-is. Returns the handles of the
    /// resulting instances (possibly empty when a combination cancels).
    ///
    /// A stale `target` absorbs the call and returns an empty list.
    pub fn add_status(
        &mut self,
        target: Handle,
        seed: StatusSeed,
    ) -> Result<Vec<Handle>, StatusError> {
        if !self.is_alive(target) {
            return Ok(Vec::new());
        }

        let compatible: Vec<Handle> = self
            .attached_status_handles(target)
            .into_iter()
            .filter(|&h| {
                self.status(h)
                    .is_some_and(|state| seed.kind.can_combine(state.kind))
            })
            .collect();

        let mut seeds = vec![seed];
        for old in compatible {
            let Some(state) = self.status(old) else {
                continue;
            };
            let attached = StatusSeed {
                kind: state.kind,
                buildup: state.buildup,
                duration: state.duration,
            };
            self.remove_status(old);

            let mut next = Vec::new();
            for incoming in seeds {
                next.extend(attached.kind.combine(attached, incoming));
            }
            seeds = next;
        }

        let mut handles = Vec::with_capacity(seeds.len());
        for seed in seeds {
            handles.push(self.attach_status(target, seed)?);
        }
        Ok(handles)
    }

    /// Adjusts an instance's buildup by `delta` and returns the new stack
    /// count.
    ///
    /// The delta may be negative; buildup is clamped into
    /// `[0, max_stacks]` before stacks are recomputed. Boundary crossings
    /// emit [`SimEvent::StackChanged`] and re-grant the kind's stat
    /// contributions. Kinds whose removal policy drains remove themselves
    /// when buildup reaches 0.
    pub fn add_buildup(&mut self, status: Handle, delta: f64) -> Result<u32, StatusError> {
        let Some(state) = self.status(status) else {
            return Err(StatusError::Stale(status));
        };
        let kind = state.kind;
        let target = state.target;
        let old_stacks = state.stacks();
        let new_buildup = (state.buildup + delta).clamp(0.0, kind.max_stacks() as f64);
        let new_stacks = stacks_for(kind, new_buildup);

        if let Some(state) = self.statuses.get_mut(&status.index) {
            state.buildup = new_buildup;
        }

        if new_stacks != old_stacks {
            self.push_event(SimEvent::StackChanged {
                status,
                kind,
                from: old_stacks,
                to: new_stacks,
            });
            self.regrant_contributions(status, target, kind, new_stacks);
        }

        if kind.expires_when_drained() && new_buildup <= 0.0 {
            self.remove_status(status);
        }
        Ok(new_stacks)
    }

    /// Counts down every instance's duration; expired instances are
    /// removed. Call once per completed turn.
    pub fn tick_statuses(&mut self) {
        let handles: Vec<Handle> = self.statuses.values().map(|state| state.handle).collect();
        for status in handles {
            if let Some(state) = self.statuses.get_mut(&status.index) {
                state.duration -= 1;
                if state.duration <= 0 {
                    self.remove_status(status);
                }
            }
        }
    }

    /// Removes a status instance outright, releasing its holder slot and
    /// withdrawing everything it granted.
    pub fn remove_status(&mut self, status: Handle) {
        let Some(state) = self.status(status) else {
            return;
        };
        let kind = state.kind;
        let target = state.target;
        self.destroy_status_instance(status);
        self.push_event(SimEvent::StatusRemoved {
            status,
            kind,
            target,
        });
    }

    fn attach_status(&mut self, target: Handle, seed: StatusSeed) -> Result<Handle, StatusError> {
        let attached = self.attached_status_handles(target);
        if attached.len() >= SimConfig::MAX_STATUS_EFFECTS {
            return Err(StatusError::Saturated {
                max: SimConfig::MAX_STATUS_EFFECTS,
            });
        }

        let handle = self.spawn_holder(HolderKind::Status);
        let Some(link) = self.apply_effect(PendingEffect::new(
            handle,
            target,
            EffectPayload::StatusLink { status: handle },
        )) else {
            // Target died mid-transaction; give the slot back.
            self.allocator.release(handle);
            return Err(StatusError::Stale(target));
        };

        let buildup = seed.buildup.clamp(0.0, seed.kind.max_stacks() as f64);
        let stacks = stacks_for(seed.kind, buildup);
        let mut contributed = Vec::new();
        for payload in seed.kind.contributions(stacks) {
            if let Some(id) = self.apply_effect(PendingEffect::new(handle, target, payload)) {
                contributed.push(id);
            }
        }

        self.statuses.insert(
            handle.index,
            StatusState {
                handle,
                target,
                kind: seed.kind,
                buildup,
                duration: seed.duration,
                link,
                contributed,
            },
        );

        self.push_event(SimEvent::StatusAdded {
            status: handle,
            kind: seed.kind,
            target,
        });
        if stacks > 0 {
            self.push_event(SimEvent::StackChanged {
                status: handle,
                kind: seed.kind,
                from: 0,
                to: stacks,
            });
        }
        Ok(handle)
    }

    /// Withdraws previously granted contributions and re-applies them for
    /// the new stack count.
    fn regrant_contributions(
        &mut self,
        status: Handle,
        target: Handle,
        kind: StatusKind,
        stacks: u32,
    ) {
        let old = self
            .statuses
            .get_mut(&status.index)
            .map(|state| std::mem::take(&mut state.contributed))
            .unwrap_or_default();
        for id in old {
            self.remove_effect(id);
        }

        let mut contributed = Vec::new();
        for payload in kind.contributions(stacks) {
            if let Some(id) = self.apply_effect(PendingEffect::new(status, target, payload)) {
                contributed.push(id);
            }
        }
        if let Some(state) = self.statuses.get_mut(&status.index) {
            state.contributed = contributed;
        }
    }

    /// Tears down the instance without emitting events; callers decide
    /// whether the removal is observable.
    pub(crate) fn destroy_status_instance(&mut self, status: Handle) {
        let Some(state) = self.statuses.remove(&status.index) else {
            return;
        };
        if state.handle != status {
            // A different instance reclaimed the slot; put it back.
            self.statuses.insert(state.handle.index, state);
            return;
        }
        self.remove_effect(state.link);
        for id in state.contributed {
            self.remove_effect(id);
        }
        self.effects.remove_all_for(status);
        self.allocator.release(status);
    }
}
