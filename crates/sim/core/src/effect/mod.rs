//! Typed facts attached to effect holders.
//!
//! An [`Effect`] is a single fact ("flat Attack bonus", "this item is
//! equipped", "a Bleed status hangs off this creature") applied to exactly
//! one target holder. Instead of walking a runtime type hierarchy, every
//! payload statically declares the [`EffectCategory`] buckets it is
//! queryable under: its own narrow category plus the broader groups that
//! cover it. Querying by a broad or a narrow category both find the effect.

pub mod store;

pub use store::EffectStore;

use crate::handle::Handle;
use crate::stats::{Element, Stat};

/// Monotonically increasing identifier for an effect instance.
///
/// Never reused within one store; removal leaves a gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u64);

/// Query buckets an effect can be registered under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(strum::Display, strum::EnumIter)]
pub enum EffectCategory {
    /// Every effect, regardless of payload.
    Any,
    /// The four stat-contribution payloads (flat, percent, multiply, lock).
    StatContribution,
    StatFlat,
    StatPercent,
    StatMultiply,
    StatLock,
    Element,
    StatusLink,
    /// Inventory / equipment / tile presence markers.
    Marker,
    InInventory,
    Equipped,
    OnTile,
    Trigger,
}

/// Host events an effect can hook into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(strum::Display)]
pub enum TriggerKind {
    Attack,
    Defend,
    Mine,
}

/// Effect payload variants.
///
/// Stat amounts follow the aggregation pipeline conventions: percent `0.2`
/// means +20% of base, multiply `2.0` doubles the combined value, lock
/// contributions are intersected (tightest bounds win).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectPayload {
    StatFlat { stat: Stat, amount: f64 },
    StatPercent { stat: Stat, amount: f64 },
    StatMultiply { stat: Stat, factor: f64 },
    StatLock { stat: Stat, min: f64, max: f64 },
    /// Elemental damage percentage for the given element.
    ElementPercent { element: Element, amount: f64 },
    /// Marks a status-effect instance as attached to the target holder.
    StatusLink { status: Handle },
    InInventory { item: Handle },
    Equipped { item: Handle },
    /// Presence of `occupant` on the target tile holder.
    OnTile { occupant: Handle },
    /// Registers the source holder for a host-resolved event hook.
    Trigger { on: TriggerKind },
}

impl EffectPayload {
    /// The static list of categories this payload is queryable under.
    ///
    /// Always starts with [`EffectCategory::Any`] and ends with the
    /// payload's own narrow category.
    pub fn categories(&self) -> &'static [EffectCategory] {
        use EffectCategory::*;
        match self {
            Self::StatFlat { .. } => &[Any, StatContribution, StatFlat],
            Self::StatPercent { .. } => &[Any, StatContribution, StatPercent],
            Self::StatMultiply { .. } => &[Any, StatContribution, StatMultiply],
            Self::StatLock { .. } => &[Any, StatContribution, StatLock],
            Self::ElementPercent { .. } => &[Any, Element],
            Self::StatusLink { .. } => &[Any, StatusLink],
            Self::InInventory { .. } => &[Any, Marker, InInventory],
            Self::Equipped { .. } => &[Any, Marker, Equipped],
            Self::OnTile { .. } => &[Any, Marker, OnTile],
            Self::Trigger { .. } => &[Any, Trigger],
        }
    }

    /// The stat this payload contributes to, if it is a stat contribution.
    pub fn stat(&self) -> Option<Stat> {
        match self {
            Self::StatFlat { stat, .. }
            | Self::StatPercent { stat, .. }
            | Self::StatMultiply { stat, .. }
            | Self::StatLock { stat, .. } => Some(*stat),
            _ => None,
        }
    }
}

/// A fact applied to exactly one holder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Effect {
    pub id: EffectId,
    /// Holder that granted the effect. The aggregation engine treats flat
    /// contributions from the target itself as base stacking and everything
    /// else as external bonuses.
    pub source: Handle,
    /// Holder the effect applies to.
    pub target: Handle,
    /// Soft-delete marker. A removed effect is never returned by queries
    /// even if it transiently survives in a bucket before the next sweep.
    pub removed: bool,
    pub payload: EffectPayload,
}

/// Effect data prior to insertion into an [`EffectStore`]; `apply` assigns
/// the id.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingEffect {
    pub source: Handle,
    pub target: Handle,
    pub payload: EffectPayload,
}

impl PendingEffect {
    pub fn new(source: Handle, target: Handle, payload: EffectPayload) -> Self {
        Self {
            source,
            target,
            payload,
        }
    }
}
