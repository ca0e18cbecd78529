//! Stat aggregation following the fixed arithmetic pipeline.
//!
//! Every derived value is computed as
//! `clamp((base + percentage × base + add) × multiplier, min, max)` where:
//!
//! - `base` is the stat default plus flat contributions sourced by the
//!   holder itself,
//! - `add` sums externally-sourced flat contributions,
//! - `percentage` sums percentage modifiers and applies to `base` only,
//! - `multiplier` multiplies after base and add are combined,
//! - lock contributions are intersected (tightest min, tightest max).
//!
//! Nothing is cached: the pipeline re-reads the effect store every time a
//! stat is requested, so attach/detach is always immediately visible.

use strum::{EnumCount, IntoEnumIterator};

use crate::effect::{EffectCategory, EffectPayload, EffectStore};
use crate::handle::{Handle, HandleAllocator};

use super::{Stat, StatSheet};

/// Accumulator for one stat's contributing effects.
///
/// Empty aggregates degenerate to neutral identities: sums start at 0, the
/// multiplier at 1, and the lock range at `(-∞, +∞)`, so a holder with no
/// contributions resolves to the stat default unchanged.
///
/// # Pipeline
/// ```
/// # use sim_core::stats::aggregate::StatPipeline;
/// let mut pipe = StatPipeline::new();
/// pipe.flat_self(10.0);
/// pipe.flat_external(5.0);
/// pipe.percentage(0.2);
/// pipe.multiplier(2.0);
/// // (10 + 0.2 × 10 + 5) × 2.0
/// assert_eq!(pipe.resolve(0.0), 34.0);
///
/// pipe.lock(0.0, 20.0);
/// assert_eq!(pipe.resolve(0.0), 20.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatPipeline {
    base_flat: f64,
    add: f64,
    percentage: f64,
    multiplier: f64,
    min: f64,
    max: f64,
}

impl StatPipeline {
    pub fn new() -> Self {
        Self {
            base_flat: 0.0,
            add: 0.0,
            percentage: 0.0,
            multiplier: 1.0,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// Flat contribution sourced by the holder itself (stacks into base).
    pub fn flat_self(&mut self, amount: f64) {
        self.base_flat += amount;
    }

    /// Externally-sourced flat contribution (added after percentages).
    pub fn flat_external(&mut self, amount: f64) {
        self.add += amount;
    }

    pub fn percentage(&mut self, amount: f64) {
        self.percentage += amount;
    }

    pub fn multiplier(&mut self, factor: f64) {
        self.multiplier *= factor;
    }

    /// Intersects the lock range with `[min, max]`.
    pub fn lock(&mut self, min: f64, max: f64) {
        self.min = self.min.max(min);
        self.max = self.max.min(max);
    }

    /// Folds the accumulated contributions over `default_value`.
    pub fn resolve(&self, default_value: f64) -> f64 {
        let base = default_value + self.base_flat;
        let combined = (base + self.percentage * base + self.add) * self.multiplier;
        combined.clamp(self.min, self.max)
    }
}

impl Default for StatPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves `holder`'s value for `stat` from its attached effects.
///
/// A holder with no contributing effects (including a stale handle, whose
/// queries are empty) resolves to [`Stat::default_value`].
pub fn get_stat(
    allocator: &HandleAllocator,
    effects: &EffectStore,
    holder: Handle,
    stat: Stat,
) -> f64 {
    let mut pipe = StatPipeline::new();
    for effect in effects.query(allocator, EffectCategory::StatContribution, holder) {
        match effect.payload {
            EffectPayload::StatFlat { stat: s, amount } if s == stat => {
                if effect.source == holder {
                    pipe.flat_self(amount);
                } else {
                    pipe.flat_external(amount);
                }
            }
            EffectPayload::StatPercent { stat: s, amount } if s == stat => {
                pipe.percentage(amount);
            }
            EffectPayload::StatMultiply { stat: s, factor } if s == stat => {
                pipe.multiplier(factor);
            }
            EffectPayload::StatLock { stat: s, min, max } if s == stat => {
                pipe.lock(min, max);
            }
            _ => {}
        }
    }
    pipe.resolve(stat.default_value())
}

/// Evaluates every stat for `holder` into a [`StatSheet`].
pub fn get_stats(allocator: &HandleAllocator, effects: &EffectStore, holder: Handle) -> StatSheet {
    let mut values = [0.0; Stat::COUNT];
    for stat in Stat::iter() {
        values[stat as usize] = get_stat(allocator, effects, holder, stat);
    }
    StatSheet::new(values)
}

/// Sums elemental percentage contributions for `holder` and `element`.
pub fn get_element(
    allocator: &HandleAllocator,
    effects: &EffectStore,
    holder: Handle,
    element: super::Element,
) -> f64 {
    effects
        .query(allocator, EffectCategory::Element, holder)
        .iter()
        .filter_map(|effect| match effect.payload {
            EffectPayload::ElementPercent { element: e, amount } if e == element => Some(amount),
            _ => None,
        })
        .sum()
}
