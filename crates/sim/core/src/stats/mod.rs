//! Named stats, elements, and the derived-value aggregation engine.

pub mod aggregate;

pub use aggregate::{get_element, get_stat, get_stats, StatPipeline};

use strum::EnumCount;

/// A named numeric quantity resolved through the aggregation engine.
///
/// Stats carry no stored value of their own; a holder's stat is recomputed
/// on demand from its attached effects, folded over
/// [`default_value`](Stat::default_value).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(strum::Display, strum::EnumIter, strum::EnumCount)]
pub enum Stat {
    Attack,
    Defense,
    /// Per-tick turn buildup increment for scheduler participants.
    Speed,
    MaxHealth,
    MiningPower,
    Evasion,
}

impl Stat {
    /// Value a holder with no contributing effects resolves to.
    pub fn default_value(self) -> f64 {
        match self {
            Stat::Attack => 0.0,
            Stat::Defense => 0.0,
            Stat::Speed => 1.0,
            Stat::MaxHealth => 10.0,
            Stat::MiningPower => 0.0,
            Stat::Evasion => 0.0,
        }
    }
}

/// Damage elements for percentage contributions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(strum::Display, strum::EnumIter)]
pub enum Element {
    Physical,
    Fire,
    Ice,
    Poison,
}

/// Snapshot of every stat for one holder, in [`Stat`] declaration order.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatSheet {
    values: [f64; Stat::COUNT],
}

impl StatSheet {
    pub(crate) fn new(values: [f64; Stat::COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, stat: Stat) -> f64 {
        self.values[stat as usize]
    }
}
