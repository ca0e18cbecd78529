/// Simulation configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Buildup a turn taker must accumulate before it is allowed to act.
    pub action_threshold: f64,
}

impl SimConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of status-effect instances attached to one holder.
    pub const MAX_STATUS_EFFECTS: usize = 8;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_ACTION_THRESHOLD: f64 = 1.0;

    /// Buildup values are rounded to this many decimal places before stack
    /// counts are derived, so accumulated float error cannot eat a stack.
    pub const BUILDUP_DECIMALS: i32 = 2;

    pub fn new() -> Self {
        Self {
            action_threshold: Self::DEFAULT_ACTION_THRESHOLD,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}
