//! Deterministic turn and effect simulation kernel.
//!
//! `sim-core` defines the canonical rules for who acts next and what a
//! holder's derived numbers are: generation-tagged handles, the
//! category-indexed effect store, the stat aggregation pipeline, stacking
//! status effects, the turn queue, and the cooperative coroutine runner.
//! Everything is single-threaded and step-driven; hosts own rendering,
//! input, and persistence and talk to the core only through [`World`],
//! [`ActionQueue`], and [`Runner`].
pub mod config;
pub mod coroutine;
pub mod effect;
pub mod events;
pub mod handle;
pub mod schedule;
pub mod stats;
pub mod status;
pub mod world;

pub use config::SimConfig;
pub use coroutine::{sequence, CoroutineId, InputSignal, Runner, Script, Wait};
pub use effect::{
    Effect, EffectCategory, EffectId, EffectPayload, EffectStore, PendingEffect, TriggerKind,
};
pub use events::SimEvent;
pub use handle::{Handle, HandleAllocator, HolderKind, HolderRecord};
pub use schedule::{ActionQueue, Forecast, StepOutcome, TurnError, TurnTaker};
pub use stats::{Element, Stat, StatSheet};
pub use status::{StatusError, StatusKind, StatusSeed, StatusState};
pub use world::World;
