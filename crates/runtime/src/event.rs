use sim_core::{Handle, SimEvent};

/// Events emitted by the simulation driver.
///
/// Turn lifecycle events originate here; everything else is a core
/// [`SimEvent`] drained from the world and forwarded unchanged.
#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeEvent {
    /// An actor's turn began at the given simulation tick.
    TurnStarted { actor: Handle, tick: u64 },
    /// An actor's turn (including its whole action script) completed.
    TurnEnded { actor: Handle, tick: u64 },
    /// No actor can ever become ready again.
    Idle,
    /// A state change observed inside the simulation core.
    Sim(SimEvent),
}
