use sim_core::{Handle, Script, TurnTaker, World};

/// Host-side turn taker.
///
/// Implementations decide an action when their turn arrives and express it
/// as a [`Script`] of waits; the driver runs the script to completion
/// before the next turn starts. Scheduling speed is not part of this
/// contract: the driver reads it from the actor's `Speed` stat, so
/// equipment and status effects influence turn order automatically.
pub trait Actor {
    /// The holder whose stats drive this actor's scheduling.
    fn handle(&self) -> Handle;

    /// Decides and begins one turn's action.
    fn take_turn(&mut self, world: &mut World) -> Script;
}

/// Queue entry pairing an actor with its scheduling state.
///
/// Speed is a cache refreshed from the stat pipeline before every
/// scheduling pass; buildup lives here because the queue owns it.
pub(crate) struct ActorSlot {
    pub(crate) handle: Handle,
    pub(crate) actor: Box<dyn Actor>,
    pub(crate) speed: f64,
    pub(crate) buildup: f64,
    pub(crate) threshold: f64,
    pub(crate) dead: bool,
}

impl TurnTaker for ActorSlot {
    fn turn_speed(&self) -> f64 {
        self.speed
    }

    fn turn_buildup(&self) -> f64 {
        self.buildup
    }

    fn set_turn_buildup(&mut self, value: f64) {
        self.buildup = value;
    }

    fn turn_ready(&self) -> bool {
        self.buildup >= self.threshold
    }

    fn remove_from_queue(&self) -> bool {
        self.dead
    }
}
