//! Step-driven simulation driver.
//!
//! [`Simulation`] owns the world, the turn queue, and the coroutine runner
//! and advances them in lockstep: one [`step`](Simulation::step) per host
//! frame. A selected actor's action script is run through the coroutine
//! runner across as many steps as its waits require; only when the script
//! completes does the turn end and scheduling resume.

use sim_core::{
    ActionQueue, CoroutineId, Handle, Runner, SimConfig, Stat, StatusSeed, StepOutcome, World,
};

use crate::actor::{Actor, ActorSlot};
use crate::error::Result;
use crate::event::RuntimeEvent;

/// Driver configuration.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub sim: SimConfig,
    /// Upper bound on steps consumed by one [`run_turn`](Simulation::run_turn)
    /// call, so an unresolved input wait cannot spin the host.
    pub max_steps_per_turn: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            max_steps_per_turn: 64,
        }
    }
}

/// Outcome of one driver step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepReport {
    /// A turn began; its action script is now running.
    TurnStarted(Handle),
    /// The current action script is still resolving its waits.
    Acting(Handle),
    /// The current turn completed this step.
    TurnEnded(Handle),
    /// No actor can ever become ready: the encounter is over.
    Idle,
}

type EventHandler = Box<dyn FnMut(&RuntimeEvent)>;

/// Owns one simulation and drives it turn by turn.
pub struct Simulation {
    config: RuntimeConfig,
    world: World,
    queue: ActionQueue<ActorSlot>,
    runner: Runner,
    /// Turn in flight: actor handle and its script coroutine.
    in_flight: Option<(Handle, CoroutineId)>,
    subscribers: Vec<EventHandler>,
}

impl Simulation {
    pub fn new(config: RuntimeConfig) -> Self {
        let world = World::new(config.sim.clone());
        Self {
            config,
            world,
            queue: ActionQueue::new(),
            runner: Runner::new(),
            in_flight: None,
            subscribers: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Simulation ticks elapsed so far.
    pub fn now(&self) -> u64 {
        self.queue.now()
    }

    /// Registers an actor for scheduling and returns its queue position.
    pub fn add_actor(&mut self, actor: Box<dyn Actor>) -> usize {
        let handle = actor.handle();
        let threshold = self.config.sim.action_threshold;
        let speed = self.world.stat(handle, Stat::Speed);
        self.queue.push(ActorSlot {
            handle,
            actor,
            speed,
            buildup: 0.0,
            threshold,
            dead: false,
        })
    }

    /// Registers an event handler. Every handler sees every event, in
    /// registration order.
    pub fn subscribe(&mut self, handler: impl FnMut(&RuntimeEvent) + 'static) {
        self.subscribers.push(Box::new(handler));
    }

    /// Applies a status effect through the world, forwarding core events
    /// to subscribers.
    pub fn afflict(&mut self, target: Handle, seed: StatusSeed) -> Result<Vec<Handle>> {
        let handles = self.world.add_status(target, seed)?;
        self.flush_sim_events();
        Ok(handles)
    }

    /// Hands the turn to an arbitrary actor out of band, granting whatever
    /// buildup the threshold requires. Reactive turns for zero-speed
    /// actors go through here.
    pub fn interrupt(&mut self, position: usize) -> Result<()> {
        self.queue.set_current(position)?;
        if let Some(slot) = self.queue.get_mut(position) {
            slot.buildup = slot.buildup.max(slot.threshold);
        }
        Ok(())
    }

    /// Upcoming turn order as queue positions, from the scheduler's own
    /// forecast routine.
    ///
    /// Speeds are re-read from the stat pipeline first, so an effect
    /// applied since the last step is already reflected in the forecast.
    pub fn predict(&mut self, n: usize) -> Vec<usize> {
        self.refresh_slots();
        self.queue.predict(n)
    }

    /// Advances the simulation by one step.
    ///
    /// With a turn in flight the coroutine runner is updated once; the
    /// turn ends when the script completes. Otherwise actor speeds are
    /// refreshed from the stat pipeline and the scheduler fast-forwards to
    /// the next turn holder.
    pub fn step(&mut self) -> StepReport {
        if let Some((actor, id)) = self.in_flight {
            self.runner.update();
            self.flush_sim_events();
            if !self.runner.is_done(id) {
                return StepReport::Acting(actor);
            }

            self.in_flight = None;
            self.queue.finish_turn();
            self.world.tick_statuses();
            self.flush_sim_events();
            let tick = self.queue.now();
            tracing::debug!(%actor, tick, "turn ended");
            self.emit(RuntimeEvent::TurnEnded { actor, tick });
            return StepReport::TurnEnded(actor);
        }

        self.refresh_slots();
        match self.queue.step() {
            StepOutcome::Idle => {
                tracing::debug!(tick = self.queue.now(), "queue idle");
                self.emit(RuntimeEvent::Idle);
                StepReport::Idle
            }
            StepOutcome::Selected(position) => {
                let Some(slot) = self.queue.get_mut(position) else {
                    unreachable!("scheduler selected queue position {position}");
                };
                let actor = slot.handle;
                let script = slot.actor.take_turn(&mut self.world);
                let id = self.runner.run(script);
                self.in_flight = Some((actor, id));
                let tick = self.queue.now();
                tracing::debug!(%actor, tick, "turn started");
                self.emit(RuntimeEvent::TurnStarted { actor, tick });
                self.flush_sim_events();
                StepReport::TurnStarted(actor)
            }
        }
    }

    /// Steps until the next turn completes or the queue goes idle.
    ///
    /// Bounded by `max_steps_per_turn`; an action still waiting at the
    /// bound (unresolved input) is reported as [`StepReport::Acting`] and
    /// can be resumed by calling again.
    pub fn run_turn(&mut self) -> StepReport {
        let mut report = StepReport::Idle;
        for _ in 0..self.config.max_steps_per_turn {
            report = self.step();
            match report {
                StepReport::TurnEnded(_) | StepReport::Idle => break,
                StepReport::TurnStarted(_) | StepReport::Acting(_) => {}
            }
        }
        report
    }

    /// Re-reads every actor's speed from the stat pipeline and flags
    /// despawned actors for pruning.
    fn refresh_slots(&mut self) {
        for position in 0..self.queue.len() {
            let Some(slot) = self.queue.get(position) else {
                continue;
            };
            let handle = slot.handle;
            let alive = self.world.is_alive(handle);
            let speed = if alive {
                self.world.stat(handle, Stat::Speed)
            } else {
                0.0
            };
            if let Some(slot) = self.queue.get_mut(position) {
                slot.speed = speed;
                slot.dead = !alive;
            }
        }
    }

    fn flush_sim_events(&mut self) {
        for event in self.world.drain_events() {
            self.emit(RuntimeEvent::Sim(event));
        }
    }

    fn emit(&mut self, event: RuntimeEvent) {
        for handler in &mut self.subscribers {
            handler(&event);
        }
    }
}
