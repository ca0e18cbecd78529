use std::cell::RefCell;
use std::rc::Rc;

use runtime::{Actor, RuntimeConfig, RuntimeEvent, Simulation, StepReport};
use sim_core::{
    sequence, EffectPayload, Handle, HolderKind, InputSignal, PendingEffect, Script, SimEvent,
    Stat, StatusKind, StatusSeed, Wait, World,
};

/// Actor that records every turn it takes and yields a fixed wait list.
struct Recording {
    handle: Handle,
    waits: Vec<Wait>,
    log: Rc<RefCell<Vec<Handle>>>,
}

impl Recording {
    fn instant(handle: Handle, log: Rc<RefCell<Vec<Handle>>>) -> Self {
        Self {
            handle,
            waits: Vec::new(),
            log,
        }
    }
}

impl Actor for Recording {
    fn handle(&self) -> Handle {
        self.handle
    }

    fn take_turn(&mut self, _world: &mut World) -> Script {
        self.log.borrow_mut().push(self.handle);
        sequence(self.waits.clone())
    }
}

fn spawn_recording(sim: &mut Simulation, log: &Rc<RefCell<Vec<Handle>>>) -> Handle {
    let handle = sim.world_mut().spawn_holder(HolderKind::Creature);
    sim.add_actor(Box::new(Recording::instant(handle, Rc::clone(log))));
    handle
}

#[test]
fn equal_speed_actors_alternate_in_insertion_order() {
    let mut sim = Simulation::new(RuntimeConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = spawn_recording(&mut sim, &log);
    let b = spawn_recording(&mut sim, &log);

    for _ in 0..4 {
        assert!(matches!(sim.run_turn(), StepReport::TurnEnded(_)));
    }
    assert_eq!(*log.borrow(), vec![a, b, a, b]);
}

#[test]
fn speed_is_read_from_the_stat_pipeline() {
    let mut sim = Simulation::new(RuntimeConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let slow = spawn_recording(&mut sim, &log);
    let fast = spawn_recording(&mut sim, &log);

    // Base speed is 1.0; a self-sourced flat doubles the second actor.
    sim.world_mut()
        .apply_effect(PendingEffect::new(
            fast,
            fast,
            EffectPayload::StatFlat {
                stat: Stat::Speed,
                amount: 1.0,
            },
        ))
        .unwrap();

    for _ in 0..6 {
        sim.run_turn();
    }
    let log = log.borrow();
    let fast_turns = log.iter().filter(|&&h| h == fast).count();
    let slow_turns = log.iter().filter(|&&h| h == slow).count();
    assert_eq!(fast_turns, 4);
    assert_eq!(slow_turns, 2);
}

#[test]
fn stunned_actor_skips_turns_until_the_stun_expires() {
    let mut sim = Simulation::new(RuntimeConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = spawn_recording(&mut sim, &log);
    let b = spawn_recording(&mut sim, &log);

    sim.afflict(b, StatusSeed::new(StatusKind::Stun, 1.0)).unwrap();

    // Stun locks Speed to 0 for its whole duration; statuses tick once
    // per completed turn.
    for _ in 0..StatusKind::Stun.base_duration() {
        sim.run_turn();
    }
    assert!(log.borrow().iter().all(|&h| h == a));

    log.borrow_mut().clear();
    for _ in 0..4 {
        sim.run_turn();
    }
    assert!(log.borrow().contains(&b));
}

#[test]
fn multi_step_action_spans_several_steps() {
    runtime::init_tracing();
    let mut sim = Simulation::new(RuntimeConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let handle = sim.world_mut().spawn_holder(HolderKind::Creature);
    sim.add_actor(Box::new(Recording {
        handle,
        waits: vec![Wait::Timed(2)],
        log: Rc::clone(&log),
    }));

    assert_eq!(sim.step(), StepReport::TurnStarted(handle));
    assert_eq!(sim.step(), StepReport::Acting(handle));
    assert_eq!(sim.step(), StepReport::Acting(handle));
    assert_eq!(sim.step(), StepReport::TurnEnded(handle));
}

#[test]
fn input_wait_suspends_the_turn_until_resolved() {
    let mut sim = Simulation::new(RuntimeConfig {
        max_steps_per_turn: 8,
        ..RuntimeConfig::default()
    });
    let log = Rc::new(RefCell::new(Vec::new()));
    let signal = InputSignal::new();
    let handle = sim.world_mut().spawn_holder(HolderKind::Creature);
    sim.add_actor(Box::new(Recording {
        handle,
        waits: vec![Wait::ForInput(signal.clone())],
        log: Rc::clone(&log),
    }));

    // The step budget runs out while the script waits for input.
    assert_eq!(sim.run_turn(), StepReport::Acting(handle));

    signal.resolve();
    assert_eq!(sim.run_turn(), StepReport::TurnEnded(handle));
}

#[test]
fn subscribers_receive_turn_and_sim_events() {
    let mut sim = Simulation::new(RuntimeConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let actor = spawn_recording(&mut sim, &log);

    let events: Rc<RefCell<Vec<RuntimeEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    sim.subscribe(move |event| sink.borrow_mut().push(event.clone()));

    let statuses = sim
        .afflict(actor, StatusSeed::new(StatusKind::Poison, 1.0))
        .unwrap();
    sim.run_turn();

    let events = events.borrow();
    assert!(events.contains(&RuntimeEvent::Sim(SimEvent::StatusAdded {
        status: statuses[0],
        kind: StatusKind::Poison,
        target: actor,
    })));
    assert!(events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::TurnStarted { actor: a, .. } if *a == actor)));
    assert!(events
        .iter()
        .any(|e| matches!(e, RuntimeEvent::TurnEnded { actor: a, .. } if *a == actor)));
}

#[test]
fn despawned_actor_is_pruned_and_the_queue_idles() {
    let mut sim = Simulation::new(RuntimeConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let actor = spawn_recording(&mut sim, &log);

    sim.world_mut().despawn(actor);
    assert_eq!(sim.run_turn(), StepReport::Idle);
    assert!(log.borrow().is_empty());
}

#[test]
fn interrupt_grants_an_out_of_band_turn() {
    let mut sim = Simulation::new(RuntimeConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let _a = spawn_recording(&mut sim, &log);
    let b = spawn_recording(&mut sim, &log);

    sim.interrupt(1).unwrap();
    assert_eq!(sim.step(), StepReport::TurnStarted(b));

    assert!(sim.interrupt(9).is_err());
}

#[test]
fn predictions_reflect_effects_applied_between_steps() {
    let mut sim = Simulation::new(RuntimeConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let _a = spawn_recording(&mut sim, &log);
    let b = spawn_recording(&mut sim, &log);

    sim.afflict(b, StatusSeed::new(StatusKind::Stun, 1.0)).unwrap();

    // The stun's speed lock is visible to the forecast without stepping.
    assert_eq!(sim.predict(3), vec![0, 0, 0]);
}

#[test]
fn predictions_match_the_turns_actually_taken() {
    let mut sim = Simulation::new(RuntimeConfig::default());
    let log = Rc::new(RefCell::new(Vec::new()));
    let a = spawn_recording(&mut sim, &log);
    let b = spawn_recording(&mut sim, &log);

    // Forecast positions map onto insertion order here.
    let predicted = sim.predict(4);
    for _ in 0..4 {
        sim.run_turn();
    }
    let taken: Vec<usize> = log.borrow().iter().map(|&h| usize::from(h == b)).collect();
    assert_eq!(predicted, taken);
    assert!(log.borrow().contains(&a));
}
