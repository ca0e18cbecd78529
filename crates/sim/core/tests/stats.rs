use sim_core::{EffectPayload, Handle, HolderKind, PendingEffect, SimConfig, Stat, World};

fn world() -> World {
    World::new(SimConfig::default())
}

fn flat(world: &mut World, source: Handle, target: Handle, stat: Stat, amount: f64) {
    world
        .apply_effect(PendingEffect::new(
            source,
            target,
            EffectPayload::StatFlat { stat, amount },
        ))
        .unwrap();
}

#[test]
fn empty_effect_set_resolves_to_the_stat_default() {
    let mut world = world();
    let holder = world.spawn_holder(HolderKind::Creature);

    assert_eq!(world.stat(holder, Stat::Attack), 0.0);
    assert_eq!(world.stat(holder, Stat::MaxHealth), 10.0);
    assert_eq!(world.stat(holder, Stat::Speed), 1.0);
}

#[test]
fn pipeline_orders_percentage_before_external_flat_and_multiplier_last() {
    let mut world = world();
    let holder = world.spawn_holder(HolderKind::Creature);
    let other = world.spawn_holder(HolderKind::Item);

    flat(&mut world, holder, holder, Stat::Attack, 10.0);
    flat(&mut world, other, holder, Stat::Attack, 5.0);
    world
        .apply_effect(PendingEffect::new(
            other,
            holder,
            EffectPayload::StatPercent {
                stat: Stat::Attack,
                amount: 0.2,
            },
        ))
        .unwrap();
    world
        .apply_effect(PendingEffect::new(
            other,
            holder,
            EffectPayload::StatMultiply {
                stat: Stat::Attack,
                factor: 2.0,
            },
        ))
        .unwrap();

    // (10 + 0.2 × 10 + 5) × 2.0 — the percentage applies to base only.
    assert_eq!(world.stat(holder, Stat::Attack), 34.0);
}

#[test]
fn lock_clamps_the_pipeline_result() {
    let mut world = world();
    let holder = world.spawn_holder(HolderKind::Creature);
    let other = world.spawn_holder(HolderKind::Item);

    flat(&mut world, holder, holder, Stat::Attack, 10.0);
    flat(&mut world, other, holder, Stat::Attack, 5.0);
    world
        .apply_effect(PendingEffect::new(
            other,
            holder,
            EffectPayload::StatPercent {
                stat: Stat::Attack,
                amount: 0.2,
            },
        ))
        .unwrap();
    world
        .apply_effect(PendingEffect::new(
            other,
            holder,
            EffectPayload::StatMultiply {
                stat: Stat::Attack,
                factor: 2.0,
            },
        ))
        .unwrap();
    world
        .apply_effect(PendingEffect::new(
            other,
            holder,
            EffectPayload::StatLock {
                stat: Stat::Attack,
                min: 0.0,
                max: 20.0,
            },
        ))
        .unwrap();

    assert_eq!(world.stat(holder, Stat::Attack), 20.0);
}

#[test]
fn multiple_locks_intersect_to_the_tightest_range() {
    let mut world = world();
    let holder = world.spawn_holder(HolderKind::Creature);

    flat(&mut world, holder, holder, Stat::Defense, 100.0);
    for (min, max) in [(0.0, 50.0), (5.0, 30.0)] {
        world
            .apply_effect(PendingEffect::new(
                holder,
                holder,
                EffectPayload::StatLock {
                    stat: Stat::Defense,
                    min,
                    max,
                },
            ))
            .unwrap();
    }
    assert_eq!(world.stat(holder, Stat::Defense), 30.0);
}

#[test]
fn contributions_to_other_stats_are_ignored() {
    let mut world = world();
    let holder = world.spawn_holder(HolderKind::Creature);
    flat(&mut world, holder, holder, Stat::Defense, 42.0);
    assert_eq!(world.stat(holder, Stat::Attack), 0.0);
}

#[test]
fn stat_sheet_matches_individual_queries() {
    let mut world = world();
    let holder = world.spawn_holder(HolderKind::Creature);
    flat(&mut world, holder, holder, Stat::Attack, 4.0);
    flat(&mut world, holder, holder, Stat::MaxHealth, 6.0);

    let sheet = world.stats(holder);
    assert_eq!(sheet.get(Stat::Attack), world.stat(holder, Stat::Attack));
    assert_eq!(sheet.get(Stat::MaxHealth), 16.0);
    assert_eq!(sheet.get(Stat::Speed), 1.0);
}

#[test]
fn removal_is_visible_on_the_next_query() {
    let mut world = world();
    let holder = world.spawn_holder(HolderKind::Creature);
    let id = world
        .apply_effect(PendingEffect::new(
            holder,
            holder,
            EffectPayload::StatFlat {
                stat: Stat::Attack,
                amount: 9.0,
            },
        ))
        .unwrap();

    assert_eq!(world.stat(holder, Stat::Attack), 9.0);
    world.remove_effect(id);
    assert_eq!(world.stat(holder, Stat::Attack), 0.0);
}
