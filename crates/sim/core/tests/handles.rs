use std::collections::BTreeSet;

use sim_core::{Handle, HandleAllocator, HolderKind};

#[test]
fn fresh_handles_use_distinct_indices() {
    let mut allocator = HandleAllocator::new();
    let a = allocator.allocate();
    let b = allocator.allocate();
    assert_ne!(a.index, b.index);
    assert_eq!(a.generation, 0);
    assert_eq!(b.generation, 0);
}

#[test]
fn released_slot_reissues_with_strictly_greater_generation() {
    let mut allocator = HandleAllocator::new();
    let old = allocator.allocate();
    allocator.register(old, HolderKind::Creature);
    allocator.release(old);

    let new = allocator.allocate();
    assert_eq!(new.index, old.index);
    assert!(new.generation > old.generation);

    allocator.register(new, HolderKind::Item);
    assert!(!allocator.is_valid(old));
    assert!(allocator.is_valid(new));
    assert_eq!(
        allocator.resolve(new.index).map(|rec| rec.kind),
        Some(HolderKind::Item)
    );
}

#[test]
fn resolving_released_unreused_index_is_none() {
    let mut allocator = HandleAllocator::new();
    let handle = allocator.allocate();
    allocator.register(handle, HolderKind::Tile);
    allocator.release(handle);
    assert!(allocator.resolve(handle.index).is_none());
    assert!(!allocator.is_valid(handle));
}

#[test]
fn records_can_be_retagged_in_place() {
    let mut allocator = HandleAllocator::new();
    let handle = allocator.allocate();
    allocator.register(handle, HolderKind::Item);

    if let Some(record) = allocator.resolve_mut(handle.index) {
        record.kind = HolderKind::Material;
    }
    assert_eq!(
        allocator.resolve(handle.index).map(|rec| rec.kind),
        Some(HolderKind::Material)
    );
    assert!(allocator.is_valid(handle));
}

#[test]
fn releasing_a_stale_handle_is_a_no_op() {
    let mut allocator = HandleAllocator::new();
    let old = allocator.allocate();
    allocator.register(old, HolderKind::Creature);
    allocator.release(old);
    let new = allocator.allocate();
    allocator.register(new, HolderKind::Creature);

    // The old handle must not be able to evict the new occupant.
    allocator.release(old);
    assert!(allocator.is_valid(new));
}

#[test]
fn no_two_live_holders_ever_share_index_and_generation() {
    let mut allocator = HandleAllocator::new();
    let mut live: Vec<Handle> = Vec::new();

    // Churn: allocate three, release the middle one, repeat.
    for round in 0..10 {
        for _ in 0..3 {
            let handle = allocator.allocate();
            allocator.register(handle, HolderKind::Material);
            live.push(handle);
        }
        let victim = live.remove(round % live.len());
        allocator.release(victim);
    }

    let unique: BTreeSet<Handle> = live.iter().copied().collect();
    assert_eq!(unique.len(), live.len());
    for handle in &live {
        assert!(allocator.is_valid(*handle));
    }
}
