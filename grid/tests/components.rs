use cellstage_core::{
    CellCoord, Command, ComponentId, ComponentKind, ComponentRemovalError, Event, GridSize,
};
use cellstage_grid::{apply, query, Stage};

fn size(width: u32, height: u32) -> GridSize {
    GridSize::new(width, height).expect("test sizes are positive")
}

fn add(stage: &mut Stage, cell: CellCoord) -> Vec<Event> {
    let mut events = Vec::new();
    apply(
        stage,
        Command::AddComponent {
            cell,
            kind: ComponentKind::EnemySpawner,
        },
        &mut events,
    );
    events
}

#[test]
fn added_component_reflects_its_kind_and_owner() {
    let mut stage = Stage::new(size(3, 2));
    let target = CellCoord::new(1, 1);

    let events = add(&mut stage, target);
    let component = match events.as_slice() {
        [Event::ComponentAdded {
            cell,
            component,
            kind,
        }] => {
            assert_eq!(*cell, target);
            assert_eq!(*kind, ComponentKind::EnemySpawner);
            *component
        }
        other => panic!("expected a single ComponentAdded event, got {other:?}"),
    };

    let owner = query::cell(&stage, target).expect("in bounds");
    assert_eq!(owner.components().len(), 1);
    let attached = &owner.components()[0];
    assert_eq!(attached.id(), component);
    assert_eq!(attached.kind(), ComponentKind::EnemySpawner);
    assert_eq!(attached.owner(), Some(owner.id()));
}

#[test]
fn removal_by_kind_takes_the_first_of_duplicate_components() {
    let mut stage = Stage::new(size(2, 2));
    let target = CellCoord::new(0, 1);

    let first = add(&mut stage, target);
    let second = add(&mut stage, target);
    let first_id = match first.as_slice() {
        [Event::ComponentAdded { component, .. }] => *component,
        other => panic!("expected ComponentAdded, got {other:?}"),
    };
    let second_id = match second.as_slice() {
        [Event::ComponentAdded { component, .. }] => *component,
        other => panic!("expected ComponentAdded, got {other:?}"),
    };

    let mut events = Vec::new();
    apply(
        &mut stage,
        Command::RemoveComponentByKind {
            cell: target,
            kind: ComponentKind::EnemySpawner,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::ComponentRemoved {
            cell: target,
            component: first_id,
            kind: ComponentKind::EnemySpawner,
        }]
    );
    let remaining = query::cell(&stage, target).expect("in bounds").components();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), second_id);
}

#[test]
fn removal_misses_are_reported_and_recoverable() {
    let mut stage = Stage::new(size(2, 2));
    let target = CellCoord::new(1, 0);
    let mut events = Vec::new();

    apply(
        &mut stage,
        Command::RemoveComponentByKind {
            cell: target,
            kind: ComponentKind::EnemySpawner,
        },
        &mut events,
    );
    apply(
        &mut stage,
        Command::RemoveComponentById {
            cell: target,
            component: ComponentId::new(99),
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::ComponentRemovalRejected {
                cell: target,
                reason: ComponentRemovalError::MissingKind {
                    kind: ComponentKind::EnemySpawner,
                },
            },
            Event::ComponentRemovalRejected {
                cell: target,
                reason: ComponentRemovalError::MissingComponent {
                    component: ComponentId::new(99),
                },
            },
        ]
    );

    // The stage remains usable after the misses.
    let events = add(&mut stage, target);
    assert!(matches!(events.as_slice(), [Event::ComponentAdded { .. }]));
}

#[test]
fn out_of_bounds_component_requests_are_rejected() {
    let mut stage = Stage::new(size(2, 2));
    let outside = CellCoord::new(5, 5);
    let mut events = Vec::new();

    apply(
        &mut stage,
        Command::AddComponent {
            cell: outside,
            kind: ComponentKind::EnemySpawner,
        },
        &mut events,
    );
    apply(
        &mut stage,
        Command::RemoveComponentByKind {
            cell: outside,
            kind: ComponentKind::EnemySpawner,
        },
        &mut events,
    );

    assert!(matches!(
        events.as_slice(),
        [
            Event::ComponentAdditionRejected { .. },
            Event::ComponentRemovalRejected { .. },
        ]
    ));
}

#[test]
fn removal_by_id_detaches_the_exact_component() {
    let mut stage = Stage::new(size(2, 2));
    let target = CellCoord::new(0, 0);

    let first = add(&mut stage, target);
    let second = add(&mut stage, target);
    let first_id = match first.as_slice() {
        [Event::ComponentAdded { component, .. }] => *component,
        other => panic!("expected ComponentAdded, got {other:?}"),
    };
    let second_id = match second.as_slice() {
        [Event::ComponentAdded { component, .. }] => *component,
        other => panic!("expected ComponentAdded, got {other:?}"),
    };

    let mut events = Vec::new();
    apply(
        &mut stage,
        Command::RemoveComponentById {
            cell: target,
            component: second_id,
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::ComponentRemoved {
            cell: target,
            component: second_id,
            kind: ComponentKind::EnemySpawner,
        }]
    );
    let remaining = query::cell(&stage, target).expect("in bounds").components();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id(), first_id);
}

#[test]
fn started_stage_ticks_spawners_through_the_cells() {
    let mut stage = Stage::new(size(3, 2));
    let target = CellCoord::new(2, 0);
    let mut events = Vec::new();

    apply(&mut stage, Command::Start, &mut events);
    let added = add(&mut stage, target);
    let component = match added.as_slice() {
        [Event::ComponentAdded { component, .. }] => *component,
        other => panic!("expected ComponentAdded, got {other:?}"),
    };

    let interval = match query::cell(&stage, target).expect("in bounds").components()[0].state() {
        cellstage_grid::ComponentState::EnemySpawner(spawner) => spawner.interval(),
    };

    events.clear();
    let ticks = interval * 2;
    for _ in 0..ticks {
        apply(&mut stage, Command::Tick, &mut events);
    }

    let mut spawns = Vec::new();
    for event in &events {
        if let Event::EnemySpawnRequested { cell, component } = event {
            spawns.push((*cell, *component));
        }
    }

    assert_eq!(
        spawns,
        vec![(target, component), (target, component)],
        "a spawner fires once per elapsed interval",
    );
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::TickCompleted))
            .count(),
        ticks as usize
    );
}
