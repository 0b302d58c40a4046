use cellstage_core::{CellCoord, CellStatus, Command, ComponentKind, Event};
use cellstage_system_authoring::{Authoring, AuthoringInput};

#[test]
fn cursor_moves_emit_only_changed_axes_x_first() {
    let mut authoring = Authoring::new();
    let mut commands = Vec::new();

    authoring.handle(
        &[],
        AuthoringInput {
            cursor: Some(CellCoord::new(3, 2)),
            ..AuthoringInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::SetCursorX { x: 3 }, Command::SetCursorY { y: 2 }],
        "a diagonal move is two sequential transitions",
    );
    assert_eq!(authoring.cursor(), CellCoord::new(3, 2));
}

#[test]
fn settled_cursor_emits_nothing() {
    let mut authoring = Authoring::new();
    let mut commands = Vec::new();

    authoring.handle(
        &[],
        AuthoringInput {
            cursor: Some(CellCoord::new(0, 0)),
            ..AuthoringInput::default()
        },
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn single_axis_move_emits_a_single_transition() {
    let mut authoring = Authoring::new();
    let mut commands = Vec::new();

    authoring.handle(
        &[],
        AuthoringInput {
            cursor: Some(CellCoord::new(0, 4)),
            ..AuthoringInput::default()
        },
        &mut commands,
    );

    assert_eq!(commands, vec![Command::SetCursorY { y: 4 }]);
}

#[test]
fn selection_events_resync_the_cached_cursor() {
    let mut authoring = Authoring::new();
    let mut commands = Vec::new();

    // The stage reports an externally driven move; requesting the same
    // position afterwards must not replay it.
    authoring.handle(
        &[Event::SelectionChanged {
            old: CellCoord::new(0, 0),
            new: CellCoord::new(5, 1),
        }],
        AuthoringInput {
            cursor: Some(CellCoord::new(5, 1)),
            ..AuthoringInput::default()
        },
        &mut commands,
    );

    assert!(commands.is_empty());
    assert_eq!(authoring.cursor(), CellCoord::new(5, 1));
}

#[test]
fn edits_target_the_cell_under_the_cursor() {
    let mut authoring = Authoring::new();
    let mut commands = Vec::new();

    authoring.handle(
        &[],
        AuthoringInput {
            cursor: Some(CellCoord::new(2, 1)),
            set_status: Some(CellStatus::MOVABLE),
            add_component: Some(ComponentKind::EnemySpawner),
            ..AuthoringInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::SetCursorX { x: 2 },
            Command::SetCursorY { y: 1 },
            Command::SetCellStatus {
                cell: CellCoord::new(2, 1),
                status: CellStatus::MOVABLE,
            },
            Command::AddComponent {
                cell: CellCoord::new(2, 1),
                kind: ComponentKind::EnemySpawner,
            },
        ]
    );
}

#[test]
fn resize_requests_precede_cursor_transitions() {
    let mut authoring = Authoring::new();
    let mut commands = Vec::new();

    authoring.handle(
        &[],
        AuthoringInput {
            resize: Some((6, 4)),
            cursor: Some(CellCoord::new(1, 0)),
            remove_component: Some(ComponentKind::EnemySpawner),
            ..AuthoringInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![
            Command::ResizeGrid {
                width: 6,
                height: 4,
            },
            Command::SetCursorX { x: 1 },
            Command::RemoveComponentByKind {
                cell: CellCoord::new(1, 0),
                kind: ComponentKind::EnemySpawner,
            },
        ]
    );
}
