#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure authoring system that distils editor input into stage commands.
//!
//! The system never touches the stage directly: it consumes the event
//! stream plus an [`AuthoringInput`] snapshot and responds with a command
//! batch, leaving execution to the stage's `apply` entry point.

use cellstage_core::{CellCoord, CellStatus, Command, ComponentKind, Event};

/// Input snapshot distilled from adapter-provided editor interactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuthoringInput {
    /// Position the edit cursor should occupy after this frame.
    pub cursor: Option<CellCoord>,
    /// Requested grid dimensions, if the user confirmed a resize.
    pub resize: Option<(u32, u32)>,
    /// Status flags to assign to the cell under the cursor.
    pub set_status: Option<CellStatus>,
    /// Component kind to attach to the cell under the cursor.
    pub add_component: Option<ComponentKind>,
    /// Component kind to detach from the cell under the cursor.
    pub remove_component: Option<ComponentKind>,
}

/// Authoring system that turns input snapshots into command batches.
///
/// The cursor is cached so only changed axes emit transitions, x before y;
/// diagonal moves therefore become two sequential commands. The cache
/// re-syncs from observed [`Event::SelectionChanged`] events so externally
/// driven moves are not replayed.
#[derive(Clone, Debug)]
pub struct Authoring {
    cursor: CellCoord,
}

impl Default for Authoring {
    fn default() -> Self {
        Self::new()
    }
}

impl Authoring {
    /// Creates a new authoring system with the cursor cached at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: CellCoord::new(0, 0),
        }
    }

    /// Cursor position the system currently believes the stage holds.
    #[must_use]
    pub const fn cursor(&self) -> CellCoord {
        self.cursor
    }

    /// Consumes stage events and editor input to emit stage commands.
    pub fn handle(&mut self, events: &[Event], input: AuthoringInput, out: &mut Vec<Command>) {
        for event in events {
            if let Event::SelectionChanged { new, .. } = event {
                self.cursor = *new;
            }
        }

        if let Some((width, height)) = input.resize {
            out.push(Command::ResizeGrid { width, height });
        }

        if let Some(target) = input.cursor {
            if target.column() != self.cursor.column() {
                out.push(Command::SetCursorX { x: target.column() });
            }
            if target.row() != self.cursor.row() {
                out.push(Command::SetCursorY { y: target.row() });
            }
            self.cursor = target;
        }

        let edited = self.cursor;
        if let Some(status) = input.set_status {
            out.push(Command::SetCellStatus {
                cell: edited,
                status,
            });
        }
        if let Some(kind) = input.add_component {
            out.push(Command::AddComponent { cell: edited, kind });
        }
        if let Some(kind) = input.remove_component {
            out.push(Command::RemoveComponentByKind { cell: edited, kind });
        }
    }
}
