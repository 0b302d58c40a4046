#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative stage state for the cellstage editor.
//!
//! The [`Stage`] owns a flat, row-major buffer of [`Cell`]s plus the edit
//! cursor used for selection. Adapters submit [`Command`] values through
//! [`apply`], which mutates the stage and pushes [`Event`] values describing
//! what happened; read access goes through the [`query`] module. Hover
//! notifications flow separately through the per-cell observer registry,
//! which is the seam consumed by presentation views.

mod cell;
mod component;

pub use cell::{Cell, HoverObserver, HoverSignal};
pub use component::{CellComponent, ComponentState, EnemySpawner};

use cellstage_core::{
    CellCoord, CellId, CellStatus, Command, ComponentAdditionError, ComponentId, ComponentKind,
    Event, GridSize, StatusChangeError, SubscribeError, SubscriberId,
};

/// The authoritative grid of cells addressed by the editor.
#[derive(Debug)]
pub struct Stage {
    size: GridSize,
    cells: Vec<Cell>,
    cursor: CellCoord,
    next_cell_id: u32,
    next_component_id: u32,
    started: bool,
}

impl Stage {
    /// Creates a stage of the provided size with empty cells.
    ///
    /// The edit cursor starts at the origin; no cell is hovered until the
    /// cursor first moves.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        let mut stage = Self {
            size,
            cells: Vec::new(),
            cursor: CellCoord::new(0, 0),
            next_cell_id: 0,
            next_component_id: 0,
            started: false,
        };
        let mut cells = Vec::with_capacity(size.cell_count());
        for _ in 0..size.cell_count() {
            cells.push(stage.fresh_cell());
        }
        stage.cells = cells;
        stage
    }

    /// Produces a new stage with the same dimensions, cursor and per-cell
    /// status flags.
    ///
    /// Cells are re-created through their shell-clone policy: status is
    /// copied, components, hover state and observers are not.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let mut duplicate = Self {
            size: self.size,
            cells: Vec::new(),
            cursor: self.cursor,
            next_cell_id: 0,
            next_component_id: 0,
            started: self.started,
        };
        let mut cells = Vec::with_capacity(self.cells.len());
        for source in &self.cells {
            let id = duplicate.allocate_cell_id();
            cells.push(source.clone_shell(id));
        }
        duplicate.cells = cells;
        duplicate
    }

    /// Registers a hover observer on the addressed cell.
    ///
    /// This is the entry point for presentation views; the returned handle
    /// is required to unsubscribe. Observers must be detached (or the cell
    /// disposed) before the view is torn down.
    ///
    /// # Errors
    ///
    /// Returns [`SubscribeError::CellOutOfBounds`] for coordinates outside
    /// the grid and [`SubscribeError::CellDisposed`] for terminal cells.
    pub fn subscribe_hover(
        &mut self,
        cell: CellCoord,
        observer: HoverObserver,
    ) -> Result<SubscriberId, SubscribeError> {
        match self.cell_at_mut(cell) {
            Some(target) => target.subscribe(observer),
            None => Err(SubscribeError::CellOutOfBounds { cell }),
        }
    }

    /// Removes a hover subscription, reporting whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`SubscribeError::CellOutOfBounds`] for coordinates outside
    /// the grid.
    pub fn unsubscribe_hover(
        &mut self,
        cell: CellCoord,
        subscriber: SubscriberId,
    ) -> Result<bool, SubscribeError> {
        match self.cell_at_mut(cell) {
            Some(target) => Ok(target.unsubscribe(subscriber)),
            None => Err(SubscribeError::CellOutOfBounds { cell }),
        }
    }

    fn allocate_cell_id(&mut self) -> CellId {
        let id = CellId::new(self.next_cell_id);
        self.next_cell_id += 1;
        id
    }

    fn allocate_component_id(&mut self) -> ComponentId {
        let id = ComponentId::new(self.next_component_id);
        self.next_component_id += 1;
        id
    }

    fn fresh_cell(&mut self) -> Cell {
        let id = self.allocate_cell_id();
        Cell::new(id)
    }

    fn cell_at(&self, coord: CellCoord) -> Option<&Cell> {
        let index = self.size.index_of(coord)?;
        self.cells.get(index)
    }

    fn cell_at_mut(&mut self, coord: CellCoord) -> Option<&mut Cell> {
        let index = self.size.index_of(coord)?;
        self.cells.get_mut(index)
    }

    /// Rebuilds the cell buffer for the new size.
    ///
    /// The new buffer is populated first: every new-bounds coordinate that
    /// was also in old bounds claims its old cell by move, preserving
    /// identity, components and hover state; the rest are freshly
    /// constructed. Old cells never claimed are disposed afterwards so no
    /// external hover subscription outlives its cell.
    fn resize(&mut self, new_size: GridSize, out_events: &mut Vec<Event>) {
        let old_size = self.size;
        let mut old_slots: Vec<Option<Cell>> =
            std::mem::take(&mut self.cells).into_iter().map(Some).collect();

        let mut cells = Vec::with_capacity(new_size.cell_count());
        for row in 0..new_size.height() {
            for column in 0..new_size.width() {
                let coord = CellCoord::new(column, row);
                let claimed = old_size
                    .index_of(coord)
                    .and_then(|index| old_slots.get_mut(index).and_then(Option::take));
                match claimed {
                    Some(cell) => cells.push(cell),
                    None => {
                        let cell = self.fresh_cell();
                        cells.push(cell);
                    }
                }
            }
        }

        self.cells = cells;
        self.size = new_size;

        for mut dropped in old_slots.into_iter().flatten() {
            dropped.dispose();
        }

        out_events.push(Event::GridResized {
            old: old_size,
            new: new_size,
        });
    }

    /// Applies a single-axis cursor transition.
    ///
    /// The selection notification is emitted before the hover pair so
    /// subscribers observe the transition before cell state settles.
    fn move_cursor(&mut self, new: CellCoord, out_events: &mut Vec<Event>) {
        let old = self.cursor;
        if new == old {
            return;
        }

        out_events.push(Event::SelectionChanged { old, new });
        if let Some(cell) = self.cell_at_mut(old) {
            cell.unhover();
        }
        if let Some(cell) = self.cell_at_mut(new) {
            cell.hover();
        }
        self.cursor = new;
    }

    fn set_status(&mut self, coord: CellCoord, status: CellStatus, out_events: &mut Vec<Event>) {
        match self.cell_at_mut(coord) {
            Some(cell) => {
                cell.set_status(status);
                out_events.push(Event::CellStatusChanged { cell: coord, status });
            }
            None => out_events.push(Event::StatusChangeRejected {
                cell: coord,
                reason: StatusChangeError::CellOutOfBounds { cell: coord },
            }),
        }
    }

    fn add_component(
        &mut self,
        coord: CellCoord,
        kind: ComponentKind,
        out_events: &mut Vec<Event>,
    ) {
        if !self.size.contains(coord) {
            out_events.push(Event::ComponentAdditionRejected {
                cell: coord,
                kind,
                reason: ComponentAdditionError::CellOutOfBounds { cell: coord },
            });
            return;
        }

        let id = self.allocate_component_id();
        let mut component = CellComponent::new(id, kind);
        if self.started {
            // Keeps "start before any update" for components installed late.
            component.start();
        }

        if let Some(cell) = self.cell_at_mut(coord) {
            let attached = cell.install(component);
            debug_assert!(attached.is_ok(), "fresh components attach exactly once");
            if attached.is_ok() {
                out_events.push(Event::ComponentAdded {
                    cell: coord,
                    component: id,
                    kind,
                });
            }
        }
    }

    fn remove_component_by_kind(
        &mut self,
        coord: CellCoord,
        kind: ComponentKind,
        out_events: &mut Vec<Event>,
    ) {
        match self.cell_at_mut(coord) {
            Some(cell) => match cell.remove_by_kind(kind) {
                Ok(removed) => out_events.push(Event::ComponentRemoved {
                    cell: coord,
                    component: removed.id(),
                    kind: removed.kind(),
                }),
                Err(reason) => {
                    out_events.push(Event::ComponentRemovalRejected { cell: coord, reason });
                }
            },
            None => out_events.push(Event::ComponentRemovalRejected {
                cell: coord,
                reason: cellstage_core::ComponentRemovalError::CellOutOfBounds { cell: coord },
            }),
        }
    }

    fn remove_component_by_id(
        &mut self,
        coord: CellCoord,
        component: ComponentId,
        out_events: &mut Vec<Event>,
    ) {
        match self.cell_at_mut(coord) {
            Some(cell) => match cell.remove_by_id(component) {
                Ok(removed) => out_events.push(Event::ComponentRemoved {
                    cell: coord,
                    component: removed.id(),
                    kind: removed.kind(),
                }),
                Err(reason) => {
                    out_events.push(Event::ComponentRemovalRejected { cell: coord, reason });
                }
            },
            None => out_events.push(Event::ComponentRemovalRejected {
                cell: coord,
                reason: cellstage_core::ComponentRemovalError::CellOutOfBounds { cell: coord },
            }),
        }
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        if self.started {
            return;
        }
        self.started = true;
        for cell in &mut self.cells {
            cell.start();
        }
        out_events.push(Event::StageStarted);
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        let size = self.size;
        for (index, cell) in self.cells.iter_mut().enumerate() {
            if let Some(coord) = size.coord_of(index) {
                cell.update(coord, out_events);
            }
        }
        out_events.push(Event::TickCompleted);
    }
}

/// Applies the provided command to the stage, mutating state deterministically.
///
/// Invalid requests never leave the stage partially mutated: validation
/// happens before any buffer is touched and failures surface as rejection
/// events.
pub fn apply(stage: &mut Stage, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ResizeGrid { width, height } => match GridSize::new(width, height) {
            Ok(size) => stage.resize(size, out_events),
            Err(reason) => out_events.push(Event::ResizeRejected {
                width,
                height,
                reason,
            }),
        },
        Command::SetCursorX { x } => {
            let new = stage.cursor.with_column(x);
            stage.move_cursor(new, out_events);
        }
        Command::SetCursorY { y } => {
            let new = stage.cursor.with_row(y);
            stage.move_cursor(new, out_events);
        }
        Command::SetCellStatus { cell, status } => stage.set_status(cell, status, out_events),
        Command::AddComponent { cell, kind } => stage.add_component(cell, kind, out_events),
        Command::RemoveComponentByKind { cell, kind } => {
            stage.remove_component_by_kind(cell, kind, out_events);
        }
        Command::RemoveComponentById { cell, component } => {
            stage.remove_component_by_id(cell, component, out_events);
        }
        Command::Start => stage.start(out_events),
        Command::Tick => stage.tick(out_events),
    }
}

/// Query functions that provide read-only access to the stage state.
pub mod query {
    use cellstage_core::{CellCoord, CellId, CellStatus, ComponentId, ComponentKind, GridSize};

    use super::{Cell, Stage};

    /// Provides the stage's current grid dimensions.
    #[must_use]
    pub fn grid_size(stage: &Stage) -> GridSize {
        stage.size
    }

    /// Provides the current edit cursor position.
    ///
    /// The cursor may lie outside the grid; the cell under it is then
    /// simply absent.
    #[must_use]
    pub fn cursor(stage: &Stage) -> CellCoord {
        stage.cursor
    }

    /// Reports whether the stage has started.
    #[must_use]
    pub fn is_started(stage: &Stage) -> bool {
        stage.started
    }

    /// Bounds-checked cell lookup; absent for out-of-bounds coordinates.
    #[must_use]
    pub fn cell(stage: &Stage, coord: CellCoord) -> Option<&Cell> {
        stage.cell_at(coord)
    }

    /// Captures a read-only snapshot of every cell in buffer order.
    #[must_use]
    pub fn stage_view(stage: &Stage) -> StageView {
        let cells = stage
            .cells
            .iter()
            .enumerate()
            .map(|(index, cell)| CellSnapshot {
                id: cell.id(),
                coord: stage
                    .size
                    .coord_of(index)
                    .unwrap_or(CellCoord::new(0, 0)),
                status: cell.status(),
                hovered: cell.is_hovered(),
                components: cell
                    .components()
                    .iter()
                    .map(|component| ComponentSnapshot {
                        id: component.id(),
                        kind: component.kind(),
                        owner: component.owner(),
                    })
                    .collect(),
            })
            .collect();
        StageView {
            size: stage.size,
            cursor: stage.cursor,
            cells,
        }
    }

    /// Read-only snapshot describing the whole stage.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct StageView {
        /// Grid dimensions at capture time.
        pub size: GridSize,
        /// Edit cursor position at capture time.
        pub cursor: CellCoord,
        /// Cell snapshots in row-major buffer order.
        pub cells: Vec<CellSnapshot>,
    }

    /// Immutable representation of a single cell's state.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct CellSnapshot {
        /// Identifier carried by the cell.
        pub id: CellId,
        /// Coordinate the cell occupies.
        pub coord: CellCoord,
        /// Status flags carried by the cell.
        pub status: CellStatus,
        /// Hover state at capture time.
        pub hovered: bool,
        /// Attached components in insertion order.
        pub components: Vec<ComponentSnapshot>,
    }

    /// Immutable representation of a single attached component.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ComponentSnapshot {
        /// Identifier carried by the component.
        pub id: ComponentId,
        /// Variant of the component.
        pub kind: ComponentKind,
        /// Cell the component is attached to.
        pub owner: Option<CellId>,
    }
}
