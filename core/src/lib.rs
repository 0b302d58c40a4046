#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the cellstage editor.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative stage, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the stage executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! views to react to deterministically. Everything here is plain data; the
//! behaviour lives in the `cellstage-grid` crate.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the editor boots.
pub const WELCOME_BANNER: &str = "Welcome to cellstage.";

/// Location of a single grid cell expressed as column and row coordinates.
///
/// The column is the x axis and varies fastest in buffer order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the coordinate with the column replaced.
    #[must_use]
    pub const fn with_column(&self, column: u32) -> Self {
        Self::new(column, self.row)
    }

    /// Returns the coordinate with the row replaced.
    #[must_use]
    pub const fn with_row(&self, row: u32) -> Self {
        Self::new(self.column, row)
    }
}

/// Validated dimensions of the stage grid.
///
/// Owns the row-major mapping between coordinates and flat buffer offsets:
/// `index = row * width + column`. The mapping is a bijection between
/// `[0, height) x [0, width)` and `[0, width * height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new grid size, rejecting zero dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`GridSizeError`] when either dimension is zero.
    pub const fn new(width: u32, height: u32) -> Result<Self, GridSizeError> {
        if width == 0 {
            return Err(GridSizeError::ZeroWidth);
        }
        if height == 0 {
            return Err(GridSizeError::ZeroHeight);
        }
        Ok(Self { width, height })
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells addressed by the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.width) * u64::from(self.height);
        usize::try_from(count).unwrap_or(0)
    }

    /// Reports whether the coordinate lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Maps an in-bounds coordinate to its flat buffer offset.
    #[must_use]
    pub fn index_of(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }

    /// Maps a flat buffer offset back to its coordinate.
    #[must_use]
    pub fn coord_of(&self, index: usize) -> Option<CellCoord> {
        if index >= self.cell_count() {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}

bitflags! {
    /// Authoring status flags attached to a cell.
    ///
    /// `CellStatus::empty()` marks a cell with no capabilities and
    /// `CellStatus::all()` grants every capability.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CellStatus: u8 {
        /// Units may traverse the cell.
        const MOVABLE = 1;
        /// A unit may be placed on the cell.
        const UNIT_PLACEABLE = 2;
    }
}

/// Closed set of behaviour component variants attachable to a cell.
///
/// Extending the set means adding a variant here and teaching the grid
/// crate's construction and reflection matches about it; both matches are
/// exhaustive, so the compiler enforces the pairing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Spawns enemies from the owning cell at a fixed tick interval.
    EnemySpawner,
}

/// Unique identifier assigned to a cell by its stage.
///
/// Identity is the observable notion of carryover: a resize that keeps a
/// coordinate in bounds keeps the cell's identifier, while a freshly
/// constructed cell receives a new one. Identifiers are never reused within
/// a single stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(u32);

impl CellId {
    /// Creates a new cell identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a behaviour component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(u32);

impl ComponentId {
    /// Creates a new component identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Handle returned when a view subscribes to a cell's hover notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriberId(u32);

impl SubscriberId {
    /// Creates a new subscriber identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible stage mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Resizes the grid, carrying over every cell that stays in bounds.
    ResizeGrid {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// Moves the edit cursor along the x axis.
    SetCursorX {
        /// Requested cursor column.
        x: u32,
    },
    /// Moves the edit cursor along the y axis.
    SetCursorY {
        /// Requested cursor row.
        y: u32,
    },
    /// Replaces the status flags of the addressed cell.
    SetCellStatus {
        /// Coordinate of the cell to update.
        cell: CellCoord,
        /// Flags the cell should carry afterwards.
        status: CellStatus,
    },
    /// Constructs a component of the given kind and attaches it to a cell.
    AddComponent {
        /// Coordinate of the cell receiving the component.
        cell: CellCoord,
        /// Variant of component to construct.
        kind: ComponentKind,
    },
    /// Removes the first component of the given kind in insertion order.
    RemoveComponentByKind {
        /// Coordinate of the cell to remove from.
        cell: CellCoord,
        /// Variant of component to remove.
        kind: ComponentKind,
    },
    /// Removes a specific component by identity.
    RemoveComponentById {
        /// Coordinate of the cell to remove from.
        cell: CellCoord,
        /// Identifier of the component to remove.
        component: ComponentId,
    },
    /// Starts the stage, forwarding `start` to every cell and component.
    Start,
    /// Advances the stage by one logical tick.
    Tick,
}

/// Events broadcast by the stage after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the stage started for the first time.
    StageStarted,
    /// Confirms that a logical tick ran to completion.
    TickCompleted,
    /// Confirms that the grid was resized.
    GridResized {
        /// Dimensions before the resize.
        old: GridSize,
        /// Dimensions after the resize.
        new: GridSize,
    },
    /// Reports that a resize request was rejected.
    ResizeRejected {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
        /// Specific reason the resize failed.
        reason: GridSizeError,
    },
    /// Announces that the edit cursor moved along one axis.
    SelectionChanged {
        /// Cursor position before the move.
        old: CellCoord,
        /// Cursor position after the move.
        new: CellCoord,
    },
    /// Confirms that a cell's status flags were replaced.
    CellStatusChanged {
        /// Coordinate of the updated cell.
        cell: CellCoord,
        /// Flags the cell carries after the change.
        status: CellStatus,
    },
    /// Reports that a status change request was rejected.
    StatusChangeRejected {
        /// Coordinate provided in the request.
        cell: CellCoord,
        /// Specific reason the change failed.
        reason: StatusChangeError,
    },
    /// Confirms that a component was attached to a cell.
    ComponentAdded {
        /// Coordinate of the owning cell.
        cell: CellCoord,
        /// Identifier assigned to the new component.
        component: ComponentId,
        /// Variant of the attached component.
        kind: ComponentKind,
    },
    /// Confirms that a component was detached from a cell.
    ComponentRemoved {
        /// Coordinate of the previously owning cell.
        cell: CellCoord,
        /// Identifier of the removed component.
        component: ComponentId,
        /// Variant of the removed component.
        kind: ComponentKind,
    },
    /// Reports that a component addition request was rejected.
    ComponentAdditionRejected {
        /// Coordinate provided in the request.
        cell: CellCoord,
        /// Variant requested for construction.
        kind: ComponentKind,
        /// Specific reason the addition failed.
        reason: ComponentAdditionError,
    },
    /// Reports that a component removal request was rejected.
    ComponentRemovalRejected {
        /// Coordinate provided in the request.
        cell: CellCoord,
        /// Specific reason the removal failed.
        reason: ComponentRemovalError,
    },
    /// Requests that a collaborator spawn an enemy at the cell.
    EnemySpawnRequested {
        /// Coordinate of the cell hosting the spawner.
        cell: CellCoord,
        /// Identifier of the spawner component that fired.
        component: ComponentId,
    },
}

/// Reasons a grid size or resize request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum GridSizeError {
    /// The requested width was zero.
    #[error("grid width must be positive")]
    ZeroWidth,
    /// The requested height was zero.
    #[error("grid height must be positive")]
    ZeroHeight,
}

/// Reasons a status change request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum StatusChangeError {
    /// The addressed coordinate lies outside the grid bounds.
    #[error("cell ({}, {}) is outside the grid", .cell.column(), .cell.row())]
    CellOutOfBounds {
        /// Coordinate provided in the request.
        cell: CellCoord,
    },
}

/// Reasons a component addition request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ComponentAdditionError {
    /// The addressed coordinate lies outside the grid bounds.
    #[error("cell ({}, {}) is outside the grid", .cell.column(), .cell.row())]
    CellOutOfBounds {
        /// Coordinate provided in the request.
        cell: CellCoord,
    },
}

/// Reasons a component removal request may be rejected.
///
/// Removal misses occur routinely during authoring (removing something
/// already removed), so they surface as rejection events rather than
/// failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ComponentRemovalError {
    /// The addressed coordinate lies outside the grid bounds.
    #[error("cell ({}, {}) is outside the grid", .cell.column(), .cell.row())]
    CellOutOfBounds {
        /// Coordinate provided in the request.
        cell: CellCoord,
    },
    /// The cell holds no component of the requested kind.
    #[error("no component of kind {kind:?} attached")]
    MissingKind {
        /// Variant requested for removal.
        kind: ComponentKind,
    },
    /// The cell holds no component with the requested identifier.
    #[error("no component with id {} attached", .component.get())]
    MissingComponent {
        /// Identifier requested for removal.
        component: ComponentId,
    },
}

/// Error raised when a component's owner back-reference is set twice.
///
/// The back-reference is write-once for the component's lifetime; a second
/// attach indicates a programming error and fails loudly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum AttachError {
    /// The component already carries an owner back-reference.
    #[error("component {} is already attached to cell {}", .component.get(), .owner.get())]
    AlreadyAttached {
        /// Identifier of the component whose attach was repeated.
        component: ComponentId,
        /// Cell the component is already attached to.
        owner: CellId,
    },
}

/// Reasons a hover subscription request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SubscribeError {
    /// The addressed coordinate lies outside the grid bounds.
    #[error("cell ({}, {}) is outside the grid", .cell.column(), .cell.row())]
    CellOutOfBounds {
        /// Coordinate provided in the request.
        cell: CellCoord,
    },
    /// The cell was disposed and accepts no further subscribers.
    #[error("cell {} was disposed", .cell.get())]
    CellDisposed {
        /// Identifier of the disposed cell.
        cell: CellId,
    },
}
