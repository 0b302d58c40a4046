//! Cells and their hover observer registry.

use std::fmt;

use cellstage_core::{
    AttachError, CellCoord, CellId, CellStatus, ComponentId, ComponentKind,
    ComponentRemovalError, Event, SubscribeError, SubscriberId,
};

use crate::component::CellComponent;

/// Signal delivered to hover observers when a cell's hover state changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverSignal {
    /// The cell became the hovered cell.
    Hovered,
    /// The cell stopped being the hovered cell.
    Unhovered,
}

/// Callback registered by a view to observe a cell's hover transitions.
pub type HoverObserver = Box<dyn FnMut(HoverSignal)>;

/// Registry mapping subscriber handles to hover callbacks.
///
/// Entries are kept in subscription order so notification order is
/// deterministic.
#[derive(Default)]
struct HoverObservers {
    entries: Vec<(SubscriberId, HoverObserver)>,
}

impl HoverObservers {
    fn subscribe(&mut self, subscriber: SubscriberId, observer: HoverObserver) {
        self.entries.push((subscriber, observer));
    }

    fn unsubscribe(&mut self, subscriber: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != subscriber);
        self.entries.len() != before
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn emit(&mut self, signal: HoverSignal) {
        for (_, observer) in &mut self.entries {
            observer(signal);
        }
    }
}

impl fmt::Debug for HoverObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoverObservers")
            .field("subscribers", &self.entries.len())
            .finish()
    }
}

/// One addressable grid position, owning status flags, behaviour components
/// and hover state.
///
/// Cells are created and owned exclusively by their [`Stage`](crate::Stage);
/// identity is carried by [`CellId`] and survives a resize while the cell's
/// coordinate stays in bounds.
#[derive(Debug)]
pub struct Cell {
    id: CellId,
    status: CellStatus,
    components: Vec<CellComponent>,
    hovered: bool,
    observers: HoverObservers,
    next_subscriber: u32,
    disposed: bool,
}

impl Cell {
    pub(crate) fn new(id: CellId) -> Self {
        Self {
            id,
            status: CellStatus::empty(),
            components: Vec::new(),
            hovered: false,
            observers: HoverObservers::default(),
            next_subscriber: 0,
            disposed: false,
        }
    }

    /// Identifier assigned to the cell by its stage.
    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// Status flags currently carried by the cell.
    #[must_use]
    pub const fn status(&self) -> CellStatus {
        self.status
    }

    /// Result of the most recent hover or unhover call.
    #[must_use]
    pub const fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Reports whether the cell was disposed and is therefore terminal.
    #[must_use]
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Components attached to the cell, in insertion order.
    #[must_use]
    pub fn components(&self) -> &[CellComponent] {
        &self.components
    }

    pub(crate) fn set_status(&mut self, status: CellStatus) {
        self.status = status;
    }

    /// Marks the cell hovered and notifies every observer.
    ///
    /// There is no double-hover guard: calling this twice notifies twice.
    pub(crate) fn hover(&mut self) {
        self.hovered = true;
        self.observers.emit(HoverSignal::Hovered);
    }

    /// Marks the cell unhovered and notifies every observer.
    pub(crate) fn unhover(&mut self) {
        self.hovered = false;
        self.observers.emit(HoverSignal::Unhovered);
    }

    /// Detaches every observer, then forces the cell to unhovered.
    ///
    /// Observers are cleared before the forced unhover, so none of them see
    /// the final transition. A disposed cell accepts no new subscribers.
    pub(crate) fn dispose(&mut self) {
        self.observers.clear();
        if !self.disposed {
            self.disposed = true;
            self.unhover();
        }
    }

    /// Registers a hover observer and returns its subscription handle.
    ///
    /// # Errors
    ///
    /// Returns [`SubscribeError::CellDisposed`] when the cell was disposed.
    pub fn subscribe(&mut self, observer: HoverObserver) -> Result<SubscriberId, SubscribeError> {
        if self.disposed {
            return Err(SubscribeError::CellDisposed { cell: self.id });
        }
        let subscriber = SubscriberId::new(self.next_subscriber);
        self.next_subscriber += 1;
        self.observers.subscribe(subscriber, observer);
        Ok(subscriber)
    }

    /// Removes a hover subscription, reporting whether it existed.
    pub fn unsubscribe(&mut self, subscriber: SubscriberId) -> bool {
        self.observers.unsubscribe(subscriber)
    }

    /// Attaches the component to this cell and appends it in sequence order.
    pub(crate) fn install(&mut self, mut component: CellComponent) -> Result<(), AttachError> {
        component.attach(self.id)?;
        self.components.push(component);
        Ok(())
    }

    /// Removes the first component of the given kind in insertion order.
    pub(crate) fn remove_by_kind(
        &mut self,
        kind: ComponentKind,
    ) -> Result<CellComponent, ComponentRemovalError> {
        let position = self
            .components
            .iter()
            .position(|component| component.kind() == kind)
            .ok_or(ComponentRemovalError::MissingKind { kind })?;
        Ok(self.components.remove(position))
    }

    /// Removes a specific component by identity.
    pub(crate) fn remove_by_id(
        &mut self,
        component: ComponentId,
    ) -> Result<CellComponent, ComponentRemovalError> {
        let position = self
            .components
            .iter()
            .position(|candidate| candidate.id() == component)
            .ok_or(ComponentRemovalError::MissingComponent { component })?;
        Ok(self.components.remove(position))
    }

    /// Forwards `start` to every component in insertion order.
    pub(crate) fn start(&mut self) {
        for component in &mut self.components {
            component.start();
        }
    }

    /// Forwards `update` to every component in insertion order.
    pub(crate) fn update(&mut self, coord: CellCoord, out_events: &mut Vec<Event>) {
        for component in &mut self.components {
            component.update(coord, out_events);
        }
    }

    /// Produces a fresh cell carrying only this cell's status flags.
    ///
    /// Components hold an owner back-reference that must point at the new
    /// cell, so they are left for the caller to re-attach; hover state and
    /// observers are never carried.
    #[must_use]
    pub(crate) fn clone_shell(&self, id: CellId) -> Self {
        let mut shell = Self::new(id);
        shell.status = self.status;
        shell
    }
}
