//! Behaviour components attachable to stage cells.
//!
//! The component set is closed: [`ComponentState`] is a tagged union whose
//! construction and reflection matches are both exhaustive, so adding a
//! variant to [`ComponentKind`] forces both directions to be updated
//! together at compile time.

use cellstage_core::{AttachError, CellCoord, CellId, ComponentId, ComponentKind, Event};

/// Ticks a spawner waits between consecutive spawn requests.
const DEFAULT_SPAWN_INTERVAL: u32 = 3;

/// A unit of per-cell behaviour attached to exactly one cell at a time.
#[derive(Debug)]
pub struct CellComponent {
    id: ComponentId,
    owner: Option<CellId>,
    state: ComponentState,
}

impl CellComponent {
    pub(crate) fn new(id: ComponentId, kind: ComponentKind) -> Self {
        Self {
            id,
            owner: None,
            state: ComponentState::for_kind(kind),
        }
    }

    /// Identifier assigned to the component by its stage.
    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    /// Variant of the component, reflected from its state.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.state.kind()
    }

    /// Cell the component is attached to, once attached.
    #[must_use]
    pub const fn owner(&self) -> Option<CellId> {
        self.owner
    }

    /// Read access to the variant payload.
    #[must_use]
    pub const fn state(&self) -> &ComponentState {
        &self.state
    }

    /// Sets the owner back-reference.
    ///
    /// The back-reference is write-once for the component's lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AttachError::AlreadyAttached`] when an owner is already set.
    pub(crate) fn attach(&mut self, owner: CellId) -> Result<(), AttachError> {
        if let Some(existing) = self.owner {
            return Err(AttachError::AlreadyAttached {
                component: self.id,
                owner: existing,
            });
        }
        self.owner = Some(owner);
        Ok(())
    }

    pub(crate) fn start(&mut self) {
        self.state.start();
    }

    pub(crate) fn update(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.state.update(self.id, cell, out_events);
    }
}

/// Variant payloads for the closed component set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ComponentState {
    /// Spawns enemies from the owning cell at a fixed tick interval.
    EnemySpawner(EnemySpawner),
}

impl ComponentState {
    /// Constructs the payload for a component kind.
    #[must_use]
    fn for_kind(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::EnemySpawner => {
                Self::EnemySpawner(EnemySpawner::new(DEFAULT_SPAWN_INTERVAL))
            }
        }
    }

    /// Reflects the component kind from the payload.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Self::EnemySpawner(_) => ComponentKind::EnemySpawner,
        }
    }

    fn start(&mut self) {
        match self {
            Self::EnemySpawner(spawner) => spawner.start(),
        }
    }

    fn update(&mut self, component: ComponentId, cell: CellCoord, out_events: &mut Vec<Event>) {
        match self {
            Self::EnemySpawner(spawner) => spawner.update(component, cell, out_events),
        }
    }
}

/// Counts logical ticks and requests an enemy spawn each time the configured
/// interval elapses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemySpawner {
    interval: u32,
    elapsed: u32,
    spawned: u32,
}

impl EnemySpawner {
    const fn new(interval: u32) -> Self {
        Self {
            interval,
            elapsed: 0,
            spawned: 0,
        }
    }

    /// Ticks the spawner waits between consecutive spawn requests.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Ticks accumulated toward the next spawn request.
    #[must_use]
    pub const fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Number of spawn requests emitted so far.
    #[must_use]
    pub const fn spawned(&self) -> u32 {
        self.spawned
    }

    fn start(&mut self) {
        self.elapsed = 0;
    }

    fn update(&mut self, component: ComponentId, cell: CellCoord, out_events: &mut Vec<Event>) {
        self.elapsed = self.elapsed.saturating_add(1);
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            self.spawned = self.spawned.saturating_add(1);
            out_events.push(Event::EnemySpawnRequested { cell, component });
        }
    }
}
