//! Cross-surface synchronisation.
//!
//! Two editing surfaces (the canvas and the form) observe one canonical
//! record. An edit from either surface is turned into a patch by the update
//! engine, merged shallowly into the record, and mirrored into every other
//! mounted surface. Each surface carries an [`EchoGuard`]:
//!
//! - `Idle -> EmittingLocal` when the surface emits an edit. It stays there
//!   until the host's deferred [`SyncSession::tick`], because the widget may
//!   read the field straight back after the write; readbacks seen in this
//!   state are dropped.
//! - `Idle -> ApplyingExternal -> Idle` while a mirrored update is pushed
//!   into the surface. Any change event the widget fires during that push is
//!   dropped, so the mirror never emits a patch of its own.
//!
//! Net effect: one edit updates the record once, reaches each other surface
//! once, and never comes back to its origin as a second edit.

use tracing::{debug, trace};

use crate::group_bus::{GroupBus, GroupSignal};
use crate::index::SchemaIndex;
use crate::radio::{widget_inputs, WidgetInputs};
use crate::record::ContractData;
use crate::unfilled::{unfilled, UnfilledReport};
use crate::update::{compute_update, Patch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceId {
    Canvas,
    Form,
}

impl SurfaceId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::Form => "form",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoState {
    #[default]
    Idle,
    EmittingLocal,
    ApplyingExternal,
}

/// Per-surface echo-suppression state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EchoGuard {
    state: EchoState,
    resume: EchoState,
}

impl EchoGuard {
    #[must_use]
    pub fn state(&self) -> EchoState {
        self.state
    }

    /// Enter `EmittingLocal`. Refused while an external update is applied.
    pub fn begin_local(&mut self) -> bool {
        match self.state {
            EchoState::ApplyingExternal => false,
            EchoState::Idle | EchoState::EmittingLocal => {
                self.state = EchoState::EmittingLocal;
                true
            }
        }
    }

    /// Deferred tick: a settled local emission returns to `Idle`.
    pub fn settle(&mut self) {
        if self.state == EchoState::EmittingLocal {
            self.state = EchoState::Idle;
        }
    }

    /// Enter `ApplyingExternal`. Not re-entrant.
    pub fn begin_external(&mut self) -> bool {
        if self.state == EchoState::ApplyingExternal {
            return false;
        }
        self.resume = self.state;
        self.state = EchoState::ApplyingExternal;
        true
    }

    /// Leave `ApplyingExternal`, back to whatever state it interrupted.
    pub fn end_external(&mut self) {
        if self.state == EchoState::ApplyingExternal {
            self.state = self.resume;
            self.resume = EchoState::Idle;
        }
    }
}

/// A change event reported by a rendering widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: String,
    pub value: Option<String>,
}

/// The rendering widget behind one surface.
pub trait SurfaceWidget {
    /// Write values into the widget. Widgets may fire change events
    /// synchronously while being written to; they are returned here and
    /// routed back through the session's guards.
    fn write_values(&mut self, values: &WidgetInputs) -> Vec<FieldChange>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceStats {
    /// Edits from this surface that changed the record.
    pub emitted: usize,
    /// Change events dropped by the guard.
    pub suppressed: usize,
    /// Mirrored updates pushed into this surface.
    pub external_applied: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    UnknownSurface,
    /// The surface is applying an externally originated update.
    ApplyingExternal,
    /// The widget read back a value the surface just emitted.
    Readback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    Applied { patch: Patch, version: u64 },
    /// The edit produced no change to the record.
    Unchanged,
    Suppressed(SuppressReason),
}

struct Surface {
    id: SurfaceId,
    widget: Box<dyn SurfaceWidget>,
    guard: EchoGuard,
    view: WidgetInputs,
    stats: SurfaceStats,
}

/// Owns the canonical record and mediates every write to it.
pub struct SyncSession {
    index: SchemaIndex,
    record: ContractData,
    surfaces: Vec<Surface>,
    bus: GroupBus,
    version: u64,
}

impl SyncSession {
    #[must_use]
    pub fn new(index: SchemaIndex, record: ContractData) -> Self {
        Self {
            index,
            record,
            surfaces: Vec::new(),
            bus: GroupBus::new(),
            version: 0,
        }
    }

    #[must_use]
    pub fn record(&self) -> &ContractData {
        &self.record
    }

    #[must_use]
    pub fn index(&self) -> &SchemaIndex {
        &self.index
    }

    /// Bumped once per edit that changed the record.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn bus_mut(&mut self) -> &mut GroupBus {
        &mut self.bus
    }

    #[must_use]
    pub fn unfilled(&self) -> UnfilledReport {
        unfilled(&self.index, &self.record)
    }

    /// Mount (or replace) a surface and push the current record into it.
    pub fn mount(&mut self, id: SurfaceId, widget: Box<dyn SurfaceWidget>) {
        self.surfaces.retain(|s| s.id != id);
        self.surfaces.push(Surface {
            id,
            widget,
            guard: EchoGuard::default(),
            view: WidgetInputs::new(),
            stats: SurfaceStats::default(),
        });
        debug!(surface = id.as_str(), "mounted surface");
        self.apply_external(id);
    }

    /// Drop a surface and everything derived for it.
    pub fn unmount(&mut self, id: SurfaceId) -> bool {
        let before = self.surfaces.len();
        self.surfaces.retain(|s| s.id != id);
        let removed = self.surfaces.len() != before;
        if removed {
            debug!(surface = id.as_str(), "unmounted surface");
        }
        removed
    }

    #[must_use]
    pub fn is_mounted(&self, id: SurfaceId) -> bool {
        self.surfaces.iter().any(|s| s.id == id)
    }

    #[must_use]
    pub fn surface_state(&self, id: SurfaceId) -> Option<EchoState> {
        self.surface(id).map(|s| s.guard.state())
    }

    #[must_use]
    pub fn surface_stats(&self, id: SurfaceId) -> Option<SurfaceStats> {
        self.surface(id).map(|s| s.stats)
    }

    /// Values a surface currently displays.
    #[must_use]
    pub fn surface_view(&self, id: SurfaceId) -> Option<&WidgetInputs> {
        self.surface(id).map(|s| &s.view)
    }

    /// Handle a change event fired by a surface's widget.
    pub fn handle_change(
        &mut self,
        origin: SurfaceId,
        field: &str,
        value: Option<&str>,
    ) -> ChangeOutcome {
        let Some(slot) = self.slot(origin) else {
            return ChangeOutcome::Suppressed(SuppressReason::UnknownSurface);
        };

        let surface = &mut self.surfaces[slot];
        if surface.guard.state() == EchoState::ApplyingExternal {
            surface.stats.suppressed += 1;
            trace!(surface = origin.as_str(), field, "dropping change during external apply");
            return ChangeOutcome::Suppressed(SuppressReason::ApplyingExternal);
        }
        if surface.guard.state() == EchoState::EmittingLocal
            && surface.view.get(field).map(String::as_str).unwrap_or("") == value.unwrap_or("")
        {
            surface.stats.suppressed += 1;
            trace!(surface = origin.as_str(), field, "dropping readback");
            return ChangeOutcome::Suppressed(SuppressReason::Readback);
        }
        surface.guard.begin_local();
        surface
            .view
            .insert(field.to_string(), value.unwrap_or_default().to_string());

        let patch = compute_update(&self.index, &self.record, field, value);
        if self.record.merge(&patch) == 0 {
            trace!(surface = origin.as_str(), field, "edit left record unchanged");
            return ChangeOutcome::Unchanged;
        }
        self.version += 1;
        self.surfaces[slot].stats.emitted += 1;
        debug!(
            surface = origin.as_str(),
            field,
            keys = patch.len(),
            version = self.version,
            "merged local edit"
        );

        self.publish_group_signals(&patch);
        self.refresh_origin(slot);

        let mirrors: Vec<SurfaceId> = self
            .surfaces
            .iter()
            .map(|s| s.id)
            .filter(|id| *id != origin)
            .collect();
        for id in mirrors {
            self.apply_external(id);
        }

        ChangeOutcome::Applied {
            patch,
            version: self.version,
        }
    }

    /// Deferred tick from the host event loop: settle local emissions.
    pub fn tick(&mut self) {
        for surface in &mut self.surfaces {
            surface.guard.settle();
        }
    }

    fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.iter().find(|s| s.id == id)
    }

    fn slot(&self, id: SurfaceId) -> Option<usize> {
        self.surfaces.iter().position(|s| s.id == id)
    }

    fn publish_group_signals(&mut self, patch: &Patch) {
        for key in patch.keys() {
            if !self.index.is_group_key(key) {
                continue;
            }
            let signal = GroupSignal {
                group_key: key.to_string(),
                selected: self.record.get(key).map(str::to_string),
            };
            self.bus.publish(&signal);
        }
    }

    /// Values the surface is not yet showing.
    fn pending_values(&self, slot: usize) -> WidgetInputs {
        let view = &self.surfaces[slot].view;
        widget_inputs(&self.index, &self.record)
            .into_iter()
            .filter(|(name, value)| view.get(name) != Some(value))
            .collect()
    }

    /// The origin already shows its own edit; push only what the edit
    /// changed elsewhere (cleared sibling options) while it is still in
    /// `EmittingLocal`, so readbacks of those writes are dropped too.
    fn refresh_origin(&mut self, slot: usize) {
        let pending = self.pending_values(slot);
        if pending.is_empty() {
            return;
        }
        let id = self.surfaces[slot].id;
        let events = self.write_into(slot, &pending);
        for event in events {
            self.handle_change(id, &event.field, event.value.as_deref());
        }
    }

    fn apply_external(&mut self, id: SurfaceId) {
        let Some(slot) = self.slot(id) else {
            return;
        };
        if !self.surfaces[slot].guard.begin_external() {
            trace!(surface = id.as_str(), "external apply already in progress");
            return;
        }

        let pending = self.pending_values(slot);
        if !pending.is_empty() {
            self.surfaces[slot].stats.external_applied += 1;
            debug!(surface = id.as_str(), values = pending.len(), "mirroring record");
            let events = self.write_into(slot, &pending);
            for event in events {
                self.handle_change(id, &event.field, event.value.as_deref());
            }
        }

        if let Some(slot) = self.slot(id) {
            self.surfaces[slot].guard.end_external();
        }
    }

    fn write_into(&mut self, slot: usize, values: &WidgetInputs) -> Vec<FieldChange> {
        let surface = &mut self.surfaces[slot];
        for (name, value) in values {
            surface.view.insert(name.clone(), value.clone());
        }
        surface.widget.write_values(values)
    }
}

impl std::fmt::Debug for SyncSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let surfaces: Vec<(SurfaceId, EchoState)> = self
            .surfaces
            .iter()
            .map(|s| (s.id, s.guard.state()))
            .collect();
        f.debug_struct("SyncSession")
            .field("version", &self.version)
            .field("record", &self.record)
            .field("surfaces", &surfaces)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_local_emission_settles_on_tick() {
        let mut guard = EchoGuard::default();
        assert_eq!(guard.state(), EchoState::Idle);
        assert!(guard.begin_local());
        assert_eq!(guard.state(), EchoState::EmittingLocal);
        assert!(guard.begin_local());
        guard.settle();
        assert_eq!(guard.state(), EchoState::Idle);
    }

    #[test]
    fn guard_external_apply_is_not_reentrant() {
        let mut guard = EchoGuard::default();
        assert!(guard.begin_external());
        assert!(!guard.begin_external());
        assert!(!guard.begin_local());
        guard.end_external();
        assert_eq!(guard.state(), EchoState::Idle);
    }

    #[test]
    fn guard_external_apply_resumes_pending_local_emission() {
        let mut guard = EchoGuard::default();
        guard.begin_local();
        assert!(guard.begin_external());
        assert_eq!(guard.state(), EchoState::ApplyingExternal);
        guard.end_external();
        assert_eq!(guard.state(), EchoState::EmittingLocal);
        guard.settle();
        assert_eq!(guard.state(), EchoState::Idle);
    }

    #[test]
    fn settle_does_not_interrupt_external_apply() {
        let mut guard = EchoGuard::default();
        guard.begin_external();
        guard.settle();
        assert_eq!(guard.state(), EchoState::ApplyingExternal);
    }
}
