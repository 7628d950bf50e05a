#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;

use contract_core::group_bus::GroupSignal;
use contract_core::sync::{EchoState, FieldChange, SuppressReason};
use contract_core::{
    ChangeOutcome, ContractData, ContractEngine, SurfaceId, SurfaceWidget, Template, WidgetInputs,
};
use serde_json::json;

/// Widget that fires a change event for every value written into it, the
/// way real form libraries do.
struct EchoingWidget {
    shown: Rc<RefCell<WidgetInputs>>,
    writes: Rc<RefCell<usize>>,
}

impl SurfaceWidget for EchoingWidget {
    fn write_values(&mut self, values: &WidgetInputs) -> Vec<FieldChange> {
        *self.writes.borrow_mut() += 1;
        let mut shown = self.shown.borrow_mut();
        values
            .iter()
            .map(|(field, value)| {
                shown.insert(field.clone(), value.clone());
                FieldChange {
                    field: field.clone(),
                    value: Some(value.clone()),
                }
            })
            .collect()
    }
}

struct Harness {
    shown: Rc<RefCell<WidgetInputs>>,
    writes: Rc<RefCell<usize>>,
}

impl Harness {
    fn new() -> (Self, Box<dyn SurfaceWidget>) {
        let shown = Rc::new(RefCell::new(WidgetInputs::new()));
        let writes = Rc::new(RefCell::new(0));
        let widget = EchoingWidget {
            shown: Rc::clone(&shown),
            writes: Rc::clone(&writes),
        };
        (Self { shown, writes }, Box::new(widget))
    }

    fn value(&self, field: &str) -> String {
        self.shown.borrow().get(field).cloned().unwrap_or_default()
    }
}

fn engine() -> ContractEngine {
    ContractEngine::from_template(&Template::from_value(&json!({
        "schemas": [[
            { "name": "buyer.name", "type": "text", "required": true },
            { "name": "payment.cash", "type": "radioGroupOption", "group": "payment_group", "required": true },
            { "name": "payment.check", "type": "radioGroupOption", "group": "payment_group", "required": true }
        ]]
    })))
}

#[test]
fn edit_on_one_surface_reaches_the_other_exactly_once() {
    let mut session = engine().session(ContractData::new());
    let (canvas, canvas_widget) = Harness::new();
    let (form, form_widget) = Harness::new();
    session.mount(SurfaceId::Canvas, canvas_widget);
    session.mount(SurfaceId::Form, form_widget);
    session.tick();
    assert_eq!(session.version(), 0);

    let form_writes_before = *form.writes.borrow();
    let outcome = session.handle_change(SurfaceId::Canvas, "buyer.name", Some("Jane"));
    match outcome {
        ChangeOutcome::Applied { version, .. } => assert_eq!(version, 1),
        other => panic!("expected applied edit, got {other:?}"),
    }

    assert_eq!(session.version(), 1);
    assert_eq!(session.record().get("buyer.name"), Some("Jane"));
    assert_eq!(form.value("buyer.name"), "Jane");
    assert_eq!(*form.writes.borrow(), form_writes_before + 1);

    let form_stats = session.surface_stats(SurfaceId::Form).unwrap();
    assert_eq!(form_stats.emitted, 0);
    assert!(form_stats.suppressed > 0);

    let canvas_stats = session.surface_stats(SurfaceId::Canvas).unwrap();
    assert_eq!(canvas_stats.emitted, 1);
    assert_eq!(canvas.value("buyer.name"), "");
}

#[test]
fn option_selection_mirrors_exclusively_without_feedback() {
    let mut session = engine().session(ContractData::new());
    let (canvas, canvas_widget) = Harness::new();
    let (form, form_widget) = Harness::new();
    session.mount(SurfaceId::Canvas, canvas_widget);
    session.mount(SurfaceId::Form, form_widget);

    session.handle_change(SurfaceId::Form, "payment.cash", Some("true"));
    session.tick();
    assert_eq!(session.record().get("payment_group"), Some("payment.cash"));
    assert_eq!(canvas.value("payment.cash"), "payment.cash");
    assert_eq!(canvas.value("payment.check"), "");

    session.handle_change(SurfaceId::Canvas, "payment.check", Some("true"));
    session.tick();
    assert_eq!(session.version(), 2);
    assert_eq!(session.record().get("payment_group"), Some("payment.check"));
    assert_eq!(form.value("payment.cash"), "");
    assert_eq!(form.value("payment.check"), "payment.check");
    assert_eq!(canvas.value("payment.cash"), "");
    assert!(session.unfilled().unfilled_fields.iter().all(|e| e.name != "payment_group"));
}

#[test]
fn readback_within_the_same_tick_is_dropped() {
    let mut session = engine().session(ContractData::new());
    let (_canvas, canvas_widget) = Harness::new();
    session.mount(SurfaceId::Canvas, canvas_widget);
    session.tick();

    session.handle_change(SurfaceId::Canvas, "buyer.name", Some("Jane"));
    assert_eq!(
        session.surface_state(SurfaceId::Canvas),
        Some(EchoState::EmittingLocal)
    );
    assert_eq!(
        session.handle_change(SurfaceId::Canvas, "buyer.name", Some("Jane")),
        ChangeOutcome::Suppressed(SuppressReason::Readback)
    );

    session.tick();
    assert_eq!(session.surface_state(SurfaceId::Canvas), Some(EchoState::Idle));
    assert_eq!(
        session.handle_change(SurfaceId::Canvas, "buyer.name", Some("Jane")),
        ChangeOutcome::Unchanged
    );
    assert_eq!(session.version(), 1);
}

#[test]
fn group_signals_are_scoped_and_unmount_stops_mirroring() {
    let mut session = engine().session(ContractData::new());
    let (_canvas, canvas_widget) = Harness::new();
    let (form, form_widget) = Harness::new();
    session.mount(SurfaceId::Canvas, canvas_widget);
    session.mount(SurfaceId::Form, form_widget);

    let signals: Rc<RefCell<Vec<GroupSignal>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&signals);
    session
        .bus_mut()
        .subscribe("payment_group", move |s| sink.borrow_mut().push(s.clone()));

    session.handle_change(SurfaceId::Canvas, "buyer.name", Some("Jane"));
    assert!(signals.borrow().is_empty());

    session.handle_change(SurfaceId::Canvas, "payment.check", Some("true"));
    assert_eq!(
        signals.borrow().as_slice(),
        &[GroupSignal {
            group_key: "payment_group".to_string(),
            selected: Some("payment.check".to_string()),
        }]
    );

    assert!(session.unmount(SurfaceId::Form));
    assert!(!session.unmount(SurfaceId::Form));
    let writes = *form.writes.borrow();
    session.tick();
    session.handle_change(SurfaceId::Canvas, "buyer.name", Some("Janet"));
    assert_eq!(*form.writes.borrow(), writes);
    assert_eq!(
        session.handle_change(SurfaceId::Form, "buyer.name", Some("x")),
        ChangeOutcome::Suppressed(SuppressReason::UnknownSurface)
    );
}

#[test]
fn mount_pushes_existing_record() {
    let data: ContractData = [("buyer.name", "Jane"), ("payment_group", "payment.cash")]
        .into_iter()
        .collect();
    let mut session = engine().session(data);
    let (form, form_widget) = Harness::new();
    session.mount(SurfaceId::Form, form_widget);

    assert_eq!(form.value("buyer.name"), "Jane");
    assert_eq!(form.value("payment.cash"), "payment.cash");
    assert_eq!(session.version(), 0);
    assert_eq!(session.surface_state(SurfaceId::Form), Some(EchoState::Idle));
    let stats = session.surface_stats(SurfaceId::Form).unwrap();
    assert_eq!(stats.external_applied, 1);
    assert_eq!(stats.emitted, 0);
}
