#![allow(clippy::expect_used, clippy::unwrap_used)]

use contract_core::{
    render_model, unfilled, ContractData, ContractEngine, FieldNavigator, NavigatorState,
    RenderItem, SchemaIndex, Template,
};
use serde_json::json;

fn purchase_template() -> serde_json::Value {
    json!({
        "basePdf": "data:application/pdf;base64,AAAA",
        "schemas": [
            [
                { "name": "buyer.name", "type": "text", "required": true,
                  "position": { "x": 10, "y": 40 } }
            ],
            [
                { "name": "payment.cash", "type": "radioGroupOption", "group": "payment_group",
                  "required": true, "position": { "x": 10, "y": 80 } },
                { "name": "payment.check", "type": "radioGroupOption", "group": "payment_group",
                  "required": true, "position": { "x": 60, "y": 80 } }
            ]
        ]
    })
}

fn unfilled_names(engine: &ContractEngine, data: &ContractData) -> Vec<String> {
    engine
        .unfilled(data)
        .unfilled_fields
        .into_iter()
        .map(|e| e.name)
        .collect()
}

#[test]
fn filling_a_purchase_contract_end_to_end() {
    let engine = ContractEngine::from_template(&Template::from_value(&purchase_template()));
    let mut data = ContractData::new();

    assert_eq!(unfilled_names(&engine, &data), vec!["buyer.name", "payment_group"]);

    let patch = engine.update(&data, "buyer.name", Some("Jane Doe"));
    data.merge(&patch);
    assert_eq!(unfilled_names(&engine, &data), vec!["payment_group"]);

    let patch = engine.update(&data, "payment.cash", Some("true"));
    data.merge(&patch);
    assert_eq!(data.get("payment_group"), Some("payment.cash"));

    let inputs = engine.widget_inputs(&data);
    assert_eq!(inputs["payment.cash"], "payment.cash");
    assert_eq!(inputs["payment.check"], "");

    let report = engine.unfilled(&data);
    assert!(report.unfilled_fields.is_empty());
    assert_eq!(report.filled_count, report.total_required);
    assert_eq!(report.progress_percent(), 100);
}

#[test]
fn switching_options_keeps_one_selection() {
    let engine = ContractEngine::from_template(&Template::from_value(&purchase_template()));
    let mut data = ContractData::new();

    for option in ["payment.cash", "payment.check", "payment.cash", "payment.check"] {
        data.merge(&engine.update(&data, option, Some("true")));
        let inputs = engine.widget_inputs(&data);
        let selected: Vec<&str> = ["payment.cash", "payment.check"]
            .into_iter()
            .filter(|name| !inputs[*name].is_empty())
            .collect();
        assert_eq!(selected, vec![option]);
    }

    data.merge(&engine.update(&data, "payment.cash", Some("false")));
    assert_eq!(data.get("payment_group"), Some("payment.check"));

    data.merge(&engine.update(&data, "payment.check", None));
    assert_eq!(data.get("payment_group"), None);
    assert_eq!(unfilled_names(&engine, &data), vec!["buyer.name", "payment_group"]);
}

#[test]
fn navigator_tracks_the_shrinking_list() {
    let engine = ContractEngine::from_template(&Template::from_value(&purchase_template()));
    let mut data = ContractData::new();
    let mut nav = engine.navigator(&data);
    assert_eq!(nav.position(), Some((1, 2)));

    nav.go_next();
    assert_eq!(nav.current().map(|e| e.name.as_str()), Some("payment_group"));

    data.merge(&engine.update(&data, "buyer.name", Some("Jane")));
    nav.refresh(engine.unfilled(&data).unfilled_fields);
    assert_eq!(nav.current().map(|e| e.name.as_str()), Some("payment_group"));
    assert_eq!(nav.position(), Some((1, 1)));

    data.merge(&engine.update(&data, "payment_group", Some("payment.check")));
    assert_eq!(
        nav.refresh(engine.unfilled(&data).unfilled_fields),
        NavigatorState::Inactive
    );
}

#[test]
fn page_scoped_render_shows_only_that_page() {
    let index = SchemaIndex::build(&Template::from_value(&purchase_template()));
    let data = ContractData::new();

    let page_one = render_model(&index, &data, Some(1));
    assert_eq!(page_one.sections.len(), 1);
    assert_eq!(page_one.sections[0].family, "buyer");
    assert_eq!(page_one.sections[0].title, "Buyer");

    let page_two = render_model(&index, &data, Some(2));
    assert_eq!(page_two.sections.len(), 1);
    match &page_two.sections[0].items[0] {
        RenderItem::GroupedOption { group_key, options, .. } => {
            assert_eq!(group_key, "payment_group");
            assert_eq!(options.len(), 2);
        }
        other => panic!("expected grouped option, got {other:?}"),
    }

    assert!(render_model(&index, &data, Some(3)).sections.is_empty());
}

#[test]
fn malformed_templates_degrade_to_empty() {
    for value in [
        json!(null),
        json!({}),
        json!({ "schemas": "nope" }),
        json!({ "schemas": [] }),
        json!({ "schemas": [[{ "type": "text" }], 7] }),
    ] {
        let index = SchemaIndex::build(&Template::from_value(&value));
        let data = ContractData::new();
        assert!(render_model(&index, &data, None).sections.is_empty(), "{value}");
        let report = unfilled(&index, &data);
        assert_eq!(report.total_required, 0, "{value}");
        assert_eq!(FieldNavigator::new(report.unfilled_fields).state(), NavigatorState::Inactive);
    }
}

#[test]
fn keyed_object_pages_are_indexed() {
    let template = Template::from_value(&json!({
        "schemas": [{
            "seller.name": { "type": "text", "required": true },
            "seller.signature": { "type": "signature", "required": true }
        }]
    }));
    let index = SchemaIndex::build(&template);
    assert!(index.field("seller.name").is_some());
    assert!(index.field("seller.signature").is_none());
    let report = unfilled(&index, &ContractData::new());
    assert_eq!(report.total_required, 1);
}
