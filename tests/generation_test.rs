//! End-to-end generation through the public API.

use daq_confgen::apps::{FakeHsiApp, HsiReadoutApp, TimingApp, TriggerApp, build_topology};
use daq_confgen::command::{CommandDocument, State};
use daq_confgen::render::{parse_json, render_json, write_atomic};
use daq_confgen::{AppGenerator, ConfgenError, generate};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

fn master_with_two_partitions() -> TimingApp {
    TimingApp {
        master_device_name: "PROD_MASTER".into(),
        endpoint_device_name: String::new(),
        partition_ids: vec![0, 1],
        ..Default::default()
    }
}

#[test]
fn test_master_with_two_partitions() {
    let app = master_with_two_partitions();
    let topology = build_topology(&app).unwrap();
    assert_eq!(
        topology.instance_names().collect::<Vec<_>>(),
        vec!["thi", "tmc0", "tpc0", "tpc1"]
    );

    let docs = generate(&app).unwrap();
    let start = docs.iter().find(|d| d.id == "start").unwrap();
    assert_eq!(start.entries().len(), 4);
    assert!(start.entries().iter().all(|e| e.data.is_none()));
    assert_eq!(start.entry_state, Some(State::Configured));
    assert_eq!(start.exit_state, Some(State::Running));

    assert!(!docs.iter().any(|d| d.id.starts_with("endpoint_")));
    assert!(docs.iter().any(|d| d.id == "partition_enable"));
}

#[test]
fn test_init_is_first_and_lists_every_queue() {
    let docs = generate(&master_with_two_partitions()).unwrap();
    assert_eq!(docs[0].id, "init");
    assert_eq!(docs[0].entry_state, Some(State::Unset));
    assert_eq!(docs[0].exit_state, Some(State::Initial));

    let init = docs[0].init_data().unwrap();
    assert_eq!(init.queues.len(), 1);
    assert_eq!(init.queues[0].inst, "hardware_commands");
    assert_eq!(init.modules.len(), 4);
    assert_eq!(init.modules[3].data.params["partition_id"], Value::from(1));
}

#[test]
fn test_disabling_endpoint_removes_only_its_parts() {
    let with_ep = TimingApp {
        endpoint_device_name: "EPT".into(),
        ..master_with_two_partitions()
    };
    let without = master_with_two_partitions();

    let a = generate(&with_ep).unwrap();
    let b = generate(&without).unwrap();

    let ids_a: Vec<&str> = a.iter().map(|d| d.id.as_str()).collect();
    let ids_b: Vec<&str> = b.iter().map(|d| d.id.as_str()).collect();
    let removed: Vec<&str> = ids_a
        .iter()
        .copied()
        .filter(|id| !ids_b.contains(id))
        .collect();
    assert_eq!(
        removed,
        vec![
            "endpoint_io_reset",
            "endpoint_enable",
            "endpoint_disable",
            "endpoint_reset",
            "endpoint_print_status",
        ]
    );

    let conf_a = a.iter().find(|d| d.id == "conf").unwrap();
    let conf_b = b.iter().find(|d| d.id == "conf").unwrap();
    assert_eq!(conf_a.targets(), vec!["tpc0", "tpc1", "tec0"]);
    assert_eq!(conf_b.targets(), vec!["tpc0", "tpc1"]);

    for id in ["start", "stop", "scrap"] {
        let doc_a = a.iter().find(|d| d.id == id).unwrap();
        let doc_b = b.iter().find(|d| d.id == id).unwrap();
        assert_eq!(lost(&doc_a.targets(), &doc_b.targets()), vec!["tec0"], "{}", id);
    }

    assert_eq!(lost(&init_modules(&a[0]), &init_modules(&b[0])), vec!["tec0"]);
}

fn init_modules(doc: &CommandDocument) -> Vec<&str> {
    let init = doc.init_data().unwrap();
    init.modules.iter().map(|m| m.inst.as_str()).collect()
}

fn lost<'a>(before: &[&'a str], after: &[&str]) -> Vec<&'a str> {
    before.iter().copied().filter(|n| !after.contains(n)).collect()
}

#[test]
fn test_wildcard_expands_in_declaration_order() {
    let app = TimingApp {
        partition_ids: vec![3, 1, 2],
        ..Default::default()
    };
    let docs = generate(&app).unwrap();
    let enable = docs.iter().find(|d| d.id == "partition_enable").unwrap();
    assert_eq!(enable.targets(), vec!["tpc3", "tpc1", "tpc2"]);
}

#[test]
fn test_rendered_document_round_trips() {
    let apps: Vec<Box<dyn AppGenerator>> = vec![
        Box::new(master_with_two_partitions()),
        Box::new(HsiReadoutApp::default()),
        Box::new(FakeHsiApp::default()),
        Box::new(TriggerApp::default()),
    ];
    for app in apps {
        let docs = generate(app.as_ref()).unwrap();
        let text = render_json(&docs).unwrap();
        let parsed = parse_json(&text).unwrap();
        assert_eq!(parsed.len(), docs.len(), "{}", app.name());
        for (before, after) in docs.iter().zip(&parsed) {
            assert_eq!(before.id, after.id);
            assert_eq!(before.entries(), after.entries());
        }
        assert_eq!(parsed[0].init_data(), docs[0].init_data());
    }
}

#[test]
fn test_rendering_is_deterministic() {
    let app = TimingApp {
        fanout_devices_names: vec!["F0".into(), "F1".into()],
        hsi_device_name: "HSI".into(),
        ..Default::default()
    };
    let first = render_json(&generate(&app).unwrap()).unwrap();
    let second = render_json(&generate(&app).unwrap()).unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with("[\n    {\n        \"data\": {"));
}

#[test]
fn test_failed_build_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trigger_app.json");

    let app = TriggerApp {
        trigger_rate_hz: -1.0,
        ..Default::default()
    };
    let res = generate(&app);
    assert!(matches!(res, Err(ConfgenError::InvalidParameterCombination(_))));
    assert!(!path.exists());

    let docs = generate(&TriggerApp::default()).unwrap();
    write_atomic(&path, &render_json(&docs).unwrap()).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(parse_json(&written).unwrap().len(), docs.len());
}
