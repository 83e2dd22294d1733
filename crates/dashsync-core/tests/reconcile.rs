use dashsync_canonical::{Document, ResourceName};
use dashsync_core::{CoreError, Outcome, Reconciler, ResourceState};
use dashsync_remote::{InMemoryServer, RemoteError};
use serde_json::{json, Value};

fn name(s: &str) -> ResourceName {
    ResourceName::parse(s).unwrap()
}

fn clock(x: &str) -> Value {
    json!({"type": "clock", "x": x, "y": "0", "width": "4", "height": "3", "fields": []})
}

fn desired_json() -> Value {
    json!({
        "display_period": "30",
        "auto_start": "1",
        "pages": [
            {"display_period": "0", "widgets": [clock("0"), clock("4")]}
        ]
    })
}

fn desired() -> Document {
    Document::from(desired_json())
}

/// Seeds `content` under `dashboard_name` the way the server would hold it.
fn seed(server: &InMemoryServer, dashboard_name: &str, content: Value) -> String {
    let mut object = content;
    object["name"] = json!(dashboard_name);
    server.seed_dashboard(object)
}

#[test]
fn absent_resource_is_created_with_one_call() {
    let server = InMemoryServer::new();
    let reconciler = Reconciler::dashboards(&server);

    let outcome = reconciler.reconcile(&name("System Health"), &desired(), false).unwrap();

    assert_eq!(outcome, Outcome::Created);
    assert!(outcome.changed());
    let mutating = server.mutating_calls();
    assert_eq!(mutating.len(), 1);
    assert_eq!(mutating[0].method, "dashboard.create");
    assert_eq!(mutating[0].params["name"], json!("System Health"));
    assert!(mutating[0].params.get("dashboardid").is_none());
    assert_eq!(server.dashboard_count(), 1);
}

#[test]
fn matching_resource_is_left_alone() {
    let server = InMemoryServer::new();
    seed(&server, "System Health", desired_json());
    let reconciler = Reconciler::dashboards(&server);

    let outcome = reconciler.reconcile(&name("System Health"), &desired(), false).unwrap();

    assert_eq!(outcome, Outcome::Unchanged);
    assert!(!outcome.changed());
    assert!(server.mutating_calls().is_empty());
}

#[test]
fn differing_resource_is_cleared_then_repopulated() {
    let server = InMemoryServer::new();
    let id = seed(
        &server,
        "System Health",
        json!({
            "display_period": "30",
            "auto_start": "1",
            "pages": [{"display_period": "0", "widgets": [clock("0")]}]
        }),
    );
    let reconciler = Reconciler::dashboards(&server);

    let outcome = reconciler.reconcile(&name("System Health"), &desired(), false).unwrap();
    assert_eq!(outcome, Outcome::Replaced);

    let mutating = server.mutating_calls();
    assert_eq!(mutating.len(), 2);
    assert_eq!(mutating[0].method, "dashboard.update");
    assert_eq!(mutating[0].params, json!({"dashboardid": id, "pages": [{}]}));

    let mut expected = desired_json();
    expected["name"] = json!("System Health");
    expected["dashboardid"] = json!(id);
    assert_eq!(mutating[1].method, "dashboard.update");
    assert_eq!(mutating[1].params, expected);

    let stored = server.dashboard(&id).unwrap();
    assert_eq!(stored["pages"][0]["widgets"].as_array().unwrap().len(), 2);
}

fn two_page_remote() -> Value {
    json!({"pages": [
        {"widgets": [{"type": "clock", "x": 1}]},
        {"widgets": [{"type": "clock", "x": 2}]}
    ]})
}

fn one_page_desired() -> Value {
    json!({"pages": [{"widgets": [{"type": "clock", "x": 1}]}]})
}

fn page_count(document: &Document) -> usize {
    document
        .get("pages")
        .and_then(Document::as_sequence)
        .map_or(0, |pages| pages.len())
}

#[test]
fn dry_run_against_extra_remote_pages_reports_both_sides() {
    let server = InMemoryServer::new();
    seed(&server, "Ops", two_page_remote());
    let reconciler = Reconciler::dashboards(&server);

    let outcome = reconciler
        .reconcile(&name("Ops"), &Document::from(one_page_desired()), true)
        .unwrap();

    let diff = outcome.diff().expect("dry run reports a diff");
    assert_eq!(page_count(&diff.before), 2);
    assert_eq!(page_count(&diff.after), 1);
    assert_eq!(diff.before, Document::from(two_page_remote()));
    assert!(server.mutating_calls().is_empty());
}

#[test]
fn replace_drops_extra_remote_pages() {
    let server = InMemoryServer::new();
    let id = seed(&server, "Ops", two_page_remote());
    let reconciler = Reconciler::dashboards(&server);
    let desired = Document::from(one_page_desired());

    assert_eq!(reconciler.reconcile(&name("Ops"), &desired, false).unwrap(), Outcome::Replaced);

    let mutating = server.mutating_calls();
    assert_eq!(mutating.len(), 2);
    assert_eq!(mutating[0].method, "dashboard.update");
    assert_eq!(mutating[0].params, json!({"dashboardid": id, "pages": [{}]}));
    let mut repopulate = one_page_desired();
    repopulate["name"] = json!("Ops");
    repopulate["dashboardid"] = json!(id);
    assert_eq!(mutating[1].method, "dashboard.update");
    assert_eq!(mutating[1].params, repopulate);

    let stored = server.dashboard(&id).unwrap();
    assert_eq!(stored["pages"].as_array().unwrap().len(), 1);
    assert_eq!(stored["pages"][0]["widgets"][0]["x"], json!(1));

    server.clear_calls();
    assert_eq!(reconciler.reconcile(&name("Ops"), &desired, false).unwrap(), Outcome::Unchanged);
    assert!(server.mutating_calls().is_empty());
}

#[test]
fn reconcile_is_idempotent() {
    let server = InMemoryServer::new();
    let reconciler = Reconciler::dashboards(&server);
    let target = name("System Health");

    assert_eq!(reconciler.reconcile(&target, &desired(), false).unwrap(), Outcome::Created);
    server.clear_calls();
    assert_eq!(reconciler.reconcile(&target, &desired(), false).unwrap(), Outcome::Unchanged);
    assert!(server.mutating_calls().is_empty());
}

#[test]
fn replaced_resource_converges() {
    let server = InMemoryServer::new();
    seed(&server, "Ops", json!({"display_period": "60", "auto_start": "0", "pages": [{}]}));
    let reconciler = Reconciler::dashboards(&server);

    assert_eq!(reconciler.reconcile(&name("Ops"), &desired(), false).unwrap(), Outcome::Replaced);
    server.clear_calls();
    assert_eq!(reconciler.reconcile(&name("Ops"), &desired(), false).unwrap(), Outcome::Unchanged);
    assert_eq!(server.dashboard_count(), 1);
}

#[test]
fn dry_run_on_absent_resource_reports_creation() {
    let server = InMemoryServer::new();
    let reconciler = Reconciler::dashboards(&server);

    let outcome = reconciler.reconcile(&name("System Health"), &desired(), true).unwrap();

    let diff = outcome.diff().expect("dry run reports a diff");
    assert_eq!(diff.before, Document::mapping());
    assert_eq!(diff.after, desired());
    assert!(outcome.changed());
    assert!(server.mutating_calls().is_empty());
    assert_eq!(server.dashboard_count(), 0);
}

#[test]
fn dry_run_on_differing_resource_reports_canonical_before() {
    let server = InMemoryServer::new();
    let current = json!({"display_period": "60", "auto_start": "1", "pages": [{"widgets": []}]});
    seed(&server, "System Health", current.clone());
    let reconciler = Reconciler::dashboards(&server);

    let outcome = reconciler.reconcile(&name("System Health"), &desired(), true).unwrap();

    let diff = outcome.diff().unwrap();
    assert_eq!(diff.before, Document::from(current));
    assert_eq!(diff.after, desired());
    assert!(server.mutating_calls().is_empty());
}

#[test]
fn dry_run_on_matching_resource_is_unchanged() {
    let server = InMemoryServer::new();
    seed(&server, "System Health", desired_json());
    let reconciler = Reconciler::dashboards(&server);

    let outcome = reconciler.reconcile(&name("System Health"), &desired(), true).unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert!(outcome.diff().is_none());
}

#[test]
fn single_widget_field_change_triggers_replace() {
    let server = InMemoryServer::new();
    let mut current = desired_json();
    current["pages"][0]["widgets"][1]["x"] = json!("8");
    seed(&server, "Ops", current);
    let reconciler = Reconciler::dashboards(&server);

    assert_eq!(reconciler.reconcile(&name("Ops"), &desired(), false).unwrap(), Outcome::Replaced);
}

#[test]
fn page_order_matters() {
    let server = InMemoryServer::new();
    let page_a = json!({"display_period": "0", "widgets": [clock("0")]});
    let page_b = json!({"display_period": "60", "widgets": []});
    seed(&server, "Ops", json!({"pages": [page_a.clone(), page_b.clone()]}));
    let reconciler = Reconciler::dashboards(&server);

    let swapped = Document::from(json!({"pages": [page_b, page_a]}));
    let observation = reconciler.observe(&name("Ops"), &swapped).unwrap();
    assert_eq!(observation.state(), ResourceState::PresentDiffering);
}

#[test]
fn mapping_key_order_does_not_matter() {
    let server = InMemoryServer::new();
    seed(
        &server,
        "Ops",
        json!({"pages": [{"widgets": [clock("0")], "display_period": "0"}], "auto_start": "1"}),
    );
    let reconciler = Reconciler::dashboards(&server);

    let reordered = Document::from(json!({
        "auto_start": "1",
        "pages": [{"display_period": "0", "widgets": [clock("0")]}]
    }));
    assert_eq!(reconciler.reconcile(&name("Ops"), &reordered, false).unwrap(), Outcome::Unchanged);
}

#[test]
fn adding_or_removing_a_widget_triggers_replace() {
    let server = InMemoryServer::new();
    seed(&server, "Ops", json!({"pages": [{"widgets": [clock("0")]}]}));
    let reconciler = Reconciler::dashboards(&server);

    let more = Document::from(json!({"pages": [{"widgets": [clock("0"), clock("4")]}]}));
    let observation = reconciler.observe(&name("Ops"), &more).unwrap();
    assert_eq!(observation.state(), ResourceState::PresentDiffering);

    let fewer = Document::from(json!({"pages": [{"widgets": []}]}));
    let observation = reconciler.observe(&name("Ops"), &fewer).unwrap();
    assert_eq!(observation.state(), ResourceState::PresentDiffering);
}

#[test]
fn failed_create_leaves_nothing_behind() {
    let server = InMemoryServer::new();
    server.fail_on_mutation(1);
    let reconciler = Reconciler::dashboards(&server);

    let err = reconciler.reconcile(&name("Ops"), &desired(), false).unwrap_err();
    assert!(matches!(err, CoreError::Remote(RemoteError::Injected { .. })));
    assert_eq!(server.dashboard_count(), 0);
}

#[test]
fn failed_clear_stops_before_repopulate() {
    let server = InMemoryServer::new();
    seed(&server, "Ops", json!({"pages": [{"widgets": [clock("8")]}]}));
    server.fail_on_mutation(1);
    let reconciler = Reconciler::dashboards(&server);

    let err = reconciler.reconcile(&name("Ops"), &desired(), false).unwrap_err();
    assert!(matches!(err, CoreError::Remote(_)));
    assert_eq!(server.mutating_calls().len(), 1);
}

#[test]
fn failed_repopulate_leaves_resource_cleared() {
    let server = InMemoryServer::new();
    let id = seed(&server, "Ops", json!({"pages": [{"widgets": [clock("8")]}]}));
    server.fail_on_mutation(2);
    let reconciler = Reconciler::dashboards(&server);

    let err = reconciler.reconcile(&name("Ops"), &desired(), false).unwrap_err();
    assert!(matches!(err, CoreError::Remote(RemoteError::Injected { ref method }) if method == "dashboard.update"));
    assert_eq!(server.mutating_calls().len(), 2);

    let stored = server.dashboard(&id).unwrap();
    let pages = stored["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].get("widgets").is_none());
}

#[test]
fn desired_document_with_ids_is_rejected_before_any_call() {
    let server = InMemoryServer::new();
    let reconciler = Reconciler::dashboards(&server);

    let with_id = Document::from(json!({"dashboardid": "7", "pages": []}));
    let err = reconciler.reconcile(&name("Ops"), &with_id, false).unwrap_err();
    assert!(matches!(err, CoreError::NotCanonical { ref path } if path.to_string() == "dashboardid"));

    let with_widget_id = Document::from(json!({
        "pages": [{"widgets": [{"type": "clock", "widgetid": "12"}]}]
    }));
    let err = reconciler.reconcile(&name("Ops"), &with_widget_id, false).unwrap_err();
    assert!(
        matches!(err, CoreError::NotCanonical { ref path } if path.to_string() == "pages[0].widgets[0].widgetid")
    );

    let with_name = Document::from(json!({"name": "Ops", "pages": []}));
    assert!(matches!(
        reconciler.reconcile(&name("Ops"), &with_name, false),
        Err(CoreError::NotCanonical { .. })
    ));

    assert!(server.calls().is_empty());
}

#[test]
fn non_mapping_document_is_rejected() {
    let server = InMemoryServer::new();
    let reconciler = Reconciler::dashboards(&server);

    let err = reconciler
        .reconcile(&name("Ops"), &Document::from(json!(["not", "a", "mapping"])), false)
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidDocument(_)));
    assert!(server.calls().is_empty());
}

#[test]
fn duplicate_names_resolve_to_first_match() {
    let server = InMemoryServer::new();
    let first = seed(&server, "Ops", json!({"pages": [{"widgets": []}]}));
    let second = seed(&server, "Ops", desired_json());
    let reconciler = Reconciler::dashboards(&server);

    let outcome = reconciler.reconcile(&name("Ops"), &desired(), false).unwrap();
    assert_eq!(outcome, Outcome::Replaced);

    let mutating = server.mutating_calls();
    assert!(mutating.iter().all(|call| call.params["dashboardid"] == json!(first)));
    assert_ne!(first, second);
}

#[test]
fn other_names_are_not_touched() {
    let server = InMemoryServer::new();
    let other = seed(&server, "Other", json!({"pages": [{"widgets": [clock("8")]}]}));
    let reconciler = Reconciler::dashboards(&server);

    assert_eq!(reconciler.reconcile(&name("Ops"), &desired(), false).unwrap(), Outcome::Created);
    assert_eq!(server.dashboard_count(), 2);
    let untouched = server.dashboard(&other).unwrap();
    assert_eq!(untouched["pages"][0]["widgets"][0]["x"], json!("8"));
}

#[test]
fn outcome_serializes_with_tag() {
    assert_eq!(serde_json::to_value(Outcome::Created).unwrap(), json!({"outcome": "created"}));
    let dry = Outcome::WouldChange {
        diff: dashsync_canonical::Diff::creation(Document::from(json!({"pages": []}))),
    };
    assert_eq!(
        serde_json::to_value(dry).unwrap(),
        json!({"outcome": "would_change", "diff": {"before": {}, "after": {"pages": []}}})
    );
}
