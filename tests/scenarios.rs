//! End-to-end scenarios: counters sharing a slice, defaults, destroy, discovery.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use panevisor::{
    Capabilities, Config, ConfigError, Container, Document, ElementId, EventAccessExt, EventKind,
    PaneError, PaneState, Runtime, CHANGE_TOPIC,
};
use serde_json::{json, Value};

type Renders = Arc<Mutex<HashMap<ElementId, usize>>>;

/// Counter pane: shows `value` of the slice named by `data-key`, a click increments it.
///
/// Every listener-driven re-render is counted per container.
fn register_counter(rt: &Runtime, renders: &Renders) {
    let renders = Arc::clone(renders);
    rt.register_fn("counter", move |c: Container, caps: Arc<dyn Capabilities>| {
        let key = c
            .config()
            .get("data-key")
            .cloned()
            .ok_or_else(|| PaneError::factory("missing data-key"))?;
        let button = c.append("button");
        let display = c.append("span");
        let doc = Arc::clone(c.document());

        let show = {
            let doc = Arc::clone(&doc);
            move |v: &Value| {
                doc.set_text(display, &v["value"].as_i64().unwrap_or(0).to_string());
            }
        };
        show(&caps.state().get(&key));

        let rerender = {
            let show = show.clone();
            let renders = Arc::clone(&renders);
            let el = c.element();
            move |v: &Value| {
                show(v);
                *renders.lock().unwrap().entry(el).or_default() += 1;
            }
        };
        caps.events().on_key(&key, move |msg| rerender(&msg.payload));

        let writer = Arc::clone(&caps);
        c.listen(button, "click", move |_e| {
            let mut v = writer.state().get(&key);
            let n = v["value"].as_i64().unwrap_or(0) + 1;
            v["value"] = json!(n);
            show(&v);
            writer.state().set(&key, v);
        });
        Ok::<_, PaneError>(())
    })
    .unwrap();
}

fn counter_container(doc: &Document, key: &str) -> ElementId {
    let el = doc.append_new(doc.root(), "div");
    doc.set_attribute(el, "data-pane", "counter");
    doc.set_attribute(el, "data-key", key);
    el
}

fn shown(doc: &Document, container: ElementId) -> String {
    doc.text(doc.children(container)[1]).unwrap_or_default()
}

fn click(doc: &Document, container: ElementId) {
    doc.dispatch(doc.children(container)[0], "click");
}

fn renders_of(renders: &Renders, el: ElementId) -> usize {
    renders.lock().unwrap().get(&el).copied().unwrap_or(0)
}

#[test]
fn two_counters_share_a_slice_without_echo() {
    let rt = Runtime::new(Config::default());
    let renders: Renders = Arc::default();
    rt.register_default("N", || json!({ "value": 0 })).unwrap();
    register_counter(&rt, &renders);

    let doc = Arc::new(Document::new());
    let a = counter_container(&doc, "N");
    let b = counter_container(&doc, "N");
    let report = rt.discover(&doc);
    assert_eq!(report.mounted.len(), 2);
    assert!(report.is_clean());

    click(&doc, a);
    assert_eq!(shown(&doc, a), "1");
    assert_eq!(shown(&doc, b), "1");
    assert_eq!(renders_of(&renders, a), 0, "own write must not re-render A");
    assert_eq!(renders_of(&renders, b), 1);

    rt.state().set("N", json!({ "value": 5 }));
    assert_eq!(shown(&doc, a), "5");
    assert_eq!(shown(&doc, b), "5");
    assert_eq!(renders_of(&renders, a), 1);
    assert_eq!(renders_of(&renders, b), 2);

    click(&doc, b);
    assert_eq!(shown(&doc, a), "6");
    assert_eq!(renders_of(&renders, a), 2);
    assert_eq!(renders_of(&renders, b), 2);
}

#[test]
fn missing_key_reads_default_then_first_set_sticks() {
    let rt = Runtime::new(Config::default());
    assert_eq!(rt.state().get("missing-key"), json!({}));
    assert!(rt.state().try_get("missing-key").is_none());

    let mut merged = rt.state().get("missing-key");
    merged["items"] = json!([]);
    merged["title"] = json!("todo");
    rt.state().set("missing-key", merged.clone());
    assert_eq!(rt.state().get("missing-key"), merged);
}

#[test]
fn destroy_twice_and_revocation() {
    let rt = Runtime::new(Config::default());
    let renders: Renders = Arc::default();
    register_counter(&rt, &renders);

    let doc = Arc::new(Document::new());
    let a = counter_container(&doc, "N");
    let id = rt.discover(&doc).mounted[0];
    let topic = "state:change:N";
    assert_eq!(rt.events().subscriber_count(topic), 1);

    assert!(rt.destroy(id));
    assert!(!rt.destroy(id));
    assert_eq!(rt.pane_state(id), PaneState::Destroyed);
    assert_eq!(rt.events().subscriber_count(topic), 0);
    assert_eq!(doc.listener_count(doc.children(a)[0]), 0);

    rt.state().set("N", json!({ "value": 9 }));
    assert_eq!(renders_of(&renders, a), 0);
}

#[test]
fn duplicate_registration_keeps_first() {
    let rt = Runtime::new(Config::default());
    rt.register_fn("label", |c: Container, _caps: Arc<dyn Capabilities>| {
        c.set_text("first");
        Ok::<_, PaneError>(())
    })
    .unwrap();
    let err = rt
        .register_fn("label", |c: Container, _caps: Arc<dyn Capabilities>| {
            c.set_text("second");
            Ok::<_, PaneError>(())
        })
        .unwrap_err();
    assert_eq!(err.as_label(), "config_duplicate_pane");
    assert!(matches!(err, ConfigError::DuplicatePane { .. }));

    let doc = Arc::new(Document::new());
    let el = doc.append_new(doc.root(), "p");
    doc.set_attribute(el, "data-pane", "label");
    rt.discover(&doc);
    assert_eq!(doc.text(el).as_deref(), Some("first"));
}

#[test]
fn rediscovery_adds_no_controllers_or_subscriptions() {
    let rt = Runtime::new(Config::default());
    let renders: Renders = Arc::default();
    register_counter(&rt, &renders);

    let doc = Arc::new(Document::new());
    counter_container(&doc, "N");
    counter_container(&doc, "N");
    let first = rt.discover(&doc);
    let second = rt.discover(&doc);

    assert_eq!(first.mounted.len(), 2);
    assert!(second.mounted.is_empty());
    assert_eq!(rt.panes().len(), 2);
    assert_eq!(rt.events().subscriber_count("state:change:N"), 2);
    for id in rt.panes() {
        assert_eq!(rt.pane_subscriptions(id), Some(1));
    }

    counter_container(&doc, "N");
    assert_eq!(rt.discover(&doc).mounted.len(), 1);
    assert_eq!(rt.events().subscriber_count("state:change:N"), 3);
}

#[test]
fn one_broken_pane_does_not_block_the_page() {
    let rt = Runtime::new(Config::default());
    let renders: Renders = Arc::default();
    register_counter(&rt, &renders);

    let doc = Arc::new(Document::new());
    let ok = counter_container(&doc, "N");
    let no_key = doc.append_new(doc.root(), "div");
    doc.set_attribute(no_key, "data-pane", "counter");
    let unknown = doc.append_new(doc.root(), "div");
    doc.set_attribute(unknown, "data-pane", "chart");

    let report = rt.discover(&doc);
    assert_eq!(report.mounted.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].element, no_key);
    assert_eq!(report.failed[0].error, PaneError::factory("missing data-key"));
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].pane_type, "chart");

    click(&doc, ok);
    assert_eq!(shown(&doc, ok), "1");
}

#[test]
fn removed_container_is_pruned() {
    let rt = Runtime::new(Config::default());
    let renders: Renders = Arc::default();
    register_counter(&rt, &renders);

    let doc = Arc::new(Document::new());
    let a = counter_container(&doc, "N");
    let b = counter_container(&doc, "N");
    let ids = rt.discover(&doc).mounted;

    doc.remove(a);
    assert_eq!(rt.prune(&doc), vec![ids[0]]);
    assert_eq!(rt.panes(), vec![ids[1]]);

    rt.state().set("N", json!({ "value": 3 }));
    assert_eq!(renders_of(&renders, a), 0);
    assert_eq!(renders_of(&renders, b), 1);
}

#[test]
fn ping_pong_panes_hit_the_depth_limit() {
    let rt = Runtime::new(Config {
        max_emit_depth: 8,
        ..Config::default()
    });
    let mut diagnostics = rt.diagnostics().subscribe();
    rt.register_fn("mirror", |c: Container, caps: Arc<dyn Capabilities>| {
        let from = c.attribute("data-from").unwrap_or_default();
        let to = c.attribute("data-to").unwrap_or_default();
        let writer = Arc::clone(&caps);
        caps.events().on_key(&from, move |msg| {
            let n = msg.payload.as_i64().unwrap_or(0);
            writer.state().set(&to, json!(n + 1));
        });
        Ok::<_, PaneError>(())
    })
    .unwrap();

    let doc = Arc::new(Document::new());
    for (from, to) in [("X", "Y"), ("Y", "X")] {
        let el = doc.append_new(doc.root(), "div");
        doc.set_attribute(el, "data-pane", "mirror");
        doc.set_attribute(el, "data-from", from);
        doc.set_attribute(el, "data-to", to);
    }
    rt.discover(&doc);

    rt.state().set("X", json!(0));

    let kinds: Vec<EventKind> = std::iter::from_fn(|| diagnostics.try_recv().ok())
        .map(|e| e.kind)
        .collect();
    assert!(kinds.contains(&EventKind::CycleDetected));
    assert!(rt.state().get("X").as_i64().is_some());
}

#[test]
fn generic_topic_sees_every_key() {
    let rt = Runtime::new(Config::default());
    let keys = Arc::new(Mutex::new(Vec::new()));
    let k2 = Arc::clone(&keys);
    rt.events().on(
        CHANGE_TOPIC,
        Arc::new(move |m: &panevisor::Message| {
            k2.lock().unwrap().push(m.key().unwrap_or_default().to_string());
        }),
    );
    rt.state().set("a", json!(1));
    rt.state().set("b", json!(2));
    rt.state().remove("a");
    assert_eq!(*keys.lock().unwrap(), vec!["a", "b", "a"]);
}
