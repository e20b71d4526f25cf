//! # Example: counter
//!
//! Two counter panes bound to the same state slice.
//!
//! Shows how to:
//! - Register a pane factory and a slice default.
//! - Discover containers declared with `data-pane="counter"`.
//! - Write through capabilities without re-rendering the writer (echo suppression).
//!
//! ## Flow
//! ```text
//! click A ──► A.set("N", {value: 1})
//!               ├─► A updates its own display directly
//!               ├─► "state:change:N" ──► B re-renders
//!               └─► "state:change:N" ──► A's listener: own write, skipped
//! runtime.set("N", {value: 5}) ──► A and B re-render
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=panevisor=debug cargo run --example counter
//! ```

use std::sync::Arc;

use panevisor::{
    Capabilities, Config, Container, Document, ElementId, EventAccessExt, PaneError, Runtime,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn counter(c: Container, caps: Arc<dyn Capabilities>) -> Result<(), PaneError> {
    let key = c
        .config()
        .get("data-key")
        .cloned()
        .ok_or_else(|| PaneError::factory("counter needs a data-key attribute"))?;
    let button = c.append("button");
    let display = c.append("span");
    c.document().set_text(button, "+1");

    let show = {
        let doc = Arc::clone(c.document());
        move |v: &Value| doc.set_text(display, &v["value"].as_i64().unwrap_or(0).to_string())
    };
    show(&caps.state().get(&key));

    let rerender = {
        let show = show.clone();
        let el = c.element();
        move |v: &Value| {
            println!("[{el}] re-render -> {}", v["value"]);
            show(v);
        }
    };
    caps.events().on_key(&key, move |msg| rerender(&msg.payload));

    let writer = Arc::clone(&caps);
    c.listen(button, "click", move |_e| {
        let mut v = writer.state().get(&key);
        v["value"] = json!(v["value"].as_i64().unwrap_or(0) + 1);
        show(&v);
        writer.state().set(&key, v);
    });
    Ok(())
}

fn mount_point(doc: &Document, key: &str) -> ElementId {
    let el = doc.append_new(doc.root(), "div");
    doc.set_attribute(el, "data-pane", "counter");
    doc.set_attribute(el, "data-key", key);
    el
}

fn display(doc: &Document, el: ElementId) -> String {
    doc.text(doc.children(el)[1]).unwrap_or_default()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("panevisor=info")),
        )
        .init();

    let rt = Runtime::new(Config::default());
    rt.register_default("N", || json!({ "value": 0 }))?;
    rt.register_fn("counter", counter)?;

    let doc = Arc::new(Document::new());
    let a = mount_point(&doc, "N");
    let b = mount_point(&doc, "N");
    let report = rt.discover(&doc);
    println!("mounted: {:?}", report.mounted);

    println!("click A");
    doc.dispatch(doc.children(a)[0], "click");
    println!("A={} B={}", display(&doc, a), display(&doc, b));

    println!("external set N=5");
    rt.state().set("N", json!({ "value": 5 }));
    println!("A={} B={}", display(&doc, a), display(&doc, b));

    println!("destroyed: {}", rt.destroy_all());
    Ok(())
}
