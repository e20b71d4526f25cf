//! # Example: subscriber
//!
//! Attaches diagnostics subscribers to a runtime.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait.
//! - Combine it with the built-in [`LogWriter`].
//! - Drain diagnostics on [`Runtime::shutdown`].
//!
//! ## Flow
//! ```text
//! register / discover / set / destroy
//!     └─► Bus.publish(Event) ──► runtime listener ──► SubscriberSet
//!                                                    ├─► LogWriter (tracing)
//!                                                    └─► Tally.on_event()
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example subscriber
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use panevisor::{
    Capabilities, Config, Container, Document, Event, EventKind, LogWriter, PaneError, Runtime,
    Subscribe,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Counts events per kind.
#[derive(Default)]
struct Tally {
    counts: Mutex<BTreeMap<String, usize>>,
}

#[async_trait::async_trait]
impl Subscribe for Tally {
    async fn on_event(&self, ev: &Event) {
        let label = format!("{:?}", ev.kind);
        *self.counts.lock().unwrap().entry(label).or_default() += 1;
    }

    fn name(&self) -> &'static str {
        "tally"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let tally = Arc::new(Tally::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter), tally.clone()];
    let rt = Runtime::builder(Config::default())
        .with_subscribers(subs)
        .build()?;

    rt.register_fn("greeting", |c: Container, caps: Arc<dyn Capabilities>| {
        let name = caps.state().get("user")["name"]
            .as_str()
            .unwrap_or("stranger")
            .to_string();
        c.set_text(&format!("hello, {name}"));
        Ok::<_, PaneError>(())
    })?;
    rt.register_fn("broken", |_c: Container, _caps: Arc<dyn Capabilities>| {
        Err::<(), _>(PaneError::factory("always fails"))
    })?;

    let doc = Arc::new(Document::new());
    for pane_type in ["greeting", "broken", "chart"] {
        let el = doc.append_new(doc.root(), "div");
        doc.set_attribute(el, "data-pane", pane_type);
    }
    rt.state().set("user", json!({ "name": "Ada" }));
    let report = rt.discover(&doc);
    println!(
        "mounted={} skipped={} failed={}",
        report.mounted.len(),
        report.skipped.len(),
        report.failed.len()
    );

    rt.shutdown().await;

    for (kind, n) in tally.counts.lock().unwrap().iter() {
        println!("{kind:<16} {n}");
    }
    let failed = format!("{:?}", EventKind::FactoryFailed);
    println!("factory failures seen: {}", tally.counts.lock().unwrap().get(&failed).copied().unwrap_or(0));
    Ok(())
}
