//! IntersectionObserver bridge
//!
//! Observer callbacks push entries into an unbounded channel that the trigger
//! task awaits, so the trigger sees visibility changes as an async stream.

use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::StreamExt;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::trigger::{TriggerConfig, VisibilityEntry, VisibilityObserver, WatchTargets};

/// True when the browser exposes `IntersectionObserver`
pub fn is_supported(window: &web_sys::Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

type EntriesCallback = dyn FnMut(js_sys::Array, IntersectionObserver);

/// Watches every target with a single `IntersectionObserver`
pub struct IntersectionWatcher {
    observer: IntersectionObserver,
    entries: UnboundedReceiver<VisibilityEntry>,
    // keeps the JS callback alive for as long as the observer exists
    _callback: Closure<EntriesCallback>,
}

impl IntersectionWatcher {
    pub fn new(targets: &WatchTargets<Element>, config: &TriggerConfig) -> Result<Self, JsValue> {
        let (tx, rx) = mpsc::unbounded();

        let known: Vec<(String, Element)> = targets
            .iter()
            .map(|t| (t.id.clone(), t.handle.clone()))
            .collect();

        let on_entries = move |entries: js_sys::Array, _: IntersectionObserver| {
            for value in entries.iter() {
                let Ok(entry) = value.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let element = entry.target();
                let Some((id, _)) = known.iter().find(|(_, el)| *el == element) else {
                    continue;
                };
                // receiver gone means the trigger already moved on
                let _ = tx.unbounded_send(VisibilityEntry {
                    target_id: id.clone(),
                    is_intersecting: entry.is_intersecting(),
                    ratio: entry.intersection_ratio(),
                });
            }
        };
        let callback = Closure::wrap(Box::new(on_entries) as Box<EntriesCallback>);

        let options = IntersectionObserverInit::new();
        options.set_root_margin(&config.root_margin());
        options.set_threshold(&JsValue::from_f64(config.effective_threshold()));

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
        for target in targets.iter() {
            observer.observe(&target.handle);
        }

        Ok(Self {
            observer,
            entries: rx,
            _callback: callback,
        })
    }
}

#[async_trait(?Send)]
impl VisibilityObserver for IntersectionWatcher {
    async fn next_entry(&mut self) -> Option<VisibilityEntry> {
        self.entries.next().await
    }

    fn disconnect(&mut self) {
        self.observer.disconnect();
        self.entries.close();
    }
}

impl Drop for IntersectionWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
