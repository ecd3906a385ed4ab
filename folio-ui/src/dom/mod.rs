//! Browser bindings for the trigger
//!
//! Everything that touches `window` or `document` lives here. The rest of the
//! crate only sees the trigger traits.

pub mod chart_js;
pub mod loader;
pub mod observer;

use async_trait::async_trait;
use futures::channel::oneshot;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, IdleRequestOptions, Window};

pub use chart_js::JsChartLibrary;
pub use loader::{LoaderConfig, ModuleLoader};
pub use observer::IntersectionWatcher;

use crate::charts::ChartKind;
use crate::trigger::{ErrorSink, TriggerConfig, TriggerHost, WatchTarget, WatchTargets};

/// Attribute marking a chart region
pub const TARGET_ATTRIBUTE: &str = "data-chart";

/// The live page
pub struct BrowserHost {
    window: Window,
    document: Document,
}

impl BrowserHost {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }
}

#[async_trait(?Send)]
impl TriggerHost for BrowserHost {
    type Target = Element;
    type Surface = HtmlCanvasElement;
    type Observer = IntersectionWatcher;

    fn observe(
        &self,
        targets: &WatchTargets<Element>,
        config: &TriggerConfig,
    ) -> Option<IntersectionWatcher> {
        if !observer::is_supported(&self.window) {
            return None;
        }
        match IntersectionWatcher::new(targets, config) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                web_sys::console::error_1(
                    &format!("IntersectionObserver unavailable: {:?}", e).into(),
                );
                None
            }
        }
    }

    /// `requestIdleCallback` with `timeout_ms` as its deadline, or a plain
    /// timer where the browser lacks it
    async fn wait_idle(&self, timeout_ms: u32) {
        if !supports_idle_callback(&self.window) {
            TimeoutFuture::new(timeout_ms).await;
            return;
        }

        let (tx, rx) = oneshot::channel::<()>();
        let callback: Closure<dyn FnMut()> = Closure::once(move || {
            let _ = tx.send(());
        });
        let options = IdleRequestOptions::new();
        options.set_timeout(timeout_ms);

        let requested = self
            .window
            .request_idle_callback_with_options(callback.as_ref().unchecked_ref(), &options);
        match requested {
            // callback stays alive until it has fired
            Ok(_) => {
                let _ = rx.await;
            }
            Err(_) => TimeoutFuture::new(timeout_ms).await,
        }
    }

    fn surface(&self, kind: ChartKind) -> Option<HtmlCanvasElement> {
        self.document
            .get_element_by_id(kind.canvas_id())
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
    }
}

fn supports_idle_callback(window: &Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("requestIdleCallback")).unwrap_or(false)
}

/// Reports to the browser console
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
    fn error(&self, message: &str) {
        web_sys::console::error_1(&message.into());
    }

    fn info(&self, message: &str) {
        web_sys::console::debug_1(&message.into());
    }
}

/// Every `[data-chart]` element, identified by its attribute value (or its
/// position when the attribute is empty)
pub fn discover_targets(document: &Document) -> Vec<WatchTarget<Element>> {
    let Ok(nodes) = document.query_selector_all(&format!("[{}]", TARGET_ATTRIBUTE)) else {
        return Vec::new();
    };

    (0..nodes.length())
        .filter_map(|i| {
            let element = nodes.item(i)?.dyn_into::<Element>().ok()?;
            let id = element
                .get_attribute(TARGET_ATTRIBUTE)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| format!("chart-{}", i));
            Some(WatchTarget::new(id, element))
        })
        .collect()
}

/// Text of an embedded `<script type="application/json">` block
pub fn json_block(document: &Document, id: &str) -> Option<String> {
    document.get_element_by_id(id)?.text_content()
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn page(html: &str) -> (Window, Document) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        document.body().unwrap().set_inner_html(html);
        (window, document)
    }

    #[wasm_bindgen_test]
    fn test_discover_targets() {
        let (_, document) = page(
            r#"<section data-chart="distribution"></section>
               <section data-chart=""></section>
               <div></div>"#,
        );

        let ids: Vec<String> = discover_targets(&document)
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["distribution", "chart-1"]);
    }

    #[wasm_bindgen_test]
    fn test_json_block() {
        let (_, document) = page(
            r#"<script id="chart-data" type="application/json">{"distribution": {}}</script>"#,
        );

        assert_eq!(
            json_block(&document, "chart-data").as_deref(),
            Some(r#"{"distribution": {}}"#)
        );
        assert!(json_block(&document, "chart-config").is_none());
    }

    #[wasm_bindgen_test]
    fn test_missing_canvas_has_no_surface() {
        let (window, document) = page(r#"<canvas id="distributionChart"></canvas>"#);
        let host = BrowserHost::new(window, document);

        assert!(host.surface(ChartKind::Distribution).is_some());
        assert!(host.surface(ChartKind::Growth).is_none());
    }

    #[wasm_bindgen_test]
    async fn test_wait_idle_resolves() {
        let (window, document) = page("");
        let host = BrowserHost::new(window, document);
        host.wait_idle(50).await;
    }
}
