//! Page initialization
//!
//! [`init_dashboard`] is the single entry point: it receives the watch
//! targets and payload explicitly and runs the deferred trigger once.
//! [`start`] gathers those from the live document.

use serde::Deserialize;

use crate::dom::{self, BrowserHost, ConsoleSink, LoaderConfig, ModuleLoader};
use crate::payload::ChartPayload;
use crate::trigger::{
    ChartLibrary, DeferredTrigger, DependencyLoader, ErrorSink, TriggerConfig, TriggerHost,
    TriggerOutcome, WatchTarget, WatchTargets,
};

/// Id of the embedded payload block
pub const PAYLOAD_BLOCK_ID: &str = "chart-data";
/// Id of the embedded configuration block
pub const CONFIG_BLOCK_ID: &str = "chart-config";

/// Everything the page can tune, read from the `chart-config` block
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(flatten)]
    pub trigger: TriggerConfig,
    #[serde(flatten)]
    pub loader: LoaderConfig,
}

impl DashboardConfig {
    /// Missing block means defaults
    pub fn parse(text: Option<&str>) -> Result<Self, serde_json::Error> {
        match text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(text) => serde_json::from_str(text),
            None => Ok(Self::default()),
        }
    }
}

/// Watch `targets` and render `payload` once one of them comes into view
pub async fn init_dashboard<H, D, E>(
    host: H,
    loader: D,
    sink: E,
    config: TriggerConfig,
    targets: Vec<WatchTarget<H::Target>>,
    payload: ChartPayload,
) -> TriggerOutcome
where
    H: TriggerHost,
    D: DependencyLoader,
    D::Library: ChartLibrary<Surface = H::Surface>,
    E: ErrorSink,
{
    let targets = match WatchTargets::new(targets) {
        Ok(targets) => targets,
        Err(e) => {
            sink.info("no chart regions on this page");
            return TriggerOutcome::Failed(e);
        }
    };

    let trigger = DeferredTrigger::new(host, loader, sink, config);
    let outcome = trigger.start(&targets, &payload).await;
    trigger
        .sink()
        .info(&format!("chart job {:?}", trigger.job_status()));
    outcome
}

/// Bootstrap from the live document
pub async fn start() {
    let sink = ConsoleSink;
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    let targets = dom::discover_targets(&document);
    if targets.is_empty() {
        return;
    }

    let Some(text) = dom::json_block(&document, PAYLOAD_BLOCK_ID) else {
        sink.info("no chart payload on this page");
        return;
    };
    let payload = match ChartPayload::parse(&text) {
        Ok((payload, problems)) => {
            for problem in problems {
                sink.error(&format!("Ignoring chart data: {}", problem));
            }
            payload
        }
        Err(e) => {
            sink.error(&format!("Invalid chart data: {}", e));
            return;
        }
    };

    let config = dom::json_block(&document, CONFIG_BLOCK_ID);
    let config = DashboardConfig::parse(config.as_deref()).unwrap_or_else(|e| {
        sink.error(&format!("Invalid chart config, using defaults: {}", e));
        DashboardConfig::default()
    });

    let host = BrowserHost::new(window, document);
    let loader = ModuleLoader::new(config.loader);
    let outcome = init_dashboard(host, loader, sink, config.trigger, targets, payload).await;
    if let TriggerOutcome::Rendered { charts } = outcome {
        web_sys::console::log_1(&format!("Rendered {} charts", charts).into());
    }
    // failures were reported through the sink
}
