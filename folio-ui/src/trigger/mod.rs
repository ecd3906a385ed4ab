//! Deferred Render Trigger
//!
//! Waits until one of the chart regions is about to scroll into view (or,
//! without visibility detection, for a fixed grace period), then loads the
//! chart library and renders the charts. Runs at most once.
//!
//! ```text
//! idle -> observing -> rendering -> rendered
//!                                \-> failed
//! ```

pub mod error;
pub mod host;
#[cfg(test)]
pub(crate) mod testing;

use serde::Deserialize;
use std::cell::Cell;

pub use error::{LoadError, RenderError, TriggerError};
pub use host::{
    ChartLibrary, DependencyLoader, ErrorSink, TriggerHost, VisibilityEntry, VisibilityObserver,
    WatchTarget, WatchTargets,
};

use crate::charts::{plan_charts, XAxis};
use crate::payload::ChartPayload;

/// When the trigger fires
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TriggerConfig {
    /// Grow the viewport by this many logical pixels on every side
    #[serde(default = "default_root_margin")]
    pub root_margin_px: u32,

    /// Fraction of a target that must be visible
    #[serde(default)]
    pub threshold: f64,

    /// Delay before rendering when visibility detection is unavailable
    #[serde(default = "default_fallback_delay")]
    pub fallback_delay_ms: u32,
}

fn default_root_margin() -> u32 {
    200
}

fn default_fallback_delay() -> u32 {
    500
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            root_margin_px: default_root_margin(),
            threshold: 0.0,
            fallback_delay_ms: default_fallback_delay(),
        }
    }
}

impl TriggerConfig {
    /// Threshold clamped into `0.0..=1.0`, NaN treated as 0
    pub fn effective_threshold(&self) -> f64 {
        if self.threshold.is_nan() {
            0.0
        } else {
            self.threshold.clamp(0.0, 1.0)
        }
    }

    /// Margin in CSS syntax, e.g. `"200px"`
    pub fn root_margin(&self) -> String {
        format!("{}px", self.root_margin_px)
    }

    pub fn qualifies(&self, entry: &VisibilityEntry) -> bool {
        entry.is_intersecting && entry.ratio >= self.effective_threshold()
    }
}

/// Trigger lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerState {
    Idle,
    Observing,
    Rendering,
    Rendered,
    Failed,
}

/// Status of the one render job of a page load
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl TriggerState {
    pub fn job_status(&self) -> JobStatus {
        match self {
            TriggerState::Idle | TriggerState::Observing => JobStatus::Pending,
            TriggerState::Rendering => JobStatus::Running,
            TriggerState::Rendered => JobStatus::Done,
            TriggerState::Failed => JobStatus::Failed,
        }
    }
}

/// How a call to [`DeferredTrigger::start`] ended
#[derive(Debug, PartialEq)]
pub enum TriggerOutcome {
    /// Charts were constructed (possibly zero when nothing had data)
    Rendered { charts: usize },
    Failed(TriggerError),
    /// The observer closed before any target became visible
    NeverVisible,
    /// `start` had already been called on this trigger
    AlreadyStarted,
}

/// Loads and renders the charts once, when first needed
pub struct DeferredTrigger<H, D, E> {
    host: H,
    loader: D,
    sink: E,
    config: TriggerConfig,
    state: Cell<TriggerState>,
}

impl<H, D, E> DeferredTrigger<H, D, E>
where
    H: TriggerHost,
    D: DependencyLoader,
    D::Library: ChartLibrary<Surface = H::Surface>,
    E: ErrorSink,
{
    pub fn new(host: H, loader: D, sink: E, config: TriggerConfig) -> Self {
        Self {
            host,
            loader,
            sink,
            config,
            state: Cell::new(TriggerState::Idle),
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state.get()
    }

    pub fn job_status(&self) -> JobStatus {
        self.state().job_status()
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Watch `targets` and render `payload` once one of them qualifies.
    ///
    /// Never panics on load or render failures; they are reported to the
    /// sink and returned as [`TriggerOutcome::Failed`].
    pub async fn start(
        &self,
        targets: &WatchTargets<H::Target>,
        payload: &ChartPayload,
    ) -> TriggerOutcome {
        if self.state.get() != TriggerState::Idle {
            return TriggerOutcome::AlreadyStarted;
        }
        self.state.set(TriggerState::Observing);
        self.sink
            .info(&format!("watching {} chart regions", targets.count()));

        match self.host.observe(targets, &self.config) {
            Some(mut observer) => {
                if !self.wait_until_visible(&mut observer, targets).await {
                    return TriggerOutcome::NeverVisible;
                }
            }
            None => {
                self.sink.info(&format!(
                    "visibility detection unavailable, rendering charts within {}ms",
                    self.config.fallback_delay_ms
                ));
                self.host.wait_idle(self.config.fallback_delay_ms).await;
            }
        }

        self.state.set(TriggerState::Rendering);
        self.render(payload).await
    }

    /// Returns once a target qualifies, with the observer already
    /// disconnected. `false` when the observer ran dry first.
    async fn wait_until_visible(
        &self,
        observer: &mut H::Observer,
        targets: &WatchTargets<H::Target>,
    ) -> bool {
        while let Some(entry) = observer.next_entry().await {
            if targets.contains(&entry.target_id) && self.config.qualifies(&entry) {
                observer.disconnect();
                self.sink
                    .info(&format!("chart region {} is visible", entry.target_id));
                return true;
            }
        }
        observer.disconnect();
        false
    }

    async fn render(&self, payload: &ChartPayload) -> TriggerOutcome {
        let x_axis = if self.loader.has_date_adapter() {
            XAxis::Time
        } else {
            XAxis::Category
        };
        let plan = plan_charts(payload, x_axis, |kind| self.host.surface(kind));
        if plan.is_empty() {
            self.sink.info("no chart has data to show, skipping chart library");
            self.state.set(TriggerState::Rendered);
            return TriggerOutcome::Rendered { charts: 0 };
        }

        let library = match self.loader.load().await {
            Ok(library) => library,
            Err(e) => {
                self.sink.error(&format!("Error loading charts: {}", e));
                self.state.set(TriggerState::Failed);
                return TriggerOutcome::Failed(e.into());
            }
        };

        let total = plan.len();
        let mut failed = 0;
        for chart in &plan {
            if let Err(e) = library.construct(&chart.surface, &chart.spec) {
                self.sink.error(&format!("Error rendering chart: {}", e));
                failed += 1;
            }
        }

        if failed > 0 {
            self.state.set(TriggerState::Failed);
            TriggerOutcome::Failed(TriggerError::Render { failed, total })
        } else {
            self.state.set(TriggerState::Rendered);
            TriggerOutcome::Rendered { charts: total }
        }
    }
}
