//! Collaborators of the trigger
//!
//! The trigger itself never touches the page. Visibility events, timers, the
//! chart library and the error log all come in through these traits so the
//! browser bindings and the test doubles plug in the same way.

use async_trait::async_trait;

use super::error::{LoadError, RenderError, TriggerError};
use super::TriggerConfig;
use crate::charts::{ChartKind, ChartSpec};

/// A watched page region
#[derive(Clone, Debug)]
pub struct WatchTarget<H> {
    /// Identity used for deduplication and to match visibility entries
    pub id: String,
    pub handle: H,
}

impl<H> WatchTarget<H> {
    pub fn new(id: impl Into<String>, handle: H) -> Self {
        Self {
            id: id.into(),
            handle,
        }
    }
}

/// Non-empty set of watch targets, deduplicated by id, in discovery order
#[derive(Clone, Debug)]
pub struct WatchTargets<H> {
    targets: Vec<WatchTarget<H>>,
}

impl<H> WatchTargets<H> {
    pub fn new(targets: impl IntoIterator<Item = WatchTarget<H>>) -> Result<Self, TriggerError> {
        let mut unique: Vec<WatchTarget<H>> = Vec::new();
        for target in targets {
            if !unique.iter().any(|t| t.id == target.id) {
                unique.push(target);
            }
        }

        if unique.is_empty() {
            return Err(TriggerError::NoTargets);
        }
        Ok(Self { targets: unique })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.targets.iter().any(|t| t.id == id)
    }

    /// Never zero
    pub fn count(&self) -> usize {
        self.targets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchTarget<H>> {
        self.targets.iter()
    }
}

/// One visibility notification
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityEntry {
    pub target_id: String,
    pub is_intersecting: bool,
    /// Visible fraction of the target, 0.0..=1.0
    pub ratio: f64,
}

/// Stream of visibility notifications for the watched targets
#[async_trait(?Send)]
pub trait VisibilityObserver {
    /// Next notification, `None` once the observer can produce no more
    async fn next_entry(&mut self) -> Option<VisibilityEntry>;

    /// Stop observing every target. Must take effect immediately.
    fn disconnect(&mut self);
}

/// The page hosting the charts
#[async_trait(?Send)]
pub trait TriggerHost {
    type Target;
    type Surface;
    type Observer: VisibilityObserver;

    /// Start observing `targets`; `None` when the host has no visibility
    /// detection.
    fn observe(
        &self,
        targets: &WatchTargets<Self::Target>,
        config: &TriggerConfig,
    ) -> Option<Self::Observer>;

    /// Resolve once the host is idle, at the latest after `timeout_ms`
    async fn wait_idle(&self, timeout_ms: u32);

    /// Drawing surface for a chart, `None` if the page lacks it
    fn surface(&self, kind: ChartKind) -> Option<Self::Surface>;
}

/// Resolves the chart library on demand
#[async_trait(?Send)]
pub trait DependencyLoader {
    type Library: ChartLibrary;

    async fn load(&self) -> Result<Self::Library, LoadError>;

    /// Whether the loaded library can lay dates out on a time scale
    fn has_date_adapter(&self) -> bool {
        false
    }
}

/// The external chart constructor
pub trait ChartLibrary {
    type Surface;

    fn construct(&self, surface: &Self::Surface, spec: &ChartSpec) -> Result<(), RenderError>;
}

/// Where failures and lifecycle notes are reported
pub trait ErrorSink {
    fn error(&self, message: &str);

    fn info(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_deduplicated() {
        let targets = WatchTargets::new(vec![
            WatchTarget::new("distribution", 1),
            WatchTarget::new("growth", 2),
            WatchTarget::new("distribution", 3),
        ])
        .unwrap();

        assert_eq!(targets.count(), 2);
        let handles: Vec<_> = targets.iter().map(|t| t.handle).collect();
        assert_eq!(handles, vec![1, 2]);
        assert!(targets.contains("growth"));
        assert!(!targets.contains("news"));
    }

    #[test]
    fn test_empty_targets_rejected() {
        let result = WatchTargets::<()>::new(Vec::new());
        assert!(matches!(result, Err(TriggerError::NoTargets)));
    }
}
