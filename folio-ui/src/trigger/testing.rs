//! Scripted trigger collaborators for unit tests

use async_trait::async_trait;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::*;
use crate::charts::{ChartKind, ChartSpec};
use crate::payload::{DistributionData, GrowthData};

/// Everything the fakes observed, shared between them
#[derive(Default, Clone)]
pub struct Log {
    pub idle_waits: Rc<RefCell<Vec<u32>>>,
    pub delivered: Rc<Cell<usize>>,
    pub disconnects: Rc<Cell<usize>>,
    pub loads: Rc<Cell<usize>>,
    pub built: Rc<RefCell<Vec<ChartKind>>>,
    /// x scale type of every growth chart built
    pub x_axes: Rc<RefCell<Vec<String>>>,
    pub errors: Rc<RefCell<Vec<String>>>,
}

pub struct FakeObserver {
    entries: VecDeque<VisibilityEntry>,
    connected: bool,
    log: Log,
}

#[async_trait(?Send)]
impl VisibilityObserver for FakeObserver {
    async fn next_entry(&mut self) -> Option<VisibilityEntry> {
        if !self.connected {
            return None;
        }
        let entry = self.entries.pop_front()?;
        self.log.delivered.set(self.log.delivered.get() + 1);
        Some(entry)
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.log.disconnects.set(self.log.disconnects.get() + 1);
    }
}

pub struct FakeHost {
    /// `None` simulates a host without visibility detection
    pub entries: Option<Vec<VisibilityEntry>>,
    pub surfaces: Vec<ChartKind>,
    pub log: Log,
}

#[async_trait(?Send)]
impl TriggerHost for FakeHost {
    type Target = ();
    type Surface = ChartKind;
    type Observer = FakeObserver;

    fn observe(&self, _: &WatchTargets<()>, _: &TriggerConfig) -> Option<FakeObserver> {
        self.entries.clone().map(|entries| FakeObserver {
            entries: entries.into(),
            connected: true,
            log: self.log.clone(),
        })
    }

    async fn wait_idle(&self, timeout_ms: u32) {
        self.log.idle_waits.borrow_mut().push(timeout_ms);
    }

    fn surface(&self, kind: ChartKind) -> Option<ChartKind> {
        self.surfaces.contains(&kind).then_some(kind)
    }
}

pub struct FakeLoader {
    pub fail: Option<LoadError>,
    pub broken_chart: Option<ChartKind>,
    pub date_adapter: bool,
    pub log: Log,
}

pub struct FakeLibrary {
    broken_chart: Option<ChartKind>,
    log: Log,
}

#[async_trait(?Send)]
impl DependencyLoader for FakeLoader {
    type Library = FakeLibrary;

    async fn load(&self) -> Result<FakeLibrary, LoadError> {
        self.log.loads.set(self.log.loads.get() + 1);
        match &self.fail {
            Some(e) => Err(e.clone()),
            None => Ok(FakeLibrary {
                broken_chart: self.broken_chart,
                log: self.log.clone(),
            }),
        }
    }

    fn has_date_adapter(&self) -> bool {
        self.date_adapter
    }
}

impl ChartLibrary for FakeLibrary {
    type Surface = ChartKind;

    fn construct(&self, surface: &ChartKind, spec: &ChartSpec) -> Result<(), RenderError> {
        assert_eq!(*surface, spec.kind);
        if self.broken_chart == Some(spec.kind) {
            return Err(RenderError::Construct {
                chart: spec.kind.canvas_id(),
                reason: "boom".to_string(),
            });
        }
        if spec.kind == ChartKind::Growth {
            let x_type = spec.options["scales"]["x"]["type"].as_str().unwrap_or("");
            self.log.x_axes.borrow_mut().push(x_type.to_string());
        }
        self.log.built.borrow_mut().push(spec.kind);
        Ok(())
    }
}

pub struct RecordingSink(pub Log);

impl ErrorSink for RecordingSink {
    fn error(&self, message: &str) {
        self.0.errors.borrow_mut().push(message.to_string());
    }
}

pub fn visible(id: &str, ratio: f64) -> VisibilityEntry {
    VisibilityEntry {
        target_id: id.to_string(),
        is_intersecting: true,
        ratio,
    }
}

pub fn hidden(id: &str) -> VisibilityEntry {
    VisibilityEntry {
        target_id: id.to_string(),
        is_intersecting: false,
        ratio: 0.0,
    }
}

pub fn targets() -> WatchTargets<()> {
    WatchTargets::new(vec![
        WatchTarget::new("distribution", ()),
        WatchTarget::new("growth", ()),
    ])
    .unwrap()
}

pub fn sample_payload() -> ChartPayload {
    ChartPayload {
        distribution: DistributionData {
            labels: vec!["A".into(), "B".into()],
            values: vec![30.0, 70.0],
        },
        growth: GrowthData {
            labels: vec!["2024-01-01".into(), "2024-01-02".into()],
            values_abs: vec![1000.0, 1100.0],
            values_pct: vec![0.0, 10.0],
        },
    }
}

/// Host, loader and sink wired to one shared log
pub fn fakes(
    entries: Option<Vec<VisibilityEntry>>,
) -> (FakeHost, FakeLoader, RecordingSink, Log) {
    let log = Log::default();
    let host = FakeHost {
        entries,
        surfaces: ChartKind::ALL.to_vec(),
        log: log.clone(),
    };
    let loader = FakeLoader {
        fail: None,
        broken_chart: None,
        date_adapter: false,
        log: log.clone(),
    };
    (host, loader, RecordingSink(log.clone()), log)
}

pub type FakeTrigger = DeferredTrigger<FakeHost, FakeLoader, RecordingSink>;

pub fn fake_trigger(
    entries: Option<Vec<VisibilityEntry>>,
    config: TriggerConfig,
) -> (FakeTrigger, Log) {
    let (host, loader, sink, log) = fakes(entries);
    (DeferredTrigger::new(host, loader, sink, config), log)
}
