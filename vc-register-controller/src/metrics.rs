use std::sync::{LazyLock, RwLock};

use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family, histogram::Histogram},
    registry::{Registry, Unit},
};
use tokio::time::Instant;

use crate::Error;
use crate::controller::Step;

pub static REGISTRY: LazyLock<RwLock<Registry>> =
    LazyLock::new(|| RwLock::new(Registry::with_prefix("vc_register")));

/// Encodes every registered metric in the text exposition format.
pub fn encode() -> String {
    let mut buffer = String::new();
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    match prometheus_client::encoding::text::encode(&mut buffer, &registry) {
        Ok(_) => buffer,
        Err(_) => "".into(),
    }
}

#[derive(Clone)]
pub struct ControllerMetrics {
    pub runs: Family<NotificationLabels, Counter>,
    pub failures: Family<FailureLabels, Counter>,
    pub duration: Histogram,
}

impl ControllerMetrics {
    /// Register handler metrics to start tracking them.
    pub fn new() -> Self {
        let runs = Family::<NotificationLabels, Counter>::default();
        let failures = Family::<FailureLabels, Counter>::default();
        let duration = Histogram::new([0.01, 0.1, 0.25, 0.5, 1.0, 5.0, 15.0, 60.0].into_iter());
        Self {
            runs,
            failures,
            duration,
        }
    }

    pub fn register(self, registry: &mut Registry) -> Self {
        registry.register_with_unit(
            "handle_duration",
            "notification handling duration",
            Unit::Seconds,
            self.duration.clone(),
        );
        registry.register(
            "handle_failures",
            "Number of failed handler steps",
            self.failures.clone(),
        );
        registry.register(
            "handle_runs",
            "Number of handled notifications",
            self.runs.clone(),
        );
        self
    }

    /// Registers into the process wide registry served on `/metrics`.
    pub fn register_global(self) -> Self {
        let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
        self.register(&mut registry)
    }

    pub fn count_failure(&self, step: Step, e: &Error) {
        self.failures
            .get_or_create(&FailureLabels {
                step: step.as_str().into(),
                error: e.metric_label(),
            })
            .inc();
    }

    pub fn count_and_measure(&self, kind: &str) -> HandleMeasurer {
        self.runs
            .get_or_create(&NotificationLabels { kind: kind.into() })
            .inc();
        HandleMeasurer {
            start: Instant::now(),
            metric: self.duration.clone(),
        }
    }
}

impl Default for ControllerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HandleMeasurer {
    start: Instant,
    metric: Histogram,
}

impl Drop for HandleMeasurer {
    fn drop(&mut self) {
        #[allow(clippy::cast_precision_loss)]
        let duration = self.start.elapsed().as_millis() as f64 / 1000.0;
        self.metric.observe(duration);
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct NotificationLabels {
    pub kind: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FailureLabels {
    pub step: String,
    pub error: String,
}
