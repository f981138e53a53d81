//! Bounded timing log of committed mutations.

use std::collections::VecDeque;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Samples kept before the oldest is evicted.
pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    SetState,
    MergeState,
    DeleteState,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::SetState,
        OperationKind::MergeState,
        OperationKind::DeleteState,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::SetState => "setState",
            OperationKind::MergeState => "mergeState",
            OperationKind::DeleteState => "deleteState",
        }
    }

    /// Action type used in debug records.
    pub fn action_type(&self) -> &'static str {
        match self {
            OperationKind::SetState => "SET_STATE",
            OperationKind::MergeState => "MERGE_STATE",
            OperationKind::DeleteState => "DELETE_STATE",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSample {
    pub kind: OperationKind,
    pub elapsed_ms: f64,
    pub path: Option<String>,
}

/// FIFO ring of samples; once full, each new sample evicts the oldest.
#[derive(Debug, Clone)]
pub struct MetricsLog {
    samples: VecDeque<MetricsSample>,
    capacity: usize,
}

impl Default for MetricsLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MetricsLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, sample: MetricsSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Samples, oldest first.
    pub fn samples(&self) -> Vec<MetricsSample> {
        self.samples.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mean elapsed time of `kind`'s retained samples, `0.0` if there are none.
    pub fn average(&self, kind: OperationKind) -> f64 {
        let (sum, count) = self
            .samples
            .iter()
            .filter(|s| s.kind == kind)
            .fold((0.0, 0usize), |(sum, count), s| (sum + s.elapsed_ms, count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Averages for every operation kind, keyed by [`OperationKind::as_str`].
    pub fn averages(&self) -> IndexMap<String, f64> {
        OperationKind::ALL
            .iter()
            .map(|kind| (kind.as_str().to_owned(), self.average(*kind)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
