use serde::Deserialize;

use crate::metrics::DEFAULT_CAPACITY;

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreOptions {
    /// Emit a `tracing` debug record for every committed mutation.
    pub debug: bool,
    /// Number of timing samples retained.
    pub metrics_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            debug: false,
            metrics_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl StoreOptions {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_metrics_capacity(mut self, capacity: usize) -> Self {
        self.metrics_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial() {
        let options: StoreOptions = serde_json::from_str(r#"{"debug": true}"#).unwrap();
        assert_eq!(options, StoreOptions::default().with_debug(true));

        let options: StoreOptions = serde_json::from_str(r#"{"metricsCapacity": 5}"#).unwrap();
        assert_eq!(options.metrics_capacity, 5);
        assert!(!options.debug);
    }
}
