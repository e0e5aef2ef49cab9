use serde::{Deserialize, Serialize};
use stratus_types::WriteKind;

use crate::config::ExecutorConfig;
use crate::executor::AggregateResult;

/// Consumed capacity of a put or delete run, under the name it is
/// published as (`batchPutConsumedCapacity` / `batchDeleteConsumedCapacity`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub kind: WriteKind,
    pub variable: String,
    pub consumed_capacity_units: f64,
}

impl CapacityReport {
    /// Returns `None` when capacity tracking is disabled.
    pub fn from_aggregate(
        kind: WriteKind,
        total: &AggregateResult,
        config: &ExecutorConfig,
    ) -> Option<Self> {
        config.track_consumed_capacity.then(|| Self {
            kind,
            variable: kind.capacity_variable().to_string(),
            consumed_capacity_units: total.total_consumed_capacity_units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_uses_operation_variable() {
        let total = AggregateResult {
            total_consumed_capacity_units: 4.5,
            ..Default::default()
        };
        let report =
            CapacityReport::from_aggregate(WriteKind::Delete, &total, &ExecutorConfig::default())
                .unwrap();
        assert_eq!(report.variable, "batchDeleteConsumedCapacity");
        assert_eq!(report.consumed_capacity_units, 4.5);
    }

    #[test]
    fn no_report_without_tracking() {
        let config = ExecutorConfig::default().with_capacity_tracking(false);
        let report = CapacityReport::from_aggregate(WriteKind::Put, &AggregateResult::default(), &config);
        assert!(report.is_none());
    }
}
