// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::errors::ProcessingError;
use crate::events::EventSink;
use crate::metrics::ValidatorMetrics;
use crate::source::SnapshotSource;
use crate::types::{SystemStateSnapshot, ValidatorRecord};
use crate::{MAX_POLL_INTERVAL_SECS, MIN_POLL_INTERVAL_SECS};

/// Reads the active validator set from the system-state object on a fixed
/// interval and reports four observations per validator to the metric and
/// event sinks.
///
/// The reporter holds no state across ticks; every tick derives its values
/// from the snapshot it was handed and discards them after the sinks have
/// seen them.
pub struct ValidatorSnapshotReporter {
    source: Arc<dyn SnapshotSource>,
    metrics: ValidatorMetrics,
    events: Arc<dyn EventSink>,
    poll_interval: Duration,
}

impl ValidatorSnapshotReporter {
    /// `poll_interval` is clamped to the supported reporting bounds.
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        metrics: ValidatorMetrics,
        events: Arc<dyn EventSink>,
        poll_interval: Duration,
    ) -> Self {
        let clamped = poll_interval.clamp(
            Duration::from_secs(MIN_POLL_INTERVAL_SECS),
            Duration::from_secs(MAX_POLL_INTERVAL_SECS),
        );
        if clamped != poll_interval {
            warn!(
                "Poll interval {:?} outside supported bounds, using {:?}",
                poll_interval, clamped
            );
        }
        Self {
            source,
            metrics,
            events,
            poll_interval: clamped,
        }
    }

    /// Poll until the cancellation token is triggered. Fetch failures are
    /// logged and the tick is skipped; nothing is retried.
    pub async fn run(self, cancel: CancellationToken) -> anyhow::Result<()> {
        info!(
            "Starting validator snapshot reporter, polling every {:?}",
            self.poll_interval
        );
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown received, stopping validator snapshot reporter");
                    return Ok(());
                }
                _ = interval.tick() => {
                    match self.source.latest_snapshot().await {
                        Ok(snapshot) => self.process_snapshot(snapshot.as_ref()),
                        Err(e) => error!("Failed to fetch system-state snapshot: {e:#}"),
                    }
                }
            }
        }
    }

    /// One invocation. An absent snapshot is a no-op. Any processing error
    /// is caught here, logged once with its message, and suppressed; the
    /// remainder of the batch is not processed.
    pub fn process_snapshot(&self, snapshot: Option<&SystemStateSnapshot>) {
        let Some(snapshot) = snapshot else {
            return;
        };
        if let Err(e) = self.report_validators(snapshot) {
            error!("Error processing validator stats: {e}");
        }
    }

    fn report_validators(&self, snapshot: &SystemStateSnapshot) -> Result<(), ProcessingError> {
        for raw in &snapshot.active_validators {
            let stats = ValidatorRecord::from_raw(raw)?.derive_stats();
            self.metrics.record(&stats);
            self.events.emit(&stats);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::source::SnapshotSource;
    use anyhow::Result;
    use async_trait::async_trait;
    use prometheus::core::Collector;
    use serde_json::{json, Value};

    struct NullSource;

    #[async_trait]
    impl SnapshotSource for NullSource {
        async fn latest_snapshot(&self) -> Result<Option<SystemStateSnapshot>> {
            Ok(None)
        }
    }

    fn entry(address: &str, staking: &str, rewards: &str, rate: u64, gas: u64) -> Value {
        json!({
            "fields": {
                "sui_address": address,
                "staking_pool_sui_balance": staking,
                "rewards_pool": rewards,
                "commission_rate": rate,
                "gas_price": gas,
            }
        })
    }

    fn reporter() -> (ValidatorSnapshotReporter, Arc<CollectingEventSink>) {
        let events = Arc::new(CollectingEventSink::new());
        let reporter = ValidatorSnapshotReporter::new(
            Arc::new(NullSource),
            ValidatorMetrics::new_for_testing(),
            events.clone(),
            Duration::from_secs(60),
        );
        (reporter, events)
    }

    #[test]
    fn absent_snapshot_is_a_no_op() {
        let (reporter, events) = reporter();
        reporter.process_snapshot(None);
        assert!(events.events().is_empty());
        assert_eq!(
            reporter.metrics.gas_price.collect()[0].get_metric().len(),
            0
        );
    }

    #[test]
    fn reports_one_event_per_validator() {
        let (reporter, events) = reporter();
        let snapshot = SystemStateSnapshot {
            active_validators: vec![
                entry("0xAA", "5000000000", "250000000", 200, 1000),
                entry("0xBB", "2000000000", "1000000000", 500, 900),
            ],
        };
        reporter.process_snapshot(Some(&snapshot));

        let emitted = events.events();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[0].validator, "0xAA");
        assert_eq!(emitted[1].validator, "0xBB");
    }

    #[test]
    fn converts_balances_and_passes_rates_through() {
        let (reporter, events) = reporter();
        let snapshot = SystemStateSnapshot {
            active_validators: vec![entry("0xAA", "5000000000", "250000000", 200, 1000)],
        };
        reporter.process_snapshot(Some(&snapshot));

        let stats = &events.events()[0];
        assert_eq!(stats.staking_pool_balance, 5.0);
        assert_eq!(stats.rewards_pool, 0.25);
        assert_eq!(stats.commission_rate, 200);
        assert_eq!(stats.gas_price, 1000);

        let m = &reporter.metrics;
        assert_eq!(
            m.staking_pool_balance.with_label_values(&["0xAA"]).get(),
            5.0
        );
        assert_eq!(m.rewards_pool.with_label_values(&["0xAA"]).get(), 0.25);
        assert_eq!(m.commission_rate.with_label_values(&["0xAA"]).get(), 200);
        assert_eq!(m.gas_price.with_label_values(&["0xAA"]).get(), 1000);
    }

    #[test]
    fn bad_record_stops_the_rest_of_the_batch() {
        let (reporter, events) = reporter();
        let snapshot = SystemStateSnapshot {
            active_validators: vec![
                entry("0xAA", "5000000000", "250000000", 200, 1000),
                json!({ "fields": { "sui_address": "0xBB" } }),
                entry("0xCC", "1000000000", "0", 100, 800),
            ],
        };
        reporter.process_snapshot(Some(&snapshot));

        // The first record went through, the malformed one and everything
        // after it did not.
        let emitted = events.events();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].validator, "0xAA");
        assert_eq!(
            reporter.metrics.gas_price.collect()[0].get_metric().len(),
            1
        );
    }

    #[test]
    fn interval_is_clamped_to_bounds() {
        let make = |secs| {
            ValidatorSnapshotReporter::new(
                Arc::new(NullSource),
                ValidatorMetrics::new_for_testing(),
                Arc::new(CollectingEventSink::new()),
                Duration::from_secs(secs),
            )
        };
        assert_eq!(make(1).poll_interval, Duration::from_secs(10));
        assert_eq!(make(60).poll_interval, Duration::from_secs(60));
        assert_eq!(make(100_000).poll_interval, Duration::from_secs(1440));
    }
}
