// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use tracing::info;

use crate::types::ValidatorStats;

/// Event name attached to every per-validator emission.
pub const VALIDATOR_STATS_EVENT: &str = "ValidatorStats";

/// Structured event output. One emission per validator per reporter tick.
pub trait EventSink: Send + Sync {
    fn emit(&self, stats: &ValidatorStats);
}

/// Emits each event as one structured line on the tracing stream, under the
/// `validator_events` target so it can be filtered or routed independently
/// of operational logs.
#[derive(Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, stats: &ValidatorStats) {
        info!(
            target: "validator_events",
            event = VALIDATOR_STATS_EVENT,
            validator = %stats.validator,
            staking_pool_balance = stats.staking_pool_balance,
            rewards_pool = stats.rewards_pool,
            commission_rate = stats.commission_rate,
            gas_price = stats.gas_price,
        );
    }
}

/// Collects emitted events in memory. Test sink.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: std::sync::Mutex<Vec<ValidatorStats>>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ValidatorStats> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, stats: &ValidatorStats) {
        self.events.lock().unwrap().push(stats.clone());
    }
}
