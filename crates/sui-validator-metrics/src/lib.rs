// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

pub mod config;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod reporter;
pub mod source;
pub mod types;

/// Object ID of the Sui system-state object holding the active validator set.
pub const SUI_SYSTEM_STATE_OBJECT_ID: &str = "0x5";

/// Lower bound on the reporting interval, in seconds.
pub const MIN_POLL_INTERVAL_SECS: u64 = 10;

/// Upper bound on the reporting interval, in seconds.
pub const MAX_POLL_INTERVAL_SECS: u64 = 1440;

/// Number of MIST per SUI (9 decimal places).
pub const MIST_PER_SUI: f64 = 1_000_000_000.0;
