// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ProcessingError;
use crate::MIST_PER_SUI;

/// Point-in-time view of the system-state object's content.
///
/// Validator entries are kept loosely typed and only parsed one at a time in
/// the reporter, so a malformed entry cannot prevent the entries before it
/// from being reported.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemStateSnapshot {
    pub active_validators: Vec<Value>,
}

/// One validator's raw economic fields, extracted from a snapshot entry.
///
/// Balances are in MIST; commission rate and gas price are already in their
/// recorded units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorRecord {
    pub sui_address: String,
    pub staking_pool_sui_balance: u64,
    pub rewards_pool: u64,
    pub commission_rate: u64,
    pub gas_price: u64,
}

impl ValidatorRecord {
    /// Typed extraction from one raw validator entry. Entries carry their
    /// data under a `fields` wrapper, matching the object's JSON rendering.
    pub fn from_raw(raw: &Value) -> Result<Self, ProcessingError> {
        let fields = raw.get("fields").ok_or_else(|| {
            ProcessingError::MalformedRecord("missing `fields` wrapper".to_string())
        })?;

        let sui_address = require(fields, "sui_address")?
            .as_str()
            .ok_or_else(|| {
                ProcessingError::MalformedRecord("`sui_address` is not a string".to_string())
            })?
            .to_string();

        Ok(Self {
            sui_address,
            staking_pool_sui_balance: parse_u64(
                require(fields, "staking_pool_sui_balance")?,
                "staking_pool_sui_balance",
            )?,
            rewards_pool: parse_u64(require(fields, "rewards_pool")?, "rewards_pool")?,
            commission_rate: parse_u64(require(fields, "commission_rate")?, "commission_rate")?,
            gas_price: parse_u64(require(fields, "gas_price")?, "gas_price")?,
        })
    }

    /// Derive the reported observation, converting balances from MIST to SUI.
    pub fn derive_stats(&self) -> ValidatorStats {
        ValidatorStats {
            validator: self.sui_address.clone(),
            staking_pool_balance: self.staking_pool_sui_balance as f64 / MIST_PER_SUI,
            rewards_pool: self.rewards_pool as f64 / MIST_PER_SUI,
            commission_rate: self.commission_rate,
            gas_price: self.gas_price,
        }
    }
}

/// The per-validator observation handed to the metric and event sinks.
/// Lives for one reporter tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatorStats {
    pub validator: String,
    pub staking_pool_balance: f64,
    pub rewards_pool: f64,
    pub commission_rate: u64,
    pub gas_price: u64,
}

fn require<'a>(fields: &'a Value, name: &'static str) -> Result<&'a Value, ProcessingError> {
    fields
        .get(name)
        .ok_or_else(|| ProcessingError::MalformedRecord(format!("missing field `{name}`")))
}

/// Checked numeric parse. The object's JSON rendering carries u64 balances
/// as decimal strings and smaller quantities as JSON numbers; anything else
/// is a conversion failure rather than a silent NaN.
fn parse_u64(value: &Value, field: &'static str) -> Result<u64, ProcessingError> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| ProcessingError::Conversion {
            field,
            reason: format!("{n} is not an unsigned integer"),
        }),
        Value::String(s) => s.parse::<u64>().map_err(|e| ProcessingError::Conversion {
            field,
            reason: e.to_string(),
        }),
        other => Err(ProcessingError::Conversion {
            field,
            reason: format!("unexpected value {other}"),
        }),
    }
}
