// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// config as loaded from `config.yaml`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReporterConfig {
    #[serde(default = "default_fullnode_rpc_url")]
    pub fullnode_rpc_url: String,
    /// Seconds between snapshot reads. Clamped to the supported bounds at
    /// startup.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_metrics_address")]
    pub metrics_address: SocketAddr,
}

impl ReporterConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("cannot parse config file {}", path.display()))
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            fullnode_rpc_url: default_fullnode_rpc_url(),
            poll_interval_secs: default_poll_interval_secs(),
            metrics_address: default_metrics_address(),
        }
    }
}

fn default_fullnode_rpc_url() -> String {
    "https://fullnode.mainnet.sui.io:443".to_string()
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_metrics_address() -> SocketAddr {
    "0.0.0.0:9184".parse().unwrap()
}
