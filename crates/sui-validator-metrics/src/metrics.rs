// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::net::SocketAddr;

use axum::{http::StatusCode, routing::get, Extension, Router};
use prometheus::{
    register_gauge_vec_with_registry, register_int_gauge_vec_with_registry, GaugeVec, IntGaugeVec,
    Registry, TextEncoder,
};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::types::ValidatorStats;

/// Per-validator gauge series. The series names and the `validator` label are
/// a fixed external interface consumed by existing dashboards, so they carry
/// no crate prefix.
#[derive(Clone, Debug)]
pub struct ValidatorMetrics {
    pub(crate) staking_pool_balance: GaugeVec,
    pub(crate) rewards_pool: GaugeVec,
    pub(crate) commission_rate: IntGaugeVec,
    pub(crate) gas_price: IntGaugeVec,
}

impl ValidatorMetrics {
    pub fn new(registry: &Registry) -> Self {
        Self {
            staking_pool_balance: register_gauge_vec_with_registry!(
                "staking_pool_balance",
                "Validator staking pool balance in SUI",
                &["validator"],
                registry,
            )
            .unwrap(),
            rewards_pool: register_gauge_vec_with_registry!(
                "rewards_pool",
                "Validator rewards pool balance in SUI",
                &["validator"],
                registry,
            )
            .unwrap(),
            commission_rate: register_int_gauge_vec_with_registry!(
                "commission_rate",
                "Validator commission rate in basis points",
                &["validator"],
                registry,
            )
            .unwrap(),
            gas_price: register_int_gauge_vec_with_registry!(
                "gas_price",
                "Validator gas price in MIST",
                &["validator"],
                registry,
            )
            .unwrap(),
        }
    }

    pub fn new_for_testing() -> Self {
        let registry = Registry::new();
        Self::new(&registry)
    }

    /// Record all four observations for one validator.
    pub fn record(&self, stats: &ValidatorStats) {
        let labels = &[stats.validator.as_str()];
        self.staking_pool_balance
            .with_label_values(labels)
            .set(stats.staking_pool_balance);
        self.rewards_pool
            .with_label_values(labels)
            .set(stats.rewards_pool);
        self.commission_rate
            .with_label_values(labels)
            .set(stats.commission_rate as i64);
        self.gas_price
            .with_label_values(labels)
            .set(stats.gas_price as i64);
    }
}

/// A service that exposes prometheus metrics over HTTP on a "/metrics" route
/// on the provided listen address.
pub struct MetricsService {
    addr: SocketAddr,
    registry: Registry,
    cancel: CancellationToken,
}

impl MetricsService {
    /// Create a new instance of the service, listening on `addr`, serving
    /// metrics from the `registry`. The service will shut down if the
    /// provided `cancel` token is cancelled.
    ///
    /// The service will not be run until [Self::run] is called.
    pub fn new(addr: SocketAddr, registry: Registry, cancel: CancellationToken) -> Self {
        Self {
            addr,
            registry,
            cancel,
        }
    }

    /// Start the service. The service will run until the cancellation token
    /// is triggered.
    pub async fn run(self) -> anyhow::Result<JoinHandle<()>> {
        let Self {
            addr,
            registry,
            cancel,
        } = self;

        let listener = TcpListener::bind(&addr).await?;
        let app = Router::new()
            .route("/metrics", get(metrics))
            .layer(Extension(registry));

        Ok(tokio::spawn(async move {
            info!("Starting metrics service on {}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    cancel.cancelled().await;
                    info!("Shutdown received, shutting down metrics service");
                })
                .await
                .unwrap()
        }))
    }
}

/// Route handler for metrics service
async fn metrics(Extension(registry): Extension<Registry>) -> (StatusCode, String) {
    match TextEncoder.encode_to_string(&registry.gather()) {
        Ok(s) => (StatusCode::OK, s),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("unable to encode metrics: {e}"),
        ),
    }
}
