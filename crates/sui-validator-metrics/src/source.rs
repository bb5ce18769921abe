// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::types::SystemStateSnapshot;

/// Where snapshots of the system-state object come from.
///
/// `Ok(None)` means the object is currently absent, which the reporter treats
/// as a defined no-op rather than an error.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn latest_snapshot(&self) -> Result<Option<SystemStateSnapshot>>;
}

/// Reads the system-state object from a fullnode via JSON-RPC
/// (`sui_getObject` with `showContent`).
pub struct FullnodeSnapshotSource {
    client: reqwest::Client,
    rpc_url: String,
    object_id: String,
}

impl FullnodeSnapshotSource {
    pub fn new(rpc_url: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
            object_id: object_id.into(),
        }
    }
}

#[async_trait]
impl SnapshotSource for FullnodeSnapshotSource {
    async fn latest_snapshot(&self) -> Result<Option<SystemStateSnapshot>> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "sui_getObject",
            "params": [self.object_id, {"showContent": true}],
        });

        let response: RpcResponse = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .context("fullnode request failed")?
            .error_for_status()
            .context("fullnode returned an error status")?
            .json()
            .await
            .context("fullnode response is not valid JSON-RPC")?;

        snapshot_from_response(response)
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<ObjectResponse>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    data: Option<ObjectData>,
}

#[derive(Debug, Deserialize)]
struct ObjectData {
    content: Option<ObjectContent>,
}

#[derive(Debug, Deserialize)]
struct ObjectContent {
    fields: Value,
}

/// Maps an RPC response to an optional snapshot. An object without data or
/// content (deleted, pruned, or not yet available) is an absent snapshot;
/// an RPC-level error or unexpected content shape is an error.
fn snapshot_from_response(response: RpcResponse) -> Result<Option<SystemStateSnapshot>> {
    if let Some(err) = response.error {
        bail!("RPC error {}: {}", err.code, err.message);
    }
    let Some(content) = response
        .result
        .and_then(|r| r.data)
        .and_then(|d| d.content)
    else {
        return Ok(None);
    };
    let snapshot = serde_json::from_value(content.fields)
        .context("system-state object content has an unexpected shape")?;
    Ok(Some(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: Value) -> RpcResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn parses_snapshot_from_object_content() {
        let snapshot = snapshot_from_response(response(json!({
            "result": {
                "data": {
                    "content": {
                        "dataType": "moveObject",
                        "fields": {
                            "epoch": "700",
                            "active_validators": [{"fields": {"sui_address": "0xAA"}}],
                        }
                    }
                }
            }
        })))
        .unwrap()
        .unwrap();
        assert_eq!(snapshot.active_validators.len(), 1);
    }

    #[test]
    fn absent_object_is_no_snapshot() {
        for body in [
            json!({ "result": { "data": null } }),
            json!({ "result": { "data": { "content": null } } }),
            json!({ "result": null }),
        ] {
            assert!(snapshot_from_response(response(body)).unwrap().is_none());
        }
    }

    #[test]
    fn rpc_error_is_an_error() {
        let err = snapshot_from_response(response(json!({
            "error": { "code": -32602, "message": "Invalid params" }
        })))
        .unwrap_err();
        assert!(err.to_string().contains("Invalid params"));
    }

    #[test]
    fn unexpected_content_shape_is_an_error() {
        let result = snapshot_from_response(response(json!({
            "result": { "data": { "content": { "fields": { "epoch": "700" } } } }
        })));
        assert!(result.is_err());
    }
}
