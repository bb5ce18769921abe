// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors raised while turning a raw validator entry into reported values.
///
/// Both variants abort the current batch at the reporter's invocation
/// boundary; neither is retried.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("malformed validator record: {0}")]
    MalformedRecord(String),

    #[error("cannot convert field `{field}` to a number: {reason}")]
    Conversion { field: &'static str, reason: String },
}
