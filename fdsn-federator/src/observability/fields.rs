/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Canonical structured field keys and value-format helpers.

use crate::data_plane::upstream::FetchError;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const QUERY_ID: &str = "query_id";

pub const URL: &str = "url";
pub const SERVICE: &str = "service";
pub const STREAM: &str = "stream";
pub const WINDOW: &str = "window";
pub const PRIORITY: &str = "priority";

pub const POSITION: &str = "position";
pub const BYTES: &str = "bytes";
pub const STATUS: &str = "status";
pub const REASON: &str = "reason";
pub const ERR: &str = "err";

pub const NONE: &str = "none";
pub const REASON_CONNECT: &str = "connect";
pub const REASON_STATUS: &str = "status";
pub const REASON_READ: &str = "read";

/// Renders an optional HTTP status, `none` when the request never got one.
pub fn format_status(status: Option<u16>) -> String {
    status
        .map(|status| status.to_string())
        .unwrap_or_else(|| NONE.to_string())
}

/// Short failure class for an upstream error.
pub fn failure_reason(err: &FetchError) -> &'static str {
    match err {
        FetchError::Status { .. } => REASON_STATUS,
        FetchError::Read(_) => REASON_READ,
        FetchError::Connect(_) | FetchError::InvalidUrl(_) => REASON_CONNECT,
    }
}

/// `position/total` label used on per-endpoint log lines.
pub fn format_position(position: usize, total: usize) -> String {
    format!("{}/{}", position + 1, total)
}
