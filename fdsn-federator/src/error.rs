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

//! Error taxonomy surfaced to the request-handling collaborator.

use crate::routing::time_window::TimeWindowError;
use serde_json::json;
use thiserror::Error;

/// Resolution failures.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RoutingError {
    #[error("no route found for {stream} {window} ({service})")]
    NoRouteFound {
        stream: String,
        window: String,
        service: String,
    },
}

/// The three conditions a caller has to distinguish.
///
/// | kind | meaning | suggested status |
/// |---|---|---|
/// | `Client` | the request itself is unusable | 400 |
/// | `NoContent` | valid request, nothing to deliver | 204 |
/// | `UpstreamFault` | an upstream failed outside of a multiplexed stream | 502 |
///
/// Failures inside a relayed query never become `UpstreamFault`: they are
/// skipped, and a query nobody answered is `NoContent`. The variant is left to
/// collaborators that talk to an upstream on their own.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FederatorError {
    #[error("{0}")]
    Client(String),
    #[error("{0}")]
    NoContent(String),
    #[error("{0}")]
    UpstreamFault(String),
}

impl FederatorError {
    pub fn client(message: impl Into<String>) -> Self {
        FederatorError::Client(message.into())
    }

    pub fn http_status(&self) -> u16 {
        match self {
            FederatorError::Client(_) => 400,
            FederatorError::NoContent(_) => 204,
            FederatorError::UpstreamFault(_) => 502,
        }
    }

    /// JSON error document sent along with a 400 answer.
    pub fn to_json_body(&self) -> String {
        json!({ "code": 0, "message": self.to_string() }).to_string()
    }
}

impl From<RoutingError> for FederatorError {
    fn from(err: RoutingError) -> Self {
        FederatorError::NoContent(err.to_string())
    }
}

impl From<TimeWindowError> for FederatorError {
    fn from(err: TimeWindowError) -> Self {
        FederatorError::Client(err.to_string())
    }
}
