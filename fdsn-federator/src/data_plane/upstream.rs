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

//! Upstream fetch seam and its HTTP implementation.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const COMPONENT: &str = "http_fetcher";

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FetchError {
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("upstream answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("reading upstream body failed: {0}")]
    Read(String),
}

impl FetchError {
    /// The HTTP status carried by the error, if the upstream answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// An opened upstream answer whose body has not been read yet.
pub struct UpstreamResponse {
    pub status: u16,
    pub body: BoxStream<'static, Result<Bytes, FetchError>>,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: BoxStream<'static, Result<Bytes, FetchError>>) -> Self {
        Self { status, body }
    }
}

impl std::fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Opens one upstream GET endpoint.
///
/// Implementations return `Err` for anything that is not a success status so
/// the multiplexer can log and skip the endpoint.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    async fn open(&self, url: &str) -> Result<UpstreamResponse, FetchError>;
}

/// Client settings for [`HttpFetcher`].
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("fdsn-federator/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpClientConfig {
    /// A `reqwest` client with these settings, shareable with other HTTP users.
    pub fn build_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent)
            .build()
    }
}

/// [`UpstreamFetcher`] backed by a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpClientConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: config.build_client()?,
        })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UpstreamFetcher for HttpFetcher {
    async fn open(&self, url: &str) -> Result<UpstreamResponse, FetchError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|err| FetchError::InvalidUrl(err.to_string()))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|err| FetchError::Connect(err.to_string()))?;

        let status = response.status();
        debug!(
            component = COMPONENT,
            url,
            status = status.as_u16(),
            "upstream answered"
        );
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|err| err.to_string());
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let body = response
            .bytes_stream()
            .map_err(|err| FetchError::Read(err.to_string()))
            .boxed();
        Ok(UpstreamResponse::new(status.as_u16(), body))
    }
}
