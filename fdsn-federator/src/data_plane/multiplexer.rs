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

//! Streaming fan-out: many upstream bodies relayed as one lazy byte stream.

use crate::data_plane::accounting::{AccountingSink, FetchRecord};
use crate::data_plane::block_buffer::{BlockBuffer, DEFAULT_BLOCK_SIZE};
use crate::data_plane::upstream::{FetchError, UpstreamFetcher, UpstreamResponse};
use crate::error::FederatorError;
use crate::observability::{events, fields};
use crate::routing::request_merge::Endpoint;
use bytes::Bytes;
use chrono::Utc;
use futures::future::FutureExt;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, info, trace, warn, Instrument, Span};

const COMPONENT: &str = "multiplexer";

/// Number of upstream connections opened ahead of the one being relayed.
pub const DEFAULT_PREFETCH: usize = 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MultiplexerConfig {
    pub block_size: usize,
    pub prefetch: usize,
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            prefetch: DEFAULT_PREFETCH,
        }
    }
}

/// Turns endpoint lists into [`MultiplexedBody`] streams.
#[derive(Clone)]
pub struct StreamingMultiplexer {
    fetcher: Arc<dyn UpstreamFetcher>,
    accounting: Option<Arc<dyn AccountingSink>>,
    config: MultiplexerConfig,
}

impl StreamingMultiplexer {
    pub fn new(fetcher: Arc<dyn UpstreamFetcher>, config: MultiplexerConfig) -> Self {
        Self {
            fetcher,
            accounting: None,
            config,
        }
    }

    pub fn with_accounting(mut self, sink: Arc<dyn AccountingSink>) -> Self {
        self.accounting = Some(sink);
        self
    }

    pub fn config(&self) -> MultiplexerConfig {
        self.config
    }

    /// Relays every endpoint body, in list order, as one stream of blocks.
    ///
    /// Up to `prefetch` connections are opened ahead on the tokio runtime while
    /// the current body is relayed; bytes of endpoint N always precede those of
    /// endpoint N+1. A failing endpoint is logged, accounted and skipped. Nothing
    /// happens until the returned body is polled, and dropping it cancels every
    /// outstanding request.
    pub fn stream(&self, endpoints: Vec<Endpoint>) -> MultiplexedBody {
        let total = endpoints.len();
        let fetcher = Arc::clone(&self.fetcher);
        let relay = Arc::new(RelayContext {
            accounting: self.accounting.clone(),
            block_size: self.config.block_size,
            total,
        });

        let opened = stream::iter(endpoints.into_iter().enumerate())
            .map(move |(position, endpoint)| {
                debug!(
                    event = events::UPSTREAM_CONNECT,
                    component = COMPONENT,
                    url = endpoint.url.as_str(),
                    position = %fields::format_position(position, total),
                    "opening upstream"
                );
                let fetcher = Arc::clone(&fetcher);
                let url = endpoint.url.clone();
                let (remote, handle) = async move { fetcher.open(&url).await }
                    .instrument(Span::current())
                    .remote_handle();
                // The remote half stops as soon as its handle is dropped.
                tokio::spawn(remote);
                handle.map(move |opened| (position, endpoint, opened))
            })
            .buffered(self.config.prefetch.max(1));

        let blocks = opened
            .flat_map(move |(position, endpoint, opened)| {
                Arc::clone(&relay).relay(position, endpoint, opened)
            })
            .boxed();

        MultiplexedBody { blocks }
    }
}

struct RelayContext {
    accounting: Option<Arc<dyn AccountingSink>>,
    block_size: usize,
    total: usize,
}

impl RelayContext {
    fn relay(
        self: Arc<Self>,
        position: usize,
        endpoint: Endpoint,
        opened: Result<UpstreamResponse, FetchError>,
    ) -> BoxStream<'static, Bytes> {
        match opened {
            Ok(response) => {
                let state = RelayState {
                    buffer: BlockBuffer::new(self.block_size),
                    context: self,
                    position,
                    endpoint,
                    status: response.status,
                    body: response.body,
                    ready: VecDeque::new(),
                    delivered: 0,
                    ending: None,
                };
                stream::unfold(state, RelayState::next_block).boxed()
            }
            Err(err) => {
                self.report_failure(position, &endpoint, 0, err.status(), &err);
                stream::empty().boxed()
            }
        }
    }

    fn report_complete(&self, position: usize, endpoint: &Endpoint, status: u16, bytes: u64) {
        info!(
            event = events::UPSTREAM_COMPLETE,
            component = COMPONENT,
            url = endpoint.url.as_str(),
            position = %fields::format_position(position, self.total),
            status,
            bytes,
            "upstream relayed"
        );
        self.account(endpoint, Some(status), bytes);
    }

    fn report_failure(
        &self,
        position: usize,
        endpoint: &Endpoint,
        bytes: u64,
        status: Option<u16>,
        err: &FetchError,
    ) {
        warn!(
            event = events::UPSTREAM_FAILED,
            component = COMPONENT,
            url = endpoint.url.as_str(),
            position = %fields::format_position(position, self.total),
            status = %fields::format_status(status),
            bytes,
            reason = fields::failure_reason(err),
            err = %err,
            "upstream failed; skipping endpoint"
        );
        self.account(endpoint, err.status(), bytes);
    }

    fn account(&self, endpoint: &Endpoint, status: Option<u16>, bytes: u64) {
        let Some(sink) = self.accounting.as_ref() else {
            return;
        };
        let record = FetchRecord {
            timestamp: Utc::now(),
            status,
            url: endpoint.url.clone(),
            line: endpoint.line.clone(),
            bytes,
        };
        if let Err(err) = sink.record(&record) {
            warn!(
                event = events::ACCOUNTING_FAILED,
                component = COMPONENT,
                url = endpoint.url.as_str(),
                err = %err,
                "accounting callback failed"
            );
        }
    }
}

/// Relay progress of one opened endpoint.
struct RelayState {
    context: Arc<RelayContext>,
    position: usize,
    endpoint: Endpoint,
    status: u16,
    body: BoxStream<'static, Result<Bytes, FetchError>>,
    buffer: BlockBuffer,
    ready: VecDeque<Bytes>,
    delivered: u64,
    ending: Option<Result<(), FetchError>>,
}

impl RelayState {
    async fn next_block(mut self) -> Option<(Bytes, Self)> {
        loop {
            if let Some(block) = self.ready.pop_front() {
                self.delivered += block.len() as u64;
                trace!(
                    event = events::UPSTREAM_BLOCK,
                    component = COMPONENT,
                    url = self.endpoint.url.as_str(),
                    bytes = self.delivered,
                    "block relayed"
                );
                return Some((block, self));
            }

            match self.ending.take() {
                Some(Ok(())) => {
                    self.context.report_complete(
                        self.position,
                        &self.endpoint,
                        self.status,
                        self.delivered,
                    );
                    return None;
                }
                Some(Err(err)) => {
                    self.context.report_failure(
                        self.position,
                        &self.endpoint,
                        self.delivered,
                        Some(self.status),
                        &err,
                    );
                    return None;
                }
                None => {}
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.ready.extend(self.buffer.push(&chunk)),
                Some(Err(err)) => {
                    let dropped = self.buffer.discard();
                    if dropped > 0 {
                        warn!(
                            event = events::UPSTREAM_PARTIAL_BLOCK_DROPPED,
                            component = COMPONENT,
                            url = self.endpoint.url.as_str(),
                            dropped,
                            "incomplete block of a failed upstream dropped"
                        );
                    }
                    self.ending = Some(Err(err));
                }
                None => {
                    self.ready.extend(self.buffer.finish());
                    self.ending = Some(Ok(()));
                }
            }
        }
    }
}

/// The merged response body; a single-pass stream of blocks.
pub struct MultiplexedBody {
    blocks: BoxStream<'static, Bytes>,
}

impl MultiplexedBody {
    /// Waits for the first block so the caller can choose between a data answer
    /// and "no content" before sending any status.
    pub async fn primed(mut self) -> Result<PrimedBody, FederatorError> {
        match self.blocks.next().await {
            Some(first) => Ok(PrimedBody {
                first: Some(first),
                rest: self,
            }),
            None => Err(FederatorError::NoContent(
                "no upstream delivered any data".to_string(),
            )),
        }
    }
}

impl Stream for MultiplexedBody {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.blocks.poll_next_unpin(cx)
    }
}

/// A [`MultiplexedBody`] known to carry at least one block.
pub struct PrimedBody {
    first: Option<Bytes>,
    rest: MultiplexedBody,
}

impl Stream for PrimedBody {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(first) = self.first.take() {
            return Poll::Ready(Some(first));
        }
        Pin::new(&mut self.rest).poll_next(cx)
    }
}
