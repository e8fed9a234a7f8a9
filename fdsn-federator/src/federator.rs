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

//! Facade tying query adapters, route resolution and the multiplexer together.

use crate::control_plane::route_table::{OverlapPolicy, RouteTable};
use crate::control_plane::routing_directory::{RoutingDirectory, RoutingSnapshot};
use crate::control_plane::virtual_network::VirtualNetworkTable;
use crate::data_plane::accounting::AccountingSink;
use crate::data_plane::block_buffer::DEFAULT_BLOCK_SIZE;
use crate::data_plane::multiplexer::{
    MultiplexerConfig, PrimedBody, StreamingMultiplexer, DEFAULT_PREFETCH,
};
use crate::data_plane::upstream::UpstreamFetcher;
use crate::error::{FederatorError, RoutingError};
use crate::identifier::Identifier;
use crate::observability::events;
use crate::query::{
    ParsedQuery, QueryLimits, QueryTransport, DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_LINES,
};
use crate::routing::nslc_expansion::ls_nslc;
use crate::routing::request_merge::{Endpoint, RequestMerge};
use crate::routing::resolver::get_route;
use crate::routing::time_window::TimeWindow;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, info_span, Instrument, Span};
use uuid::Uuid;

const COMPONENT: &str = "federator";

/// Tunables of one federator instance.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FederatorConfig {
    /// Relay block size in bytes.
    pub block_size: usize,
    /// Upstream connections opened ahead of the one being relayed.
    pub prefetch: usize,
    /// Keep equal-priority routes that overlap instead of discarding the later one.
    pub allow_overlap: bool,
    /// Resolve GET queries once per concrete stream instead of once per pattern.
    pub expand_per_stream: bool,
    pub max_body_bytes: usize,
    pub max_lines: usize,
}

impl Default for FederatorConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            prefetch: DEFAULT_PREFETCH,
            allow_overlap: false,
            expand_per_stream: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

impl FederatorConfig {
    pub fn overlap_policy(&self) -> OverlapPolicy {
        OverlapPolicy::from_allow_overlap(self.allow_overlap)
    }

    pub fn query_limits(&self) -> QueryLimits {
        QueryLimits {
            max_body_bytes: self.max_body_bytes,
            max_lines: self.max_lines,
        }
    }

    pub fn multiplexer_config(&self) -> MultiplexerConfig {
        MultiplexerConfig {
            block_size: self.block_size,
            prefetch: self.prefetch,
        }
    }
}

/// One federation node: routing tables plus the upstream fan-out.
#[derive(Clone)]
pub struct Federator {
    name: String,
    config: FederatorConfig,
    directory: RoutingDirectory,
    multiplexer: StreamingMultiplexer,
}

impl Federator {
    /// Creates a federator with empty routing tables.
    pub fn new(name: &str, config: FederatorConfig, fetcher: Arc<dyn UpstreamFetcher>) -> Self {
        let multiplexer = StreamingMultiplexer::new(fetcher, config.multiplexer_config());
        info!(
            component = COMPONENT,
            name,
            block_size = config.block_size,
            prefetch = config.prefetch,
            allow_overlap = config.allow_overlap,
            "federator created"
        );
        Self {
            name: name.to_string(),
            config,
            directory: RoutingDirectory::empty(),
            multiplexer,
        }
    }

    pub fn with_accounting(mut self, sink: Arc<dyn AccountingSink>) -> Self {
        self.multiplexer = self.multiplexer.with_accounting(sink);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &FederatorConfig {
        &self.config
    }

    pub fn directory(&self) -> &RoutingDirectory {
        &self.directory
    }

    /// Publishes freshly built tables; queries already running keep their snapshot.
    pub fn publish(&self, routes: RouteTable, virtual_networks: VirtualNetworkTable) -> u64 {
        self.directory.publish(routes, virtual_networks)
    }

    /// Parses a POST body with this federator's size limits.
    pub fn parse_post(&self, service: &str, body: &str) -> Result<ParsedQuery, FederatorError> {
        ParsedQuery::from_post_body(service, body, &self.config.query_limits())
            .inspect_err(|err| log_rejected(service, err))
    }

    /// Resolves a query into its GET endpoints without contacting any upstream.
    pub fn resolve(&self, query: &ParsedQuery) -> Result<Vec<Endpoint>, FederatorError> {
        let span = query_span(query);
        let _entered = span.enter();
        self.resolve_endpoints(query)
    }

    /// Resolves a query and starts relaying it.
    ///
    /// Returns [`FederatorError::NoContent`] when nothing resolves or when no
    /// upstream delivers a single byte.
    pub async fn query(&self, query: &ParsedQuery) -> Result<PrimedBody, FederatorError> {
        let span = query_span(query);
        async {
            let endpoints = self.resolve_endpoints(query)?;
            let primed = self.multiplexer.stream(endpoints).primed().await;
            if let Err(err) = &primed {
                info!(
                    event = events::QUERY_NO_CONTENT,
                    component = COMPONENT,
                    err = %err,
                    "no upstream delivered data"
                );
            }
            primed
        }
        .instrument(span)
        .await
    }

    fn resolve_endpoints(&self, query: &ParsedQuery) -> Result<Vec<Endpoint>, FederatorError> {
        let snapshot = self.directory.snapshot();
        let expand = self.config.expand_per_stream && query.transport == QueryTransport::Get;

        let mut merge = RequestMerge::new();
        for request in &query.requests {
            if expand {
                let [network, station, location, channel] = request.identifier.fields();
                for identifier in ls_nslc(&[network], &[station], &[location], &[channel]) {
                    merge_route(&mut merge, &snapshot, &identifier, &request.window, query);
                }
            } else {
                merge_route(
                    &mut merge,
                    &snapshot,
                    &request.identifier,
                    &request.window,
                    query,
                );
            }
        }

        let endpoints = merge.to_endpoints();
        if endpoints.is_empty() {
            info!(
                event = events::QUERY_NO_CONTENT,
                component = COMPONENT,
                requests = query.requests.len(),
                "query resolved to no upstream"
            );
            return Err(FederatorError::NoContent(format!(
                "no route found for any of the {} requested stream(s)",
                query.requests.len()
            )));
        }
        Ok(endpoints)
    }
}

fn merge_route(
    merge: &mut RequestMerge,
    snapshot: &RoutingSnapshot,
    identifier: &Identifier,
    window: &TimeWindow,
    query: &ParsedQuery,
) {
    match get_route(snapshot, identifier, window, &query.service) {
        Ok(resolved) => merge.extend(resolved),
        Err(RoutingError::NoRouteFound { .. }) => {
            debug!(
                component = COMPONENT,
                stream = %identifier,
                window = %window,
                "request skipped; no route"
            );
        }
    }
}

fn query_span(query: &ParsedQuery) -> Span {
    info_span!(
        "query",
        query_id = %Uuid::new_v4(),
        service = query.service.as_str(),
        requests = query.requests.len()
    )
}

fn log_rejected(service: &str, err: &FederatorError) {
    info!(
        event = events::QUERY_REJECTED,
        component = COMPONENT,
        service,
        err = %err,
        "query rejected"
    );
}

#[cfg(test)]
mod tests {
    use super::{Federator, FederatorConfig};
    use crate::control_plane::route_table::{Route, RouteTableBuilder};
    use crate::control_plane::virtual_network::VirtualNetworkTable;
    use crate::data_plane::upstream::{FetchError, UpstreamFetcher, UpstreamResponse};
    use crate::error::FederatorError;
    use crate::identifier::Identifier;
    use crate::query::ParsedQuery;
    use crate::routing::time_window::TimeWindow;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures::{stream, StreamExt};
    use std::sync::Arc;

    struct UrlEcho;

    #[async_trait]
    impl UpstreamFetcher for UrlEcho {
        async fn open(&self, url: &str) -> Result<UpstreamResponse, FetchError> {
            let body = stream::iter(vec![Ok(Bytes::from(format!("{url}\n")))]).boxed();
            Ok(UpstreamResponse::new(200, body))
        }
    }

    fn federator(config: FederatorConfig) -> Federator {
        let federator = Federator::new("unit", config.clone(), Arc::new(UrlEcho));
        let mut builder = RouteTableBuilder::new(config.overlap_policy());
        builder.add_route(
            Identifier::new("GE", "*", "*", "*"),
            Route::new("dataselect", "http://geofon/query", TimeWindow::unbounded(), 1),
        );
        federator.publish(builder.build(), VirtualNetworkTable::default());
        federator
    }

    #[test]
    fn get_query_with_expansion_resolves_per_stream() {
        let federator = federator(FederatorConfig {
            expand_per_stream: true,
            ..FederatorConfig::default()
        });
        let query = ParsedQuery::from_get_params(
            "dataselect",
            [("net", "GE"), ("sta", "APE,WLF"), ("cha", "BHZ")],
        )
        .expect("query should parse");

        let lines: Vec<String> = federator
            .resolve(&query)
            .expect("query should resolve")
            .into_iter()
            .map(|endpoint| endpoint.line)
            .collect();

        assert_eq!(lines, vec!["GE APE * BHZ * *", "GE WLF * BHZ * *"]);
    }

    #[test]
    fn get_query_without_expansion_resolves_once() {
        let federator = federator(FederatorConfig::default());
        let query = ParsedQuery::from_get_params(
            "dataselect",
            [("net", "GE"), ("sta", "APE,WLF"), ("cha", "BHZ")],
        )
        .expect("query should parse");

        let endpoints = federator.resolve(&query).expect("query should resolve");
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].line, "GE APE,WLF * BHZ * *");
    }

    #[test]
    fn unroutable_query_is_no_content() {
        let federator = federator(FederatorConfig::default());
        let query = federator
            .parse_post("dataselect", "XX * * * * *\n")
            .expect("body should parse");

        assert!(matches!(
            federator.resolve(&query),
            Err(FederatorError::NoContent(_))
        ));
    }

    #[test]
    fn oversized_post_is_client_error() {
        let federator = federator(FederatorConfig {
            max_lines: 1,
            ..FederatorConfig::default()
        });

        let err = federator
            .parse_post("dataselect", "GE * * * * *\nGE * * * * *\n")
            .expect_err("second line exceeds the limit");
        assert_eq!(err.http_status(), 400);
    }

    #[tokio::test]
    async fn query_relays_resolved_upstreams() {
        let federator = federator(FederatorConfig::default());
        let query = federator
            .parse_post(
                "dataselect",
                "GE APE -- BHZ * *\nXX * * * * *\nGE WLF -- BHZ * *\n",
            )
            .expect("body should parse");

        let body = federator.query(&query).await.expect("data should arrive");
        let text = String::from_utf8(body.collect::<Vec<Bytes>>().await.concat())
            .expect("echoed URLs are UTF-8");

        assert_eq!(
            text,
            "http://geofon/query?net=GE&sta=APE&loc=--&cha=BHZ\n\
             http://geofon/query?net=GE&sta=WLF&loc=--&cha=BHZ\n"
        );
    }

    #[test]
    fn config_rejects_unknown_keys() {
        let parsed: Result<FederatorConfig, _> =
            serde_json::from_str(r#"{ "block_size": 4096, "unknown": true }"#);
        assert!(parsed.is_err());

        let parsed: FederatorConfig =
            serde_json::from_str(r#"{ "prefetch": 4 }"#).expect("partial config is valid");
        assert_eq!(parsed.prefetch, 4);
        assert_eq!(parsed.block_size, FederatorConfig::default().block_size);
    }
}
