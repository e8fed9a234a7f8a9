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

//! # fdsn-federator
//!
//! `fdsn-federator` answers FDSN web-service queries on behalf of many
//! independently operated data centres. A query names a network/station/
//! location/channel pattern, a time window and a service; the federator finds
//! the upstreams holding the matching data, arbitrates overlapping route
//! definitions by priority and relays the upstream answers as one byte stream.
//!
//! Typical usage is centered on [`Federator`]: publish routing tables, turn a
//! request into a [`ParsedQuery`] and pull the resulting body.
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use bytes::Bytes;
//! use futures::{stream, StreamExt};
//! use fdsn_federator::control_plane::route_table::{OverlapPolicy, Route, RouteTableBuilder};
//! use fdsn_federator::control_plane::virtual_network::VirtualNetworkTable;
//! use fdsn_federator::data_plane::upstream::{FetchError, UpstreamFetcher, UpstreamResponse};
//! use fdsn_federator::routing::time_window::TimeWindow;
//! use fdsn_federator::{Federator, FederatorConfig, Identifier, ParsedQuery};
//!
//! # struct CannedFetcher;
//! #
//! # #[async_trait]
//! # impl UpstreamFetcher for CannedFetcher {
//! #     async fn open(&self, _url: &str) -> Result<UpstreamResponse, FetchError> {
//! #         let body = stream::iter(vec![Ok(Bytes::from_static(b"miniseed"))]).boxed();
//! #         Ok(UpstreamResponse::new(200, body))
//! #     }
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let federator = Federator::new("quick-start", FederatorConfig::default(), Arc::new(CannedFetcher));
//!
//! let mut routes = RouteTableBuilder::new(OverlapPolicy::Forbid);
//! routes.add_route(
//!     Identifier::new("GE", "*", "*", "*"),
//!     Route::new(
//!         "dataselect",
//!         "http://geofon.gfz-potsdam.de/fdsnws/dataselect/1/query",
//!         TimeWindow::unbounded(),
//!         1,
//!     ),
//! );
//! federator.publish(routes.build(), VirtualNetworkTable::default());
//!
//! let query = ParsedQuery::from_get_params("dataselect", [("net", "GE"), ("sta", "APE")]).unwrap();
//! let body = federator.query(&query).await.unwrap();
//! let payload: Vec<Bytes> = body.collect().await;
//! assert_eq!(payload.concat(), b"miniseed");
//! # });
//! ```
//!
//! ## Failure model
//!
//! Callers see exactly three conditions, [`FederatorError::Client`],
//! [`FederatorError::NoContent`] and [`FederatorError::UpstreamFault`]. A single
//! failing upstream never fails a query: it is logged and skipped, and only a
//! query that delivers nothing at all degrades to `NoContent`.
//!
//! ## Internal architecture map
//!
//! - API facade: [`Federator`] and the query adapters in [`query`]
//! - Control plane: route table construction, virtual networks and snapshot publication
//! - Routing: pattern matching, time windows, resolution and identifier expansion
//! - Data plane: upstream fetch seam, block re-chunking, accounting and multiplexing
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events/spans and does not unconditionally initialize a global
//! subscriber. Binaries and tests are responsible for one-time
//! `tracing_subscriber` initialization at process boundaries.

pub mod control_plane;
pub mod data_plane;
pub mod query;
pub mod routing;

mod error;
pub use error::{FederatorError, RoutingError};

mod federator;
pub use federator::{Federator, FederatorConfig};

mod identifier;
pub use identifier::{Identifier, LOCATION_PLACEHOLDER, WILDCARD};

#[doc(hidden)]
pub mod observability;

pub use query::{ParsedQuery, QueryLimits, StreamRequest};
