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

use bytes::Bytes;
use fdsn_federator::control_plane::route_table::RouteTable;
use fdsn_federator::control_plane::virtual_network::VirtualNetworkTable;
use fdsn_federator::data_plane::multiplexer::PrimedBody;
use fdsn_federator::data_plane::upstream::UpstreamFetcher;
use fdsn_federator::{Federator, FederatorConfig};
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const DATASELECT: &str = "dataselect";

pub(crate) fn make_federator(
    name: &str,
    config: FederatorConfig,
    fetcher: Arc<dyn UpstreamFetcher>,
    routes: RouteTable,
    virtual_networks: VirtualNetworkTable,
) -> Federator {
    let federator = Federator::new(name, config, fetcher);
    federator.publish(routes, virtual_networks);
    federator
}

pub(crate) async fn collect_text(body: PrimedBody) -> String {
    let blocks: Vec<Bytes> = body.collect().await;
    String::from_utf8(blocks.concat()).expect("scripted bodies are UTF-8")
}

#[allow(dead_code)]
pub(crate) async fn eventually<F, Fut>(what: &str, mut probe: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !probe().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for {what}");
}
