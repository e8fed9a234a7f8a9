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

//! Atomically swapped routing snapshots shared by concurrent queries.

use crate::control_plane::route_table::RouteTable;
use crate::control_plane::virtual_network::VirtualNetworkTable;
use crate::observability::events;
use arc_swap::ArcSwap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

const COMPONENT: &str = "routing_directory";

/// One fully built, immutable pair of routing tables.
#[derive(Debug, Default)]
pub struct RoutingSnapshot {
    pub version: u64,
    pub routes: RouteTable,
    pub virtual_networks: VirtualNetworkTable,
}

/// Handle to the currently published [`RoutingSnapshot`].
///
/// Readers take an `Arc` to one snapshot and use it for a whole query; a refresh
/// builds new tables elsewhere and publishes them in one swap.
#[derive(Clone)]
pub struct RoutingDirectory {
    snapshot: Arc<ArcSwap<RoutingSnapshot>>,
    next_version: Arc<AtomicU64>,
}

impl RoutingDirectory {
    /// A directory with empty tables at version 0.
    pub fn empty() -> Self {
        Self {
            snapshot: Arc::new(ArcSwap::from_pointee(RoutingSnapshot::default())),
            next_version: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn new(routes: RouteTable, virtual_networks: VirtualNetworkTable) -> Self {
        let directory = Self::empty();
        directory.publish(routes, virtual_networks);
        directory
    }

    /// Replaces the published snapshot and returns its version.
    pub fn publish(&self, routes: RouteTable, virtual_networks: VirtualNetworkTable) -> u64 {
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);
        let patterns = routes.len();
        let virtual_network_count = virtual_networks.len();
        self.snapshot.store(Arc::new(RoutingSnapshot {
            version,
            routes,
            virtual_networks,
        }));
        info!(
            event = events::ROUTING_SNAPSHOT_PUBLISHED,
            component = COMPONENT,
            snapshot_version = version,
            patterns,
            virtual_networks = virtual_network_count,
            "routing snapshot published"
        );
        version
    }

    pub fn snapshot(&self) -> Arc<RoutingSnapshot> {
        self.snapshot.load_full()
    }

    pub fn current_version(&self) -> u64 {
        self.snapshot.load().version
    }
}
