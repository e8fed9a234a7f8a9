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

use crate::document::{CatalogDocument, MemberEntry, RouteEntry, ServiceOffering};
use crate::error::CatalogError;
use crate::events;
use fdsn_federator::control_plane::route_table::{
    OverlapPolicy, Route, RouteInsertion, RouteTable, RouteTableBuilder, DEFAULT_PRIORITY,
};
use fdsn_federator::control_plane::virtual_network::{
    VirtualNetworkMember, VirtualNetworkTable, VirtualNetworkTableBuilder,
};
use fdsn_federator::routing::time_window::{parse_timestamp, TimeWindow};
use fdsn_federator::{Identifier, WILDCARD};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const COMPONENT: &str = "route_catalog";

/// A remote catalog mirrored as `<cache_dir>/<id>.json5`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RemoteCatalog {
    pub id: String,
    pub url: String,
}

/// Where the documents of one catalog come from, in merge order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CatalogSources {
    pub local: Option<PathBuf>,
    pub remotes: Vec<RemoteCatalog>,
    pub cache_dir: PathBuf,
}

impl CatalogSources {
    pub fn cached_path(&self, remote: &RemoteCatalog) -> PathBuf {
        cached_path(&self.cache_dir, &remote.id)
    }

    /// Local document first, then the cached copy of every remote.
    pub fn documents(&self) -> Vec<PathBuf> {
        self.local
            .iter()
            .cloned()
            .chain(self.remotes.iter().map(|remote| self.cached_path(remote)))
            .collect()
    }
}

pub(crate) fn cached_path(cache_dir: &Path, id: &str) -> PathBuf {
    cache_dir.join(format!("{id}.json5"))
}

/// What a catalog load did, for logs and tests.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CatalogReport {
    pub documents_loaded: usize,
    pub documents_failed: usize,
    pub routes_inserted: usize,
    pub routes_overlapping: usize,
    pub routes_rejected: usize,
    pub entries_skipped: usize,
    pub virtual_network_members: usize,
}

pub fn parse_document(origin: &str, text: &str) -> Result<CatalogDocument, CatalogError> {
    json5::from_str(text).map_err(|err| CatalogError::Parse {
        origin: origin.to_string(),
        message: err.to_string(),
    })
}

pub fn read_document(path: &Path) -> Result<CatalogDocument, CatalogError> {
    let origin = path.display().to_string();
    let text = fs::read_to_string(path).map_err(|err| CatalogError::Read {
        path: origin.clone(),
        message: err.to_string(),
    })?;
    parse_document(&origin, &text)
}

/// Reads every document of `sources` and merges them into fresh tables.
///
/// A document that cannot be read or parsed is logged and skipped; the
/// remaining ones still load.
pub fn load_catalog(
    sources: &CatalogSources,
    policy: OverlapPolicy,
) -> (RouteTable, VirtualNetworkTable, CatalogReport) {
    let mut builder = CatalogBuilder::new(policy);
    for path in sources.documents() {
        match read_document(&path) {
            Ok(document) => builder.add_document(&path.display().to_string(), &document),
            Err(err) => builder.document_failed(&err),
        }
    }
    builder.finish()
}

/// Merges parsed documents into a route table and a virtual network table.
pub struct CatalogBuilder {
    routes: RouteTableBuilder,
    virtual_networks: VirtualNetworkTableBuilder,
    report: CatalogReport,
}

impl CatalogBuilder {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            routes: RouteTableBuilder::new(policy),
            virtual_networks: VirtualNetworkTableBuilder::new(),
            report: CatalogReport::default(),
        }
    }

    pub fn add_document(&mut self, origin: &str, document: &CatalogDocument) {
        for entry in &document.routes {
            self.add_route_entry(origin, entry);
        }
        for network in &document.virtual_networks {
            let code = network.code.trim();
            if code.is_empty() {
                self.skip(origin, "virtual network without a code");
                continue;
            }
            for member in &network.members {
                self.add_member(origin, code, member);
            }
        }

        self.report.documents_loaded += 1;
        info!(
            event = events::CATALOG_LOADED,
            component = COMPONENT,
            origin,
            routes = document.routes.len(),
            virtual_networks = document.virtual_networks.len(),
            "catalog document loaded"
        );
    }

    pub fn document_failed(&mut self, err: &CatalogError) {
        self.report.documents_failed += 1;
        error!(
            event = events::CATALOG_LOAD_FAILED,
            component = COMPONENT,
            err = %err,
            "catalog document skipped"
        );
    }

    pub fn finish(self) -> (RouteTable, VirtualNetworkTable, CatalogReport) {
        (
            self.routes.build(),
            self.virtual_networks.build(),
            self.report,
        )
    }

    fn add_route_entry(&mut self, origin: &str, entry: &RouteEntry) {
        let pattern = identifier(
            &entry.network,
            &entry.station,
            entry.location.as_deref(),
            &entry.channel,
        );
        for offering in &entry.services {
            let Some(route) = offering_route(origin, &pattern, offering) else {
                self.report.entries_skipped += 1;
                continue;
            };
            match self.routes.add_route(pattern.clone(), route) {
                RouteInsertion::Inserted => self.report.routes_inserted += 1,
                RouteInsertion::InsertedWithOverlap { .. } => {
                    self.report.routes_inserted += 1;
                    self.report.routes_overlapping += 1;
                }
                RouteInsertion::Rejected { .. } => self.report.routes_rejected += 1,
            }
        }
    }

    fn add_member(&mut self, origin: &str, code: &str, member: &MemberEntry) {
        let pattern = identifier(
            &member.network,
            &member.station,
            member.location.as_deref(),
            &member.channel,
        );
        let Some(window) = lenient_window(origin, &pattern, &member.start, &member.end) else {
            self.report.entries_skipped += 1;
            return;
        };
        self.virtual_networks
            .add_member(code, VirtualNetworkMember::new(pattern, window));
        self.report.virtual_network_members += 1;
    }

    fn skip(&mut self, origin: &str, reason: &str) {
        self.report.entries_skipped += 1;
        error!(
            event = events::CATALOG_ENTRY_SKIPPED,
            component = COMPONENT,
            origin,
            reason,
            "catalog entry skipped"
        );
    }
}

fn offering_route(origin: &str, pattern: &Identifier, offering: &ServiceOffering) -> Option<Route> {
    let address = offering.address.trim();
    if address.is_empty() {
        error!(
            event = events::CATALOG_ENTRY_SKIPPED,
            component = COMPONENT,
            origin,
            stream = %pattern,
            service = offering.service.as_str(),
            "service offering without an address"
        );
        return None;
    }

    let window = lenient_window(origin, pattern, &offering.start, &offering.end)?;
    let priority = offering.priority.value().unwrap_or_else(|raw| {
        warn!(
            component = COMPONENT,
            origin,
            stream = %pattern,
            url = address,
            priority = raw.as_str(),
            "unusable priority; using the default"
        );
        DEFAULT_PRIORITY
    });

    Some(Route::new(
        &offering.service.trim().to_ascii_lowercase(),
        address,
        window,
        priority,
    ))
}

/// An absent location means any location; an empty one is normalized to `--`.
fn identifier(network: &str, station: &str, location: Option<&str>, channel: &str) -> Identifier {
    Identifier::new(
        or_wildcard(network),
        or_wildcard(station),
        location.unwrap_or(WILDCARD),
        or_wildcard(channel),
    )
}

fn or_wildcard(field: &str) -> &str {
    match field.trim() {
        "" => WILDCARD,
        trimmed => trimmed,
    }
}

/// Builds a window, treating an unparsable bound as open. An inverted window
/// drops the entry.
fn lenient_window(
    origin: &str,
    pattern: &Identifier,
    start: &str,
    end: &str,
) -> Option<TimeWindow> {
    let start = lenient_bound(origin, pattern, start);
    let end = lenient_bound(origin, pattern, end);
    match TimeWindow::parse(start, end) {
        Ok(window) => Some(window),
        Err(err) => {
            error!(
                event = events::CATALOG_ENTRY_SKIPPED,
                component = COMPONENT,
                origin,
                stream = %pattern,
                err = %err,
                "catalog entry with an unusable window"
            );
            None
        }
    }
}

fn lenient_bound<'a>(origin: &str, pattern: &Identifier, text: &'a str) -> Option<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match parse_timestamp(trimmed) {
        Ok(_) => Some(trimmed),
        Err(err) => {
            warn!(
                event = events::CATALOG_TIMESTAMP_IGNORED,
                component = COMPONENT,
                origin,
                stream = %pattern,
                err = %err,
                "unparsable timestamp; bound left open"
            );
            None
        }
    }
}
