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

//! Route and virtual network catalogs kept as json5 documents.
//!
//! A catalog is assembled from one optional local document followed by any
//! number of remote documents mirrored into a cache directory. Documents are
//! merged in that order, so with equal priorities the local definitions win.
//!
//! ```
//! use fdsn_federator::control_plane::route_table::OverlapPolicy;
//! use route_catalog_static_file::{parse_document, CatalogBuilder};
//!
//! let document = parse_document(
//!     "inline",
//!     r#"{
//!         routes: [
//!             { network: "GE", services: [
//!                 { service: "dataselect", address: "http://geofon.example/query", priority: 1 },
//!             ] },
//!         ],
//!     }"#,
//! )
//! .unwrap();
//!
//! let mut builder = CatalogBuilder::new(OverlapPolicy::Forbid);
//! builder.add_document("inline", &document);
//! let (routes, virtual_networks, report) = builder.finish();
//! assert_eq!(routes.route_count(), 1);
//! assert!(virtual_networks.is_empty());
//! assert_eq!(report.routes_inserted, 1);
//! ```

mod document;
pub use document::{
    CatalogDocument, MemberEntry, Priority, RouteEntry, ServiceOffering, VirtualNetworkEntry,
};
mod error;
pub use error::CatalogError;
mod loader;
pub use loader::{
    load_catalog, parse_document, read_document, CatalogBuilder, CatalogReport, CatalogSources,
    RemoteCatalog,
};
mod remote;
pub use remote::{sync_remote, sync_remotes};

mod events {
    pub const CATALOG_LOADED: &str = "catalog_loaded";
    pub const CATALOG_LOAD_FAILED: &str = "catalog_load_failed";
    pub const CATALOG_ENTRY_SKIPPED: &str = "catalog_entry_skipped";
    pub const CATALOG_TIMESTAMP_IGNORED: &str = "catalog_timestamp_ignored";
    pub const CATALOG_SYNCED: &str = "catalog_synced";
    pub const CATALOG_SYNC_SKIPPED: &str = "catalog_sync_skipped";
    pub const CATALOG_SYNC_FAILED: &str = "catalog_sync_failed";
}
