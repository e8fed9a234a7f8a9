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

use crate::error::CatalogError;
use crate::events;
use crate::loader::{cached_path, parse_document, CatalogSources, RemoteCatalog};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const COMPONENT: &str = "route_catalog_sync";

/// Mirrors one remote catalog into `<cache_dir>/<id>.json5`.
///
/// Without `refresh` an existing cached copy is used as is. A download only
/// replaces the cached copy once it is complete and parses.
pub async fn sync_remote(
    client: &Client,
    remote: &RemoteCatalog,
    cache_dir: &Path,
    refresh: bool,
) -> Result<PathBuf, CatalogError> {
    let target = cached_path(cache_dir, &remote.id);
    if !refresh && tokio::fs::try_exists(&target).await.unwrap_or(false) {
        debug!(
            event = events::CATALOG_SYNC_SKIPPED,
            component = COMPONENT,
            id = remote.id.as_str(),
            path = %target.display(),
            "cached catalog reused"
        );
        return Ok(target);
    }

    let download_error = |err: reqwest::Error| CatalogError::Download {
        url: remote.url.clone(),
        message: err.to_string(),
    };
    let text = client
        .get(&remote.url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(download_error)?
        .text()
        .await
        .map_err(download_error)?;
    parse_document(&remote.url, &text)?;

    let cache_error = |path: &Path, err: std::io::Error| CatalogError::Cache {
        path: path.display().to_string(),
        message: err.to_string(),
    };
    tokio::fs::create_dir_all(cache_dir)
        .await
        .map_err(|err| cache_error(cache_dir, err))?;
    let partial = cache_dir.join(format!("{}.json5.part", remote.id));
    tokio::fs::write(&partial, text.as_bytes())
        .await
        .map_err(|err| cache_error(&partial, err))?;
    tokio::fs::rename(&partial, &target)
        .await
        .map_err(|err| cache_error(&target, err))?;

    info!(
        event = events::CATALOG_SYNCED,
        component = COMPONENT,
        id = remote.id.as_str(),
        url = remote.url.as_str(),
        bytes = text.len(),
        "remote catalog cached"
    );
    Ok(target)
}

/// Syncs every remote of `sources` in order and returns how many are usable.
///
/// A failed sync keeps whatever copy was cached before.
pub async fn sync_remotes(client: &Client, sources: &CatalogSources, refresh: bool) -> usize {
    let mut usable = 0;
    for remote in &sources.remotes {
        match sync_remote(client, remote, &sources.cache_dir, refresh).await {
            Ok(_) => usable += 1,
            Err(err) => {
                warn!(
                    event = events::CATALOG_SYNC_FAILED,
                    component = COMPONENT,
                    id = remote.id.as_str(),
                    err = %err,
                    "remote catalog not refreshed"
                );
                if sources.cached_path(remote).exists() {
                    usable += 1;
                }
            }
        }
    }
    usable
}
