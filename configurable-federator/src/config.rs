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

use fdsn_federator::data_plane::upstream::HttpClientConfig;
use fdsn_federator::FederatorConfig;
use route_catalog_static_file::{CatalogSources, RemoteCatalog};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub(crate) federator_config: FederatorConfig,
    #[serde(default)]
    pub(crate) http: HttpConfig,
    pub(crate) catalog: CatalogConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub(crate) timeout_secs: u64,
    pub(crate) connect_timeout_secs: u64,
    pub(crate) user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let defaults = HttpClientConfig::default();
        Self {
            timeout_secs: defaults.timeout.as_secs(),
            connect_timeout_secs: defaults.connect_timeout.as_secs(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    pub(crate) fn client_config(&self) -> HttpClientConfig {
        let defaults = HttpClientConfig::default();
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default)]
    pub(crate) local: Option<PathBuf>,
    #[serde(default)]
    pub(crate) remotes: Vec<RemoteCatalog>,
    #[serde(default = "default_cache_dir")]
    pub(crate) cache_dir: PathBuf,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

impl CatalogConfig {
    pub(crate) fn sources(&self) -> CatalogSources {
        CatalogSources {
            local: self.local.clone(),
            remotes: self.remotes.clone(),
            cache_dir: self.cache_dir.clone(),
        }
    }
}
