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

use fdsn_federator::control_plane::route_table::DEFAULT_PRIORITY;
use serde::Deserialize;

/// One catalog document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogDocument {
    pub routes: Vec<RouteEntry>,
    pub virtual_networks: Vec<VirtualNetworkEntry>,
}

/// A stream pattern and the services offered for it.
///
/// Missing or empty identifier fields stand for `*`. A `location` that is
/// present but empty is the empty location code, stored as `--`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RouteEntry {
    pub network: String,
    pub station: String,
    pub location: Option<String>,
    pub channel: String,
    pub services: Vec<ServiceOffering>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceOffering {
    pub service: String,
    pub address: String,
    pub start: String,
    pub end: String,
    pub priority: Priority,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct VirtualNetworkEntry {
    pub code: String,
    pub description: String,
    pub members: Vec<MemberEntry>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MemberEntry {
    pub network: String,
    pub station: String,
    pub location: Option<String>,
    pub channel: String,
    pub start: String,
    pub end: String,
}

/// A priority as catalogs write it: a number, a numeric string or nothing.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Priority {
    Number(f64),
    Text(String),
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Text(String::new())
    }
}

impl Priority {
    /// The numeric priority; blank means [`DEFAULT_PRIORITY`].
    pub fn value(&self) -> Result<i32, String> {
        match self {
            Priority::Number(number)
                if number.fract() == 0.0
                    && *number >= f64::from(i32::MIN)
                    && *number <= f64::from(i32::MAX) =>
            {
                Ok(*number as i32)
            }
            Priority::Number(number) => Err(number.to_string()),
            Priority::Text(text) if text.trim().is_empty() => Ok(DEFAULT_PRIORITY),
            Priority::Text(text) => text.trim().parse().map_err(|_| text.clone()),
        }
    }
}
