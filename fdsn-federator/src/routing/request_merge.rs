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

//! Resolved upstream fetches for one query and their GET-format endpoints.

use crate::data_plane::upstream::FetchError;
use crate::identifier::Identifier;
use crate::observability::events;
use crate::routing::time_window::{format_timestamp, TimeWindow};
use chrono::NaiveDateTime;
use tracing::warn;
use url::Url;

const COMPONENT: &str = "request_merge";

/// One upstream fetch needed to cover part of a query.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RequestMergeEntry {
    pub url: String,
    pub service: String,
    pub identifier: Identifier,
    pub window: TimeWindow,
}

impl RequestMergeEntry {
    /// The `N S L C start end` batch line describing this fetch.
    pub fn batch_line(&self) -> String {
        let [network, station, location, channel] = self.identifier.fields();
        format!(
            "{network} {station} {location} {channel} {} {}",
            render_bound(self.window.start()),
            render_bound(self.window.end())
        )
    }

    /// Appends the identifier and window to the route's base URL as query parameters.
    pub fn endpoint(&self) -> Result<Endpoint, FetchError> {
        let mut url = Url::parse(&self.url)
            .map_err(|err| FetchError::InvalidUrl(format!("{}: {err}", self.url)))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("net", &self.identifier.network)
                .append_pair("sta", &self.identifier.station)
                .append_pair("loc", &self.identifier.location)
                .append_pair("cha", &self.identifier.channel);
            if let Some(start) = self.window.start() {
                query.append_pair("start", &format_timestamp(&start));
            }
            if let Some(end) = self.window.end() {
                query.append_pair("end", &format_timestamp(&end));
            }
        }

        Ok(Endpoint {
            url: url.into(),
            line: self.batch_line(),
        })
    }
}

fn render_bound(bound: Option<NaiveDateTime>) -> String {
    bound.map_or_else(|| "*".to_string(), |ts| format_timestamp(&ts))
}

/// A concrete GET URL plus the batch line it answers, used for accounting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    pub url: String,
    pub line: String,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            line: line.into(),
        }
    }
}

/// The ordered result of route resolution.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequestMerge {
    entries: Vec<RequestMergeEntry>,
}

impl RequestMerge {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: Vec<RequestMergeEntry>) -> Self {
        Self { entries }
    }

    /// Appends the entries of another merge, keeping both orders.
    pub fn extend(&mut self, other: RequestMerge) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestMergeEntry> {
        self.entries.iter()
    }

    /// GET endpoints in merge order. An entry whose base URL does not parse is
    /// logged and left out.
    pub fn to_endpoints(&self) -> Vec<Endpoint> {
        self.entries
            .iter()
            .filter_map(|entry| match entry.endpoint() {
                Ok(endpoint) => Some(endpoint),
                Err(err) => {
                    warn!(
                        event = events::QUERY_REJECTED,
                        component = COMPONENT,
                        url = entry.url.as_str(),
                        stream = %entry.identifier,
                        err = %err,
                        "route address is not a valid URL"
                    );
                    None
                }
            })
            .collect()
    }
}

impl IntoIterator for RequestMerge {
    type Item = RequestMergeEntry;
    type IntoIter = std::vec::IntoIter<RequestMergeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
