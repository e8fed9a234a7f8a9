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

//! Transport adapters producing one [`ParsedQuery`] from GET parameters or a POST body.

use crate::error::FederatorError;
use crate::identifier::{Identifier, WILDCARD};
use crate::routing::time_window::TimeWindow;

pub const DEFAULT_MAX_BODY_BYTES: usize = 1_000_000;
pub const DEFAULT_MAX_LINES: usize = 10_000;

const POST_FIELDS: usize = 6;

/// Size limits applied to POST bodies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QueryLimits {
    pub max_body_bytes: usize,
    pub max_lines: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

/// Which transport the query arrived on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryTransport {
    Get,
    Post,
}

/// One identifier and window to resolve.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreamRequest {
    pub identifier: Identifier,
    pub window: TimeWindow,
}

/// Transport-independent query handed to the federator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedQuery {
    pub service: String,
    pub transport: QueryTransport,
    pub requests: Vec<StreamRequest>,
    pub user: Option<String>,
}

#[derive(Default)]
struct GetFields {
    network: Vec<String>,
    station: Vec<String>,
    location: Vec<String>,
    channel: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    user: Option<String>,
}

impl ParsedQuery {
    /// Builds a query from decoded GET parameters.
    ///
    /// Long and short parameter names are accepted; repeating an identifier
    /// parameter adds alternatives, repeating a time parameter is an error.
    ///
    /// ```
    /// use fdsn_federator::query::ParsedQuery;
    ///
    /// let query = ParsedQuery::from_get_params(
    ///     "dataselect",
    ///     [("net", "ge"), ("station", "APE"), ("starttime", "2015-01-01")],
    /// )
    /// .unwrap();
    /// assert_eq!(query.requests[0].identifier.to_string(), "GE.APE.*.*");
    ///
    /// let err = ParsedQuery::from_get_params("dataselect", [("format", "text")]).unwrap_err();
    /// assert_eq!(err.to_string(), "Unknown parameter: format");
    /// ```
    pub fn from_get_params<I, K, V>(service: &str, pairs: I) -> Result<Self, FederatorError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut fields = GetFields::default();
        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim().to_string();
            match key.to_ascii_lowercase().as_str() {
                "net" | "network" => fields.network.push(value),
                "sta" | "station" => fields.station.push(value),
                "loc" | "location" => fields.location.push(value),
                "cha" | "channel" => fields.channel.push(value),
                "start" | "starttime" => set_once(&mut fields.start, key, value)?,
                "end" | "endtime" => set_once(&mut fields.end, key, value)?,
                "user" => set_once(&mut fields.user, key, value)?,
                _ => {
                    return Err(FederatorError::client(format!("Unknown parameter: {key}")));
                }
            }
        }

        let identifier = Identifier::new(
            &join_or_wildcard(&fields.network),
            &join_or_wildcard(&fields.station),
            &join_or_wildcard(&fields.location),
            &join_or_wildcard(&fields.channel),
        );
        reject_single_wildcard(&identifier).map_err(FederatorError::client)?;
        let window = parse_window(fields.start.as_deref(), fields.end.as_deref())?;

        Ok(Self {
            service: service.to_string(),
            transport: QueryTransport::Get,
            requests: vec![StreamRequest { identifier, window }],
            user: fields.user,
        })
    }

    /// Builds a query from a POST body of `NET STA LOC CHA START END` lines.
    ///
    /// `--` stands for an empty location and `*` for an open time bound. Blank
    /// lines are ignored; any other malformed line rejects the whole body, and
    /// so does a `?` in an identifier field.
    pub fn from_post_body(
        service: &str,
        body: &str,
        limits: &QueryLimits,
    ) -> Result<Self, FederatorError> {
        Self::parse_lines(service, body, limits, true)
    }

    /// Re-reads batch lines rendered for resolved endpoints.
    ///
    /// Stored patterns may carry `?` into these lines, so it is accepted here.
    pub fn from_resolved_lines(
        service: &str,
        body: &str,
        limits: &QueryLimits,
    ) -> Result<Self, FederatorError> {
        Self::parse_lines(service, body, limits, false)
    }

    fn parse_lines(
        service: &str,
        body: &str,
        limits: &QueryLimits,
        user_input: bool,
    ) -> Result<Self, FederatorError> {
        if body.len() > limits.max_body_bytes {
            return Err(FederatorError::client(format!(
                "Request too large: {} bytes exceeds the limit of {}",
                body.len(),
                limits.max_body_bytes
            )));
        }

        let mut requests = Vec::new();
        for (index, line) in body.lines().enumerate() {
            let line_number = index + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }
            if requests.len() == limits.max_lines {
                return Err(FederatorError::client(format!(
                    "Request too large: more than {} lines",
                    limits.max_lines
                )));
            }
            let &[network, station, location, channel, start, end] = tokens.as_slice() else {
                return Err(FederatorError::client(format!(
                    "Line {line_number}: expected {POST_FIELDS} fields, found {}",
                    tokens.len()
                )));
            };

            let identifier = Identifier::new(network, station, location, channel);
            if user_input {
                reject_single_wildcard(&identifier).map_err(|message| {
                    FederatorError::client(format!("Line {line_number}: {message}"))
                })?;
            }
            let window = parse_window(Some(start), Some(end)).map_err(|err| {
                FederatorError::client(format!("Line {line_number}: {err}"))
            })?;
            requests.push(StreamRequest { identifier, window });
        }

        if requests.is_empty() {
            return Err(FederatorError::client("Empty request"));
        }

        Ok(Self {
            service: service.to_string(),
            transport: QueryTransport::Post,
            requests,
            user: None,
        })
    }
}

/// `?` is reserved for stored patterns.
fn reject_single_wildcard(identifier: &Identifier) -> Result<(), String> {
    let names = ["network", "station", "location", "channel"];
    match names
        .iter()
        .zip(identifier.fields())
        .find(|(_, field)| field.contains('?'))
    {
        Some((name, _)) => Err(format!("Wildcard '?' not allowed in {name}")),
        None => Ok(()),
    }
}

fn set_once(slot: &mut Option<String>, key: &str, value: String) -> Result<(), FederatorError> {
    if slot.replace(value).is_some() {
        return Err(FederatorError::client(format!("Duplicate parameter: {key}")));
    }
    Ok(())
}

fn join_or_wildcard(values: &[String]) -> String {
    if values.is_empty() {
        WILDCARD.to_string()
    } else {
        values.join(",")
    }
}

fn parse_window(start: Option<&str>, end: Option<&str>) -> Result<TimeWindow, FederatorError> {
    Ok(TimeWindow::parse(open_bound(start), open_bound(end))?)
}

/// `*` as a time bound means the same as leaving it out.
fn open_bound(bound: Option<&str>) -> Option<&str> {
    bound.filter(|text| text.trim() != WILDCARD)
}
