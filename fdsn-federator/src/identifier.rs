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

//! Four-field stream selector shared by the route table, the resolver and the query adapters.

use std::fmt::{Display, Formatter};

/// Wire placeholder for "no location code".
pub const LOCATION_PLACEHOLDER: &str = "--";

/// Matches any value of a field.
pub const WILDCARD: &str = "*";

/// A (network, station, location, channel) selector.
///
/// Each field is a literal code, `*`, a code containing `?`, or a comma-separated
/// set of those. Fields are stored upper-cased and an empty location is stored as
/// [`LOCATION_PLACEHOLDER`], so the two spellings of "no location" compare equal.
///
/// ```
/// use fdsn_federator::Identifier;
///
/// let id = Identifier::new("ge", "ape", "", "bh?");
/// assert_eq!(id.to_string(), "GE.APE.--.BH?");
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Identifier {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
}

impl Identifier {
    pub fn new(network: &str, station: &str, location: &str, channel: &str) -> Self {
        Self {
            network: normalize_field(network),
            station: normalize_field(station),
            location: normalize_location(location),
            channel: normalize_field(channel),
        }
    }

    /// The identifier that selects every stream.
    pub fn any() -> Self {
        Self::new(WILDCARD, WILDCARD, WILDCARD, WILDCARD)
    }

    /// Returns a copy with the network field replaced.
    pub fn with_network(&self, network: &str) -> Self {
        Self {
            network: normalize_field(network),
            ..self.clone()
        }
    }

    /// Fields in (network, station, location, channel) order.
    pub fn fields(&self) -> [&str; 4] {
        [
            self.network.as_str(),
            self.station.as_str(),
            self.location.as_str(),
            self.channel.as_str(),
        ]
    }

    /// `true` when no field carries a wildcard or an alternation.
    pub fn is_concrete(&self) -> bool {
        self.fields()
            .iter()
            .all(|field| !field.contains(['*', '?', ',']))
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.network, self.station, self.location, self.channel
        )
    }
}

fn normalize_field(value: &str) -> String {
    value.trim().to_ascii_uppercase()
}

/// Upper-cases a location field and maps every empty alternative to the placeholder.
pub(crate) fn normalize_location(value: &str) -> String {
    value
        .trim()
        .split(',')
        .map(|alternative| {
            let alternative = alternative.trim();
            if alternative.is_empty() {
                LOCATION_PLACEHOLDER.to_string()
            } else {
                alternative.to_ascii_uppercase()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
