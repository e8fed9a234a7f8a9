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

//! Cartesian expansion of alternated identifier fields into single-valued identifiers.

use crate::identifier::{normalize_location, Identifier, WILDCARD};

/// Lazily yields one [`Identifier`] per combination of field alternatives.
///
/// Network varies slowest and channel fastest. The sequence is finite and
/// cannot be rewound; call [`ls_nslc`] again to restart it.
#[derive(Clone, Debug)]
pub struct NslcExpansion {
    fields: [Vec<String>; 4],
    counters: [usize; 4],
    exhausted: bool,
}

/// Expands sets of field values into their cartesian product.
///
/// Every value is split on commas, alternatives are upper-cased and repeated
/// alternatives within one field are kept once. An empty set stands for `*`.
///
/// ```
/// use fdsn_federator::routing::nslc_expansion::ls_nslc;
///
/// let ids: Vec<String> = ls_nslc(&["A,B"], &["*"], &["*"], &["*"])
///     .map(|id| id.to_string())
///     .collect();
/// assert_eq!(ids, vec!["A.*.*.*", "B.*.*.*"]);
/// ```
pub fn ls_nslc<N, S, L, C>(
    networks: &[N],
    stations: &[S],
    locations: &[L],
    channels: &[C],
) -> NslcExpansion
where
    N: AsRef<str>,
    S: AsRef<str>,
    L: AsRef<str>,
    C: AsRef<str>,
{
    NslcExpansion {
        fields: [
            alternatives(networks, false),
            alternatives(stations, false),
            alternatives(locations, true),
            alternatives(channels, false),
        ],
        counters: [0; 4],
        exhausted: false,
    }
}

fn alternatives<T: AsRef<str>>(values: &[T], is_location: bool) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for value in values {
        for alternative in value.as_ref().split(',') {
            let normalized = if is_location {
                normalize_location(alternative)
            } else {
                alternative.trim().to_ascii_uppercase()
            };
            if !unique.contains(&normalized) {
                unique.push(normalized);
            }
        }
    }
    if unique.is_empty() {
        unique.push(WILDCARD.to_string());
    }
    unique
}

impl NslcExpansion {
    fn remaining(&self) -> usize {
        if self.exhausted {
            return 0;
        }
        let (total, position) = self
            .fields
            .iter()
            .zip(self.counters.iter())
            .fold((1, 0), |(total, position), (field, &counter)| {
                (total * field.len(), position * field.len() + counter)
            });
        total - position
    }
}

impl Iterator for NslcExpansion {
    type Item = Identifier;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let [network, station, location, channel] = &self.fields;
        let [n, s, l, c] = self.counters;
        let current = Identifier::new(&network[n], &station[s], &location[l], &channel[c]);

        // Odometer step, channel first.
        let mut digit = self.counters.len();
        loop {
            if digit == 0 {
                self.exhausted = true;
                break;
            }
            digit -= 1;
            self.counters[digit] += 1;
            if self.counters[digit] < self.fields[digit].len() {
                break;
            }
            self.counters[digit] = 0;
        }

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.remaining();
        (left, Some(left))
    }
}
