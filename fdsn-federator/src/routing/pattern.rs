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

//! Glob and alternation matching over identifier fields.
//!
//! A field is a comma-separated list of alternatives; each alternative is a glob
//! where `*` matches any run of characters (including none) and `?` matches exactly
//! one character. Matching is case-sensitive: [`Identifier`] upper-cases on
//! construction.

use crate::identifier::{Identifier, WILDCARD};

const ANY_RUN: char = '*';
const ANY_ONE: char = '?';

/// Characters FDSN codes are made of once upper-cased. `-` spells the empty location.
const CODE_ALPHABET: &str = "-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn alternatives(field: &str) -> impl Iterator<Item = &str> {
    field.split(',').map(str::trim)
}

fn has_wildcard(alternative: &str) -> bool {
    alternative.contains([ANY_RUN, ANY_ONE])
}

fn is_literal_field(field: &str) -> bool {
    alternatives(field).all(|alternative| !has_wildcard(alternative))
}

/// Matches literal `text` against one glob alternative.
pub fn glob_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let (mut t, mut p) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == ANY_ONE || pattern[p] == text[t]) {
            t += 1;
            p += 1;
        } else if p < pattern.len() && pattern[p] == ANY_RUN {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = backtrack {
            p = star_p + 1;
            t = star_t + 1;
            backtrack = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == ANY_RUN)
}

/// Whether two glob alternatives can match at least one common string.
pub fn globs_intersect(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut visited = vec![false; (a.len() + 1) * (b.len() + 1)];
    intersect_from(&a, &b, 0, 0, &mut visited)
}

fn intersect_from(a: &[char], b: &[char], i: usize, j: usize, visited: &mut [bool]) -> bool {
    let slot = i * (b.len() + 1) + j;
    if visited[slot] {
        // Already explored from this state without success.
        return false;
    }
    visited[slot] = true;

    if i == a.len() && j == b.len() {
        return true;
    }

    if i < a.len() && a[i] == ANY_RUN {
        if intersect_from(a, b, i + 1, j, visited) {
            return true;
        }
        return j < b.len() && intersect_from(a, b, i, j + 1, visited);
    }

    if j < b.len() && b[j] == ANY_RUN {
        if intersect_from(a, b, i, j + 1, visited) {
            return true;
        }
        return i < a.len() && intersect_from(a, b, i + 1, j, visited);
    }

    i < a.len()
        && j < b.len()
        && (a[i] == b[j] || a[i] == ANY_ONE || b[j] == ANY_ONE)
        && intersect_from(a, b, i + 1, j + 1, visited)
}

/// Whether any alternative of `query_field` can match any alternative of `pattern_field`.
///
/// For a literal query this is plain glob matching.
///
/// ```
/// use fdsn_federator::routing::pattern::field_matches;
///
/// assert!(field_matches("AB", "A?"));
/// assert!(!field_matches("ABC", "A?"));
/// assert!(field_matches("GE", "X,Y,GE"));
/// assert!(field_matches("", "*"));
/// ```
pub fn field_matches(query_field: &str, pattern_field: &str) -> bool {
    alternatives(query_field).any(|query| {
        alternatives(pattern_field).any(|pattern| {
            if has_wildcard(query) {
                globs_intersect(query, pattern)
            } else {
                glob_match(query, pattern)
            }
        })
    })
}

/// All four fields of `query` can match `pattern`.
pub fn matches(query: &Identifier, pattern: &Identifier) -> bool {
    query
        .fields()
        .iter()
        .zip(pattern.fields().iter())
        .all(|(query_field, pattern_field)| field_matches(query_field, pattern_field))
}

/// Conservative containment: `true` only when every string selected by `inner`
/// is certainly selected by `outer`.
pub fn field_covers(outer: &str, inner: &str) -> bool {
    alternatives(inner).all(|inner_alt| {
        alternatives(outer).any(|outer_alt| {
            outer_alt == WILDCARD
                || outer_alt == inner_alt
                || (!has_wildcard(inner_alt) && glob_match(inner_alt, outer_alt))
        })
    })
}

/// Every field of `outer` covers the matching field of `inner`.
pub fn covers(outer: &Identifier, inner: &Identifier) -> bool {
    outer
        .fields()
        .iter()
        .zip(inner.fields().iter())
        .all(|(outer_field, inner_field)| field_covers(outer_field, inner_field))
}

/// Picks the more specific of two intersecting fields.
pub fn narrow_field(query: &str, pattern: &str) -> String {
    if field_covers(pattern, query) {
        query.to_string()
    } else if field_covers(query, pattern) {
        pattern.to_string()
    } else {
        // Neither side contains the other; the upstream still filters by the query.
        query.to_string()
    }
}

/// Field-wise [`narrow_field`] of two intersecting identifiers.
pub fn narrow(query: &Identifier, pattern: &Identifier) -> Identifier {
    Identifier {
        network: narrow_field(&query.network, &pattern.network),
        station: narrow_field(&query.station, &pattern.station),
        location: narrow_field(&query.location, &pattern.location),
        channel: narrow_field(&query.channel, &pattern.channel),
    }
}

/// Glob alternatives selecting every non-empty code over [`CODE_ALPHABET`]
/// except the literals in `excluded`.
fn complement(excluded: &[&str]) -> Vec<String> {
    let mut alternatives = Vec::new();
    complement_from("", excluded, &mut alternatives);
    alternatives
}

fn complement_from(prefix: &str, excluded: &[&str], out: &mut Vec<String>) {
    let live: Vec<&str> = excluded
        .iter()
        .copied()
        .filter(|code| code.starts_with(prefix))
        .collect();
    if !prefix.is_empty() && !live.contains(&prefix) {
        out.push(prefix.to_string());
    }

    let mut next: Vec<char> = live
        .iter()
        .filter_map(|code| code[prefix.len()..].chars().next())
        .collect();
    next.sort_unstable();
    next.dedup();

    if next.is_empty() {
        // Only `prefix` itself is excluded below this point.
        out.push(format!("{prefix}{ANY_ONE}{ANY_RUN}"));
        return;
    }
    for c in CODE_ALPHABET.chars() {
        if next.contains(&c) {
            complement_from(&format!("{prefix}{c}"), &live, out);
        } else {
            out.push(format!("{prefix}{c}{ANY_RUN}"));
        }
    }
}

/// Alternatives selected by `outer` but not by `removed`.
///
/// `None` when the result cannot be written as a glob list: that needs either a
/// literal `outer` or a literal `removed` carved out of `*`.
///
/// ```
/// use fdsn_federator::routing::pattern::{field_difference, field_matches};
///
/// let rest = field_difference("APE,BZS", "APE").unwrap();
/// assert_eq!(rest, vec!["BZS"]);
///
/// let rest = field_difference("*", "APE").unwrap().join(",");
/// assert!(!field_matches("APE", &rest));
/// assert!(field_matches("APEX", &rest));
///
/// assert_eq!(field_difference("BH?", "BHZ"), None);
/// ```
pub fn field_difference(outer: &str, removed: &str) -> Option<Vec<String>> {
    if field_covers(removed, outer) {
        return Some(Vec::new());
    }
    if is_literal_field(outer) {
        let mut rest: Vec<String> = Vec::new();
        for alternative in alternatives(outer) {
            if !field_matches(alternative, removed) && !rest.iter().any(|kept| kept == alternative) {
                rest.push(alternative.to_string());
            }
        }
        return Some(rest);
    }
    if is_literal_field(removed) && alternatives(outer).any(|alternative| alternative == WILDCARD) {
        let excluded: Vec<&str> = alternatives(removed).collect();
        return Some(complement(&excluded));
    }
    None
}

/// Exact intersection of two intersecting fields, `None` when neither side
/// contains the other and neither is a literal list.
pub fn field_intersection(a: &str, b: &str) -> Option<String> {
    if field_covers(a, b) {
        return Some(b.to_string());
    }
    if field_covers(b, a) {
        return Some(a.to_string());
    }
    let (literals, other) = if is_literal_field(a) {
        (a, b)
    } else if is_literal_field(b) {
        (b, a)
    } else {
        return None;
    };
    let shared: Vec<&str> = alternatives(literals)
        .filter(|alternative| field_matches(alternative, other))
        .collect();
    Some(shared.join(","))
}

/// Splits the streams `outer` selects but `removed` does not into identifiers.
///
/// The pieces are disjoint: piece `i` agrees with `removed` on the fields
/// before `i` and excludes it on field `i`. `None` when one of the needed field
/// differences or intersections cannot be written as a glob list.
pub fn difference(outer: &Identifier, removed: &Identifier) -> Option<Vec<Identifier>> {
    let outer_fields = outer.fields();
    let removed_fields = removed.fields();
    let mut shared: Vec<Option<String>> = Vec::with_capacity(outer_fields.len());
    let mut pieces = Vec::new();

    for index in 0..outer_fields.len() {
        let rest = field_difference(outer_fields[index], removed_fields[index])?;
        if !rest.is_empty() {
            let mut fields = shared.iter().cloned().collect::<Option<Vec<String>>>()?;
            fields.push(rest.join(","));
            fields.extend(outer_fields[index + 1..].iter().map(|field| field.to_string()));
            let [network, station, location, channel]: [String; 4] = fields.try_into().ok()?;
            pieces.push(Identifier {
                network,
                station,
                location,
                channel,
            });
        }
        shared.push(field_intersection(outer_fields[index], removed_fields[index]));
    }
    Some(pieces)
}
