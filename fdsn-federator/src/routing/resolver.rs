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

//! Route resolution: identifier + window + service to a [`RequestMerge`].

use crate::control_plane::route_table::Route;
use crate::control_plane::routing_directory::RoutingSnapshot;
use crate::error::RoutingError;
use crate::identifier::Identifier;
use crate::observability::events;
use crate::routing::pattern;
use crate::routing::request_merge::{RequestMerge, RequestMergeEntry};
use crate::routing::time_window::TimeWindow;
use std::collections::HashSet;
use tracing::{debug, info, warn};

const COMPONENT: &str = "resolver";

/// One network token after virtual-network expansion, narrowed against the query.
struct Candidate {
    identifier: Identifier,
    window: TimeWindow,
}

/// A stored route that can serve part of a candidate.
struct RouteMatch<'a> {
    identifier: Identifier,
    route: &'a Route,
}

/// Resolves the upstream fetches covering `identifier` over `window` for `service`.
///
/// Overlapping routes are arbitrated by priority: a route only contributes the
/// streams and sub-intervals no better route already serves. A wider route
/// shadowed by a narrower, better one is split field by field so the narrower
/// selection is left out of it. Sub-intervals without any route are left out
/// silently. Entries are deduplicated on (url, identifier, window), so two
/// candidates that only share a URL and window still fetch their own streams.
/// Fails with [`RoutingError::NoRouteFound`] only when nothing at all resolves.
pub fn get_route(
    snapshot: &RoutingSnapshot,
    identifier: &Identifier,
    window: &TimeWindow,
    service: &str,
) -> Result<RequestMerge, RoutingError> {
    debug!(
        event = events::RESOLVE_START,
        component = COMPONENT,
        snapshot_version = snapshot.version,
        stream = %identifier,
        window = %window,
        service,
        "resolving route"
    );

    let mut entries = Vec::new();
    for candidate in candidates(snapshot, identifier, window) {
        entries.extend(resolve_candidate(snapshot, &candidate, service));
    }

    let mut seen = HashSet::new();
    entries.retain(|entry: &RequestMergeEntry| {
        seen.insert((entry.url.clone(), entry.identifier.clone(), entry.window))
    });
    entries.sort_by(|a, b| {
        (&a.identifier, a.window.start()).cmp(&(&b.identifier, b.window.start()))
    });

    if entries.is_empty() {
        info!(
            event = events::RESOLVE_NO_ROUTE,
            component = COMPONENT,
            stream = %identifier,
            window = %window,
            service,
            "no route found"
        );
        return Err(RoutingError::NoRouteFound {
            stream: identifier.to_string(),
            window: window.to_string(),
            service: service.to_string(),
        });
    }

    debug!(
        event = events::RESOLVE_OK,
        component = COMPONENT,
        stream = %identifier,
        service,
        entries = entries.len(),
        "route resolved"
    );
    Ok(RequestMerge::from_entries(entries))
}

/// Expands every distinct network token and narrows each member against the query.
fn candidates(
    snapshot: &RoutingSnapshot,
    identifier: &Identifier,
    window: &TimeWindow,
) -> Vec<Candidate> {
    let mut tokens: Vec<&str> = Vec::new();
    for token in identifier.network.split(',').map(str::trim) {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }

    let mut candidates = Vec::new();
    for token in tokens {
        let members = snapshot.virtual_networks.expand(token);
        if snapshot.virtual_networks.is_virtual(token) {
            debug!(
                event = events::VIRTUAL_NETWORK_EXPANDED,
                component = COMPONENT,
                network = token,
                members = members.len(),
                "virtual network expanded"
            );
        }

        for member in members {
            // A virtual code never appears in the route table; the member's network stands in for it.
            let query = identifier.with_network(&member.pattern.network);
            if !pattern::matches(&query, &member.pattern) {
                continue;
            }
            let Some(window) = window.intersection(&member.window) else {
                continue;
            };
            candidates.push(Candidate {
                identifier: pattern::narrow(&query, &member.pattern),
                window,
            });
        }
    }
    candidates
}

fn resolve_candidate(
    snapshot: &RoutingSnapshot,
    candidate: &Candidate,
    service: &str,
) -> Vec<RequestMergeEntry> {
    let mut matched: Vec<RouteMatch<'_>> = snapshot
        .routes
        .iter()
        .filter(|(stored, _)| pattern::matches(&candidate.identifier, stored))
        .flat_map(move |(stored, routes)| {
            routes
                .iter()
                .filter(move |route| {
                    route.service == service && route.window.overlaps(&candidate.window)
                })
                .map(move |route| RouteMatch {
                    identifier: pattern::narrow(&candidate.identifier, stored),
                    route,
                })
        })
        .collect();
    // Stable: equal priorities keep table order, so the earlier-loaded route wins.
    matched.sort_by_key(|found| found.route.priority);

    let mut selected: Vec<(Identifier, TimeWindow)> = Vec::new();
    let mut entries = Vec::new();
    for found in matched {
        let Some(usable) = found.route.window.intersection(&candidate.window) else {
            continue;
        };

        let mut remaining = vec![(found.identifier.clone(), usable)];
        for (better, served) in &selected {
            remaining = remaining
                .into_iter()
                .flat_map(|(identifier, window)| {
                    carve(identifier, window, better, served, found.route)
                })
                .collect();
        }

        for (identifier, window) in remaining {
            selected.push((identifier.clone(), window));
            entries.push(RequestMergeEntry {
                url: found.route.address.clone(),
                service: service.to_string(),
                identifier,
                window,
            });
        }
    }
    entries
}

/// Removes the streams `better` already serves over `served` from one fragment.
fn carve(
    identifier: Identifier,
    window: TimeWindow,
    better: &Identifier,
    served: &TimeWindow,
    route: &Route,
) -> Vec<(Identifier, TimeWindow)> {
    let Some(shared) = window.intersection(served) else {
        return vec![(identifier, window)];
    };
    if !pattern::matches(&identifier, better) {
        return vec![(identifier, window)];
    }

    let mut fragments: Vec<(Identifier, TimeWindow)> = window
        .subtract(served)
        .into_iter()
        .map(|piece| (identifier.clone(), piece))
        .collect();
    match pattern::difference(&identifier, better) {
        Some(rest) => fragments.extend(rest.into_iter().map(|part| (part, shared))),
        None => {
            warn!(
                event = events::ROUTE_SHADOWED_PARTIALLY,
                component = COMPONENT,
                address = route.address.as_str(),
                stream = %identifier,
                shadowed_by = %better,
                window = %shared,
                "lower-priority route overlaps a better one that cannot be carved out"
            );
            fragments.push((identifier, shared));
        }
    }
    fragments
}

#[cfg(test)]
mod tests {
    use super::get_route;
    use crate::control_plane::route_table::{OverlapPolicy, Route, RouteTableBuilder};
    use crate::control_plane::routing_directory::RoutingSnapshot;
    use crate::control_plane::virtual_network::{
        VirtualNetworkMember, VirtualNetworkTable, VirtualNetworkTableBuilder,
    };
    use crate::error::RoutingError;
    use crate::identifier::Identifier;
    use crate::routing::pattern;
    use crate::routing::request_merge::RequestMerge;
    use crate::routing::time_window::TimeWindow;

    fn window(start: Option<&str>, end: Option<&str>) -> TimeWindow {
        TimeWindow::parse(start, end).expect("test window should build")
    }

    fn snapshot(
        routes: Vec<(Identifier, Route)>,
        virtual_networks: VirtualNetworkTable,
    ) -> RoutingSnapshot {
        let mut builder = RouteTableBuilder::new(OverlapPolicy::Allow);
        for (pattern, route) in routes {
            builder.add_route(pattern, route);
        }
        RoutingSnapshot {
            version: 1,
            routes: builder.build(),
            virtual_networks,
        }
    }

    fn urls(snapshot: &RoutingSnapshot, query: &Identifier, tw: &TimeWindow) -> Vec<String> {
        get_route(snapshot, query, tw, "dataselect")
            .expect("route should resolve")
            .iter()
            .map(|entry| entry.url.clone())
            .collect()
    }

    #[test]
    fn lowest_priority_value_wins_full_overlap() {
        let pattern = Identifier::new("GE", "*", "*", "*");
        let snapshot = snapshot(
            vec![
                (
                    pattern.clone(),
                    Route::new("dataselect", "http://backup", TimeWindow::unbounded(), 99),
                ),
                (
                    pattern,
                    Route::new("dataselect", "http://primary", TimeWindow::unbounded(), 1),
                ),
            ],
            VirtualNetworkTable::default(),
        );

        assert_eq!(
            urls(
                &snapshot,
                &Identifier::new("GE", "APE", "", "BHZ"),
                &TimeWindow::unbounded()
            ),
            vec!["http://primary"]
        );
    }

    #[test]
    fn lower_priority_route_fills_the_uncovered_interval() {
        let pattern = Identifier::new("GE", "*", "*", "*");
        let snapshot = snapshot(
            vec![
                (
                    pattern.clone(),
                    Route::new(
                        "dataselect",
                        "http://primary",
                        window(Some("2010-01-01"), None),
                        1,
                    ),
                ),
                (
                    pattern,
                    Route::new("dataselect", "http://archive", TimeWindow::unbounded(), 2),
                ),
            ],
            VirtualNetworkTable::default(),
        );

        let merge = get_route(
            &snapshot,
            &Identifier::new("GE", "APE", "", "BHZ"),
            &window(Some("2009-06-01"), Some("2010-06-01")),
            "dataselect",
        )
        .expect("route should resolve");
        let pieces: Vec<(String, String)> = merge
            .iter()
            .map(|entry| (entry.url.clone(), entry.window.to_string()))
            .collect();

        assert_eq!(
            pieces,
            vec![
                (
                    "http://archive".to_string(),
                    "2009-06-01T00:00:00 2010-01-01T00:00:00".to_string()
                ),
                (
                    "http://primary".to_string(),
                    "2010-01-01T00:00:00 2010-06-01T00:00:00".to_string()
                ),
            ]
        );
    }

    #[test]
    fn wildcard_query_keeps_disjoint_routes_and_narrows_identifiers() {
        let snapshot = snapshot(
            vec![
                (
                    Identifier::new("GE", "*", "*", "*"),
                    Route::new("dataselect", "http://geofon", TimeWindow::unbounded(), 1),
                ),
                (
                    Identifier::new("CH", "*", "*", "*"),
                    Route::new("dataselect", "http://eth", TimeWindow::unbounded(), 1),
                ),
                (
                    Identifier::new("CH", "*", "*", "*"),
                    Route::new("station", "http://eth-station", TimeWindow::unbounded(), 1),
                ),
            ],
            VirtualNetworkTable::default(),
        );

        let merge = get_route(
            &snapshot,
            &Identifier::new("*", "*", "*", "BHZ"),
            &TimeWindow::unbounded(),
            "dataselect",
        )
        .expect("route should resolve");
        let rendered: Vec<String> = merge
            .iter()
            .map(|entry| format!("{} {}", entry.identifier, entry.url))
            .collect();

        assert_eq!(
            rendered,
            vec!["CH.*.*.BHZ http://eth", "GE.*.*.BHZ http://geofon"]
        );
    }

    #[test]
    fn virtual_network_resolves_like_its_member() {
        let mut virtual_networks = VirtualNetworkTableBuilder::new();
        virtual_networks.add_member(
            "_ALP",
            VirtualNetworkMember::new(
                Identifier::new("CH", "LIENZ", "*", "*"),
                TimeWindow::unbounded(),
            ),
        );
        let snapshot = snapshot(
            vec![(
                Identifier::new("CH", "*", "*", "*"),
                Route::new("dataselect", "http://eth", TimeWindow::unbounded(), 1),
            )],
            virtual_networks.build(),
        );
        let tw = window(Some("2015-01-01"), Some("2015-01-02"));

        let via_virtual = get_route(
            &snapshot,
            &Identifier::new("_ALP", "LIENZ", "*", "HHZ"),
            &tw,
            "dataselect",
        )
        .expect("virtual network should resolve");
        let direct = get_route(
            &snapshot,
            &Identifier::new("CH", "LIENZ", "*", "HHZ"),
            &tw,
            "dataselect",
        )
        .expect("member should resolve");

        assert_eq!(via_virtual, direct);
    }

    #[test]
    fn member_window_restricts_the_query() {
        let mut virtual_networks = VirtualNetworkTableBuilder::new();
        virtual_networks.add_member(
            "_TMP",
            VirtualNetworkMember::new(
                Identifier::new("XX", "*", "*", "*"),
                window(Some("2012-01-01"), Some("2013-01-01")),
            ),
        );
        let snapshot = snapshot(
            vec![(
                Identifier::new("XX", "*", "*", "*"),
                Route::new("dataselect", "http://tmp", TimeWindow::unbounded(), 1),
            )],
            virtual_networks.build(),
        );

        let merge = get_route(
            &snapshot,
            &Identifier::new("_TMP", "*", "*", "*"),
            &TimeWindow::unbounded(),
            "dataselect",
        )
        .expect("route should resolve");
        let only = merge.iter().next().expect("one entry");
        assert_eq!(only.window, window(Some("2012-01-01"), Some("2013-01-01")));

        let outside = get_route(
            &snapshot,
            &Identifier::new("_TMP", "*", "*", "*"),
            &window(Some("2014-01-01"), None),
            "dataselect",
        );
        assert!(matches!(outside, Err(RoutingError::NoRouteFound { .. })));
    }

    #[test]
    fn unknown_network_is_no_route() {
        let snapshot = snapshot(
            vec![(
                Identifier::new("GE", "*", "*", "*"),
                Route::new("dataselect", "http://geofon", TimeWindow::unbounded(), 1),
            )],
            VirtualNetworkTable::default(),
        );

        let result = get_route(
            &snapshot,
            &Identifier::new("ZZ", "*", "*", "*"),
            &TimeWindow::unbounded(),
            "dataselect",
        );
        assert!(matches!(result, Err(RoutingError::NoRouteFound { .. })));
    }

    #[test]
    fn alternated_networks_are_resolved_separately_without_duplicates() {
        let snapshot = snapshot(
            vec![(
                Identifier::new("*", "*", "*", "*"),
                Route::new("dataselect", "http://everything", TimeWindow::unbounded(), 1),
            )],
            VirtualNetworkTable::default(),
        );

        let merge = get_route(
            &snapshot,
            &Identifier::new("RO,GE,RO", "*", "*", "*"),
            &TimeWindow::unbounded(),
            "dataselect",
        )
        .expect("route should resolve");
        let networks: Vec<&str> = merge
            .iter()
            .map(|entry| entry.identifier.network.as_str())
            .collect();
        assert_eq!(networks, vec!["GE", "RO"]);
    }

    #[test]
    fn repeated_resolution_is_identical() {
        let snapshot = snapshot(
            vec![
                (
                    Identifier::new("GE", "*", "*", "*"),
                    Route::new("dataselect", "http://geofon", TimeWindow::unbounded(), 1),
                ),
                (
                    Identifier::new("GE", "APE", "*", "*"),
                    Route::new("dataselect", "http://noa", TimeWindow::unbounded(), 2),
                ),
            ],
            VirtualNetworkTable::default(),
        );
        let query = Identifier::new("GE", "*", "*", "*");

        let first = get_route(&snapshot, &query, &TimeWindow::unbounded(), "dataselect");
        let second = get_route(&snapshot, &query, &TimeWindow::unbounded(), "dataselect");
        assert_eq!(first, second);
    }

    fn serving_urls(merge: &RequestMerge, stream: &str, during: &TimeWindow) -> Vec<String> {
        let mut fields = stream.split('.');
        let mut next = || fields.next().unwrap_or_default();
        let stream = Identifier::new(next(), next(), next(), next());
        merge
            .iter()
            .filter(|entry| pattern::matches(&stream, &entry.identifier))
            .filter(|entry| entry.window.overlaps(during))
            .map(|entry| entry.url.clone())
            .collect()
    }

    #[test]
    fn narrower_better_route_is_carved_out_of_a_wider_one() {
        let snapshot = snapshot(
            vec![
                (
                    Identifier::new("GE", "APE", "*", "*"),
                    Route::new("dataselect", "http://a.example/q", TimeWindow::unbounded(), 1),
                ),
                (
                    Identifier::new("GE", "*", "*", "*"),
                    Route::new("dataselect", "http://b.example/q", TimeWindow::unbounded(), 2),
                ),
            ],
            VirtualNetworkTable::default(),
        );

        let merge = get_route(
            &snapshot,
            &Identifier::new("GE", "*", "*", "*"),
            &TimeWindow::unbounded(),
            "dataselect",
        )
        .expect("route should resolve");
        let any_time = TimeWindow::unbounded();

        assert_eq!(merge.len(), 2);
        assert_eq!(
            serving_urls(&merge, "GE.APE.--.BHZ", &any_time),
            vec!["http://a.example/q"]
        );
        for other in ["GE.BZS.00.BHZ", "GE.AP.--.HHZ", "GE.APEX.--.HHZ"] {
            assert_eq!(
                serving_urls(&merge, other, &any_time),
                vec!["http://b.example/q"],
                "{other}"
            );
        }
    }

    #[test]
    fn carving_only_applies_inside_the_better_window() {
        let snapshot = snapshot(
            vec![
                (
                    Identifier::new("GE", "APE", "*", "*"),
                    Route::new(
                        "dataselect",
                        "http://a.example/q",
                        window(Some("2010-01-01"), Some("2012-01-01")),
                        1,
                    ),
                ),
                (
                    Identifier::new("GE", "*", "*", "*"),
                    Route::new("dataselect", "http://b.example/q", TimeWindow::unbounded(), 2),
                ),
            ],
            VirtualNetworkTable::default(),
        );

        let merge = get_route(
            &snapshot,
            &Identifier::new("GE", "*", "*", "BHZ"),
            &window(Some("2009-01-01"), Some("2013-01-01")),
            "dataselect",
        )
        .expect("route should resolve");

        let early = window(Some("2009-06-01"), Some("2009-06-02"));
        let inside = window(Some("2011-06-01"), Some("2011-06-02"));
        let late = window(Some("2012-06-01"), Some("2012-06-02"));
        assert_eq!(serving_urls(&merge, "GE.APE.--.BHZ", &early), vec!["http://b.example/q"]);
        assert_eq!(serving_urls(&merge, "GE.APE.--.BHZ", &inside), vec!["http://a.example/q"]);
        assert_eq!(serving_urls(&merge, "GE.APE.--.BHZ", &late), vec!["http://b.example/q"]);
        assert_eq!(serving_urls(&merge, "GE.BZS.--.BHZ", &inside), vec!["http://b.example/q"]);
    }

    #[test]
    fn uncarvable_overlap_keeps_the_wider_route() {
        let snapshot = snapshot(
            vec![
                (
                    Identifier::new("GE", "*", "*", "BH?"),
                    Route::new("dataselect", "http://a.example/q", TimeWindow::unbounded(), 1),
                ),
                (
                    Identifier::new("GE", "*", "*", "*"),
                    Route::new("dataselect", "http://b.example/q", TimeWindow::unbounded(), 2),
                ),
            ],
            VirtualNetworkTable::default(),
        );

        let merge = get_route(
            &snapshot,
            &Identifier::new("GE", "APE", "*", "*"),
            &TimeWindow::unbounded(),
            "dataselect",
        )
        .expect("route should resolve");
        let urls: Vec<&str> = merge.iter().map(|entry| entry.url.as_str()).collect();

        assert_eq!(urls.len(), 2);
        assert!(urls.contains(&"http://a.example/q"));
        assert!(urls.contains(&"http://b.example/q"));
    }

    #[test]
    fn entries_sharing_url_and_window_keep_their_own_streams() {
        let mut virtual_networks = VirtualNetworkTableBuilder::new();
        for station in ["APE", "WLF"] {
            virtual_networks.add_member(
                "_PAIR",
                VirtualNetworkMember::new(
                    Identifier::new("GE", station, "*", "*"),
                    TimeWindow::unbounded(),
                ),
            );
        }
        let snapshot = snapshot(
            vec![(
                Identifier::new("GE", "*", "*", "*"),
                Route::new("dataselect", "http://geofon", TimeWindow::unbounded(), 1),
            )],
            virtual_networks.build(),
        );

        let merge = get_route(
            &snapshot,
            &Identifier::new("_PAIR", "*", "*", "BHZ"),
            &TimeWindow::unbounded(),
            "dataselect",
        )
        .expect("route should resolve");
        let rendered: Vec<String> = merge
            .iter()
            .map(|entry| format!("{} {}", entry.identifier, entry.url))
            .collect();

        assert_eq!(
            rendered,
            vec!["GE.APE.*.BHZ http://geofon", "GE.WLF.*.BHZ http://geofon"]
        );
    }
}
