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

//! Route-table data model and its build-time overlap arbitration.

use crate::identifier::Identifier;
use crate::observability::events;
use crate::routing::pattern;
use crate::routing::time_window::TimeWindow;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Priority assigned to offerings that do not state one.
pub const DEFAULT_PRIORITY: i32 = 99;

const COMPONENT: &str = "route_table";

/// One upstream offering: a service at a base address, valid for a window.
///
/// Lower `priority` values win.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Route {
    pub service: String,
    pub address: String,
    pub window: TimeWindow,
    pub priority: i32,
}

impl Route {
    pub fn new(service: &str, address: &str, window: TimeWindow, priority: i32) -> Self {
        Self {
            service: service.to_string(),
            address: address.to_string(),
            window,
            priority,
        }
    }

    /// Same service, overlapping window and equal priority: priority alone cannot
    /// decide between the two.
    fn ties_with(&self, other: &Route) -> bool {
        self.service == other.service
            && self.priority == other.priority
            && self.window.overlaps(&other.window)
    }
}

/// Whether two routes may cover the same stream space with equal priority.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OverlapPolicy {
    /// The later of two tying routes is discarded.
    #[default]
    Forbid,
    /// Both tying routes are kept; the earlier-loaded one is preferred at query time.
    Allow,
}

impl OverlapPolicy {
    pub fn from_allow_overlap(allow_overlap: bool) -> Self {
        if allow_overlap {
            OverlapPolicy::Allow
        } else {
            OverlapPolicy::Forbid
        }
    }
}

/// Outcome of [`RouteTableBuilder::add_route`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RouteInsertion {
    Inserted,
    /// Kept although it ties with a route already stored under `conflicting`.
    InsertedWithOverlap { conflicting: Identifier },
    /// Discarded because it ties with a route already stored under `conflicting`.
    Rejected { conflicting: Identifier },
}

/// Incrementally assembled route table; sealed into a [`RouteTable`] by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    policy: OverlapPolicy,
    entries: Vec<(Identifier, Vec<Route>)>,
    index: HashMap<Identifier, usize>,
}

impl RouteTableBuilder {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    fn find_conflict(&self, pattern: &Identifier, route: &Route) -> Option<&Identifier> {
        self.entries
            .iter()
            .filter(|(stored, _)| pattern::matches(pattern, stored))
            .find(|(_, routes)| routes.iter().any(|stored| stored.ties_with(route)))
            .map(|(stored, _)| stored)
    }

    /// Inserts one route under one pattern, arbitrating against what is already stored.
    pub fn add_route(&mut self, pattern: Identifier, route: Route) -> RouteInsertion {
        let outcome = match (self.find_conflict(&pattern, &route), self.policy) {
            (None, _) => RouteInsertion::Inserted,
            (Some(conflicting), OverlapPolicy::Forbid) => {
                warn!(
                    event = events::ROUTE_OVERLAP_REJECTED,
                    component = COMPONENT,
                    stream = %pattern,
                    conflicting = %conflicting,
                    service = route.service.as_str(),
                    url = route.address.as_str(),
                    window = %route.window,
                    priority = route.priority,
                    "overlapping route discarded"
                );
                return RouteInsertion::Rejected {
                    conflicting: conflicting.clone(),
                };
            }
            (Some(conflicting), OverlapPolicy::Allow) => {
                info!(
                    event = events::ROUTE_OVERLAP_ACCEPTED,
                    component = COMPONENT,
                    stream = %pattern,
                    conflicting = %conflicting,
                    service = route.service.as_str(),
                    url = route.address.as_str(),
                    "overlapping route kept"
                );
                RouteInsertion::InsertedWithOverlap {
                    conflicting: conflicting.clone(),
                }
            }
        };

        debug!(
            event = events::ROUTE_INSERTED,
            component = COMPONENT,
            stream = %pattern,
            service = route.service.as_str(),
            url = route.address.as_str(),
            priority = route.priority,
            "route inserted"
        );
        match self.index.get(&pattern) {
            Some(&position) => self.entries[position].1.push(route),
            None => {
                self.index.insert(pattern.clone(), self.entries.len());
                self.entries.push((pattern, vec![route]));
            }
        }
        outcome
    }

    /// Seals the table, ordering every pattern's routes by ascending priority.
    pub fn build(mut self) -> RouteTable {
        for (_, routes) in self.entries.iter_mut() {
            // `sort_by_key` is stable: equal priorities keep insertion order.
            routes.sort_by_key(|route| route.priority);
        }

        let table = RouteTable {
            entries: self.entries,
            index: self.index,
        };
        info!(
            event = events::ROUTE_TABLE_BUILT,
            component = COMPONENT,
            patterns = table.len(),
            routes = table.route_count(),
            "route table built"
        );
        table
    }
}

/// Immutable mapping from identifier patterns to priority-ordered routes.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    entries: Vec<(Identifier, Vec<Route>)>,
    index: HashMap<Identifier, usize>,
}

impl RouteTable {
    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of routes over all patterns.
    pub fn route_count(&self) -> usize {
        self.entries.iter().map(|(_, routes)| routes.len()).sum()
    }

    /// Routes stored under exactly `pattern`.
    pub fn routes_for(&self, pattern: &Identifier) -> Option<&[Route]> {
        self.index
            .get(pattern)
            .map(|&position| self.entries[position].1.as_slice())
    }

    /// Patterns and their routes in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &[Route])> {
        self.entries
            .iter()
            .map(|(pattern, routes)| (pattern, routes.as_slice()))
    }
}
