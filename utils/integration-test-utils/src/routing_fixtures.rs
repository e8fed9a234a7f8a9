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

use fdsn_federator::control_plane::route_table::{
    OverlapPolicy, Route, RouteInsertion, RouteTable, RouteTableBuilder,
};
use fdsn_federator::routing::time_window::TimeWindow;
use fdsn_federator::Identifier;

/// `(pattern, service, address, start, end, priority)` as written in catalogs.
pub type RouteRow<'a> = (
    &'a str,
    &'a str,
    &'a str,
    Option<&'a str>,
    Option<&'a str>,
    i32,
);

/// Parses `"NET.STA.LOC.CHA"`; missing trailing fields are wildcards.
pub fn pattern(dotted: &str) -> Identifier {
    let mut fields = dotted.split('.');
    let mut next = || fields.next().unwrap_or("*");
    let (network, station, location, channel) = (next(), next(), next(), next());
    Identifier::new(network, station, location, channel)
}

pub fn window(start: Option<&str>, end: Option<&str>) -> TimeWindow {
    TimeWindow::parse(start, end).expect("fixture window should parse")
}

pub fn route(service: &str, address: &str, window: TimeWindow, priority: i32) -> Route {
    Route::new(service, address, window, priority)
}

/// Builds a table from rows, panicking if the policy rejects any of them.
pub fn routes(policy: OverlapPolicy, rows: &[RouteRow<'_>]) -> RouteTable {
    let mut builder = RouteTableBuilder::new(policy);
    for &(dotted, service, address, start, end, priority) in rows {
        let insertion = builder.add_route(
            pattern(dotted),
            route(service, address, window(start, end), priority),
        );
        assert!(
            !matches!(insertion, RouteInsertion::Rejected { .. }),
            "fixture route {dotted} {address} was rejected"
        );
    }
    builder.build()
}
