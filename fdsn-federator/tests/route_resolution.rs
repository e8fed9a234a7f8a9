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

mod support;

use fdsn_federator::control_plane::route_table::{
    OverlapPolicy, Route, RouteInsertion, RouteTableBuilder,
};
use fdsn_federator::control_plane::virtual_network::{
    VirtualNetworkMember, VirtualNetworkTable, VirtualNetworkTableBuilder,
};
use fdsn_federator::routing::nslc_expansion::ls_nslc;
use fdsn_federator::routing::request_merge::Endpoint;
use fdsn_federator::routing::resolver::get_route;
use fdsn_federator::{Federator, FederatorConfig, FederatorError, Identifier, ParsedQuery};
use integration_test_utils::{init_logging, pattern, routes, window, RouteRow, ScriptedFetcher};
use std::collections::BTreeSet;
use std::sync::Arc;
use support::{make_federator, DATASELECT};

const GEOFON: &str = "http://geofon.example/fdsnws/dataselect/1/query";
const ODC: &str = "http://odc.example/fdsnws/dataselect/1/query";
const RESIF: &str = "http://resif.example/fdsnws/dataselect/1/query";

fn federator_with(rows: &[RouteRow<'_>], virtual_networks: VirtualNetworkTable) -> Federator {
    make_federator(
        "resolution-test",
        FederatorConfig::default(),
        Arc::new(ScriptedFetcher::new()),
        routes(OverlapPolicy::Forbid, rows),
        virtual_networks,
    )
}

fn get(params: &[(&str, &str)]) -> ParsedQuery {
    ParsedQuery::from_get_params(DATASELECT, params.iter().copied())
        .expect("test query should parse")
}

fn lines(endpoints: &[Endpoint]) -> Vec<&str> {
    endpoints.iter().map(|endpoint| endpoint.line.as_str()).collect()
}

#[test]
fn query_selects_the_route_of_its_network() {
    init_logging();

    let federator = federator_with(
        &[
            ("GE.*.*.*", DATASELECT, GEOFON, None, None, 1),
            ("RO.*.*.*", DATASELECT, ODC, None, None, 1),
        ],
        VirtualNetworkTable::default(),
    );

    let endpoints = federator
        .resolve(&get(&[("net", "RO"), ("sta", "BZS")]))
        .expect("RO should resolve");
    assert_eq!(endpoints.len(), 1);
    assert_eq!(
        endpoints[0].url,
        format!("{ODC}?net=RO&sta=BZS&loc=*&cha=*")
    );
    assert_eq!(lines(&endpoints), vec!["RO BZS * * * *"]);
}

#[test]
fn lower_priority_value_wins_and_fallback_fills_the_rest() {
    init_logging();

    let federator = federator_with(
        &[
            (
                "GE.*.*.*",
                DATASELECT,
                GEOFON,
                Some("2010-01-01"),
                Some("2015-01-01"),
                1,
            ),
            ("GE.*.*.*", DATASELECT, ODC, None, None, 2),
        ],
        VirtualNetworkTable::default(),
    );

    let endpoints = federator
        .resolve(&get(&[
            ("net", "GE"),
            ("sta", "APE"),
            ("start", "2012-01-01"),
            ("end", "2018-01-01"),
        ]))
        .expect("GE should resolve");

    assert_eq!(
        lines(&endpoints),
        vec![
            "GE APE * * 2012-01-01T00:00:00 2015-01-01T00:00:00",
            "GE APE * * 2015-01-01T00:00:00 2018-01-01T00:00:00",
        ]
    );
    assert!(endpoints[0].url.starts_with(GEOFON));
    assert!(endpoints[1].url.starts_with(ODC));
}

#[test]
fn equal_priority_overlap_is_arbitrated_by_policy() {
    init_logging();

    let first = || Route::new(DATASELECT, GEOFON, window(None, None), 1);
    let second = || Route::new(DATASELECT, ODC, window(Some("2014-01-01"), None), 1);

    let mut forbid = RouteTableBuilder::new(OverlapPolicy::Forbid);
    assert_eq!(forbid.add_route(pattern("GE"), first()), RouteInsertion::Inserted);
    assert_eq!(
        forbid.add_route(pattern("GE.APE"), second()),
        RouteInsertion::Rejected {
            conflicting: pattern("GE")
        }
    );
    // A different priority is not an overlap.
    assert_eq!(
        forbid.add_route(
            pattern("GE.APE"),
            Route::new(DATASELECT, RESIF, window(None, None), 5)
        ),
        RouteInsertion::Inserted
    );
    assert_eq!(forbid.build().route_count(), 2);

    let mut allow = RouteTableBuilder::new(OverlapPolicy::Allow);
    allow.add_route(pattern("GE"), first());
    assert_eq!(
        allow.add_route(pattern("GE.APE"), second()),
        RouteInsertion::InsertedWithOverlap {
            conflicting: pattern("GE")
        }
    );
    let federator = make_federator(
        "overlap-test",
        FederatorConfig {
            allow_overlap: true,
            ..FederatorConfig::default()
        },
        Arc::new(ScriptedFetcher::new()),
        allow.build(),
        VirtualNetworkTable::default(),
    );

    // The earlier-loaded route keeps the whole window.
    let endpoints = federator
        .resolve(&get(&[("net", "GE"), ("sta", "APE")]))
        .expect("GE.APE should resolve");
    assert_eq!(endpoints.len(), 1);
    assert!(endpoints[0].url.starts_with(GEOFON));
}

#[test]
fn virtual_network_resolves_to_its_members() {
    init_logging();

    let mut builder = VirtualNetworkTableBuilder::new();
    builder.add_member(
        "_alps",
        VirtualNetworkMember::new(pattern("GE.APE"), window(None, None)),
    );
    builder.add_member(
        "_ALPS",
        VirtualNetworkMember::new(
            pattern("CH.DAVOX"),
            window(Some("2010-01-01"), Some("2020-01-01")),
        ),
    );
    let federator = federator_with(
        &[
            ("GE.*.*.*", DATASELECT, GEOFON, None, None, 1),
            ("CH.*.*.*", DATASELECT, ODC, None, None, 1),
        ],
        builder.build(),
    );

    let via_virtual = federator
        .resolve(&get(&[("net", "_ALPS"), ("cha", "HHZ")]))
        .expect("virtual network should resolve");
    assert_eq!(
        lines(&via_virtual),
        vec![
            "CH DAVOX * HHZ 2010-01-01T00:00:00 2020-01-01T00:00:00",
            "GE APE * HHZ * *",
        ]
    );

    let direct = federator
        .resolve(&get(&[("net", "GE"), ("sta", "APE"), ("cha", "HHZ")]))
        .expect("member should resolve directly");
    assert_eq!(direct, via_virtual[1..].to_vec());
}

#[test]
fn unroutable_queries_are_no_content() {
    init_logging();

    let federator = federator_with(
        &[("GE.*.*.*", DATASELECT, GEOFON, None, None, 1)],
        VirtualNetworkTable::default(),
    );

    let unknown_network = federator.resolve(&get(&[("net", "XX")]));
    assert!(matches!(unknown_network, Err(FederatorError::NoContent(_))));

    let other_service = ParsedQuery::from_get_params("station", [("net", "GE")])
        .expect("query should parse");
    let err = federator
        .resolve(&other_service)
        .expect_err("no station routes exist");
    assert_eq!(err.http_status(), 204);

    let resolved_error = get_route(
        &federator.directory().snapshot(),
        &pattern("XX"),
        &window(None, None),
        DATASELECT,
    )
    .expect_err("XX has no routes");
    assert!(resolved_error.to_string().starts_with("no route found for XX.*.*.*"));
}

#[test]
fn resolution_is_deterministic_across_republication() {
    init_logging();

    let rows: &[RouteRow<'_>] = &[
        ("GE.*.*.*", DATASELECT, GEOFON, None, Some("2015-01-01"), 1),
        ("GE.*.*.*", DATASELECT, ODC, Some("2015-01-01"), None, 1),
        ("RO.*.*.*", DATASELECT, RESIF, None, None, 3),
    ];
    let federator = federator_with(rows, VirtualNetworkTable::default());
    let query = federator
        .parse_post(
            DATASELECT,
            "RO * * * * *\nGE APE -- BHZ 2014-06-01 2016-01-01\n",
        )
        .expect("body should parse");

    let first = federator.resolve(&query).expect("query should resolve");
    let before = federator.directory().current_version();
    federator.publish(
        routes(OverlapPolicy::Forbid, rows),
        VirtualNetworkTable::default(),
    );
    let second = federator.resolve(&query).expect("query should resolve");

    assert!(federator.directory().current_version() > before);
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn published_snapshot_outlives_a_refresh() {
    init_logging();

    let federator = federator_with(
        &[("GE.*.*.*", DATASELECT, GEOFON, None, None, 1)],
        VirtualNetworkTable::default(),
    );
    let held = federator.directory().snapshot();

    federator.publish(
        routes(
            OverlapPolicy::Forbid,
            &[("GE.*.*.*", DATASELECT, ODC, None, None, 1)],
        ),
        VirtualNetworkTable::default(),
    );

    let old = get_route(&held, &pattern("GE.APE"), &window(None, None), DATASELECT)
        .expect("held snapshot still routes");
    assert!(old.iter().all(|entry| entry.url == GEOFON));

    let current = federator
        .resolve(&get(&[("net", "GE")]))
        .expect("new snapshot routes");
    assert!(current[0].url.starts_with(ODC));
}

#[test]
fn expansion_reproduces_the_requested_field_sets() {
    let expanded: Vec<Identifier> =
        ls_nslc(&["ge,RO"], &["APE"], &[""], &["BHZ,HHZ", "BHZ"]).collect();

    assert_eq!(
        expanded.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec![
            "GE.APE.--.BHZ",
            "GE.APE.--.HHZ",
            "RO.APE.--.BHZ",
            "RO.APE.--.HHZ",
        ]
    );

    let networks: BTreeSet<&str> = expanded.iter().map(|id| id.network.as_str()).collect();
    let channels: BTreeSet<&str> = expanded.iter().map(|id| id.channel.as_str()).collect();
    assert_eq!(networks, BTreeSet::from(["GE", "RO"]));
    assert_eq!(channels, BTreeSet::from(["BHZ", "HHZ"]));

    for identifier in &expanded {
        let [network, station, location, channel] = identifier.fields();
        let again: Vec<Identifier> =
            ls_nslc(&[network], &[station], &[location], &[channel]).collect();
        assert_eq!(again, vec![identifier.clone()]);
    }
}
