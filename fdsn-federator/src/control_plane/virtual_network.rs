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

//! Virtual network codes: aliases standing for a union of real stream patterns.

use crate::identifier::{Identifier, WILDCARD};
use crate::observability::events;
use crate::routing::time_window::TimeWindow;
use std::collections::HashMap;
use tracing::info;

const COMPONENT: &str = "virtual_network_table";

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct VirtualNetworkMember {
    pub pattern: Identifier,
    pub window: TimeWindow,
}

impl VirtualNetworkMember {
    pub fn new(pattern: Identifier, window: TimeWindow) -> Self {
        Self { pattern, window }
    }
}

#[derive(Debug, Default)]
pub struct VirtualNetworkTableBuilder {
    groups: HashMap<String, Vec<VirtualNetworkMember>>,
}

impl VirtualNetworkTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member to `code`; an identical member already present is ignored.
    pub fn add_member(&mut self, code: &str, member: VirtualNetworkMember) {
        let members = self
            .groups
            .entry(code.trim().to_ascii_uppercase())
            .or_default();
        if !members.contains(&member) {
            members.push(member);
        }
    }

    pub fn build(self) -> VirtualNetworkTable {
        let table = VirtualNetworkTable {
            groups: self.groups,
        };
        info!(
            event = events::VIRTUAL_NETWORK_TABLE_BUILT,
            component = COMPONENT,
            virtual_networks = table.len(),
            "virtual network table built"
        );
        table
    }
}

/// Immutable virtual network definitions.
#[derive(Clone, Debug, Default)]
pub struct VirtualNetworkTable {
    groups: HashMap<String, Vec<VirtualNetworkMember>>,
}

impl VirtualNetworkTable {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn is_virtual(&self, code: &str) -> bool {
        self.groups.contains_key(code)
    }

    /// Members of a virtual network, or the code itself as a literal
    /// `(code, *, *, *)` pattern valid at all times.
    pub fn expand(&self, network_code: &str) -> Vec<VirtualNetworkMember> {
        match self.groups.get(network_code) {
            Some(members) => members.clone(),
            None => vec![VirtualNetworkMember::new(
                Identifier::new(network_code, WILDCARD, WILDCARD, WILDCARD),
                TimeWindow::unbounded(),
            )],
        }
    }
}
