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

use fdsn_federator::data_plane::accounting::{AccountingError, AccountingSink, FetchRecord};
use std::sync::Mutex;

/// Keeps every accounting record in arrival order.
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<FetchRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<FetchRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// `(url, status)` pairs, the part most assertions care about.
    pub fn outcomes(&self) -> Vec<(String, Option<u16>)> {
        self.records()
            .into_iter()
            .map(|record| (record.url, record.status))
            .collect()
    }
}

impl AccountingSink for RecordingSink {
    fn record(&self, record: &FetchRecord) -> Result<(), AccountingError> {
        self.records
            .lock()
            .map_err(|err| AccountingError::Unavailable(err.to_string()))?
            .push(record.clone());
        Ok(())
    }
}
