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

//! Per-endpoint usage accounting.

use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::sync::Mutex;
use thiserror::Error;

/// Outcome of one endpoint fetch, reported after the endpoint is done.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchRecord {
    pub timestamp: DateTime<Utc>,
    /// HTTP status, `None` when no answer was received or the body broke off.
    pub status: Option<u16>,
    pub url: String,
    /// The `N S L C start end` line this endpoint answers.
    pub line: String,
    pub bytes: u64,
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum AccountingError {
    #[error("accounting store unavailable: {0}")]
    Unavailable(String),
}

/// Receives a [`FetchRecord`] for every endpoint the multiplexer visits.
///
/// Errors are logged by the caller and otherwise ignored.
pub trait AccountingSink: Send + Sync {
    fn record(&self, record: &FetchRecord) -> Result<(), AccountingError>;
}

/// Short label for an HTTP status as it appears in run summaries.
pub fn status_label(status: Option<u16>) -> String {
    match status {
        None | Some(0) => "ERROR".to_string(),
        Some(200) => "OK".to_string(),
        Some(204) => "NODATA".to_string(),
        Some(400) => "BAD REQUEST".to_string(),
        Some(500) => "SERVER ERROR".to_string(),
        Some(other) => other.to_string(),
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LineSummary {
    pub line: String,
    pub statuses: Vec<String>,
    pub bytes: u64,
}

/// Collects records per request line for a batch run.
#[derive(Debug, Default)]
pub struct FetchSummary {
    lines: Mutex<Vec<LineSummary>>,
}

impl FetchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-line totals in first-seen order.
    pub fn lines(&self) -> Vec<LineSummary> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Lines that were visited but delivered no bytes at all.
    pub fn lines_without_data(&self) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|summary| summary.bytes == 0)
            .map(|summary| summary.line)
            .collect()
    }

    pub fn total_bytes(&self) -> u64 {
        self.lines().iter().map(|summary| summary.bytes).sum()
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }

    /// One `LINE [STATUS, ...] N bytes` row per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for summary in self.lines() {
            let _ = writeln!(
                out,
                "{} [{}] {} bytes",
                summary.line,
                summary.statuses.join(", "),
                summary.bytes
            );
        }
        out
    }
}

impl AccountingSink for FetchSummary {
    fn record(&self, record: &FetchRecord) -> Result<(), AccountingError> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|err| AccountingError::Unavailable(err.to_string()))?;
        let label = status_label(record.status);
        match lines.iter_mut().find(|summary| summary.line == record.line) {
            Some(summary) => {
                summary.statuses.push(label);
                summary.bytes += record.bytes;
            }
            None => lines.push(LineSummary {
                line: record.line.clone(),
                statuses: vec![label],
                bytes: record.bytes,
            }),
        }
        Ok(())
    }
}
