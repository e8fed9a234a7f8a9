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

//! Possibly unbounded `[start, end)` time intervals.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use std::cmp::{max, min};
use std::fmt::{Display, Formatter};
use thiserror::Error;

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TimeWindowError {
    #[error("unparsable timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("start time {start} is after end time {end}")]
    Inverted { start: String, end: String },
}

/// Parses `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS[.ffffff][Z]`.
///
/// A blank between date and time is accepted in place of `T`, and seconds may be
/// omitted.
///
/// ```
/// use fdsn_federator::routing::time_window::parse_timestamp;
///
/// let ts = parse_timestamp("2015-06-01T12:30:00.5Z").unwrap();
/// assert_eq!(ts.to_string(), "2015-06-01 12:30:00.500");
/// ```
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TimeWindowError> {
    let trimmed = value.trim();
    let normalized = trimmed
        .strip_suffix('Z')
        .unwrap_or(trimmed)
        .replacen(' ', "T", 1);

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(parsed);
        }
    }

    NaiveDate::parse_from_str(&normalized, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimeWindowError::InvalidTimestamp(value.to_string()))
}

/// Renders a timestamp the way upstream services expect it in query strings.
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    if timestamp.nanosecond() == 0 {
        timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// A `[start, end)` interval; `None` on either side means unbounded.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct TimeWindow {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl TimeWindow {
    pub fn new(
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Self, TimeWindowError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(TimeWindowError::Inverted {
                    start: format_timestamp(&start),
                    end: format_timestamp(&end),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// The window covering all of time.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Builds a window from optional textual bounds; blank text means unbounded.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self, TimeWindowError> {
        let parse_bound = |bound: Option<&str>| match bound.map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_timestamp(text).map(Some),
        };
        Self::new(parse_bound(start)?, parse_bound(end)?)
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// `true` unless one window lies entirely before the other.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        starts_before_end(self.start, other.end) && starts_before_end(other.start, self.end)
    }

    /// The common part of two windows, if any.
    pub fn intersection(&self, other: &TimeWindow) -> Option<TimeWindow> {
        if !self.overlaps(other) {
            return None;
        }
        let start = match (self.start, other.start) {
            (Some(a), Some(b)) => Some(max(a, b)),
            (a, b) => a.or(b),
        };
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(min(a, b)),
            (a, b) => a.or(b),
        };
        Some(TimeWindow { start, end })
    }

    /// The parts of `self` not covered by `other`, in chronological order.
    pub fn subtract(&self, other: &TimeWindow) -> Vec<TimeWindow> {
        let Some(common) = self.intersection(other) else {
            return vec![*self];
        };

        let mut pieces = Vec::with_capacity(2);
        if let Some(cut) = common.start {
            if self.start.map_or(true, |start| start < cut) {
                pieces.push(TimeWindow {
                    start: self.start,
                    end: Some(cut),
                });
            }
        }
        if let Some(cut) = common.end {
            if self.end.map_or(true, |end| cut < end) {
                pieces.push(TimeWindow {
                    start: Some(cut),
                    end: self.end,
                });
            }
        }
        pieces
    }
}

fn starts_before_end(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => start < end,
        _ => true,
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let render =
            |bound: Option<NaiveDateTime>| bound.map_or("*".to_string(), |ts| format_timestamp(&ts));
        write!(f, "{} {}", render(self.start), render(self.end))
    }
}
