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

//! Batch download with per-line retries.

use fdsn_federator::data_plane::accounting::FetchSummary;
use fdsn_federator::{Federator, FederatorError, ParsedQuery};
use futures::StreamExt;
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

pub(crate) const SERVICE: &str = "dataselect";

#[derive(Debug, Error)]
pub(crate) enum BatchError {
    #[error(transparent)]
    Query(#[from] FederatorError),
    #[error("unable to write payload: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RetryPolicy {
    pub(crate) retries: u32,
    pub(crate) wait: Duration,
}

#[derive(Debug, Default)]
pub(crate) struct BatchReport {
    pub(crate) attempts: u32,
    pub(crate) bytes: u64,
    /// Per-attempt summaries, written to the run log.
    pub(crate) log: String,
    /// Lines that still produced no data after the last attempt.
    pub(crate) pending: Vec<String>,
}

/// Queries `request` and re-queries the lines that delivered nothing.
///
/// The federator must account into `summary`.
pub(crate) async fn run_batch<W>(
    federator: &Federator,
    summary: &FetchSummary,
    request: &str,
    policy: RetryPolicy,
    out: &mut W,
) -> Result<BatchReport, BatchError>
where
    W: AsyncWrite + Unpin,
{
    let mut report = BatchReport::default();
    let mut request = request.to_string();

    for attempt in 1..=policy.retries + 1 {
        if attempt > 1 {
            info!(
                attempt,
                lines = report.pending.len(),
                wait_ms = policy.wait.as_millis() as u64,
                "retrying lines without data"
            );
            tokio::time::sleep(policy.wait).await;
        }
        summary.clear();
        report.attempts = attempt;

        let query = if attempt == 1 {
            federator.parse_post(SERVICE, &request)?
        } else {
            let limits = federator.config().query_limits();
            ParsedQuery::from_resolved_lines(SERVICE, &request, &limits)?
        };
        match federator.query(&query).await {
            Ok(mut blocks) => {
                while let Some(block) = blocks.next().await {
                    out.write_all(&block).await?;
                    report.bytes += block.len() as u64;
                }
            }
            Err(FederatorError::NoContent(reason)) => {
                info!(attempt, reason = reason.as_str(), "attempt delivered no data");
            }
            Err(err) => return Err(err.into()),
        }

        let _ = writeln!(report.log, "# attempt {attempt}");
        report.log.push_str(&summary.render());

        report.pending = summary.lines_without_data();
        if report.pending.is_empty() {
            break;
        }
        request = report.pending.join("\n");
    }

    out.flush().await?;
    if !report.pending.is_empty() {
        warn!(
            attempts = report.attempts,
            lines = report.pending.len(),
            "some lines delivered no data"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::{run_batch, RetryPolicy, SERVICE};
    use fdsn_federator::control_plane::route_table::OverlapPolicy;
    use fdsn_federator::control_plane::virtual_network::VirtualNetworkTable;
    use fdsn_federator::data_plane::accounting::FetchSummary;
    use fdsn_federator::{Federator, FederatorConfig};
    use integration_test_utils::{init_logging, routes, Script, ScriptedFetcher};
    use std::sync::Arc;
    use std::time::Duration;

    const NO_WAIT: Duration = Duration::ZERO;

    fn federator(fetcher: Arc<ScriptedFetcher>, summary: Arc<FetchSummary>) -> Federator {
        let federator = Federator::new("batch-test", FederatorConfig::default(), fetcher)
            .with_accounting(summary);
        federator.publish(
            routes(
                OverlapPolicy::Forbid,
                &[
                    ("AA.*.*.*", SERVICE, "http://a.example/query", None, None, 1),
                    ("BB.*.*.*", SERVICE, "http://b.example/query", None, None, 1),
                ],
            ),
            VirtualNetworkTable::default(),
        );
        federator
    }

    #[tokio::test]
    async fn retry_requeries_only_lines_without_data() {
        init_logging();

        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .script("http://a.example/", Script::Body(vec!["aaa"]))
                .script("http://b.example/", Script::RefusedTimes(1, vec!["bbb"])),
        );
        let summary = Arc::new(FetchSummary::new());
        let federator = federator(fetcher.clone(), summary.clone());

        let mut payload = Vec::new();
        let report = run_batch(
            &federator,
            &summary,
            "AA * * * * *\nBB * * * * *\n",
            RetryPolicy {
                retries: 3,
                wait: NO_WAIT,
            },
            &mut payload,
        )
        .await
        .expect("batch should run");

        assert_eq!(payload, b"aaabbb");
        assert_eq!(report.attempts, 2);
        assert_eq!(report.bytes, 6);
        assert!(report.pending.is_empty());
        assert_eq!(
            report.log,
            "# attempt 1\nAA * * * * * [OK] 3 bytes\nBB * * * * * [ERROR] 0 bytes\n\
             # attempt 2\nBB * * * * * [OK] 3 bytes\n"
        );
        assert_eq!(
            fetcher
                .opened()
                .iter()
                .filter(|url| url.starts_with("http://a.example/"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn retry_keeps_single_character_wildcards_from_stored_patterns() {
        init_logging();

        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .script("http://c.example/", Script::RefusedTimes(1, vec!["ccc"])),
        );
        let summary = Arc::new(FetchSummary::new());
        let federator = Federator::new("batch-test", FederatorConfig::default(), fetcher.clone())
            .with_accounting(summary.clone());
        federator.publish(
            routes(
                OverlapPolicy::Forbid,
                &[("CC.*.*.BH?", SERVICE, "http://c.example/query", None, None, 1)],
            ),
            VirtualNetworkTable::default(),
        );

        let mut payload = Vec::new();
        let report = run_batch(
            &federator,
            &summary,
            "CC * * * * *\n",
            RetryPolicy {
                retries: 1,
                wait: NO_WAIT,
            },
            &mut payload,
        )
        .await
        .expect("batch should run");

        assert_eq!(payload, b"ccc");
        assert_eq!(report.attempts, 2);
        assert!(report.log.ends_with("# attempt 2\nCC * * BH? * * [OK] 3 bytes\n"));
    }

    #[tokio::test]
    async fn retries_stop_at_the_limit() {
        init_logging();

        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .script("http://a.example/", Script::Body(vec!["aaa"]))
                .script("http://b.example/", Script::Status(503)),
        );
        let summary = Arc::new(FetchSummary::new());
        let federator = federator(fetcher, summary.clone());

        let mut payload = Vec::new();
        let report = run_batch(
            &federator,
            &summary,
            "AA * * * * *\nBB * * * * *\n",
            RetryPolicy {
                retries: 2,
                wait: NO_WAIT,
            },
            &mut payload,
        )
        .await
        .expect("batch should run");

        assert_eq!(payload, b"aaa");
        assert_eq!(report.attempts, 3);
        assert_eq!(report.pending, vec!["BB * * * * *"]);
    }

    #[tokio::test]
    async fn malformed_request_fails_the_batch() {
        init_logging();

        let summary = Arc::new(FetchSummary::new());
        let federator = federator(Arc::new(ScriptedFetcher::new()), summary.clone());

        let mut payload = Vec::new();
        let result = run_batch(
            &federator,
            &summary,
            "AA * *\n",
            RetryPolicy {
                retries: 1,
                wait: NO_WAIT,
            },
            &mut payload,
        )
        .await;

        assert!(result.is_err());
        assert!(payload.is_empty());
    }
}
