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

use async_trait::async_trait;
use bytes::Bytes;
use fdsn_federator::data_plane::upstream::{FetchError, UpstreamFetcher, UpstreamResponse};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// What a scripted upstream does when it is opened.
#[derive(Clone, Debug)]
pub enum Script {
    /// Answers 200 and sends the chunks.
    Body(Vec<&'static str>),
    /// Answers 200 and sends the chunks after waiting.
    Delayed(Duration, Vec<&'static str>),
    /// Answers 200, sends the chunks, then the connection breaks.
    BreaksAfter(Vec<&'static str>),
    /// Rejects the request with the given status.
    Status(u16),
    /// The connection cannot be established.
    Refused,
    /// Answers 200 and never sends anything.
    Stalled,
    /// Refuses the first `n` connections, then answers 200 with the chunks.
    RefusedTimes(usize, Vec<&'static str>),
}

struct LiveBody {
    live: Arc<AtomicUsize>,
}

impl LiveBody {
    fn track(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            live: Arc::clone(live),
        }
    }
}

impl Drop for LiveBody {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Upstream fake answering by URL prefix.
///
/// Unscripted URLs are refused. Every opened URL is recorded, and bodies that
/// have been handed out but not dropped yet are counted.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Vec<(String, Script)>,
    opened: Mutex<Vec<String>>,
    live_bodies: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts every URL starting with `prefix`; the first matching prefix wins.
    pub fn script(mut self, prefix: &str, script: Script) -> Self {
        self.scripts.push((prefix.to_string(), script));
        self
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .map(|opened| opened.clone())
            .unwrap_or_default()
    }

    pub fn live_bodies(&self) -> usize {
        self.live_bodies.load(Ordering::SeqCst)
    }

    /// The script for `url` and how often its prefix was opened before.
    fn script_for(&self, url: &str, opened: &[String]) -> (Script, usize) {
        match self
            .scripts
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
        {
            Some((prefix, script)) => {
                let earlier = opened
                    .iter()
                    .filter(|seen| seen.starts_with(prefix.as_str()))
                    .count();
                (script.clone(), earlier)
            }
            None => (Script::Refused, 0),
        }
    }

    fn tracked(
        &self,
        body: BoxStream<'static, Result<Bytes, FetchError>>,
    ) -> BoxStream<'static, Result<Bytes, FetchError>> {
        let guard = LiveBody::track(&self.live_bodies);
        body.map(move |item| {
            let _alive = &guard;
            item
        })
        .boxed()
    }
}

fn chunks(body: &[&'static str]) -> Vec<Result<Bytes, FetchError>> {
    body.iter()
        .map(|chunk| Ok(Bytes::from_static(chunk.as_bytes())))
        .collect()
}

#[async_trait]
impl UpstreamFetcher for ScriptedFetcher {
    async fn open(&self, url: &str) -> Result<UpstreamResponse, FetchError> {
        let (script, earlier) = match self.opened.lock() {
            Ok(mut opened) => {
                let found = self.script_for(url, &opened);
                opened.push(url.to_string());
                found
            }
            Err(_) => self.script_for(url, &[]),
        };
        debug!(url, ?script, earlier, "scripted upstream opened");

        let body = match script {
            Script::Body(body) => stream::iter(chunks(&body)).boxed(),
            Script::Delayed(delay, body) => {
                tokio::time::sleep(delay).await;
                stream::iter(chunks(&body)).boxed()
            }
            Script::BreaksAfter(body) => {
                let mut items = chunks(&body);
                items.push(Err(FetchError::Read("connection reset by peer".to_string())));
                stream::iter(items).boxed()
            }
            Script::Status(status) => {
                return Err(FetchError::Status {
                    status,
                    message: format!("scripted status {status}"),
                })
            }
            Script::Refused => return Err(FetchError::Connect("connection refused".to_string())),
            Script::Stalled => stream::pending().boxed(),
            Script::RefusedTimes(refusals, _) if earlier < refusals => {
                return Err(FetchError::Connect("connection refused".to_string()))
            }
            Script::RefusedTimes(_, body) => stream::iter(chunks(&body)).boxed(),
        };
        Ok(UpstreamResponse::new(200, self.tracked(body)))
    }
}
