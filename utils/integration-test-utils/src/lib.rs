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

mod scripted_fetcher;
pub use scripted_fetcher::{Script, ScriptedFetcher};
mod recording_sink;
pub use recording_sink::RecordingSink;
mod routing_fixtures;
pub use routing_fixtures::{pattern, route, routes, window, RouteRow};
mod test_logging;
pub use test_logging::init_logging;
