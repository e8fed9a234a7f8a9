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

use thiserror::Error;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CatalogError {
    #[error("unable to read catalog {path}: {message}")]
    Read { path: String, message: String },
    #[error("unable to parse catalog {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error("unable to download catalog {url}: {message}")]
    Download { url: String, message: String },
    #[error("unable to update cached catalog {path}: {message}")]
    Cache { path: String, message: String },
}
