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

//! Canonical structured field keys and value-format helpers.

use crate::stream_error::SharedError;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const STREAM_ID: &str = "stream_id";
pub const STREAM_NAME: &str = "stream_name";
pub const LINK_ID: &str = "link_id";

pub const ERR: &str = "err";
pub const REASON: &str = "reason";

pub const NONE: &str = "none";
pub const REASON_NO_ERROR_OBSERVERS: &str = "no_error_observers";
pub const REASON_RAW_SINK: &str = "raw_sink";
pub const REASON_END_DISABLED: &str = "end_disabled";

pub fn format_optional_error(error: Option<&SharedError>) -> String {
    error
        .map(|error| error.to_string())
        .unwrap_or_else(|| NONE.to_string())
}
