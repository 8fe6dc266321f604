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

//! Terminal error types shared across the lifecycle and pipe layers.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Shared handle for a stream's terminal error.
///
/// Terminal errors are recorded in stream state, handed to completion
/// callbacks, and dispatched to error observers; `Rc` keeps all of those
/// views pointing at the same error without copying it.
pub type SharedError = Rc<StreamError>;

/// A terminal stream error.
#[derive(Debug)]
pub struct StreamError {
    message: String,
    source: Option<Box<dyn Error>>,
}

impl StreamError {
    /// Creates a shared terminal error from a message.
    pub fn new(message: impl Into<String>) -> SharedError {
        Rc::new(Self {
            message: message.into(),
            source: None,
        })
    }

    /// Creates a shared terminal error wrapping an underlying cause.
    pub fn with_source(message: impl Into<String>, source: Box<dyn Error>) -> SharedError {
        Rc::new(Self {
            message: message.into(),
            source: Some(source),
        })
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for StreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for StreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref()
    }
}

/// A terminal error that was dispatched with zero observers.
///
/// The scheduler collects these so the embedding application can decide how
/// to escalate them; the core never silently discards an error.
#[derive(Debug)]
pub struct UnhandledError {
    stream_id: String,
    error: SharedError,
}

impl UnhandledError {
    pub(crate) fn new(stream_id: impl Into<String>, error: SharedError) -> Self {
        Self {
            stream_id: stream_id.into(),
            error,
        }
    }

    /// Returns the id of the stream whose error went unobserved.
    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// Returns the unobserved terminal error.
    pub fn error(&self) -> &SharedError {
        &self.error
    }
}

impl Display for UnhandledError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unhandled terminal error on stream {}: {}",
            self.stream_id, self.error
        )
    }
}

impl Error for UnhandledError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.error.as_ref())
    }
}
