//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zift.
//! The Zift project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Zift Error Module
//!
//! This module defines the error types shared by estimators, transformers,
//! the archive codec and the foreign-function boundary.
//!
//! ## Error Categories
//!
//! - **InvalidArgument**: bad constructor parameters, empty buffers, bad
//!   column indices, stale boundary handles
//! - **InvalidState**: training protocol violations
//! - **NotFound**: inference lookup misses and missing annotations
//! - **VersionMismatch**: archive headers this build does not understand
//! - **CorruptArchive**: truncated or malformed archive payloads
//! - **Estimator**: a failure raised inside a named pipeline stage
//! - **Io** / **Serde**: configuration loading
//! - **Internal**: poisoned locks and panics caught at the boundary
//!
//! Every error is detected synchronously and returned to the caller. Nothing
//! is retried internally.
//!
//! ## Usage
//!
//! ```rust
//! use zift::errors::{Result, ZiError};
//!
//! fn check_bounds(min_df: f32, max_df: f32) -> Result<()> {
//!     if min_df > max_df {
//!         return Err(ZiError::invalid_argument("min_df > max_df"));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Zift.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for Zift.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// Invalid constructor parameters or call arguments.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// An operation was invoked in a state that does not allow it.
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// A lookup did not find the requested entry.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The archive header carries a version this build cannot read.
    #[error("Unsupported archive version {major}.{minor}")]
    VersionMismatch { major: u16, minor: u16 },

    /// The archive ended early or holds malformed data.
    #[error("corrupt archive: {message}")]
    CorruptArchive { message: String },

    /// Failure raised by a named estimator inside a pipeline.
    #[error("estimator '{estimator}' failed: {source}")]
    Estimator {
        estimator: String,
        #[source]
        source: Box<ZiError>,
    },

    /// Errors originating from filesystem reads.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Flat discriminant of [`ZiError`], stable across the C boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ZiErrorKind {
    InvalidArgument = 1,
    InvalidState = 2,
    NotFound = 3,
    VersionMismatch = 4,
    CorruptArchive = 5,
    Io = 6,
    Serde = 7,
    Internal = 8,
}

impl From<io::Error> for ZiError {
    fn from(err: io::Error) -> Self {
        ZiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl From<regex::Error> for ZiError {
    fn from(err: regex::Error) -> Self {
        ZiError::invalid_argument(format!("regex: {err}"))
    }
}

impl ZiError {
    /// Helper to construct invalid argument errors.
    pub fn invalid_argument<T: Into<String>>(message: T) -> Self {
        ZiError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Helper to construct invalid state errors.
    pub fn invalid_state<T: Into<String>>(message: T) -> Self {
        ZiError::InvalidState {
            message: message.into(),
        }
    }

    /// Helper to construct lookup misses.
    pub fn not_found<T: Into<String>>(message: T) -> Self {
        ZiError::NotFound {
            message: message.into(),
        }
    }

    pub fn version_mismatch(major: u16, minor: u16) -> Self {
        ZiError::VersionMismatch { major, minor }
    }

    /// Helper to construct archive decoding errors.
    pub fn corrupt_archive<T: Into<String>>(message: T) -> Self {
        ZiError::CorruptArchive {
            message: message.into(),
        }
    }

    /// Attaches the name of the stage that raised `self`.
    ///
    /// Errors that already carry a stage name are returned unchanged so that
    /// nested pipelines report the innermost failing stage.
    pub fn estimator(name: impl Into<String>, source: ZiError) -> Self {
        match source {
            ZiError::Estimator { .. } => source,
            other => ZiError::Estimator {
                estimator: name.into(),
                source: Box::new(other),
            },
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        ZiError::Internal(message.into())
    }

    /// Returns the category of this error, looking through stage context.
    pub fn kind(&self) -> ZiErrorKind {
        match self {
            ZiError::InvalidArgument { .. } => ZiErrorKind::InvalidArgument,
            ZiError::InvalidState { .. } => ZiErrorKind::InvalidState,
            ZiError::NotFound { .. } => ZiErrorKind::NotFound,
            ZiError::VersionMismatch { .. } => ZiErrorKind::VersionMismatch,
            ZiError::CorruptArchive { .. } => ZiErrorKind::CorruptArchive,
            ZiError::Estimator { source, .. } => source.kind(),
            ZiError::Io(_) => ZiErrorKind::Io,
            ZiError::Serde(_) => ZiErrorKind::Serde,
            ZiError::Internal(_) => ZiErrorKind::Internal,
        }
    }
}
