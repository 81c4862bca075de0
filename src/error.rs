// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use crate::resources::ResourceKind;
use thiserror::Error;

/// Resource manager error type
///
/// `Clone` because a single load result is handed to every caller waiting
/// on the same in-flight preload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// Loader failed to fetch or decode a resource
    #[error("Failed to load {url}: {reason}")]
    Load { url: String, reason: String },

    /// Key is registered, but under a different kind than requested
    #[error("Resource {key} is a {found}, expected a {expected}")]
    KindMismatch {
        key: String,
        expected: ResourceKind,
        found: ResourceKind,
    },

    /// Manager was dropped while a preload was still in flight
    #[error("Resource manager shut down before {0} finished loading")]
    Shutdown(String),

    /// Invalid manager configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ResourceError {
    /// Build a load error from any displayable cause
    pub fn load(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ResourceError::Load {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for ResourceError {
    fn from(err: serde_json::Error) -> Self {
        ResourceError::Config(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ResourceError>;
