// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Decides how an operation should be polled.
//!
//! Azure Resource Manager services signal asynchronous completion through
//! several conventions: an `azure-asyncoperation` header pointing at an
//! operation resource, a `location` header, or a provisioning state embedded
//! in the resource body. The classifier resolves these into a single
//! [PollingStrategy], exactly once per operation. It performs no I/O, so the
//! precedence rules are unit testable in isolation.

use crate::InitialResult;
use http::Method;
use mgmt_core::Result;
use mgmt_core::error::Error;

pub(crate) const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";
pub(crate) const LOCATION_HEADER: &str = "location";

/// How the operation's progress is observed.
///
/// Chosen once from the initial response and never re-derived mid-poll. Every
/// polling variant carries the resolved absolute URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PollingStrategy {
    /// The operation already completed with the initial response; the initial
    /// body is the final result and no poll request is ever made.
    None,
    /// Poll the operation resource named by the `azure-asyncoperation`
    /// header.
    AzureAsyncOperation { url: String },
    /// Poll the URL named by the `location` header.
    Location { url: String },
    /// Poll the original resource, whose initial body carried a provisioning
    /// state that has not reached a terminal value yet.
    ProvisioningStateField { url: String },
    /// Poll the original resource as a last resort: a PUT or PATCH was
    /// accepted without any polling headers or state field.
    ResourceLocationFallback { url: String },
}

impl PollingStrategy {
    /// Chooses the polling strategy for an operation.
    ///
    /// Fails with [Error::unexpected_status] when the initial status code
    /// cannot start a long running operation for the request's verb; this is
    /// detected before any poll request is made.
    pub fn choose(initial: &InitialResult) -> Result<Self> {
        if !allowed_status(initial.method(), initial.status()) {
            return Err(Error::unexpected_status(
                initial.status(),
                initial.method().clone(),
            ));
        }
        if let Some(url) = non_empty_header(initial.headers(), ASYNC_OPERATION_HEADER) {
            return Ok(Self::AzureAsyncOperation { url });
        }
        if let Some(url) = non_empty_header(initial.headers(), LOCATION_HEADER) {
            return Ok(Self::Location { url });
        }
        match *initial.method() {
            Method::PUT | Method::PATCH => Ok(Self::without_headers(initial)),
            // POST and DELETE with no polling headers are complete: the
            // initial body is all the service is going to say.
            _ => Ok(Self::None),
        }
    }

    fn without_headers(initial: &InitialResult) -> Self {
        match initial.provisioning_state() {
            Some(state) if !state.is_terminal() => Self::ProvisioningStateField {
                url: initial.url().to_string(),
            },
            Some(_) => Self::None,
            None if matches!(initial.status(), 200 | 201) => Self::None,
            None => Self::ResourceLocationFallback {
                url: initial.url().to_string(),
            },
        }
    }

    /// The URL to poll, or `None` when the operation is already complete.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::AzureAsyncOperation { url }
            | Self::Location { url }
            | Self::ProvisioningStateField { url }
            | Self::ResourceLocationFallback { url } => Some(url),
        }
    }

    /// Whether the loop should wait one interval before the first poll.
    ///
    /// The header strategies wait: the service just reported the operation as
    /// running. The resource strategies poll immediately, as the resource may
    /// already carry a terminal state.
    pub(crate) fn delay_before_first_poll(&self) -> bool {
        matches!(
            self,
            Self::AzureAsyncOperation { .. } | Self::Location { .. }
        )
    }
}

fn allowed_status(method: &Method, status: u16) -> bool {
    match *method {
        Method::PUT | Method::PATCH | Method::GET => matches!(status, 200 | 201 | 202),
        Method::POST | Method::DELETE => matches!(status, 200 | 202 | 204),
        _ => false,
    }
}

fn non_empty_header(headers: &http::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
