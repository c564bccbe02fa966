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

//! Interprets poll responses, tolerating malformed payloads.
//!
//! Nothing in this module returns early with a raw deserialization error:
//! malformed bodies become failed *outcomes*, with a message that records
//! whether the success body or the error body could not be read. The polling
//! loop relies on this to keep in-loop failures as terminal outcomes rather
//! than faults.

use crate::prober::PollAttempt;
use crate::state::ProvisioningState;
use mgmt_core::Result;
use mgmt_core::error::Error;
use serde_json::Value;

/// Status codes a poll may legitimately return.
const SUCCESS_STATUS: [u16; 4] = [200, 201, 202, 204];

fn is_success(status: u16) -> bool {
    SUCCESS_STATUS.contains(&status)
}

/// Diagnostics for poll bodies that could not be deserialized.
///
/// The two variants deliberately produce different messages: a success status
/// with an unreadable body is a different failure than an error status whose
/// error payload cannot be read.
#[derive(thiserror::Error, Debug)]
enum BodyError {
    #[error("Error \"{source}\" occurred in deserializing the response body - {body}")]
    Response {
        body: String,
        source: serde_json::Error,
    },
    #[error("Could not deserialize error response body - \"{body}\".")]
    ErrorResponse { body: String },
}

/// What a single poll response means for the operation.
#[derive(Debug)]
pub(crate) enum PollVerdict {
    /// Keep polling.
    InProgress,
    /// The operation completed; `body` is the parsed poll payload, if any.
    Succeeded { body: Option<Value> },
    /// The operation terminated in failure, or the response could not be
    /// interpreted.
    Failed(Error),
}

/// Interprets one poll response.
pub(crate) fn classify_poll(attempt: &PollAttempt) -> PollVerdict {
    let parsed = match parse_body(attempt) {
        Ok(v) => v,
        Err(e) => return PollVerdict::Failed(e),
    };
    if !is_success(attempt.status()) {
        let detail = error_detail(parsed.as_ref(), attempt.status());
        return PollVerdict::Failed(failure(attempt, detail));
    }
    match parsed.as_ref().and_then(state_from_body) {
        Some(state) if state.is_failure() => {
            let detail = failed_detail(parsed.as_ref(), &state);
            PollVerdict::Failed(failure(attempt, detail))
        }
        Some(state) if state.is_terminal() => PollVerdict::Succeeded { body: parsed },
        Some(_) => PollVerdict::InProgress,
        // A 202 with no state field means the service accepted the request
        // and is still working. Any other success code with no state field
        // means the resource is ready.
        None if attempt.status() == 202 => PollVerdict::InProgress,
        None => PollVerdict::Succeeded { body: parsed },
    }
}

/// Interprets the final GET against the resource URL.
///
/// Unlike [classify_poll] the provisioning state is not consulted; the body
/// is the final resource representation regardless.
pub(crate) fn final_resource(attempt: &PollAttempt) -> Result<Option<Value>> {
    let parsed = parse_body(attempt)?;
    if !is_success(attempt.status()) {
        let detail = error_detail(parsed.as_ref(), attempt.status());
        return Err(failure(attempt, detail));
    }
    Ok(parsed)
}

/// Extracts the provisioning state from a parsed poll body.
///
/// Operation resources carry a top-level `status` string; resource bodies
/// carry `properties.provisioningState`. The former wins when both exist.
pub(crate) fn state_from_body(body: &Value) -> Option<ProvisioningState> {
    body.get("status")
        .and_then(Value::as_str)
        .or_else(|| {
            body.pointer("/properties/provisioningState")
                .and_then(Value::as_str)
        })
        .map(ProvisioningState::from)
}

fn parse_body(attempt: &PollAttempt) -> Result<Option<Value>> {
    let text = attempt.body().trim();
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text).map(Some).map_err(|e| {
        let diagnostic = if is_success(attempt.status()) {
            BodyError::Response {
                body: attempt.body().to_string(),
                source: e,
            }
        } else {
            BodyError::ErrorResponse {
                body: attempt.body().to_string(),
            }
        };
        failure(attempt, diagnostic.to_string())
    })
}

fn failure(attempt: &PollAttempt, detail: String) -> Error {
    Error::operation_with_response(
        format!("Long running operation failed with error: \"{detail}\"."),
        attempt.status(),
        attempt.headers().clone(),
        bytes::Bytes::from(attempt.body().to_string()),
    )
}

fn server_message(body: Option<&Value>) -> Option<String> {
    body?
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn error_detail(body: Option<&Value>, status: u16) -> String {
    server_message(body).unwrap_or_else(|| {
        format!("Invalid status code \"{status}\" received when polling for the operation status")
    })
}

fn failed_detail(body: Option<&Value>, state: &ProvisioningState) -> String {
    server_message(body).unwrap_or_else(|| format!("The operation status is \"{state}\""))
}
