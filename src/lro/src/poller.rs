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

//! The polling loop.
//!
//! The loop runs an operation from its initial response to a terminal
//! outcome: it completes on arrival when the strategy requires no polling,
//! and otherwise alternates waiting and probing until the normalizer reports
//! a terminal state, a failure, or the caller cancels. Probing and sleeping
//! are injected as async closures so the loop is testable without a network
//! or a clock.

use crate::InitialResult;
use crate::normalize::{PollVerdict, classify_poll, final_resource};
use crate::prober::PollAttempt;
use crate::strategy::PollingStrategy;
use http::Method;
use mgmt_core::Result;
use mgmt_core::error::Error;
use mgmt_core::options::RequestOptions;
use mgmt_core::response::{Parts, Response};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// The delay between polls when neither the caller nor the service asks for
/// a specific one.
pub(crate) const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_secs(30);

/// The floor applied to service-provided `retry-after` values.
const MIN_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Runs the polling loop for one operation.
///
/// Exactly one poll is in flight at any time; poll N is only classified
/// after poll N-1 completed. The cancellation token covers both suspension
/// points, the inter-poll delay and the in-flight probe.
pub(crate) async fn poll_loop<P, S>(
    initial: &InitialResult,
    strategy: &PollingStrategy,
    options: &RequestOptions,
    mut probe: P,
    sleep: S,
    cancel: CancellationToken,
) -> Result<Response<Value>>
where
    P: AsyncFnMut(String) -> Result<PollAttempt>,
    S: AsyncFn(Duration),
{
    let Some(url) = strategy.url() else {
        // Complete on arrival: the initial body is the final result, and no
        // poll request is made.
        let parts = Parts::new().set_headers(initial.headers().clone());
        let body = initial.body().cloned().unwrap_or(Value::Null);
        return Ok(Response::from_parts(parts, body));
    };

    let mut wait = strategy.delay_before_first_poll();
    let mut retry_after = None;
    let mut attempt_count: u32 = 0;
    loop {
        if wait {
            let delay = next_delay(options, retry_after);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::cancelled()),
                _ = sleep(delay) => {}
            }
        }
        wait = true;
        attempt_count += 1;
        tracing::debug!(url, attempt_count, "polling long running operation");
        let attempt = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::cancelled()),
            r = probe(url.to_string()) => r?,
        };
        retry_after = attempt.retry_after();
        match classify_poll(&attempt) {
            PollVerdict::InProgress => continue,
            PollVerdict::Failed(e) => {
                tracing::warn!(url, attempt_count, "long running operation failed: {e}");
                return Err(e);
            }
            PollVerdict::Succeeded { body } => {
                return finish(initial, strategy, body, attempt, &mut probe, &cancel).await;
            }
        }
    }
}

/// Builds the final response once polling reports success.
///
/// PUT and PATCH operations that polled an operation resource (or whose last
/// poll carried no body) fetch the resource itself once more, so the caller
/// receives the resource representation rather than the operation status.
async fn finish<P>(
    initial: &InitialResult,
    strategy: &PollingStrategy,
    body: Option<Value>,
    last: PollAttempt,
    probe: &mut P,
    cancel: &CancellationToken,
) -> Result<Response<Value>>
where
    P: AsyncFnMut(String) -> Result<PollAttempt>,
{
    let mut headers = merged_headers(initial.headers(), last.headers());
    let mut body = body;
    if needs_resource_fetch(initial, strategy, &body) {
        let attempt = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::cancelled()),
            r = probe(initial.url().to_string()) => r?,
        };
        headers = merged_headers(&headers, attempt.headers());
        if let Some(resource) = final_resource(&attempt)? {
            body = Some(resource);
        }
    }
    let parts = Parts::new().set_headers(headers);
    Ok(Response::from_parts(parts, body.unwrap_or(Value::Null)))
}

fn needs_resource_fetch(
    initial: &InitialResult,
    strategy: &PollingStrategy,
    body: &Option<Value>,
) -> bool {
    matches!(*initial.method(), Method::PUT | Method::PATCH)
        && (matches!(strategy, PollingStrategy::AzureAsyncOperation { .. }) || body.is_none())
}

/// The final response's headers are the last poll's merged over the initial
/// response's, so headers reflected by the server during polling stay
/// visible.
fn merged_headers(base: &http::HeaderMap, over: &http::HeaderMap) -> http::HeaderMap {
    let mut merged = base.clone();
    for (name, value) in over.iter() {
        merged.insert(name, value.clone());
    }
    merged
}

fn next_delay(options: &RequestOptions, retry_after: Option<Duration>) -> Duration {
    if let Some(delay) = options.retry_timeout() {
        return delay;
    }
    retry_after
        .map(|d| d.max(MIN_RETRY_AFTER))
        .unwrap_or(DEFAULT_RETRY_TIMEOUT)
}
