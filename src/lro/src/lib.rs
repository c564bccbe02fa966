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

//! Polls Azure Resource Manager long running operations to completion.
//!
//! A PUT, PATCH, POST, or DELETE against a management endpoint may complete
//! asynchronously: the service accepts the request, reports where to observe
//! progress, and the client polls until the operation reaches a terminal
//! provisioning state. This crate takes the response of the initial request,
//! works out whether and where to poll, and drives the polling loop to a
//! final resource representation or a failure.
//!
//! # Example
//! ```no_run
//! # use azure_mgmt_lro::{InitialResult, OperationPoller, RequestOptions};
//! # tokio_test::block_on(async {
//! // The response to the initial PUT, as observed by the caller.
//! let mut headers = http::HeaderMap::new();
//! headers.insert(
//!     "azure-asyncoperation",
//!     http::HeaderValue::from_static("https://management.azure.com/operations/op1"),
//! );
//! let initial = InitialResult::new(
//!     http::Method::PUT,
//!     "https://management.azure.com/subscriptions/sub1/resourcegroups/g1/type1/resource1",
//!     201,
//! )
//! .set_headers(headers);
//!
//! let poller = OperationPoller::new();
//! let resource = poller
//!     .poll_operation(&initial, RequestOptions::default())
//!     .await?;
//! println!("resource = {:?}", resource.body());
//! # azure_mgmt_lro::Result::<()>::Ok(()) });
//! ```

pub use mgmt_core::Result;
pub use mgmt_core::error::Error;
pub use mgmt_core::options::RequestOptions;
pub use mgmt_core::response::{Parts, Response};

mod normalize;
mod poller;
pub mod prober;
pub mod state;
pub mod strategy;

pub use prober::{PollAttempt, StatusProber};
pub use state::ProvisioningState;
pub use strategy::PollingStrategy;

/// The terminal result of a long running operation.
///
/// On success the response carries the final parsed body (possibly
/// `serde_json::Value::Null` for operations with no payload) and the final
/// observed headers, merged over the initial response's headers.
pub type LroOutcome = Result<Response<serde_json::Value>>;

/// The response to the request that started the operation.
///
/// Immutable once constructed. The polling engine never re-issues the
/// initial request; everything it needs is captured here.
#[derive(Clone, Debug)]
pub struct InitialResult {
    method: http::Method,
    url: String,
    status: u16,
    headers: http::HeaderMap,
    body: Option<serde_json::Value>,
}

impl InitialResult {
    /// Creates the record of an initial response.
    ///
    /// `url` is the URL the initial request was sent to; PUT and PATCH
    /// operations may fall back to polling it directly.
    pub fn new<U: Into<String>>(method: http::Method, url: U, status: u16) -> Self {
        Self {
            method,
            url: url.into(),
            status,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Sets the initial response's headers.
    pub fn set_headers<V: Into<http::HeaderMap>>(mut self, v: V) -> Self {
        self.headers = v.into();
        self
    }

    /// Sets the initial response's parsed body.
    pub fn set_body<V: Into<serde_json::Value>>(mut self, v: V) -> Self {
        self.body = Some(v.into());
        self
    }

    /// The verb of the initial request.
    pub fn method(&self) -> &http::Method {
        &self.method
    }

    /// The URL of the initial request.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The status code of the initial response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The headers of the initial response.
    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    /// The parsed body of the initial response, if any.
    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }

    pub(crate) fn provisioning_state(&self) -> Option<ProvisioningState> {
        self.body.as_ref().and_then(normalize::state_from_body)
    }
}

/// Drives long running operations to completion.
///
/// The poller owns the HTTP client used for status probes; credentials and
/// transport-level retry policies belong to that client's configuration. A
/// poller is cheap to clone and can drive any number of independent
/// operations concurrently; each call runs its own sequential loop.
#[derive(Clone, Debug, Default)]
pub struct OperationPoller {
    prober: StatusProber,
}

impl OperationPoller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a poller sharing the connection pool of an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            prober: StatusProber::with_client(client),
        }
    }

    /// Polls the operation described by `initial` until it completes.
    ///
    /// Returns immediately, without any network traffic, when the initial
    /// response already carries the terminal result. Classification problems
    /// (an initial status code the operation's verb does not allow) are also
    /// reported before any poll request is made.
    pub async fn poll_operation(
        &self,
        initial: &InitialResult,
        options: RequestOptions,
    ) -> LroOutcome {
        let strategy = PollingStrategy::choose(initial)?;
        let cancel = options.cancellation_token().cloned().unwrap_or_default();
        let probe = async |url: String| {
            self.prober
                .get_status(&url, options.custom_headers())
                .await
        };
        let sleep = async |d| tokio::time::sleep(d).await;
        poller::poll_loop(initial, &strategy, &options, probe, sleep, cancel).await
    }

    /// Polls the operation, delivering the outcome to `done`.
    ///
    /// This is a thin adapter over [poll_operation][Self::poll_operation]:
    /// the same engine runs either way, and `done` is invoked exactly once
    /// with the terminal outcome.
    pub async fn poll_operation_with_callback<F>(
        &self,
        initial: &InitialResult,
        options: RequestOptions,
        done: F,
    ) where
        F: FnOnce(LroOutcome),
    {
        let result = self.poll_operation(initial, options).await;
        done(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RESOURCE_URL: &str =
        "https://management.azure.com/subscriptions/sub1/resourcegroups/g1/type1/resource1";

    #[test]
    fn initial_result_accessors() {
        let mut headers = http::HeaderMap::new();
        headers.insert("location", http::HeaderValue::from_static("https://x"));
        let initial = InitialResult::new(http::Method::PUT, RESOURCE_URL, 201)
            .set_headers(headers.clone())
            .set_body(json!({"properties": {"provisioningState": "Creating"}}));
        assert_eq!(initial.method(), &http::Method::PUT);
        assert_eq!(initial.url(), RESOURCE_URL);
        assert_eq!(initial.status(), 201);
        assert_eq!(initial.headers(), &headers);
        assert_eq!(
            initial.provisioning_state(),
            Some(ProvisioningState::Creating)
        );
    }

    #[tokio::test]
    async fn classification_errors_surface_before_any_poll() {
        // No server is running; an attempt to poll would fail with an I/O
        // error rather than the classification error asserted here.
        let initial = InitialResult::new(http::Method::POST, RESOURCE_URL, 201);
        let error = OperationPoller::new()
            .poll_operation(&initial, RequestOptions::default())
            .await
            .unwrap_err();
        assert!(error.is_unexpected_status(), "{error:?}");
    }

    #[tokio::test]
    async fn complete_on_arrival_requires_no_server() {
        let initial = InitialResult::new(http::Method::POST, RESOURCE_URL, 202)
            .set_body(json!({"status": "Succeeded"}));
        let response = OperationPoller::new()
            .poll_operation(&initial, RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(response.body(), &json!({"status": "Succeeded"}));
    }

    #[tokio::test]
    async fn callback_is_invoked_exactly_once() {
        let initial = InitialResult::new(http::Method::POST, RESOURCE_URL, 202)
            .set_body(json!({"status": "Succeeded"}));
        let count = std::cell::Cell::new(0);
        OperationPoller::new()
            .poll_operation_with_callback(&initial, RequestOptions::default(), |outcome| {
                count.set(count.get() + 1);
                assert!(outcome.is_ok(), "{outcome:?}");
            })
            .await;
        assert_eq!(count.get(), 1);
    }

    #[tokio::test]
    async fn callback_delivers_errors() {
        let initial = InitialResult::new(http::Method::POST, RESOURCE_URL, 201);
        let count = std::cell::Cell::new(0);
        OperationPoller::new()
            .poll_operation_with_callback(&initial, RequestOptions::default(), |outcome| {
                count.set(count.get() + 1);
                assert!(outcome.is_err(), "{outcome:?}");
            })
            .await;
        assert_eq!(count.get(), 1);
    }
}
