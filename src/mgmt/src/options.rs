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

//! Per-operation request options.
//!
//! The defaults are intended to work for most applications. Overrides are
//! most useful in tests, where a zero retry timeout makes polling loops
//! deterministic, and in interactive applications that want to cancel a
//! pending operation.

use tokio_util::sync::CancellationToken;

/// A set of options configuring a single long running operation.
///
/// # Example
/// ```
/// # use azure_mgmt_core::options::RequestOptions;
/// use std::time::Duration;
/// let mut headers = http::HeaderMap::new();
/// headers.insert("x-ms-client-request-id", http::HeaderValue::from_static("00000000-0000-0000-0000-000000000000"));
/// let options = RequestOptions::default()
///     .with_custom_headers(headers)
///     .with_retry_timeout(Duration::from_secs(5));
/// assert_eq!(options.retry_timeout(), Some(Duration::from_secs(5)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    custom_headers: http::HeaderMap,
    retry_timeout: Option<std::time::Duration>,
    cancellation_token: Option<CancellationToken>,
}

impl RequestOptions {
    /// Sets headers merged into every poll request.
    ///
    /// Servers typically reflect unknown `x-ms-*` headers back; reflected
    /// headers are visible on the final response.
    pub fn set_custom_headers<V: Into<http::HeaderMap>>(&mut self, v: V) {
        self.custom_headers = v.into();
    }

    /// Sets headers merged into every poll request.
    pub fn with_custom_headers<V: Into<http::HeaderMap>>(mut self, v: V) -> Self {
        self.set_custom_headers(v);
        self
    }

    /// Gets the headers merged into every poll request.
    pub fn custom_headers(&self) -> &http::HeaderMap {
        &self.custom_headers
    }

    /// Overrides the delay between polls.
    ///
    /// Zero is permitted, and useful for deterministic tests. When unset, the
    /// delay comes from the service's `retry-after` header, or a 30 second
    /// default.
    pub fn set_retry_timeout<V: Into<std::time::Duration>>(&mut self, v: V) {
        self.retry_timeout = Some(v.into());
    }

    /// Overrides the delay between polls.
    pub fn with_retry_timeout<V: Into<std::time::Duration>>(mut self, v: V) -> Self {
        self.set_retry_timeout(v);
        self
    }

    /// Gets the configured delay between polls, if any.
    pub fn retry_timeout(&self) -> Option<std::time::Duration> {
        self.retry_timeout
    }

    /// Sets a token that cancels the polling loop.
    ///
    /// Cancelling abandons the pending delay or in-flight poll request. The
    /// service-side operation is not affected.
    pub fn set_cancellation_token(&mut self, v: CancellationToken) {
        self.cancellation_token = Some(v);
    }

    /// Sets a token that cancels the polling loop.
    pub fn with_cancellation_token(mut self, v: CancellationToken) -> Self {
        self.set_cancellation_token(v);
        self
    }

    /// Gets the cancellation token, if any.
    pub fn cancellation_token(&self) -> Option<&CancellationToken> {
        self.cancellation_token.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn defaults() {
        let options = RequestOptions::default();
        assert!(options.custom_headers().is_empty());
        assert_eq!(options.retry_timeout(), None);
        assert!(options.cancellation_token().is_none());
    }

    #[test]
    fn custom_headers() {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            "testcustomfield",
            http::HeaderValue::from_static("CustomField123"),
        );
        let options = RequestOptions::default().with_custom_headers(headers.clone());
        assert_eq!(options.custom_headers(), &headers);
    }

    #[test]
    fn retry_timeout() {
        let mut options = RequestOptions::default();
        options.set_retry_timeout(Duration::ZERO);
        assert_eq!(options.retry_timeout(), Some(Duration::ZERO));
    }

    #[test]
    fn cancellation_token() {
        let token = CancellationToken::new();
        let options = RequestOptions::default().with_cancellation_token(token.clone());
        token.cancel();
        assert!(options.cancellation_token().unwrap().is_cancelled());
    }
}
