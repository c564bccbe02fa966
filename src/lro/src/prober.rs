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

//! Issues individual status probes against a polling URL.

use mgmt_core::Result;
use mgmt_core::error::Error;

/// One observation of a polling URL.
///
/// Produced and consumed within a single loop iteration. The body is kept as
/// text: interpreting it is the normalizer's job, and malformed payloads must
/// not fail here.
#[derive(Clone, Debug)]
pub struct PollAttempt {
    pub(crate) url: String,
    pub(crate) status: u16,
    pub(crate) headers: http::HeaderMap,
    pub(crate) body: String,
}

impl PollAttempt {
    pub fn new<U: Into<String>, B: Into<String>>(
        url: U,
        status: u16,
        headers: http::HeaderMap,
        body: B,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            headers,
            body: body.into(),
        }
    }

    /// The URL this attempt probed.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The HTTP status code of the poll response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The headers of the poll response.
    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    /// The raw body of the poll response.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The delay requested by the service via `retry-after`, if any.
    pub(crate) fn retry_after(&self) -> Option<std::time::Duration> {
        self.headers
            .get(http::header::RETRY_AFTER)?
            .to_str()
            .ok()?
            .trim()
            .parse::<u64>()
            .ok()
            .map(std::time::Duration::from_secs)
    }
}

/// Issues a single GET against a polling URL.
///
/// The prober does not retry: transient transport failures are surfaced to
/// the polling loop unchanged, and retry policies belong to the transport
/// configured on the underlying [reqwest::Client]. Credentials are expected
/// to be injected by that client as well.
#[derive(Clone, Debug, Default)]
pub struct StatusProber {
    inner: reqwest::Client,
}

impl StatusProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a prober sharing the connection pool of an existing client.
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Performs one GET against `url` with `headers` merged in.
    pub async fn get_status(&self, url: &str, headers: &http::HeaderMap) -> Result<PollAttempt> {
        let mut builder = self.inner.get(url);
        for (key, value) in headers.iter() {
            builder = builder.header(key, value);
        }
        let response = builder.send().await.map_err(Error::io)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(Error::io)?;
        Ok(PollAttempt {
            url: url.to_string(),
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn attempt_with_headers(headers: http::HeaderMap) -> PollAttempt {
        PollAttempt::new("https://management.azure.com/op/1", 200, headers, "{}")
    }

    #[test]
    fn accessors() {
        let attempt = attempt_with_headers(http::HeaderMap::new());
        assert_eq!(attempt.url(), "https://management.azure.com/op/1");
        assert_eq!(attempt.status(), 200);
        assert_eq!(attempt.body(), "{}");
        assert!(attempt.headers().is_empty());
    }

    #[test]
    fn retry_after() {
        let mut headers = http::HeaderMap::new();
        headers.insert(http::header::RETRY_AFTER, HeaderValue::from_static("17"));
        let attempt = attempt_with_headers(headers);
        assert_eq!(
            attempt.retry_after(),
            Some(std::time::Duration::from_secs(17))
        );
    }

    #[test]
    fn retry_after_missing_or_malformed() {
        let attempt = attempt_with_headers(http::HeaderMap::new());
        assert_eq!(attempt.retry_after(), None);

        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"),
        );
        let attempt = attempt_with_headers(headers);
        assert_eq!(attempt.retry_after(), None);
    }

    #[tokio::test]
    async fn get_status_propagates_transport_errors() {
        // Port 1 is reserved and nothing listens on it.
        let prober = StatusProber::new();
        let err = prober
            .get_status("http://127.0.0.1:1/op/1", &http::HeaderMap::new())
            .await
            .unwrap_err();
        assert!(err.is_io(), "{err:?}");
    }
}
