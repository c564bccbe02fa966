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

//! The error type used across the client runtime.

use http::HeaderMap;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// The core error returned by the client runtime.
///
/// Errors come from multiple sources: the initial response may not describe a
/// long running operation at all, the transport may fail while polling, the
/// service may report a terminal failure, or the caller may cancel the
/// operation. Most applications just return or log the error. Applications
/// that need to interrogate the details can use the predicates to determine
/// the error kind, and the accessors to recover the last response observed by
/// the polling loop.
///
/// # Example
/// ```
/// use azure_mgmt_core::error::Error;
/// match example_function() {
///     Err(e) if e.is_operation_failure() => {
///         println!("the service failed the operation: {e}");
///     }
///     Err(e) => { println!("some other error {e}"); }
///     Ok(_) => { println!("success"); }
/// }
///
/// fn example_function() -> Result<String, Error> {
///     // ... details omitted ...
///     # Err(Error::operation("Long running operation failed with error: \"boom\"."))
/// }
/// ```
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl Error {
    /// Creates an error for an initial status code that cannot start a long
    /// running operation with the given method.
    ///
    /// # Example
    /// ```
    /// use azure_mgmt_core::error::Error;
    /// let error = Error::unexpected_status(409, http::Method::PUT);
    /// assert!(error.is_unexpected_status());
    /// ```
    pub fn unexpected_status(status: u16, method: http::Method) -> Self {
        let details = UnexpectedStatusDetails { status, method };
        Self {
            kind: ErrorKind::UnexpectedStatus(Box::new(details)),
            source: None,
        }
    }

    /// The initial response's status code is not one a long running operation
    /// may return for its verb. This error is always produced before any poll
    /// request is made, and retrying will not help.
    pub fn is_unexpected_status(&self) -> bool {
        matches!(self.kind, ErrorKind::UnexpectedStatus(_))
    }

    /// Creates an error for an operation that reached a terminal failure.
    ///
    /// The message is reported verbatim; the polling loop formats it with the
    /// `Long running operation failed with error:` prefix before it gets here.
    pub fn operation<T: Into<String>>(message: T) -> Self {
        let details = OperationDetails {
            message: message.into(),
            status_code: None,
            headers: None,
            payload: None,
        };
        Self {
            kind: ErrorKind::Operation(Box::new(details)),
            source: None,
        }
    }

    /// Creates an operation failure that retains the response which produced
    /// it, so callers can inspect the status code, headers, and raw payload.
    pub fn operation_with_response<T: Into<String>>(
        message: T,
        status_code: u16,
        headers: HeaderMap,
        payload: bytes::Bytes,
    ) -> Self {
        let details = OperationDetails {
            message: message.into(),
            status_code: Some(status_code),
            headers: Some(headers),
            payload: Some(payload),
        };
        Self {
            kind: ErrorKind::Operation(Box::new(details)),
            source: None,
        }
    }

    /// The service reported the operation as failed, or a poll response could
    /// not be interpreted and was converted to a failed outcome.
    pub fn is_operation_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::Operation(_))
    }

    /// Creates an error representing a transport problem.
    ///
    /// Examples include connection failures, DNS resolution failures, and
    /// broken connections. These are reported by the transport while polling
    /// and are propagated unchanged.
    ///
    /// # Example
    /// ```
    /// use std::error::Error as _;
    /// use azure_mgmt_core::error::Error;
    /// let error = Error::io("simulated failure");
    /// assert!(error.is_io());
    /// assert!(error.source().is_some());
    /// ```
    pub fn io<T: Into<BoxError>>(source: T) -> Self {
        Self {
            kind: ErrorKind::Io,
            source: Some(source.into()),
        }
    }

    /// A problem in the transport layer.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io)
    }

    /// Creates an error representing a cancelled operation.
    pub fn cancelled() -> Self {
        Self {
            kind: ErrorKind::Cancelled,
            source: None,
        }
    }

    /// The caller cancelled the polling loop before the operation reached a
    /// terminal state. The service-side operation may still be running.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ErrorKind::Cancelled)
    }

    /// The HTTP status code, if any, of the response associated with this
    /// error.
    pub fn http_status_code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Operation(d) => d.status_code,
            _ => None,
        }
    }

    /// The headers, if any, of the response associated with this error.
    pub fn http_headers(&self) -> Option<&HeaderMap> {
        match &self.kind {
            ErrorKind::Operation(d) => d.headers.as_ref(),
            _ => None,
        }
    }

    /// The raw payload, if any, of the response associated with this error.
    pub fn http_payload(&self) -> Option<&bytes::Bytes> {
        match &self.kind {
            ErrorKind::Operation(d) => d.payload.as_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.kind, &self.source) {
            (ErrorKind::UnexpectedStatus(d), _) => {
                write!(
                    f,
                    "Unexpected polling status code from long running operation \"{}\" for method \"{}\".",
                    d.status, d.method
                )
            }
            (ErrorKind::Operation(d), _) => {
                write!(f, "{}", d.message)
            }
            (ErrorKind::Io, Some(e)) => {
                write!(f, "the transport reports an error: {e}")
            }
            (ErrorKind::Cancelled, _) => {
                write!(f, "the long running operation was cancelled")
            }
            (_, None) => unreachable!("no constructor allows this"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error))
    }
}

/// The type of error held by an [Error] instance.
#[derive(Debug)]
enum ErrorKind {
    UnexpectedStatus(Box<UnexpectedStatusDetails>),
    Operation(Box<OperationDetails>),
    Io,
    Cancelled,
}

#[derive(Debug)]
struct UnexpectedStatusDetails {
    status: u16,
    method: http::Method,
}

#[derive(Debug)]
struct OperationDetails {
    message: String,
    status_code: Option<u16>,
    headers: Option<HeaderMap>,
    payload: Option<bytes::Bytes>,
}
