//! Transport-side error types.
//!
//! Same structure as the assembly family in `nerpc-proto`: a kind code,
//! the raising function, an optional wrapped cause, and equality on
//! function + kind (+ cause text when both sides carry causes).

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use nerpc_proto::RpcError;

/// The kind of transport or construction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// No target host was supplied.
    NoHost,
    /// The target port was zero.
    NoPort,
    /// No username was supplied.
    NoUsername,
    /// No password was supplied.
    NoPassword,
    /// The construction-time probe of the target failed.
    TargetVerification,
    /// Certificate verification is on but TLS file paths are missing.
    TlsFilesUnspecified,
    /// The CA bundle file could not be opened.
    TlsOpenCa,
    /// The CA bundle did not parse as PEM.
    TlsLoadCaPem,
    /// The client certificate did not parse.
    TlsCertParse,
    /// The client certificate/key pair could not be loaded.
    TlsLoadCertPair,
    /// The request could not be marshalled to wire JSON.
    Marshal,
    /// The HTTP transport or target URL could not be constructed.
    HttpRequestCreation,
    /// Sending the request failed, including timeouts.
    HttpSend,
    /// The server answered with a non-200 HTTP status.
    HttpStatus {
        /// The status code received.
        status: u16,
    },
    /// The response body did not decode as a JSON-RPC envelope.
    JsonUnmarshal,
    /// The response echoed a different correlation id.
    IdMismatch {
        /// Id the request carried.
        expected: u64,
        /// Id the response carried.
        got: u64,
    },
    /// The envelope carried a JSON-RPC error.
    JsonRpc {
        /// The server's error record.
        error: RpcError,
    },
    /// Assembling the underlying request failed.
    RequestCreation,
    /// The operation needs a concrete action, not `Action::None`.
    ActionNone,
}

impl fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHost => write!(f, "target host is not specified"),
            Self::NoPort => write!(f, "target port is not specified"),
            Self::NoUsername => write!(f, "username is not specified"),
            Self::NoPassword => write!(f, "password is not specified"),
            Self::TargetVerification => write!(f, "target verification failed"),
            Self::TlsFilesUnspecified => {
                write!(f, "CA bundle, certificate and key files are required unless verification is skipped")
            }
            Self::TlsOpenCa => write!(f, "CA bundle file could not be opened"),
            Self::TlsLoadCaPem => write!(f, "CA bundle is not valid PEM"),
            Self::TlsCertParse => write!(f, "client certificate could not be parsed"),
            Self::TlsLoadCertPair => write!(f, "client certificate/key pair could not be loaded"),
            Self::Marshal => write!(f, "request could not be marshalled"),
            Self::HttpRequestCreation => write!(f, "http transport could not be constructed"),
            Self::HttpSend => write!(f, "http request could not be sent"),
            Self::HttpStatus { status } => write!(f, "unexpected http status {status}"),
            Self::JsonUnmarshal => write!(f, "response body is not a JSON-RPC envelope"),
            Self::IdMismatch { expected, got } => {
                write!(f, "response id {got} does not match request id {expected}")
            }
            Self::JsonRpc { error } => write!(f, "server returned {error}"),
            Self::RequestCreation => write!(f, "request assembly failed"),
            Self::ActionNone => write!(f, "a concrete action is required"),
        }
    }
}

/// Error raised by the transport client.
#[derive(Debug, Error)]
#[error("{function}: {kind}")]
pub struct ClientError {
    function: &'static str,
    kind: ClientErrorKind,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ClientError {
    /// Create a new error from the raising function and the kind.
    #[must_use]
    pub fn new(function: &'static str, kind: ClientErrorKind) -> Self {
        Self {
            function,
            kind,
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The kind of failure.
    #[must_use]
    pub fn kind(&self) -> &ClientErrorKind {
        &self.kind
    }

    /// The function that raised the error.
    #[must_use]
    pub fn function(&self) -> &'static str {
        self.function
    }
}

impl PartialEq for ClientError {
    fn eq(&self, other: &Self) -> bool {
        if self.function != other.function || self.kind != other.kind {
            return false;
        }
        match (&self.source, &other.source) {
            (Some(a), Some(b)) => a.to_string() == b.to_string(),
            _ => true,
        }
    }
}

/// Result alias for transport operations.
pub type ClientResult<T> = Result<T, ClientError>;
