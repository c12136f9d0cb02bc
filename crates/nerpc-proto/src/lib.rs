//! # nerpc-proto
//!
//! Protocol model for JSON-RPC 2.0 network-element management: the
//! closed enum vocabularies, the command and parameter wire shapes, the
//! request assembly engine with its cross-field rule matrix, and the
//! response envelope.
//!
//! Every semantic rule of the service is enforced when a [`Request`] or
//! [`CliRequest`] is assembled, so an ill-formed combination never
//! reaches the wire.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod params;
pub mod request;
pub mod response;
pub mod types;

pub use command::Command;
pub use error::{MessageError, MessageErrorKind, MessageResult};
pub use params::{CliParams, Params};
pub use request::{CliRequest, Request, RequestBuilder, JSONRPC_VERSION};
pub use response::{Response, RpcError};
pub use types::{Action, Datastore, Method, OutputFormat, PathValue, YangModels};
