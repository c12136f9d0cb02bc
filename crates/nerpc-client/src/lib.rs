//! # nerpc-client
//!
//! HTTPS transport for the management protocol modelled in
//! `nerpc-proto`: client construction with TLS material and Basic
//! auth, a construction-time target probe, single round-trip `call`
//! semantics, and a convenience façade for the common operations.
//!
//! ```no_run
//! use nerpc_client::{Client, ClientResult};
//! use nerpc_proto::PathValue;
//!
//! # async fn example() -> ClientResult<()> {
//! let client = Client::builder("198.51.100.7")
//!     .with_credentials("admin", "admin")
//!     .build()
//!     .await?;
//! println!("target {} runs {}", client.hostname(), client.version());
//! client
//!     .update(&[PathValue::new("/system/name/host-name", "leaf1")])
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod tls;

pub use client::{
    Client, ClientBuilder, DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_TIMEOUT, DEFAULT_USERNAME,
};
pub use error::{ClientError, ClientErrorKind, ClientResult};
pub use tls::TlsOptions;
