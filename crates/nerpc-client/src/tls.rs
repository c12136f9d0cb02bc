//! TLS material loading.
//!
//! The management interface is HTTPS-only. Unless verification is
//! explicitly skipped, a client presents a certificate/key pair and
//! pins the server against a CA bundle, all PEM-encoded files.

use std::fs;
use std::path::{Path, PathBuf};

use reqwest::{Certificate, Identity};

use crate::error::{ClientError, ClientErrorKind, ClientResult};

/// TLS attributes of a client: CA bundle, client pair, verify toggle.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    ca_file: Option<PathBuf>,
    cert_file: Option<PathBuf>,
    key_file: Option<PathBuf>,
    skip_verify: bool,
}

impl TlsOptions {
    /// Start with no material and verification enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path to the PEM-encoded CA bundle.
    #[must_use]
    pub fn with_ca_file(mut self, path: impl AsRef<Path>) -> Self {
        self.ca_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Paths to the PEM-encoded client certificate and private key.
    #[must_use]
    pub fn with_cert_pair(
        mut self,
        cert: impl AsRef<Path>,
        key: impl AsRef<Path>,
    ) -> Self {
        self.cert_file = Some(cert.as_ref().to_path_buf());
        self.key_file = Some(key.as_ref().to_path_buf());
        self
    }

    /// Disable server certificate verification.
    #[must_use]
    pub fn with_skip_verify(mut self, skip: bool) -> Self {
        self.skip_verify = skip;
        self
    }

    /// Whether verification is disabled.
    #[must_use]
    pub fn skips_verify(&self) -> bool {
        self.skip_verify
    }

    /// Apply the material to an HTTP client builder.
    ///
    /// With verification on, all three files are required: the CA must
    /// parse as PEM, the leaf certificate must parse, and the pair must
    /// load as a client identity. With verification off, no files are
    /// read and the pool accepts any server certificate.
    pub(crate) fn apply(
        &self,
        builder: reqwest::ClientBuilder,
    ) -> ClientResult<reqwest::ClientBuilder> {
        const FUNCTION: &str = "TlsOptions::apply";
        if self.skip_verify {
            return Ok(builder.danger_accept_invalid_certs(true));
        }
        let (Some(ca_file), Some(cert_file), Some(key_file)) =
            (&self.ca_file, &self.cert_file, &self.key_file)
        else {
            return Err(ClientError::new(
                FUNCTION,
                ClientErrorKind::TlsFilesUnspecified,
            ));
        };

        let ca_pem = fs::read(ca_file).map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::TlsOpenCa).with_source(e)
        })?;
        let ca = Certificate::from_pem(&ca_pem).map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::TlsLoadCaPem).with_source(e)
        })?;

        let cert_pem = fs::read(cert_file).map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::TlsCertParse).with_source(e)
        })?;
        // Parse the leaf on its own before pairing it with the key.
        Certificate::from_pem(&cert_pem).map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::TlsCertParse).with_source(e)
        })?;
        let key_pem = fs::read(key_file).map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::TlsLoadCertPair).with_source(e)
        })?;
        let identity = Identity::from_pkcs8_pem(&cert_pem, &key_pem).map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::TlsLoadCertPair).with_source(e)
        })?;

        Ok(builder.add_root_certificate(ca).identity(identity))
    }
}
