//! HTTPS client: construction, target probe, round trips, façade.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use nerpc_proto::{
    Action, CliRequest, Command, Datastore, Method, OutputFormat, PathValue, Request,
    RequestBuilder, Response, YangModels,
};

use crate::error::{ClientError, ClientErrorKind, ClientResult};
use crate::tls::TlsOptions;

/// Default management port.
pub const DEFAULT_PORT: u16 = 443;
/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);
/// Default Basic-auth username.
pub const DEFAULT_USERNAME: &str = "admin";
/// Default Basic-auth password.
pub const DEFAULT_PASSWORD: &str = "admin";

const POOL_MAX_IDLE: usize = 32;
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const HOSTNAME_PATH: &str = "/system/name/host-name";
const VERSION_PATH: &str = "/system/information/version";

/// Builder for [`Client`].
///
/// Host is mandatory; everything else falls back to the defaults above.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    host: String,
    port: u16,
    timeout: Duration,
    username: String,
    password: String,
    tls: Option<TlsOptions>,
}

impl ClientBuilder {
    fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            tls: None,
        }
    }

    /// Override the default port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the default per-request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the Basic-auth identity.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Supply TLS material.
    #[must_use]
    pub fn with_tls(mut self, tls: TlsOptions) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Validate the options, build the HTTPS pool and probe the target.
    ///
    /// The probe reads hostname and software version from the RUNNING
    /// datastore; a target that cannot answer it fails construction.
    pub async fn build(self) -> ClientResult<Client> {
        const FUNCTION: &str = "ClientBuilder::build";
        let fail = |kind| Err(ClientError::new(FUNCTION, kind));

        if self.host.is_empty() {
            return fail(ClientErrorKind::NoHost);
        }
        if self.port == 0 {
            return fail(ClientErrorKind::NoPort);
        }
        if self.username.is_empty() {
            return fail(ClientErrorKind::NoUsername);
        }
        if self.password.is_empty() {
            return fail(ClientErrorKind::NoPassword);
        }

        let url = Url::parse(&format!("https://{}:{}/jsonrpc", self.host, self.port))
            .map_err(|e| {
                ClientError::new(FUNCTION, ClientErrorKind::HttpRequestCreation).with_source(e)
            })?;

        let mut builder = reqwest::Client::builder()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .pool_max_idle_per_host(POOL_MAX_IDLE)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(self.timeout);
        if let Some(tls) = &self.tls {
            builder = tls.apply(builder)?;
        }
        let http = builder.build().map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::HttpRequestCreation).with_source(e)
        })?;

        let mut client = Client {
            url,
            username: self.username,
            password: self.password,
            http,
            hostname: String::new(),
            version: String::new(),
        };
        client.probe().await?;
        Ok(client)
    }
}

/// A verified client for one management target.
///
/// Cheap to clone; clones share the HTTPS pool. All calls are
/// synchronous per invocation: one request, one response or error.
#[derive(Debug, Clone)]
pub struct Client {
    url: Url,
    username: String,
    password: String,
    http: reqwest::Client,
    hostname: String,
    version: String,
}

impl Client {
    /// Start building a client for the given host.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(host)
    }

    /// The endpoint requests are posted to.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Hostname reported by the target at construction.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Software version reported by the target at construction.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    async fn probe(&mut self) -> ClientResult<()> {
        const FUNCTION: &str = "Client::probe";
        let request = RequestBuilder::new(
            Method::Get,
            vec![
                Command::new(Action::None, HOSTNAME_PATH, ""),
                Command::new(Action::None, VERSION_PATH, ""),
            ],
        )
        .with_datastore(Datastore::Running)
        .build()
        .map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::RequestCreation).with_source(e)
        })?;
        let result = self.call(&request).await.map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::TargetVerification).with_source(e)
        })?;
        self.hostname = result_entry(&result, 0);
        self.version = result_entry(&result, 1);
        debug!(hostname = %self.hostname, version = %self.version, "target verified");
        Ok(())
    }

    /// Post a validated request and return the opaque result payload.
    pub async fn call(&self, request: &Request) -> ClientResult<Value> {
        const FUNCTION: &str = "Client::call";
        let body = request.to_json().map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::Marshal).with_source(e)
        })?;
        self.dispatch(FUNCTION, body, request.id()).await
    }

    /// Post a validated CLI request and return the opaque result payload.
    pub async fn call_cli(&self, request: &CliRequest) -> ClientResult<Value> {
        const FUNCTION: &str = "Client::call_cli";
        let body = request.to_json().map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::Marshal).with_source(e)
        })?;
        self.dispatch(FUNCTION, body, request.id()).await
    }

    async fn dispatch(
        &self,
        function: &'static str,
        body: String,
        id: u64,
    ) -> ClientResult<Value> {
        debug!(id, url = %self.url, "sending request");
        let response = self
            .http
            .post(self.url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                ClientError::new(function, ClientErrorKind::HttpSend).with_source(e)
            })?;
        let status = response.status();
        if status != StatusCode::OK {
            warn!(id, %status, "request rejected by target");
            return Err(ClientError::new(
                function,
                ClientErrorKind::HttpStatus {
                    status: status.as_u16(),
                },
            ));
        }
        let bytes = response.bytes().await.map_err(|e| {
            ClientError::new(function, ClientErrorKind::HttpSend).with_source(e)
        })?;
        let result = decode_response(function, &bytes, id)?;
        debug!(id, "request completed");
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Convenience façade
    // ------------------------------------------------------------------

    /// Read paths from the running configuration.
    pub async fn get(&self, paths: &[&str]) -> ClientResult<Value> {
        self.read("Client::get", Datastore::Running, paths).await
    }

    /// Read paths from operational state.
    pub async fn state(&self, paths: &[&str]) -> ClientResult<Value> {
        self.read("Client::state", Datastore::State, paths).await
    }

    /// Merge path/value pairs into the candidate configuration.
    pub async fn update(&self, pvs: &[PathValue]) -> ClientResult<Value> {
        self.mutate("Client::update", Method::Set, Action::Update, Datastore::Candidate, None, pvs)
            .await
    }

    /// Replace subtrees of the candidate configuration.
    pub async fn replace(&self, pvs: &[PathValue]) -> ClientResult<Value> {
        self.mutate("Client::replace", Method::Set, Action::Replace, Datastore::Candidate, None, pvs)
            .await
    }

    /// Delete paths from the candidate configuration.
    pub async fn delete(&self, paths: &[&str]) -> ClientResult<Value> {
        let pvs: Vec<PathValue> = paths.iter().map(|p| PathValue::new(*p, "")).collect();
        self.mutate("Client::delete", Method::Set, Action::Delete, Datastore::Candidate, None, &pvs)
            .await
    }

    /// Validate path/value pairs against the candidate without applying.
    pub async fn validate(&self, action: Action, pvs: &[PathValue]) -> ClientResult<Value> {
        const FUNCTION: &str = "Client::validate";
        if action == Action::None {
            return Err(ClientError::new(FUNCTION, ClientErrorKind::ActionNone));
        }
        self.mutate(FUNCTION, Method::Validate, action, Datastore::Candidate, None, pvs)
            .await
    }

    /// Run operational tools commands.
    pub async fn tools(&self, pvs: &[PathValue]) -> ClientResult<Value> {
        self.mutate("Client::tools", Method::Set, Action::Update, Datastore::Tools, None, pvs)
            .await
    }

    /// Diff path/value pairs against the candidate configuration.
    pub async fn diff_candidate(
        &self,
        action: Action,
        yang_models: YangModels,
        pvs: &[PathValue],
    ) -> ClientResult<Value> {
        const FUNCTION: &str = "Client::diff_candidate";
        if action == Action::None {
            return Err(ClientError::new(FUNCTION, ClientErrorKind::ActionNone));
        }
        self.mutate(
            FUNCTION,
            Method::Diff,
            action,
            Datastore::Candidate,
            Some(yang_models),
            pvs,
        )
        .await
    }

    /// Apply per-action buckets to the candidate in one SET request.
    pub async fn bulk_set_candidate(
        &self,
        deletes: &[PathValue],
        replaces: &[PathValue],
        updates: &[PathValue],
        yang_models: Option<YangModels>,
    ) -> ClientResult<Value> {
        const FUNCTION: &str = "Client::bulk_set_candidate";
        let request = Request::bulk_set(
            deletes,
            replaces,
            updates,
            yang_models,
            None,
            Datastore::Candidate,
        )
        .map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::RequestCreation).with_source(e)
        })?;
        self.call(&request).await
    }

    /// Diff per-action buckets against the candidate in one request.
    pub async fn bulk_diff_candidate(
        &self,
        deletes: &[PathValue],
        replaces: &[PathValue],
        updates: &[PathValue],
        yang_models: YangModels,
    ) -> ClientResult<Value> {
        const FUNCTION: &str = "Client::bulk_diff_candidate";
        let request = Request::bulk_diff(
            deletes,
            replaces,
            updates,
            Some(yang_models),
            None,
            Datastore::Candidate,
        )
        .map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::RequestCreation).with_source(e)
        })?;
        self.call(&request).await
    }

    /// Run CLI command lines.
    pub async fn cli(
        &self,
        commands: &[&str],
        output_format: Option<OutputFormat>,
    ) -> ClientResult<Value> {
        const FUNCTION: &str = "Client::cli";
        let request = CliRequest::new(commands, output_format).map_err(|e| {
            ClientError::new(FUNCTION, ClientErrorKind::RequestCreation).with_source(e)
        })?;
        self.call_cli(&request).await
    }

    async fn read(
        &self,
        function: &'static str,
        datastore: Datastore,
        paths: &[&str],
    ) -> ClientResult<Value> {
        let commands = paths
            .iter()
            .map(|p| Command::new(Action::None, *p, ""))
            .collect();
        let request = RequestBuilder::new(Method::Get, commands)
            .with_datastore(datastore)
            .build()
            .map_err(|e| {
                ClientError::new(function, ClientErrorKind::RequestCreation).with_source(e)
            })?;
        self.call(&request).await
    }

    async fn mutate(
        &self,
        function: &'static str,
        method: Method,
        action: Action,
        datastore: Datastore,
        yang_models: Option<YangModels>,
        pvs: &[PathValue],
    ) -> ClientResult<Value> {
        let commands = pvs
            .iter()
            .map(|pv| Command::new(action, pv.path.clone(), pv.value.clone()))
            .collect();
        let mut builder = RequestBuilder::new(method, commands).with_datastore(datastore);
        if let Some(y) = yang_models {
            builder = builder.with_yang_models(y);
        }
        let request = builder.build().map_err(|e| {
            ClientError::new(function, ClientErrorKind::RequestCreation).with_source(e)
        })?;
        self.call(&request).await
    }
}

/// Decode a response body and pair it with the request id.
fn decode_response(function: &'static str, body: &[u8], id: u64) -> ClientResult<Value> {
    let response: Response = serde_json::from_slice(body).map_err(|e| {
        ClientError::new(function, ClientErrorKind::JsonUnmarshal).with_source(e)
    })?;
    if response.id != id {
        return Err(ClientError::new(
            function,
            ClientErrorKind::IdMismatch {
                expected: id,
                got: response.id,
            },
        ));
    }
    response
        .into_result()
        .map_err(|error| ClientError::new(function, ClientErrorKind::JsonRpc { error }))
}

/// Fish one entry out of a GET result, keeping non-strings readable.
fn result_entry(result: &Value, index: usize) -> String {
    match result.get(index) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}
