//! Request envelopes and the assembly-time rule engine.
//!
//! All cross-field constraints of the service are enforced here, at
//! construction: a [`Request`] that exists is a request the service
//! will accept structurally. No partially validated envelope escapes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::{MessageError, MessageErrorKind, MessageResult};
use crate::params::{CliParams, Params};
use crate::types::{Action, Datastore, Method, OutputFormat, PathValue, YangModels};

/// Protocol version tag carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Draw a fresh 63-bit non-negative correlation id.
///
/// The source is the process-global thread rng, so sequential draws are
/// distinct with overwhelming probability.
fn draw_id() -> u64 {
    rand::thread_rng().gen::<u64>() >> 1
}

/// A fully validated GET/SET/VALIDATE/DIFF request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    jsonrpc: String,
    id: u64,
    method: Method,
    params: Params,
}

impl Request {
    /// The correlation id the response must echo.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The method verb.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// The validated parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Marshal to the wire JSON form.
    pub fn to_json(&self) -> MessageResult<String> {
        serde_json::to_string(self).map_err(|e| {
            MessageError::new("Request::to_json", MessageErrorKind::Marshal).with_source(e)
        })
    }

    /// Assemble a SET request from per-action buckets.
    ///
    /// The command order is deletes, then replaces, then updates; every
    /// command carries the given datastore through the params level.
    pub fn bulk_set(
        deletes: &[PathValue],
        replaces: &[PathValue],
        updates: &[PathValue],
        yang_models: Option<YangModels>,
        output_format: Option<OutputFormat>,
        datastore: Datastore,
    ) -> MessageResult<Self> {
        Self::bulk(
            Method::Set,
            deletes,
            replaces,
            updates,
            yang_models,
            output_format,
            datastore,
        )
    }

    /// Assemble a DIFF request from per-action buckets.
    ///
    /// Same fan-out as [`Request::bulk_set`]; the engine additionally
    /// requires the yang-models selector for DIFF.
    pub fn bulk_diff(
        deletes: &[PathValue],
        replaces: &[PathValue],
        updates: &[PathValue],
        yang_models: Option<YangModels>,
        output_format: Option<OutputFormat>,
        datastore: Datastore,
    ) -> MessageResult<Self> {
        Self::bulk(
            Method::Diff,
            deletes,
            replaces,
            updates,
            yang_models,
            output_format,
            datastore,
        )
    }

    fn bulk(
        method: Method,
        deletes: &[PathValue],
        replaces: &[PathValue],
        updates: &[PathValue],
        yang_models: Option<YangModels>,
        output_format: Option<OutputFormat>,
        datastore: Datastore,
    ) -> MessageResult<Self> {
        let mut commands =
            Vec::with_capacity(deletes.len() + replaces.len() + updates.len());
        for (action, bucket) in [
            (Action::Delete, deletes),
            (Action::Replace, replaces),
            (Action::Update, updates),
        ] {
            commands.extend(
                bucket
                    .iter()
                    .map(|pv| Command::new(action, pv.path.clone(), pv.value.clone())),
            );
        }
        let mut builder = RequestBuilder::new(method, commands)
            .with_datastore(datastore);
        if let Some(y) = yang_models {
            builder = builder.with_yang_models(y);
        }
        if let Some(f) = output_format {
            builder = builder.with_output_format(f);
        }
        builder.build()
    }
}

/// A validated CLI request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliRequest {
    jsonrpc: String,
    id: u64,
    method: Method,
    params: CliParams,
}

impl CliRequest {
    /// Build a CLI request from command lines and an optional format.
    ///
    /// Fails when the list is empty or any command line is empty.
    pub fn new<S: AsRef<str>>(
        commands: &[S],
        output_format: Option<OutputFormat>,
    ) -> MessageResult<Self> {
        const FUNCTION: &str = "CliRequest::new";
        if commands.is_empty() {
            return Err(MessageError::new(FUNCTION, MessageErrorKind::NoCommands));
        }
        let mut lines = Vec::with_capacity(commands.len());
        for command in commands {
            let line = command.as_ref();
            if line.is_empty() {
                return Err(MessageError::new(FUNCTION, MessageErrorKind::CliEmptyCommand));
            }
            lines.push(line.to_string());
        }
        Ok(Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: draw_id(),
            method: Method::Cli,
            params: CliParams {
                commands: lines,
                output_format,
            },
        })
    }

    /// Pin the correlation id, for reproducible wire snapshots.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// The correlation id the response must echo.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The validated parameters.
    #[must_use]
    pub fn params(&self) -> &CliParams {
        &self.params
    }

    /// Marshal to the wire JSON form.
    pub fn to_json(&self) -> MessageResult<String> {
        serde_json::to_string(self).map_err(|e| {
            MessageError::new("CliRequest::to_json", MessageErrorKind::Marshal).with_source(e)
        })
    }
}

/// Builder applying the cross-field rule matrix to produce a [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    commands: Vec<Command>,
    output_format: Option<OutputFormat>,
    datastore: Option<Datastore>,
    yang_models: Option<YangModels>,
    id: Option<u64>,
}

impl RequestBuilder {
    /// Start a request for the given method and commands.
    #[must_use]
    pub fn new(method: Method, commands: Vec<Command>) -> Self {
        Self {
            method,
            commands,
            output_format: None,
            datastore: None,
            yang_models: None,
            id: None,
        }
    }

    /// Request a response rendering other than the JSON default.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set the request-level datastore.
    ///
    /// Commands without their own override inherit it.
    #[must_use]
    pub fn with_datastore(mut self, datastore: Datastore) -> Self {
        self.datastore = Some(datastore);
        self
    }

    /// Select the schema family the paths are written against.
    #[must_use]
    pub fn with_yang_models(mut self, yang_models: YangModels) -> Self {
        self.yang_models = Some(yang_models);
        self
    }

    /// Pin the correlation id, for reproducible wire snapshots.
    #[must_use]
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Validate the combination and produce the envelope.
    pub fn build(self) -> MessageResult<Request> {
        self.validate()?;
        Ok(Request {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: self.id.unwrap_or_else(draw_id),
            method: self.method,
            params: Params {
                commands: self.commands,
                output_format: self.output_format,
                datastore: self.datastore,
                yang_models: self.yang_models,
            },
        })
    }

    /// The rule matrix. One pass over params-level options, then one
    /// pass per command against the method's constraints.
    fn validate(&self) -> MessageResult<()> {
        const FUNCTION: &str = "RequestBuilder::build";
        let fail = |kind| Err(MessageError::new(FUNCTION, kind));

        if self.method == Method::Cli {
            return fail(MessageErrorKind::MethodNotSupported {
                method: Method::Cli,
            });
        }
        if self.commands.is_empty() {
            return fail(MessageErrorKind::NoCommands);
        }
        match self.method {
            Method::Get | Method::Validate if self.yang_models.is_some() => {
                return fail(MessageErrorKind::YangModelsNotAllowed {
                    method: self.method,
                });
            }
            Method::Diff if self.yang_models.is_none() => {
                return fail(MessageErrorKind::YangModelsRequired);
            }
            _ => {}
        }
        // Tables exist only for CLI output.
        if self.output_format == Some(OutputFormat::Table) {
            return fail(MessageErrorKind::OutputFormatNotAllowed {
                method: self.method,
                format: OutputFormat::Table,
            });
        }

        for command in &self.commands {
            if command.path.is_empty() {
                return fail(MessageErrorKind::EmptyPath);
            }
            let datastore = command
                .datastore
                .or(self.datastore)
                .unwrap_or_default();
            match self.method {
                Method::Get => {
                    if command.action.is_some_and(|a| a != Action::None) {
                        return fail(MessageErrorKind::ActionNotAllowed {
                            method: Method::Get,
                        });
                    }
                    if command.has_value() {
                        return fail(MessageErrorKind::ValueNotAllowed {
                            method: Method::Get,
                        });
                    }
                    if datastore == Datastore::Tools {
                        return fail(MessageErrorKind::DatastoreNotAllowed {
                            method: Method::Get,
                            datastore,
                        });
                    }
                }
                Method::Set => {
                    if !matches!(datastore, Datastore::Candidate | Datastore::Tools) {
                        return fail(MessageErrorKind::SetDatastore { datastore });
                    }
                    check_mutation(FUNCTION, Method::Set, command, datastore)?;
                }
                Method::Validate => {
                    if datastore != Datastore::Candidate {
                        return fail(MessageErrorKind::ValidateDatastore { datastore });
                    }
                    check_mutation(FUNCTION, Method::Validate, command, datastore)?;
                }
                Method::Diff => {
                    if datastore != Datastore::Candidate {
                        return fail(MessageErrorKind::DiffDatastore { datastore });
                    }
                    check_mutation(FUNCTION, Method::Diff, command, datastore)?;
                }
                // Rejected before the per-command pass.
                Method::Cli => {}
            }
        }
        Ok(())
    }
}

/// Shared mutation rules of SET, VALIDATE and DIFF.
fn check_mutation(
    function: &'static str,
    method: Method,
    command: &Command,
    datastore: Datastore,
) -> MessageResult<()> {
    let action = match command.action {
        None | Some(Action::None) => {
            return Err(MessageError::new(
                function,
                MessageErrorKind::ActionRequired { method },
            ));
        }
        Some(action) => action,
    };
    if datastore == Datastore::Tools && action != Action::Update {
        return Err(MessageError::new(
            function,
            MessageErrorKind::ToolsUpdateOnly { action },
        ));
    }
    match action {
        Action::Delete => {
            if command.has_value() {
                return Err(MessageError::new(function, MessageErrorKind::DeleteWithValue));
            }
        }
        Action::Replace | Action::Update => {
            if !command.has_value() && !command.has_embedded_value() {
                return Err(MessageError::new(
                    function,
                    MessageErrorKind::MissingValue { action },
                ));
            }
        }
        // Absent actions were rejected above.
        Action::None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn kind_of(result: MessageResult<Request>) -> MessageErrorKind {
        result.expect_err("assembly must fail").kind().clone()
    }

    #[test]
    fn get_request_wire_form() {
        let req = RequestBuilder::new(
            Method::Get,
            vec![Command::new(Action::None, "/system/name/host-name", "")],
        )
        .with_id(7)
        .build()
        .expect("valid get");
        let wire: serde_json::Value =
            serde_json::from_str(&req.to_json().expect("marshals")).expect("well-formed");
        assert_eq!(
            wire,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 7,
                "method": "get",
                "params": {"commands": [{"path": "/system/name/host-name"}]},
            })
        );
    }

    #[test]
    fn marshalled_request_reparses_with_the_same_id() {
        let req = RequestBuilder::new(
            Method::Set,
            vec![Command::new(Action::Update, "/system/name/host-name", "srl1")],
        )
        .build()
        .expect("valid set");
        let reparsed: Request =
            serde_json::from_str(&req.to_json().expect("marshals")).expect("round trip");
        assert_eq!(reparsed.id(), req.id());
        assert_eq!(reparsed, req);
    }

    #[test]
    fn sequential_ids_are_distinct_and_non_negative() {
        let build = || {
            RequestBuilder::new(Method::Get, vec![Command::new(Action::None, "/p", "")])
                .build()
                .expect("valid get")
        };
        let (a, b) = (build(), build());
        assert_ne!(a.id(), b.id());
        assert!(a.id() < (1_u64 << 63));
        assert!(b.id() < (1_u64 << 63));
    }

    #[test]
    fn get_with_value_is_rejected() {
        let kind = kind_of(
            RequestBuilder::new(Method::Get, vec![Command::new(Action::None, "/p", "x")]).build(),
        );
        assert_eq!(kind, MessageErrorKind::ValueNotAllowed { method: Method::Get });
    }

    #[test]
    fn get_with_action_is_rejected() {
        let kind = kind_of(
            RequestBuilder::new(Method::Get, vec![Command::new(Action::Update, "/p", "")]).build(),
        );
        assert_eq!(kind, MessageErrorKind::ActionNotAllowed { method: Method::Get });
    }

    #[test]
    fn get_against_tools_is_rejected() {
        let kind = kind_of(
            RequestBuilder::new(
                Method::Get,
                vec![Command::new(Action::None, "/p", "").with_datastore(Datastore::Tools)],
            )
            .build(),
        );
        assert_eq!(
            kind,
            MessageErrorKind::DatastoreNotAllowed {
                method: Method::Get,
                datastore: Datastore::Tools,
            }
        );
    }

    #[test_case(Datastore::Candidate ; "candidate")]
    #[test_case(Datastore::Running ; "running")]
    #[test_case(Datastore::State ; "state")]
    fn get_accepts_non_tools_datastores(datastore: Datastore) {
        let req = RequestBuilder::new(
            Method::Get,
            vec![Command::new(Action::None, "/p", "").with_datastore(datastore)],
        )
        .build();
        assert!(req.is_ok());
    }

    #[test]
    fn set_tools_delete_is_rejected() {
        let kind = kind_of(
            RequestBuilder::new(
                Method::Set,
                vec![Command::new(Action::Delete, "/tools/system/ntp", "")
                    .with_datastore(Datastore::Tools)],
            )
            .build(),
        );
        assert_eq!(kind, MessageErrorKind::ToolsUpdateOnly { action: Action::Delete });
    }

    #[test]
    fn set_tools_update_is_accepted() {
        let req = Request::bulk_set(
            &[],
            &[],
            &[PathValue::new("/tools/system/disconnect/session-id", "8")],
            None,
            None,
            Datastore::Tools,
        );
        assert!(req.is_ok());
    }

    #[test]
    fn set_update_without_value_is_rejected() {
        let kind = kind_of(
            RequestBuilder::new(
                Method::Set,
                vec![Command::new(Action::Update, "/interface[name=s0]/description", "")],
            )
            .build(),
        );
        assert_eq!(kind, MessageErrorKind::MissingValue { action: Action::Update });
    }

    #[test]
    fn set_replace_with_embedded_value_is_accepted() {
        let req = RequestBuilder::new(
            Method::Set,
            vec![Command::new(Action::Replace, "/interface[name=s0]/description:test", "")],
        )
        .build();
        assert!(req.is_ok());
    }

    #[test]
    fn set_delete_with_value_is_rejected() {
        let kind = kind_of(
            RequestBuilder::new(Method::Set, vec![Command::new(Action::Delete, "/p", "x")])
                .build(),
        );
        assert_eq!(kind, MessageErrorKind::DeleteWithValue);
    }

    #[test]
    fn set_without_action_is_rejected() {
        let kind = kind_of(
            RequestBuilder::new(Method::Set, vec![Command::new(Action::None, "/p", "x")]).build(),
        );
        assert_eq!(kind, MessageErrorKind::ActionRequired { method: Method::Set });
    }

    #[test_case(Datastore::Running ; "running")]
    #[test_case(Datastore::State ; "state")]
    fn set_rejects_read_only_datastores(datastore: Datastore) {
        let kind = kind_of(
            RequestBuilder::new(
                Method::Set,
                vec![Command::new(Action::Update, "/p", "v").with_datastore(datastore)],
            )
            .build(),
        );
        assert_eq!(kind, MessageErrorKind::SetDatastore { datastore });
    }

    #[test_case(Datastore::Running ; "running")]
    #[test_case(Datastore::Tools ; "tools")]
    fn validate_requires_candidate(datastore: Datastore) {
        let kind = kind_of(
            RequestBuilder::new(
                Method::Validate,
                vec![Command::new(Action::Update, "/p", "v").with_datastore(datastore)],
            )
            .build(),
        );
        assert_eq!(kind, MessageErrorKind::ValidateDatastore { datastore });
    }

    #[test]
    fn validate_on_candidate_is_accepted() {
        let req = RequestBuilder::new(
            Method::Validate,
            vec![Command::new(Action::Delete, "/interface[name=s0]", "")],
        )
        .build();
        assert!(req.is_ok());
    }

    #[test]
    fn diff_requires_yang_models() {
        let kind = kind_of(
            RequestBuilder::new(Method::Diff, vec![Command::new(Action::Update, "/p", "v")])
                .build(),
        );
        assert_eq!(kind, MessageErrorKind::YangModelsRequired);
    }

    #[test]
    fn diff_requires_candidate() {
        let kind = kind_of(
            RequestBuilder::new(
                Method::Diff,
                vec![Command::new(Action::Update, "/p", "v").with_datastore(Datastore::Tools)],
            )
            .with_yang_models(YangModels::Srl)
            .build(),
        );
        assert_eq!(kind, MessageErrorKind::DiffDatastore { datastore: Datastore::Tools });
    }

    #[test]
    fn diff_with_yang_models_is_accepted() {
        let req = RequestBuilder::new(
            Method::Diff,
            vec![Command::new(Action::Update, "/system/name/host-name", "srl2")],
        )
        .with_yang_models(YangModels::Oc)
        .build()
        .expect("valid diff");
        assert_eq!(req.params().yang_models, Some(YangModels::Oc));
    }

    #[test_case(Method::Get ; "get")]
    #[test_case(Method::Validate ; "validate")]
    fn yang_models_is_rejected_outside_set_and_diff(method: Method) {
        let command = match method {
            Method::Get => Command::new(Action::None, "/p", ""),
            _ => Command::new(Action::Update, "/p", "v"),
        };
        let kind = kind_of(
            RequestBuilder::new(method, vec![command])
                .with_yang_models(YangModels::Srl)
                .build(),
        );
        assert_eq!(kind, MessageErrorKind::YangModelsNotAllowed { method });
    }

    #[test]
    fn table_output_is_cli_only() {
        let kind = kind_of(
            RequestBuilder::new(Method::Get, vec![Command::new(Action::None, "/p", "")])
                .with_output_format(OutputFormat::Table)
                .build(),
        );
        assert_eq!(
            kind,
            MessageErrorKind::OutputFormatNotAllowed {
                method: Method::Get,
                format: OutputFormat::Table,
            }
        );
    }

    #[test]
    fn text_output_is_accepted_on_get() {
        let req = RequestBuilder::new(Method::Get, vec![Command::new(Action::None, "/p", "")])
            .with_output_format(OutputFormat::Text)
            .build()
            .expect("valid get");
        assert_eq!(req.params().output_format, Some(OutputFormat::Text));
    }

    #[test]
    fn empty_command_list_is_rejected() {
        let kind = kind_of(RequestBuilder::new(Method::Get, Vec::new()).build());
        assert_eq!(kind, MessageErrorKind::NoCommands);
    }

    #[test]
    fn empty_path_is_rejected() {
        let kind = kind_of(
            RequestBuilder::new(Method::Get, vec![Command::new(Action::None, "", "")]).build(),
        );
        assert_eq!(kind, MessageErrorKind::EmptyPath);
    }

    #[test]
    fn cli_method_is_rejected_by_the_builder() {
        let kind = kind_of(
            RequestBuilder::new(Method::Cli, vec![Command::new(Action::None, "/p", "")]).build(),
        );
        assert_eq!(kind, MessageErrorKind::MethodNotSupported { method: Method::Cli });
    }

    #[test]
    fn cli_request_wire_form() {
        let req = CliRequest::new(&["show version"], Some(OutputFormat::Table))
            .expect("valid cli")
            .with_id(3);
        let wire: serde_json::Value =
            serde_json::from_str(&req.to_json().expect("marshals")).expect("well-formed");
        assert_eq!(
            wire,
            serde_json::json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "cli",
                "params": {"commands": ["show version"], "output-format": "table"},
            })
        );
    }

    #[test]
    fn cli_empty_command_is_rejected() {
        let err = CliRequest::new(&["show version", ""], Some(OutputFormat::Table))
            .expect_err("empty line must fail");
        assert_eq!(err.kind(), &MessageErrorKind::CliEmptyCommand);
    }

    #[test]
    fn cli_empty_list_is_rejected() {
        let err = CliRequest::new::<&str>(&[], None).expect_err("empty list must fail");
        assert_eq!(err.kind(), &MessageErrorKind::NoCommands);
    }

    #[test]
    fn bulk_set_preserves_bucket_order() {
        let req = Request::bulk_set(
            &[PathValue::new("/acl", "")],
            &[PathValue::new("/interface[name=s0]/description", "uplink")],
            &[PathValue::new("/system/name/host-name", "srl1")],
            None,
            None,
            Datastore::Candidate,
        )
        .expect("valid bulk set");
        let actions: Vec<Option<Action>> =
            req.params().commands.iter().map(|c| c.action).collect();
        assert_eq!(
            actions,
            vec![Some(Action::Delete), Some(Action::Replace), Some(Action::Update)]
        );
        assert_eq!(req.params().datastore, Some(Datastore::Candidate));
    }

    #[test]
    fn bulk_diff_requires_yang_models() {
        let err = Request::bulk_diff(
            &[],
            &[],
            &[PathValue::new("/system/name/host-name", "srl1")],
            None,
            None,
            Datastore::Candidate,
        )
        .expect_err("diff without selector must fail");
        assert_eq!(err.kind(), &MessageErrorKind::YangModelsRequired);
    }

    #[test]
    fn bulk_diff_with_yang_models_is_accepted() {
        let req = Request::bulk_diff(
            &[PathValue::new("/acl", "")],
            &[],
            &[PathValue::new("/system/name/host-name", "srl1")],
            Some(YangModels::Srl),
            Some(OutputFormat::Text),
            Datastore::Candidate,
        )
        .expect("valid bulk diff");
        assert_eq!(req.method(), Method::Diff);
        assert_eq!(req.params().yang_models, Some(YangModels::Srl));
    }
}
