//! Closed vocabularies of the management protocol.
//!
//! Each enum maps 1:1 onto the textual wire forms the service accepts.
//! Parsing an unknown token and rendering a value without a wire form
//! both fail with a [`MessageError`]; there are no in-band invalid
//! sentinels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MessageError, MessageErrorKind};

/// JSON-RPC method verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Read configuration or state.
    Get,
    /// Mutate configuration.
    Set,
    /// Run CLI commands.
    Cli,
    /// Validate a candidate change without applying it.
    Validate,
    /// Diff a proposed change against the candidate.
    Diff,
}

impl Method {
    /// Canonical wire form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Cli => "cli",
            Self::Validate => "validate",
            Self::Diff => "diff",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Self::Get),
            "set" => Ok(Self::Set),
            "cli" => Ok(Self::Cli),
            "validate" => Ok(Self::Validate),
            "diff" => Ok(Self::Diff),
            _ => Err(unknown("Method::from_str", "method", s)),
        }
    }
}

/// Per-command mutation verb.
///
/// `None` is a legal constructor argument meaning "serialize no action
/// element"; it has no wire form of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Replace the subtree at the path.
    Replace,
    /// Merge the value into the subtree at the path.
    Update,
    /// Delete the subtree at the path.
    Delete,
    /// No action element on the wire.
    #[serde(skip)]
    None,
}

impl Action {
    /// Canonical wire form, or `Err` for [`Action::None`].
    pub fn render(&self) -> Result<&'static str, MessageError> {
        self.as_wire_str().ok_or_else(|| {
            MessageError::new("Action::render", MessageErrorKind::NoWireForm { what: "action" })
        })
    }

    /// Canonical wire form; `None` for [`Action::None`].
    #[must_use]
    pub const fn as_wire_str(&self) -> Option<&'static str> {
        match self {
            Self::Replace => Some("replace"),
            Self::Update => Some("update"),
            Self::Delete => Some("delete"),
            Self::None => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str().unwrap_or("none"))
    }
}

impl FromStr for Action {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(Self::Replace),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(unknown("Action::from_str", "action", s)),
        }
    }
}

/// Named configuration surface a command or request addresses.
///
/// Absence on the wire is read as [`Datastore::Candidate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datastore {
    /// The uncommitted candidate configuration.
    #[default]
    Candidate,
    /// The committed running configuration.
    Running,
    /// Operational state.
    State,
    /// Operational tools (resets, clears and the like).
    Tools,
}

impl Datastore {
    /// Canonical wire form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Running => "running",
            Self::State => "state",
            Self::Tools => "tools",
        }
    }
}

impl fmt::Display for Datastore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datastore {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "candidate" => Ok(Self::Candidate),
            "running" => Ok(Self::Running),
            "state" => Ok(Self::State),
            "tools" => Ok(Self::Tools),
            _ => Err(unknown("Datastore::from_str", "datastore", s)),
        }
    }
}

/// Rendering of the response payload.
///
/// Absence on the wire is read as [`OutputFormat::Json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured JSON payload.
    #[default]
    Json,
    /// Flat text rendering.
    Text,
    /// Tabular rendering; only the CLI method produces tables.
    Table,
}

impl OutputFormat {
    /// Canonical wire form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "table" => Ok(Self::Table),
            _ => Err(unknown("OutputFormat::from_str", "output format", s)),
        }
    }
}

/// Schema family the paths of a request are written against.
///
/// Absence on the wire is read as [`YangModels::Srl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YangModels {
    /// Vendor-native schema.
    #[default]
    Srl,
    /// OpenConfig schema.
    Oc,
}

impl YangModels {
    /// Canonical wire form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Srl => "srl",
            Self::Oc => "oc",
        }
    }
}

impl fmt::Display for YangModels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for YangModels {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "srl" => Ok(Self::Srl),
            "oc" => Ok(Self::Oc),
            _ => Err(unknown("YangModels::from_str", "yang-models selector", s)),
        }
    }
}

/// A path/value pair consumed by the mutating helpers and the bulk
/// request constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathValue {
    /// Schema path, forwarded verbatim.
    pub path: String,
    /// Value to write; empty means "no value".
    pub value: String,
}

impl PathValue {
    /// Create a new path/value pair.
    #[must_use]
    pub fn new(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

fn unknown(function: &'static str, what: &'static str, token: &str) -> MessageError {
    MessageError::new(
        function,
        MessageErrorKind::UnknownToken {
            what,
            token: token.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("get", Method::Get)]
    #[test_case("set", Method::Set)]
    #[test_case("cli", Method::Cli)]
    #[test_case("validate", Method::Validate)]
    #[test_case("diff", Method::Diff)]
    fn method_round_trips(s: &str, m: Method) {
        assert_eq!(s.parse::<Method>().expect("known verb"), m);
        assert_eq!(m.as_str(), s);
    }

    #[test_case("replace", Action::Replace)]
    #[test_case("update", Action::Update)]
    #[test_case("delete", Action::Delete)]
    fn action_round_trips(s: &str, a: Action) {
        assert_eq!(s.parse::<Action>().expect("known action"), a);
        assert_eq!(a.render().expect("has wire form"), s);
    }

    #[test]
    fn action_none_has_no_wire_form() {
        let err = Action::None.render().expect_err("none must not render");
        assert_eq!(err.kind(), &MessageErrorKind::NoWireForm { what: "action" });
        assert_eq!(err.function(), "Action::render");
    }

    #[test_case("candidate", Datastore::Candidate)]
    #[test_case("running", Datastore::Running)]
    #[test_case("state", Datastore::State)]
    #[test_case("tools", Datastore::Tools)]
    fn datastore_round_trips(s: &str, d: Datastore) {
        assert_eq!(s.parse::<Datastore>().expect("known datastore"), d);
        assert_eq!(d.as_str(), s);
    }

    #[test]
    fn absent_tokens_map_to_defaults() {
        assert_eq!("".parse::<Datastore>().expect("default"), Datastore::Candidate);
        assert_eq!("".parse::<OutputFormat>().expect("default"), OutputFormat::Json);
        assert_eq!("".parse::<YangModels>().expect("default"), YangModels::Srl);
        assert_eq!(Datastore::default(), Datastore::Candidate);
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
        assert_eq!(YangModels::default(), YangModels::Srl);
    }

    #[test_case("json", OutputFormat::Json)]
    #[test_case("text", OutputFormat::Text)]
    #[test_case("table", OutputFormat::Table)]
    fn output_format_round_trips(s: &str, o: OutputFormat) {
        assert_eq!(s.parse::<OutputFormat>().expect("known format"), o);
        assert_eq!(o.as_str(), s);
    }

    #[test_case("srl", YangModels::Srl)]
    #[test_case("oc", YangModels::Oc)]
    fn yang_models_round_trips(s: &str, y: YangModels) {
        assert_eq!(s.parse::<YangModels>().expect("known selector"), y);
        assert_eq!(y.as_str(), s);
    }

    #[test]
    fn enums_serialize_to_wire_strings() {
        assert_eq!(
            serde_json::to_value(Method::Validate).expect("serializable"),
            serde_json::json!("validate")
        );
        assert_eq!(
            serde_json::to_value(Action::Replace).expect("serializable"),
            serde_json::json!("replace")
        );
        assert_eq!(
            serde_json::to_value(Datastore::Tools).expect("serializable"),
            serde_json::json!("tools")
        );
    }

    #[test]
    fn action_none_does_not_serialize() {
        assert!(serde_json::to_value(Action::None).is_err());
    }

    proptest! {
        #[test]
        fn unknown_method_tokens_are_rejected(s in "[a-z]{1,12}") {
            prop_assume!(!matches!(
                s.as_str(),
                "get" | "set" | "cli" | "validate" | "diff"
            ));
            prop_assert!(s.parse::<Method>().is_err());
        }

        #[test]
        fn unknown_datastore_tokens_are_rejected(s in "[a-z]{1,12}") {
            prop_assume!(!matches!(
                s.as_str(),
                "candidate" | "running" | "state" | "tools"
            ));
            prop_assert!(s.parse::<Datastore>().is_err());
        }
    }
}
