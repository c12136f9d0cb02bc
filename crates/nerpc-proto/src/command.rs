//! Per-command wire model and construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MessageError, MessageErrorKind, MessageResult};
use crate::types::{Action, Datastore};

/// One command of a request: a schema path plus the optional elements
/// the service recognizes alongside it.
///
/// All elements except `path` follow omitempty semantics: unset fields
/// never appear on the wire. An empty `value` is normalized to "unset"
/// at construction, so the emptiness rules of the assembly engine and
/// the wire form share one representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Schema path, forwarded verbatim.
    pub path: String,
    /// Value to write at the path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Opaque JSON object substituted into named placeholders of the path.
    #[serde(
        rename = "path-keywords",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub path_keywords: Option<Value>,
    /// Whether the service descends into the subtree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
    /// Whether unset leaves are reported with their schema defaults.
    #[serde(
        rename = "include-field-defaults",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub include_field_defaults: Option<bool>,
    /// Mutation verb for this command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    /// Datastore override for this command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore: Option<Datastore>,
}

impl Command {
    /// Create a command from an action, a path and a value.
    ///
    /// [`Action::None`] leaves the action element absent; an empty
    /// value leaves the value element absent.
    #[must_use]
    pub fn new(action: Action, path: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            path: path.into(),
            value: (!value.is_empty()).then_some(value),
            path_keywords: None,
            recursive: None,
            include_field_defaults: None,
            action: match action {
                Action::None => None,
                a => Some(a),
            },
            datastore: None,
        }
    }

    /// Ask the service not to descend into the subtree.
    #[must_use]
    pub fn without_recursion(mut self) -> Self {
        self.recursive = Some(false);
        self
    }

    /// Ask the service to report schema defaults for unset leaves.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.include_field_defaults = Some(true);
        self
    }

    /// Attach a datastore override to this command.
    #[must_use]
    pub fn with_datastore(mut self, datastore: Datastore) -> Self {
        self.datastore = Some(datastore);
        self
    }

    /// Attach path keywords, given as raw JSON text.
    ///
    /// The text must parse as a JSON object; it is stored as parsed
    /// structure and forwarded without a lossy re-encoding.
    pub fn with_path_keywords(mut self, raw: &str) -> MessageResult<Self> {
        let parsed: Value = serde_json::from_str(raw).map_err(|e| {
            MessageError::new("Command::with_path_keywords", MessageErrorKind::InvalidPathKeywords)
                .with_source(e)
        })?;
        if !parsed.is_object() {
            return Err(MessageError::new(
                "Command::with_path_keywords",
                MessageErrorKind::InvalidPathKeywords,
            ));
        }
        self.path_keywords = Some(parsed);
        Ok(self)
    }

    /// Whether the path carries a trailing `:value` segment.
    ///
    /// Such a path embeds its value inline, which exempts the command
    /// from the non-empty value rule for update and replace.
    #[must_use]
    pub fn has_embedded_value(&self) -> bool {
        self.path
            .rsplit_once(':')
            .is_some_and(|(_, suffix)| !suffix.is_empty())
    }

    /// Whether the value element is set.
    #[must_use]
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn new_sets_path_and_value_verbatim() {
        let cmd = Command::new(Action::Update, "/interface[name=ethernet-1/1]", "desc");
        assert_eq!(cmd.path, "/interface[name=ethernet-1/1]");
        assert_eq!(cmd.value.as_deref(), Some("desc"));
        assert_eq!(cmd.action, Some(Action::Update));
    }

    #[test]
    fn action_none_and_empty_value_stay_absent() {
        let cmd = Command::new(Action::None, "/system/name/host-name", "");
        assert!(cmd.action.is_none());
        assert!(cmd.value.is_none());
        let wire = serde_json::to_value(&cmd).expect("serializable");
        assert_eq!(wire, serde_json::json!({"path": "/system/name/host-name"}));
    }

    #[test]
    fn options_set_their_fields() {
        let cmd = Command::new(Action::None, "/p", "")
            .without_recursion()
            .with_defaults()
            .with_datastore(Datastore::Running);
        assert_eq!(cmd.recursive, Some(false));
        assert_eq!(cmd.include_field_defaults, Some(true));
        assert_eq!(cmd.datastore, Some(Datastore::Running));
    }

    #[test]
    fn later_options_overwrite_earlier_ones() {
        let cmd = Command::new(Action::None, "/p", "")
            .with_datastore(Datastore::Running)
            .with_datastore(Datastore::State);
        assert_eq!(cmd.datastore, Some(Datastore::State));
    }

    #[test]
    fn path_keywords_accepts_an_object() {
        let cmd = Command::new(Action::None, "/interface[name={name}]", "")
            .with_path_keywords(r#"{"name": "ethernet-1/1"}"#)
            .expect("object keywords");
        assert_eq!(
            cmd.path_keywords,
            Some(serde_json::json!({"name": "ethernet-1/1"}))
        );
    }

    #[test_case(r#"["not", "an", "object"]"# ; "array")]
    #[test_case(r#""scalar""# ; "scalar")]
    #[test_case("{broken" ; "malformed json")]
    fn path_keywords_rejects_non_objects(raw: &str) {
        let err = Command::new(Action::None, "/p", "")
            .with_path_keywords(raw)
            .expect_err("must reject");
        assert_eq!(err.kind(), &MessageErrorKind::InvalidPathKeywords);
        assert_eq!(err.function(), "Command::with_path_keywords");
    }

    #[test_case("/interface[name=s0]/description:test", true ; "embedded suffix")]
    #[test_case("/interface[name=s0]/description", false ; "no colon")]
    #[test_case("/interface[name=s0]/description:", false ; "empty suffix")]
    fn embedded_value_detection(path: &str, expected: bool) {
        let cmd = Command::new(Action::Replace, path, "");
        assert_eq!(cmd.has_embedded_value(), expected);
    }

    #[test]
    fn wire_field_names_match_the_service() {
        let cmd = Command::new(Action::Delete, "/acl", "")
            .with_defaults()
            .without_recursion()
            .with_datastore(Datastore::Candidate);
        let wire = serde_json::to_value(&cmd).expect("serializable");
        assert_eq!(
            wire,
            serde_json::json!({
                "path": "/acl",
                "recursive": false,
                "include-field-defaults": true,
                "action": "delete",
                "datastore": "candidate",
            })
        );
    }
}
