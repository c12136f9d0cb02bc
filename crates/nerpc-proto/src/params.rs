//! Parameter containers carried inside the request envelope.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::types::{Datastore, OutputFormat, YangModels};

/// Parameters of a GET/SET/VALIDATE/DIFF request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// The commands, in the order they were supplied.
    pub commands: Vec<Command>,
    /// Response rendering; absent means JSON.
    #[serde(
        rename = "output-format",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub output_format: Option<OutputFormat>,
    /// Request-level datastore; absent means candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datastore: Option<Datastore>,
    /// Schema family selector; absent means vendor-native.
    #[serde(
        rename = "yang-models",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub yang_models: Option<YangModels>,
}

/// Parameters of a CLI request: bare command strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliParams {
    /// The command lines, in the order they were supplied.
    pub commands: Vec<String>,
    /// Response rendering; absent means JSON.
    #[serde(
        rename = "output-format",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub output_format: Option<OutputFormat>,
}
