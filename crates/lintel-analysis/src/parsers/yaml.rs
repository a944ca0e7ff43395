//! Agent definition parser.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use lintel_core::FileType;

use super::{FileParser, Metadata, ParsedFile};
use crate::error::ParseError;

/// Typed view of an agent definition.
///
/// Every field defaults so that a structurally wrong document still yields a
/// value; the schema validator reports what is wrong with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDocument {
    #[serde(default)]
    pub agent: AgentSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSpec {
    pub identity: AgentIdentity,
    pub activation_prompt: Vec<String>,
    pub principles: Vec<String>,
    pub customization: String,
    pub commands: BTreeMap<String, String>,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentIdentity {
    pub name: String,
    pub id: String,
    pub version: String,
    pub description: String,
    pub role: String,
    pub goal: String,
    pub icon: String,
}

/// Parses `.yaml`/`.yml` agent definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlAgentParser;

impl FileParser for YamlAgentParser {
    fn parse_content(&self, content: &str, path: &Path) -> Result<ParsedFile, ParseError> {
        let raw: serde_json::Value = if content.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_yaml::from_str(content).map_err(|e| ParseError::Yaml {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let document = match serde_json::from_value::<AgentDocument>(raw.clone()) {
            Ok(document) => document,
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "agent does not fit typed shape");
                AgentDocument {
                    agent: AgentSpec {
                        tasks: tasks_of(&raw),
                        ..AgentSpec::default()
                    },
                }
            }
        };

        Ok(ParsedFile {
            file_type: FileType::Agent,
            path: path.to_path_buf(),
            metadata: Metadata::Agent { document, raw },
            content: content.to_string(),
            content_line: 1,
        })
    }

    fn file_type(&self) -> FileType {
        FileType::Agent
    }
}

/// String entries of `agent.tasks`, read independently of the rest of the
/// document so a mistyped field elsewhere does not hide task references.
fn tasks_of(raw: &serde_json::Value) -> Vec<String> {
    raw.pointer("/agent/tasks")
        .and_then(serde_json::Value::as_array)
        .map(|tasks| {
            tasks
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
