//! Merged image manifest document.

use serde::Serialize;
use serde_json::{Map, Value};

/// One platform entry of a multi-arch tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub os: String,
    pub architecture: String,
    pub variant: Option<String>,
    pub digest: Option<String>,
}

impl Platform {
    pub fn label(&self) -> String {
        match &self.variant {
            Some(variant) => format!("{}/{}/{}", self.os, self.architecture, variant),
            None => format!("{}/{}", self.os, self.architecture),
        }
    }
}

/// Manifest list, image manifest and config blob merged into one JSON object, plus
/// `digest` (manifest digest) and `id` (config blob digest).
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    document: Value,
}

impl Manifest {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self {
            document: Value::Object(map),
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    pub fn into_value(self) -> Value {
        self.document
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.document.get(key).and_then(Value::as_str)
    }

    /// Field of the embedded container config (`config.Cmd`, `config.Env`, ...)
    pub fn config_field(&self, key: &str) -> Option<&Value> {
        self.document
            .get("config")
            .and_then(|config| config.get(key))
            .filter(|value| !is_empty(value))
    }

    pub fn digest(&self) -> Option<&str> {
        self.str_field("digest")
    }

    pub fn id(&self) -> Option<&str> {
        self.str_field("id")
    }

    pub fn os(&self) -> Option<&str> {
        self.str_field("os")
    }

    pub fn architecture(&self) -> Option<&str> {
        self.str_field("architecture")
    }

    pub fn created(&self) -> Option<&str> {
        self.str_field("created")
    }

    pub fn docker_version(&self) -> Option<&str> {
        self.str_field("docker_version")
    }

    /// Sum of layer sizes, in bytes.
    pub fn size(&self) -> Option<u64> {
        let layers = self.document.get("layers")?.as_array()?;
        Some(
            layers
                .iter()
                .filter_map(|layer| layer.get("size").and_then(Value::as_u64))
                .sum(),
        )
    }

    /// Platforms of a multi-arch tag, or the image's own platform.
    pub fn platforms(&self) -> Vec<Platform> {
        let listed = self
            .document
            .get("manifests")
            .and_then(Value::as_array)
            .filter(|entries| !entries.is_empty());

        match listed {
            Some(entries) => entries
                .iter()
                .map(|entry| {
                    let platform = entry.get("platform");
                    let field = |key: &str| {
                        platform
                            .and_then(|platform| platform.get(key))
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    };
                    Platform {
                        os: field("os").unwrap_or_else(|| "unknown".to_string()),
                        architecture: field("architecture").unwrap_or_else(|| "unknown".to_string()),
                        variant: field("variant"),
                        digest: entry.get("digest").and_then(Value::as_str).map(str::to_string),
                    }
                })
                .collect(),
            None => vec![Platform {
                os: self.os().unwrap_or("unknown").to_string(),
                architecture: self.architecture().unwrap_or("unknown").to_string(),
                variant: None,
                digest: self.digest().map(str::to_string),
            }],
        }
    }

    /// `created_by` of every history entry, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.document
            .get("history")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| {
                        entry
                            .get("created_by")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
