use serde::{Deserialize, Serialize};

use crate::internal::common::error::AllocError;

/// Jobspec document, version 1.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JobspecDocument {
    pub version: i64,
    pub resources: Vec<ResourceEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ResourceEntry {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub count: CountSpec,
    #[serde(default)]
    pub exclusive: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub with: Vec<ResourceEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(untagged)]
pub enum CountSpec {
    Fixed(i64),
    /// Only the minimum is honored, the matcher never takes more than needed.
    Range {
        min: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operand: Option<i64>,
    },
}

impl CountSpec {
    #[inline]
    pub fn min(&self) -> i64 {
        match self {
            CountSpec::Fixed(count) | CountSpec::Range { min: count, .. } => *count,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemAttributes>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SystemAttributes {
    /// Requested walltime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl JobspecDocument {
    pub fn parse(text: &str) -> crate::Result<Self> {
        serde_json::from_str(text).map_err(|e| AllocError::JobspecParseError(e.to_string()))
    }

    pub fn duration(&self) -> Option<f64> {
        self.attributes
            .as_ref()
            .and_then(|a| a.system.as_ref())
            .and_then(|s| s.duration)
    }
}
