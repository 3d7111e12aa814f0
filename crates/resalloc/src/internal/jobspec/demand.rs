use std::fmt;

use crate::internal::common::error::AllocError;
use crate::internal::jobspec::parser::{JobspecDocument, ResourceEntry};

pub const SLOT_TYPE: &str = "slot";
pub const JOBSPEC_VERSION: i64 = 1;

/// One level of a normalized resource request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DemandNode {
    pub resource_type: String,
    pub count: u64,
    pub exclusive: bool,
    pub with: Vec<DemandNode>,
}

impl DemandNode {
    pub fn new(resource_type: &str, count: u64) -> Self {
        DemandNode {
            resource_type: resource_type.to_string(),
            count,
            exclusive: false,
            with: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.with.is_empty()
    }
}

impl fmt::Display for DemandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.count, self.resource_type)?;
        if self.exclusive {
            write!(f, "!")?;
        }
        if !self.with.is_empty() {
            write!(f, "[")?;
            for (i, child) in self.with.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{child}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Jobspec {
    pub resources: Vec<DemandNode>,
    /// Requested duration in seconds, `None` when the jobspec does not ask for one
    pub duration: Option<u64>,
}

fn semantic_error<T>(message: impl Into<String>) -> crate::Result<T> {
    Err(AllocError::JobspecSemanticError(message.into()))
}

fn normalize_entry(
    entry: &ResourceEntry,
    multiplier: u64,
    exclusive: bool,
    out: &mut Vec<DemandNode>,
) -> crate::Result<()> {
    let count = entry.count.min();
    if count <= 0 {
        return semantic_error(format!(
            "count of '{}' has to be positive, got {count}",
            entry.resource_type
        ));
    }
    if entry.resource_type.is_empty() {
        return semantic_error("resource type cannot be empty");
    }
    let Some(count) = (count as u64).checked_mul(multiplier) else {
        return semantic_error(format!("count of '{}' is too large", entry.resource_type));
    };

    if entry.resource_type == SLOT_TYPE {
        // Slots are not graph resources; their content is requested `count` times and
        // allocated exclusively.
        if entry.with.is_empty() {
            return semantic_error("slot has to contain at least one resource");
        }
        for child in &entry.with {
            normalize_entry(child, count, true, out)?;
        }
        return Ok(());
    }

    let mut with = Vec::with_capacity(entry.with.len());
    for child in &entry.with {
        normalize_entry(child, 1, false, &mut with)?;
    }
    out.push(DemandNode {
        resource_type: entry.resource_type.clone(),
        count,
        exclusive: exclusive || entry.exclusive,
        with,
    });
    Ok(())
}

/// Parses a jobspec and turns it into a tree of demands.
pub fn normalize(text: &str) -> crate::Result<Jobspec> {
    let document = JobspecDocument::parse(text)?;
    if document.version != JOBSPEC_VERSION {
        return semantic_error(format!(
            "unsupported jobspec version {}",
            document.version
        ));
    }
    if document.resources.is_empty() {
        return semantic_error("jobspec does not request any resources");
    }

    let mut resources = Vec::with_capacity(document.resources.len());
    for entry in &document.resources {
        normalize_entry(entry, 1, false, &mut resources)?;
    }

    let duration = match document.duration() {
        Some(d) if !d.is_finite() || d < 0.0 => {
            return semantic_error(format!("invalid duration {d}"));
        }
        Some(d) if d > 0.0 => Some(d.ceil() as u64),
        _ => None,
    };
    Ok(Jobspec {
        resources,
        duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::tests::utils::jobspec::JobspecBuilder;

    fn expect_semantic_error(text: &str, msg: &str) {
        match normalize(text) {
            Err(AllocError::JobspecSemanticError(e)) => {
                assert!(e.contains(msg), "Did not find `{msg}` in `{e}`")
            }
            r => panic!("Expected semantic error, got {r:?}"),
        }
    }

    fn expect_parse_error(text: &str) {
        assert!(matches!(
            normalize(text),
            Err(AllocError::JobspecParseError(_))
        ));
    }

    #[test]
    fn test_normalize_nested() {
        let jobspec = normalize(
            r#"{"version": 1,
                "resources": [{"type": "node", "count": 2,
                               "with": [{"type": "socket", "count": 1,
                                         "with": [{"type": "core", "count": 4},
                                                  {"type": "gpu", "count": 1}]}]}],
                "tasks": [{"command": ["app"], "slot": "task", "count": {"per_slot": 1}}],
                "attributes": {"system": {"duration": 59.5}}}"#,
        )
        .unwrap();
        assert_eq!(jobspec.duration, Some(60));
        assert_eq!(jobspec.resources.len(), 1);
        assert_eq!(jobspec.resources[0].to_string(), "2xnode[1xsocket[4xcore,1xgpu]]");
    }

    #[test]
    fn test_normalize_flattens_slots() {
        let jobspec = normalize(
            &JobspecBuilder::default()
                .node_slot(1, 3, &[("core", 2), ("gpu", 1)])
                .build(),
        )
        .unwrap();
        let node = &jobspec.resources[0];
        assert!(!node.exclusive);
        assert_eq!(node.to_string(), "1xnode[6xcore!,3xgpu!]");
        assert_eq!(jobspec.duration, None);
    }

    #[test]
    fn test_normalize_count_range() {
        let jobspec = normalize(
            r#"{"version": 1, "resources": [{"type": "core", "count": {"min": 3, "max": 8}}]}"#,
        )
        .unwrap();
        assert_eq!(jobspec.resources[0], DemandNode::new("core", 3));
    }

    #[test]
    fn test_normalize_exclusive_flag() {
        let jobspec = normalize(
            r#"{"version": 1, "resources": [{"type": "node", "count": 1, "exclusive": true}]}"#,
        )
        .unwrap();
        assert!(jobspec.resources[0].exclusive);
    }

    #[test]
    fn test_normalize_is_pure() {
        let text = JobspecBuilder::default().cores(2).duration(10).build();
        assert_eq!(normalize(&text).unwrap(), normalize(&text).unwrap());
    }

    #[test]
    fn test_normalize_semantic_errors() {
        expect_semantic_error(
            r#"{"version": 1, "resources": [{"type": "core", "count": 0}]}"#,
            "has to be positive",
        );
        expect_semantic_error(
            r#"{"version": 1, "resources": [{"type": "node", "count": 1,
                "with": [{"type": "core", "count": -2}]}]}"#,
            "has to be positive",
        );
        expect_semantic_error(r#"{"version": 2, "resources": []}"#, "version");
        expect_semantic_error(r#"{"version": 1, "resources": []}"#, "any resources");
        expect_semantic_error(
            r#"{"version": 1, "resources": [{"type": "slot", "count": 1}]}"#,
            "slot",
        );
        expect_semantic_error(
            r#"{"version": 1, "resources": [{"type": "core", "count": 1}],
                "attributes": {"system": {"duration": -5}}}"#,
            "duration",
        );
        expect_semantic_error(
            r#"{"version": 1, "resources": [{"type": "slot", "count": 9223372036854775807,
                "with": [{"type": "core", "count": 4}]}]}"#,
            "too large",
        );
    }

    #[test]
    fn test_normalize_parse_errors() {
        expect_parse_error("");
        expect_parse_error("version: 1");
        expect_parse_error(r#"{"resources": [{"type": "core", "count": 1}]}"#);
        expect_parse_error(r#"{"version": 1, "resources": [{"type": "core"}]}"#);
        expect_parse_error(r#"{"version": 1, "resources": [{"type": "core", "count": "x"}]}"#);
        expect_parse_error(r#"{"version": 1, "resources": {"type": "core", "count": 1}}"#);
    }
}
