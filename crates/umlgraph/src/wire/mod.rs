//! Diagram persistence formats
//!
//! The native format is the serde shape of [`Diagram`]: string-literal enums,
//! relations inline on each class, positions included. The legacy format
//! ([`legacy`]) encodes enums as integers and carries no positions.
//!
//! Every diagram read from outside is checked against the model invariants
//! before it is handed out. The plain readers use the default
//! [`RelationPolicy`]; the `_with` variants take the policy to check against.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::core::{DiagramError, DiagramResult};
use crate::model::{Diagram, DiagramDocument, RelationPolicy};

pub mod legacy;

pub use legacy::LegacyDiagram;

/// Serialized diagram format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramFormat {
    Native,
    Legacy,
}

impl DiagramFormat {
    /// Guess the format of a parsed JSON document
    ///
    /// Legacy documents are recognized by their `file_id` object.
    pub fn detect(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.get("file_id").is_some_and(Value::is_object) {
            Some(DiagramFormat::Legacy)
        } else if object.contains_key("classes") {
            Some(DiagramFormat::Native)
        } else {
            None
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["native", "legacy"]
    }
}

impl fmt::Display for DiagramFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramFormat::Native => write!(f, "native"),
            DiagramFormat::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for DiagramFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(DiagramFormat::Native),
            "legacy" => Ok(DiagramFormat::Legacy),
            _ => Err(format!("Unknown diagram format: {}", s)),
        }
    }
}

/// Read a native diagram and check its invariants
pub fn from_json(input: &str) -> DiagramResult<Diagram> {
    from_json_with(input, RelationPolicy::default())
}

pub fn from_json_with(input: &str, policy: RelationPolicy) -> DiagramResult<Diagram> {
    let document: DiagramDocument = serde_json::from_str(input)?;
    document.into_diagram(policy)
}

/// Write a diagram in the native format
pub fn to_json(diagram: &Diagram) -> DiagramResult<String> {
    Ok(serde_json::to_string_pretty(diagram)?)
}

/// Read a legacy diagram
pub fn from_legacy_json(input: &str) -> DiagramResult<Diagram> {
    from_legacy_json_with(input, RelationPolicy::default())
}

pub fn from_legacy_json_with(input: &str, policy: RelationPolicy) -> DiagramResult<Diagram> {
    let legacy: LegacyDiagram = serde_json::from_str(input)?;
    legacy.into_diagram_with(policy)
}

/// Write a diagram in the legacy format
pub fn to_legacy_json(diagram: &Diagram) -> DiagramResult<String> {
    Ok(serde_json::to_string_pretty(&LegacyDiagram::from_diagram(
        diagram,
    ))?)
}

/// Read a diagram in either format
pub fn read_any(input: &str) -> DiagramResult<(Diagram, DiagramFormat)> {
    read_any_with(input, RelationPolicy::default())
}

pub fn read_any_with(
    input: &str,
    policy: RelationPolicy,
) -> DiagramResult<(Diagram, DiagramFormat)> {
    let value: Value = serde_json::from_str(input)?;
    let format = DiagramFormat::detect(&value).ok_or_else(|| {
        DiagramError::invalid_encoding("document", "neither a native nor a legacy diagram")
    })?;
    debug!(%format, "Detected diagram format");

    let diagram = match format {
        DiagramFormat::Native => {
            let document: DiagramDocument = serde_json::from_value(value)?;
            document.into_diagram(policy)?
        }
        DiagramFormat::Legacy => {
            let legacy: LegacyDiagram = serde_json::from_value(value)?;
            legacy.into_diagram_with(policy)?
        }
    };
    Ok((diagram, format))
}

/// Write a diagram in the requested format
pub fn write(diagram: &Diagram, format: DiagramFormat) -> DiagramResult<String> {
    match format {
        DiagramFormat::Native => to_json(diagram),
        DiagramFormat::Legacy => to_legacy_json(diagram),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Position;

    #[test]
    fn test_detect_formats() {
        let native: Value = serde_json::json!({"id": "d", "name": "D", "classes": []});
        let legacy: Value = serde_json::json!({"file_id": {"id": "d"}, "classes": []});
        assert_eq!(DiagramFormat::detect(&native), Some(DiagramFormat::Native));
        assert_eq!(DiagramFormat::detect(&legacy), Some(DiagramFormat::Legacy));
        assert_eq!(DiagramFormat::detect(&serde_json::json!([1, 2])), None);
    }

    #[test]
    fn test_native_position_optional() {
        let input = r#"{"id":"d","name":"D","classes":[
            {"id":"a","name":"A","attributes":[],"methods":[]}
        ]}"#;
        let diagram = from_json(input).unwrap();
        assert_eq!(
            diagram.class("a").unwrap().position,
            Position::new(100.0, 100.0)
        );
    }

    #[test]
    fn test_native_dangling_relation_rejected() {
        let input = r#"{"id":"d","name":"D","classes":[
            {"id":"a","name":"A","attributes":[],"methods":[],
             "relations":[{"target_class_id":"zzz","relation":"ASSOCIATION"}]}
        ]}"#;
        let err = from_json(input).unwrap_err();
        assert!(matches!(err, DiagramError::InvariantViolation { .. }));
    }

    #[test]
    fn test_malformed_json_is_deserialize_error() {
        let err = from_json("{ not json").unwrap_err();
        assert!(matches!(err, DiagramError::Deserialize { .. }));
    }

    #[test]
    fn test_unknown_document_shape() {
        let err = read_any(r#"{"hello": "world"}"#).unwrap_err();
        assert!(matches!(err, DiagramError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_readers_honor_policy() {
        let input = r#"{"id":"d","name":"D","classes":[
            {"id":"a","name":"A","attributes":[],"methods":[],
             "relations":[{"target_class_id":"a","relation":"ASSOCIATION"}]}
        ]}"#;
        let permissive = RelationPolicy {
            allow_self_relations: true,
        };

        assert!(from_json(input).is_err());
        assert!(read_any(input).is_err());
        assert!(from_json_with(input, permissive).is_ok());
        let (diagram, _) = read_any_with(input, permissive).unwrap();
        assert_eq!(diagram.policy(), permissive);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("LEGACY".parse::<DiagramFormat>().unwrap(), DiagramFormat::Legacy);
        assert!("xml".parse::<DiagramFormat>().is_err());
    }
}
