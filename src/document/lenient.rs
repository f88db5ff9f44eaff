//! Field readers that tolerate the shapes the analysis producer actually emits.
//!
//! The producer is loose about types: line numbers arrive as numbers or
//! strings, `pointer` is sometimes a boolean and sometimes a descriptive
//! string, references are either bare names or `{"name": ...}` objects.
//! Every reader here maps an unexpected shape to the field's empty value
//! instead of failing the whole node.

use super::ast::{ArgBinding, ClassMember, MemberKind, Param, ProgramNode, Receiver};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(opt_string(deserializer)?.unwrap_or_default())
}

pub fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

pub fn opt_usize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(as_usize(&value))
}

pub fn opt_usize_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<usize>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().filter_map(as_usize).collect()))
}

pub fn opt_values<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<Value>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(items),
        _ => None,
    })
}

/// `true`, `"true"`, `"pointer declaration"` and `"array pointer declaration"`
/// all mean pointer.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => matches!(
            s.as_str(),
            "true" | "pointer declaration" | "array pointer declaration"
        ),
        _ => false,
    })
}

/// A reference given either as `"x"` or as `{"name": "x", ...}`
pub fn name_ref<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Object(_) => value
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    })
}

pub fn name_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(name_ref(deserializer)?.unwrap_or_default())
}

pub fn receiver<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Receiver, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(name) => Receiver {
            name,
            class_type: None,
        },
        Value::Object(_) => Receiver {
            name: value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            class_type: value
                .get("class_type")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        _ => Receiver::default(),
    })
}

pub fn member_kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MemberKind, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(MemberKind::from_tag)
        .unwrap_or_default())
}

pub fn node_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ProgramNode>, D::Error> {
    Ok(opt_node_list(deserializer)?.unwrap_or_default())
}

pub fn opt_node_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<ProgramNode>>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().filter_map(ProgramNode::from_value).collect()))
}

pub fn members<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ClassMember>, D::Error> {
    list_of(deserializer)
}

pub fn params<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Param>, D::Error> {
    list_of(deserializer)
}

pub fn bindings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ArgBinding>, D::Error> {
    list_of(deserializer)
}

/// Array of records; unreadable entries are skipped
fn list_of<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> Deserialize<'a>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default())
}

fn as_usize(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    struct Probe {
        #[serde(deserialize_with = "flag")]
        pointer: bool,
        #[serde(deserialize_with = "opt_usize")]
        line: Option<usize>,
        #[serde(deserialize_with = "name_ref")]
        points_to: Option<String>,
    }

    #[test]
    fn test_flag_accepts_descriptive_strings() {
        let probe: Probe = serde_json::from_value(json!({"pointer": "array pointer declaration"}))
            .unwrap();
        assert!(probe.pointer);

        let probe: Probe = serde_json::from_value(json!({"pointer": "no"})).unwrap();
        assert!(!probe.pointer);
    }

    #[test]
    fn test_line_from_string_or_number() {
        let probe: Probe = serde_json::from_value(json!({"line": "12"})).unwrap();
        assert_eq!(probe.line, Some(12));

        let probe: Probe = serde_json::from_value(json!({"line": 7})).unwrap();
        assert_eq!(probe.line, Some(7));

        let probe: Probe = serde_json::from_value(json!({"line": [1]})).unwrap();
        assert_eq!(probe.line, None);
    }

    #[test]
    fn test_name_ref_shapes() {
        let probe: Probe = serde_json::from_value(json!({"points_to": {"name": "x"}})).unwrap();
        assert_eq!(probe.points_to.as_deref(), Some("x"));

        let probe: Probe = serde_json::from_value(json!({"points_to": "y"})).unwrap();
        assert_eq!(probe.points_to.as_deref(), Some("y"));

        let probe: Probe = serde_json::from_value(json!({"points_to": null})).unwrap();
        assert_eq!(probe.points_to, None);
    }
}
