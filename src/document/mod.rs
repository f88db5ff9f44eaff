//! Program-structure documents
//!
//! An external analysis step turns a C++ program into a JSON tree of nodes.
//! This module reads that tree into the closed [`ProgramNode`] sum type:
//! - [`ast`]: node kinds and their fields
//! - [`lenient`]: field readers for the producer's loose typing
//! - [`errors`]: load failures
//!
//! # Accepted envelopes
//!
//! - a bare array of nodes
//! - `{"ast": [...]}`
//! - `{"analysis": {"ast": [...]}}`
//! - `{"blocks": [...]}`

pub mod ast;
pub mod errors;
pub mod lenient;

pub use ast::{
    identifier, ArgBinding, Assignment, ClassDeclaration, ClassMember, ClassPointerDeclaration,
    Declaration, Declarator, FunctionCall, FunctionDeclaration, IfStatement, MemberAssignment,
    MemberKind, MethodCall, NodeKind, ObjectDeclaration, Param, ProgramNode, Receiver,
    UnknownNode, WhileStatement,
};
pub use errors::DocumentError;

use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// A loaded document: the top-level node sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: Vec<ProgramNode>,
}

impl Document {
    pub fn new(nodes: Vec<ProgramNode>) -> Self {
        Document { nodes }
    }

    /// Parse document text
    pub fn from_json_str(text: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Read and parse a document file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Unwrap one of the accepted envelopes and convert its nodes
    pub fn from_value(value: &Value) -> Result<Self, DocumentError> {
        let nodes = Self::unwrap_envelope(value)?;
        let nodes: Vec<ProgramNode> = nodes.iter().filter_map(ProgramNode::from_value).collect();
        debug!(count = nodes.len(), "loaded document nodes");
        Ok(Document { nodes })
    }

    fn unwrap_envelope(value: &Value) -> Result<&Vec<Value>, DocumentError> {
        if let Some(nodes) = value.as_array() {
            return Ok(nodes);
        }

        let candidates = [
            value.get("ast"),
            value.get("analysis").and_then(|a| a.get("ast")),
            value.get("blocks"),
        ];
        candidates
            .into_iter()
            .flatten()
            .find_map(Value::as_array)
            .ok_or(DocumentError::UnrecognizedShape {
                found: json_kind(value),
            })
    }

    pub fn nodes(&self) -> &[ProgramNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level function (or main function) declaration by name
    pub fn function(&self, name: &str) -> Option<&FunctionDeclaration> {
        self.nodes.iter().find_map(|node| match node {
            ProgramNode::FunctionDeclaration(f) | ProgramNode::MainFunction(f)
                if f.name == name =>
            {
                Some(f)
            }
            _ => None,
        })
    }

    /// Top-level class declaration by name
    pub fn class(&self, name: &str) -> Option<&ClassDeclaration> {
        self.nodes.iter().find_map(|node| match node {
            ProgramNode::ClassDeclaration(c) if c.name == name => Some(c),
            _ => None,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without a node array",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes() {
        let bare = r#"[{"type": "assignment", "name": "x", "value": 1}]"#;
        let ast = r#"{"ast": [{"type": "assignment", "name": "x", "value": 1}]}"#;
        let analysis =
            r#"{"analysis": {"ast": [{"type": "assignment", "name": "x", "value": 1}]}}"#;
        let blocks = r#"{"blocks": [{"type": "assignment", "name": "x", "value": 1}]}"#;

        for text in [bare, ast, analysis, blocks] {
            let doc = Document::from_json_str(text).unwrap();
            assert_eq!(doc.nodes().len(), 1, "envelope: {}", text);
            assert!(matches!(doc.nodes()[0], ProgramNode::Assignment(_)));
        }
    }

    #[test]
    fn test_unrecognized_shape() {
        let err = Document::from_json_str(r#"{"program": []}"#).unwrap_err();
        assert!(matches!(err, DocumentError::UnrecognizedShape { .. }));

        let err = Document::from_json_str("42").unwrap_err();
        assert!(matches!(err, DocumentError::UnrecognizedShape { found: "number" }));
    }

    #[test]
    fn test_invalid_json() {
        let err = Document::from_json_str("[{").unwrap_err();
        assert!(matches!(err, DocumentError::Json(_)));
    }

    #[test]
    fn test_tag_aliases() {
        let text = r#"[
            {"type": "function declaration", "name": "f", "params": [], "body": []},
            {"type": "the standard Main_Function ", "body": []}
        ]"#;
        let doc = Document::from_json_str(text).unwrap();
        assert!(doc.function("f").is_some());
        match &doc.nodes()[1] {
            ProgramNode::MainFunction(main) => assert_eq!(main.name, "main"),
            other => panic!("expected main function, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_keeps_children() {
        let text = r#"[{"type": "for_statement", "body": [
            {"type": "declaration", "declarations": [{"name": "i", "value": 0}]}
        ]}]"#;
        let doc = Document::from_json_str(text).unwrap();
        match &doc.nodes()[0] {
            ProgramNode::Unknown(unknown) => {
                assert_eq!(unknown.kind, "for_statement");
                assert_eq!(unknown.body.len(), 1);
            }
            other => panic!("expected unknown node, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_children_are_skipped() {
        let text = r#"[{"type": "main_function", "name": "main", "body": [1, "x", null,
            {"type": "assignment", "name": "y", "value": 2}]}]"#;
        let doc = Document::from_json_str(text).unwrap();
        match &doc.nodes()[0] {
            ProgramNode::MainFunction(main) => assert_eq!(main.body.len(), 1),
            other => panic!("expected main function, got {:?}", other),
        }
    }
}
