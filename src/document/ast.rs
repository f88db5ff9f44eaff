// Program-structure nodes produced by the analysis pipeline

use super::lenient;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// One node of the program-structure document.
///
/// The producer tags nodes with a `type` string; each recognized tag maps to
/// exactly one variant carrying only the fields that kind uses. Anything else
/// lands in [`ProgramNode::Unknown`] and is walked structurally.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramNode {
    Declaration(Declaration),
    Assignment(Assignment),
    MemberAssignment(MemberAssignment),
    ClassDeclaration(ClassDeclaration),
    ObjectDeclaration(ObjectDeclaration),
    FunctionDeclaration(FunctionDeclaration),
    MainFunction(FunctionDeclaration),
    FunctionCall(FunctionCall),
    MethodCall(MethodCall),
    ClassPointerDeclaration(ClassPointerDeclaration),
    IfStatement(IfStatement),
    WhileStatement(WhileStatement),
    Unknown(UnknownNode),
}

/// Recognized `type` tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Declaration,
    Assignment,
    MemberAssignment,
    ClassDeclaration,
    ObjectDeclaration,
    FunctionDeclaration,
    MainFunction,
    FunctionCall,
    MethodCall,
    ClassPointerDeclaration,
    IfStatement,
    WhileStatement,
}

impl NodeKind {
    /// Map a producer tag to a kind. The producer spells two of its tags with
    /// spaces, so those spellings are accepted alongside the snake_case ones.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag.trim() {
            "declaration" => NodeKind::Declaration,
            "assignment" => NodeKind::Assignment,
            "member_assignment" => NodeKind::MemberAssignment,
            "class_declaration" => NodeKind::ClassDeclaration,
            "object_declaration" => NodeKind::ObjectDeclaration,
            "function_declaration" | "function declaration" => NodeKind::FunctionDeclaration,
            "main_function" | "the standard Main_Function" => NodeKind::MainFunction,
            "function_call" => NodeKind::FunctionCall,
            "method_call" => NodeKind::MethodCall,
            "class_pointer_declaration" => NodeKind::ClassPointerDeclaration,
            "if_statement" => NodeKind::IfStatement,
            "while_statement" => NodeKind::WhileStatement,
            _ => return None,
        };
        Some(kind)
    }
}

impl ProgramNode {
    /// Convert one JSON value into a node.
    ///
    /// Returns `None` only for non-object values. A recognized node whose
    /// fields cannot be read is downgraded to `Unknown` so its children are
    /// still visited.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            debug!(value = %value, "dropping non-object node entry");
            return None;
        }

        let tag = value.get("type").and_then(Value::as_str).unwrap_or_default();
        let Some(kind) = NodeKind::from_tag(tag) else {
            return Some(ProgramNode::Unknown(UnknownNode::from_value(tag, value)));
        };

        let parsed = match kind {
            NodeKind::Declaration => Declaration::deserialize(value).map(ProgramNode::Declaration),
            NodeKind::Assignment => Assignment::deserialize(value).map(ProgramNode::Assignment),
            NodeKind::MemberAssignment => {
                MemberAssignment::deserialize(value).map(ProgramNode::MemberAssignment)
            }
            NodeKind::ClassDeclaration => {
                ClassDeclaration::deserialize(value).map(ProgramNode::ClassDeclaration)
            }
            NodeKind::ObjectDeclaration => {
                ObjectDeclaration::deserialize(value).map(ProgramNode::ObjectDeclaration)
            }
            NodeKind::FunctionDeclaration => {
                FunctionDeclaration::deserialize(value).map(ProgramNode::FunctionDeclaration)
            }
            NodeKind::MainFunction => FunctionDeclaration::deserialize(value).map(|mut main| {
                if main.name.is_empty() {
                    main.name = "main".to_string();
                }
                ProgramNode::MainFunction(main)
            }),
            NodeKind::FunctionCall => {
                FunctionCall::deserialize(value).map(ProgramNode::FunctionCall)
            }
            NodeKind::MethodCall => MethodCall::deserialize(value).map(ProgramNode::MethodCall),
            NodeKind::ClassPointerDeclaration => ClassPointerDeclaration::deserialize(value)
                .map(ProgramNode::ClassPointerDeclaration),
            NodeKind::IfStatement => IfStatement::deserialize(value).map(ProgramNode::IfStatement),
            NodeKind::WhileStatement => {
                WhileStatement::deserialize(value).map(ProgramNode::WhileStatement)
            }
        };

        match parsed {
            Ok(node) => Some(node),
            Err(err) => {
                warn!(kind = tag, error = %err, "unreadable node, falling back to structural walk");
                Some(ProgramNode::Unknown(UnknownNode::from_value(tag, value)))
            }
        }
    }

    /// Source line, when the producer recorded one
    pub fn line(&self) -> Option<usize> {
        match self {
            ProgramNode::Declaration(n) => n.line,
            ProgramNode::Assignment(n) => n.line,
            ProgramNode::MemberAssignment(n) => n.line,
            ProgramNode::ClassDeclaration(n) => n.line,
            ProgramNode::ObjectDeclaration(n) => n.line,
            ProgramNode::FunctionDeclaration(n) | ProgramNode::MainFunction(n) => n.line,
            ProgramNode::FunctionCall(n) => n.line,
            ProgramNode::MethodCall(n) => n.line,
            ProgramNode::ClassPointerDeclaration(n) => n.line,
            ProgramNode::IfStatement(n) => n.line,
            ProgramNode::WhileStatement(n) => n.line,
            ProgramNode::Unknown(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for ProgramNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ProgramNode::from_value(&value)
            .ok_or_else(|| serde::de::Error::custom("program node must be a JSON object"))
    }
}

/// `declaration`: one or more declarators sharing a statement
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Declaration {
    pub declarations: Vec<Declarator>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

/// A single declared name inside a `declaration`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Declarator {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    pub value: Value,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub pointer: bool,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub allocation: Option<String>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub array_size: Option<usize>,
    #[serde(deserialize_with = "lenient::opt_usize_list")]
    pub dimensions: Option<Vec<usize>>,
    #[serde(deserialize_with = "lenient::opt_values")]
    pub values: Option<Vec<Value>>,
    #[serde(deserialize_with = "lenient::name_ref")]
    pub points_to: Option<String>,
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

impl Declarator {
    pub fn is_new(&self) -> bool {
        is_new_allocation(self.allocation.as_deref())
    }
}

/// `assignment`: `name = value`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Assignment {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    pub value: Value,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

/// `member_assignment`: `object.member = value` or `object->member = value`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MemberAssignment {
    #[serde(deserialize_with = "lenient::name_or_empty")]
    pub object: String,
    #[serde(deserialize_with = "lenient::string")]
    pub member: String,
    pub value: Value,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    #[serde(deserialize_with = "lenient::flag")]
    pub pointer_access: bool,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

/// `class_declaration`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassDeclaration {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::members")]
    pub members: Vec<ClassMember>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

impl ClassDeclaration {
    /// Data members in declaration order
    pub fn member_variables(&self) -> impl Iterator<Item = &ClassMember> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Variable)
    }

    /// Find a member function by name
    pub fn method(&self, name: &str) -> Option<&ClassMember> {
        self.members
            .iter()
            .find(|m| m.kind == MemberKind::Function && m.name == name)
    }

    /// Pick the constructor to replay. A parameterized constructor is
    /// preferred when arguments were supplied.
    pub fn constructor(&self, has_arguments: bool) -> Option<&ClassMember> {
        let parameterized = self
            .members
            .iter()
            .find(|m| m.kind == MemberKind::ParameterizedConstructor);
        let default = self
            .members
            .iter()
            .find(|m| m.kind == MemberKind::Constructor);

        if has_arguments {
            parameterized.or(default)
        } else {
            default.or(parameterized)
        }
    }

    /// Whether a data member with this name is a pointer
    pub fn is_pointer_member(&self, name: &str) -> bool {
        self.member_variables()
            .any(|m| m.name == name && m.is_pointer())
    }
}

/// Kinds of class members the producer emits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemberKind {
    Variable,
    Function,
    Constructor,
    ParameterizedConstructor,
    Destructor,
    #[default]
    Other,
}

impl MemberKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "member_variable" => MemberKind::Variable,
            "member_function" => MemberKind::Function,
            "constructor" => MemberKind::Constructor,
            "parameterized constructor" | "parameterized_constructor" => {
                MemberKind::ParameterizedConstructor
            }
            "destructor" => MemberKind::Destructor,
            _ => MemberKind::Other,
        }
    }
}

/// A member of a class declaration (field, method, constructor, ...)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassMember {
    #[serde(rename = "type", deserialize_with = "lenient::member_kind")]
    pub kind: MemberKind,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    pub default_value: Value,
    #[serde(deserialize_with = "lenient::flag")]
    pub pointer: bool,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub data_type: Option<String>,
    #[serde(deserialize_with = "lenient::name_ref")]
    pub points_to: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    #[serde(deserialize_with = "lenient::params")]
    pub params: Vec<Param>,
    #[serde(deserialize_with = "lenient::node_list")]
    pub body: Vec<ProgramNode>,
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

impl ClassMember {
    pub fn is_pointer(&self) -> bool {
        self.pointer || self.data_type.as_deref().is_some_and(|t| t.contains('*'))
    }
}

/// Formal parameter of a function, method or constructor
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Param {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub data_type: Option<String>,
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

/// Positional argument binding (`arg_param_map` entry)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArgBinding {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub param_name: Option<String>,
    pub arg_value: Value,
}

/// `object_declaration`: a class instance with automatic storage
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObjectDeclaration {
    #[serde(deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub object_name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub class_type: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    #[serde(deserialize_with = "lenient::bindings")]
    pub arg_param_map: Vec<ArgBinding>,
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

impl ObjectDeclaration {
    /// The producer names parameterized-constructor objects `object_name`
    pub fn object_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.object_name.as_deref())
            .unwrap_or_default()
    }
}

/// `function_declaration` and `main_function`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FunctionDeclaration {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::params")]
    pub params: Vec<Param>,
    #[serde(deserialize_with = "lenient::node_list")]
    pub body: Vec<ProgramNode>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub return_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

/// `function_call`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FunctionCall {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::bindings")]
    pub arg_param_map: Vec<ArgBinding>,
    /// Callee body as embedded by the producer; used when no declaration
    /// with this name exists at top level.
    #[serde(deserialize_with = "lenient::node_list")]
    pub body: Vec<ProgramNode>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

/// Receiver of a method call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Receiver {
    pub name: String,
    pub class_type: Option<String>,
}

/// `method_call`: `object.method(args)` or `object->method(args)`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MethodCall {
    #[serde(deserialize_with = "lenient::receiver")]
    pub object: Receiver,
    #[serde(deserialize_with = "lenient::string")]
    pub method: String,
    #[serde(deserialize_with = "lenient::bindings")]
    pub arg_param_map: Vec<ArgBinding>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

/// `class_pointer_declaration`: `Node* p;` or `Node* p = new Node{...};`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassPointerDeclaration {
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub class_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub allocated_type: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub allocation: Option<String>,
    #[serde(deserialize_with = "lenient::opt_string")]
    pub scope: Option<String>,
    #[serde(deserialize_with = "lenient::bindings")]
    pub arg_param_map: Vec<ArgBinding>,
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

impl ClassPointerDeclaration {
    pub fn is_new(&self) -> bool {
        is_new_allocation(self.allocation.as_deref())
    }

    /// Class of the allocated object
    pub fn allocated_class(&self) -> Option<&str> {
        self.allocated_type
            .as_deref()
            .or(self.class_type.as_deref())
    }
}

/// `if_statement`. A missing branch is `None`; an empty branch still opens
/// and closes its scope.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IfStatement {
    #[serde(deserialize_with = "lenient::opt_node_list")]
    pub if_body: Option<Vec<ProgramNode>>,
    #[serde(deserialize_with = "lenient::opt_node_list")]
    pub else_body: Option<Vec<ProgramNode>>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

/// `while_statement`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WhileStatement {
    #[serde(deserialize_with = "lenient::opt_node_list")]
    pub body: Option<Vec<ProgramNode>>,
    #[serde(deserialize_with = "lenient::opt_usize")]
    pub line: Option<usize>,
}

/// Any node whose kind is not recognized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownNode {
    pub kind: String,
    pub body: Vec<ProgramNode>,
    pub members: Vec<ProgramNode>,
}

impl UnknownNode {
    fn from_value(kind: &str, value: &Value) -> Self {
        let children = |key: &str| -> Vec<ProgramNode> {
            value
                .get(key)
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(ProgramNode::from_value).collect())
                .unwrap_or_default()
        };

        UnknownNode {
            kind: kind.to_string(),
            body: children("body"),
            members: children("members"),
        }
    }
}

/// Name of a bare identifier expression (`{"type": "variable", "name": "x"}`).
/// Literals and other expressions yield `None`.
pub fn identifier(value: &Value) -> Option<&str> {
    value.get("name").and_then(Value::as_str)
}

fn is_new_allocation(allocation: Option<&str>) -> bool {
    allocation == Some("new")
}
