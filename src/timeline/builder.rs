//! Document walk that produces the event log
//!
//! The walk starts with `push("global")` and visits top-level nodes in order.
//! Function declarations are only walked when something calls them; the
//! main function is walked where it appears. Scopes opened for calls,
//! method calls and blocks are closed before the walk returns, so the log is
//! always balanced apart from the global frame.

use super::event::{
    Event, EventLog, HeapId, MemberAssignment, Pointee, VarKind, VariableRecord, GLOBAL_SCOPE,
    HEAP_SCOPE, HEAP_SUFFIX,
};
use crate::document::{
    self, ArgBinding, Assignment, ClassDeclaration, ClassMember, ClassPointerDeclaration,
    Declaration, Document, FunctionCall, FunctionDeclaration, IfStatement, MethodCall,
    ObjectDeclaration, Param, ProgramNode, WhileStatement,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Value shown for a parameter whose argument cannot be resolved
pub const UNRESOLVED_PARAM: &str = "param";

/// Nested calls deeper than this open their frame but skip the body, so
/// recursive documents still produce a finite log
pub const MAX_CALL_DEPTH: usize = 32;

/// Uninitialized `new[]` blocks get at most this many `"?"` cells; the
/// declared `array_size` is kept as is
pub const MAX_PLACEHOLDER_CELLS: usize = 16;

/// Prefix some producers put on function scopes (`function:main`)
const FUNCTION_SCOPE_PREFIX: &str = "function:";

/// How block scopes are labelled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeNaming {
    /// Every block of a kind shares one label (`if_body`)
    #[default]
    Shared,
    /// Each block occurrence gets its own label (`if_body#1`, `if_body#2`)
    Unique,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    pub scope_naming: ScopeNaming,
}

/// Build the event log with default options
pub fn build(document: &Document) -> EventLog {
    build_with(document, &BuildOptions::default())
}

pub fn build_with(document: &Document, options: &BuildOptions) -> EventLog {
    let mut builder = TimelineBuilder::new(document, options);
    builder.run();
    let log = EventLog::new(builder.events);
    info!(
        events = log.len(),
        pushes = log.push_count(),
        allocations = builder.next_heap,
        "built timeline"
    );
    log
}

struct TimelineBuilder<'a> {
    document: &'a Document,
    options: &'a BuildOptions,
    events: Vec<Event>,
    next_heap: usize,
    /// Pointer name -> the allocation it was last bound to
    allocations: FxHashMap<String, (HeapId, String)>,
    block_counters: FxHashMap<&'static str, usize>,
    call_depth: usize,
}

impl<'a> TimelineBuilder<'a> {
    fn new(document: &'a Document, options: &'a BuildOptions) -> Self {
        TimelineBuilder {
            document,
            options,
            events: Vec::new(),
            next_heap: 0,
            allocations: FxHashMap::default(),
            block_counters: FxHashMap::default(),
            call_depth: 0,
        }
    }

    fn run(&mut self) {
        self.events.push(Event::push(GLOBAL_SCOPE, None));
        let document = self.document;
        self.walk(document.nodes(), GLOBAL_SCOPE);
    }

    fn walk(&mut self, nodes: &'a [ProgramNode], parent: &str) {
        for node in nodes {
            self.visit(node, parent);
        }
    }

    fn visit(&mut self, node: &'a ProgramNode, parent: &str) {
        match node {
            ProgramNode::Declaration(decl) => self.declaration(decl, parent),
            ProgramNode::Assignment(assign) => self.assignment(assign, parent),
            ProgramNode::MemberAssignment(assign) => self.member_assignment(assign, parent),
            ProgramNode::ClassDeclaration(class) => self.class_declaration(class),
            ProgramNode::ObjectDeclaration(object) => self.object_declaration(object, parent),
            // walked on call
            ProgramNode::FunctionDeclaration(_) => {}
            ProgramNode::MainFunction(main) => self.function_frame(main),
            ProgramNode::FunctionCall(call) => self.function_call(call),
            ProgramNode::MethodCall(call) => self.method_call(call),
            ProgramNode::ClassPointerDeclaration(decl) => {
                self.class_pointer_declaration(decl, parent)
            }
            ProgramNode::IfStatement(stmt) => self.if_statement(stmt),
            ProgramNode::WhileStatement(stmt) => self.while_statement(stmt),
            ProgramNode::Unknown(unknown) => {
                debug!(kind = %unknown.kind, "walking unrecognized node structurally");
                if !unknown.body.is_empty() {
                    self.walk(&unknown.body, parent);
                } else {
                    self.walk(&unknown.members, parent);
                }
            }
        }
    }

    fn declaration(&mut self, decl: &Declaration, parent: &str) {
        for d in &decl.declarations {
            let scope = scope_of(d.scope.as_deref().or(decl.scope.as_deref()), parent);
            let line = d.line.or(decl.line);

            if d.is_new() {
                let (id, heap_name) = self.allocate(&d.name);
                self.record(
                    VariableRecord::new(&d.name, d.value.clone(), scope, VarKind::Pointer)
                        .with_pointee(Some(Pointee::heap(&heap_name, id)))
                        .with_source(d.id.clone(), line),
                );

                let size = d.array_size.unwrap_or(1);
                let mut heap =
                    VariableRecord::new(heap_name, Value::Null, HEAP_SCOPE, VarKind::Heap)
                        .allocated(id)
                        .with_source(d.id.clone(), line);
                heap.array_size = Some(size);
                heap.values = Some(d.values.clone().unwrap_or_else(|| {
                    vec![Value::from("?"); size.min(MAX_PLACEHOLDER_CELLS)]
                }));
                self.record(heap);
            } else {
                let kind = if d.pointer {
                    VarKind::Pointer
                } else if d.array_size.is_some() || d.dimensions.is_some() {
                    VarKind::Array
                } else {
                    VarKind::Variable
                };
                let mut record = VariableRecord::new(&d.name, d.value.clone(), scope, kind)
                    .with_pointee(d.points_to.clone().map(Pointee::named))
                    .with_source(d.id.clone(), line);
                record.array_size = d.array_size;
                record.dimensions = d.dimensions.clone();
                record.values = d.values.clone();
                self.record(record);
            }
        }
    }

    fn assignment(&mut self, assign: &Assignment, parent: &str) {
        let scope = scope_of(assign.scope.as_deref(), parent);
        self.record(
            VariableRecord::new(&assign.name, assign.value.clone(), scope, VarKind::Assignment)
                .with_source(assign.id.clone(), assign.line),
        );
    }

    fn member_assignment(&mut self, assign: &document::MemberAssignment, parent: &str) {
        let target = self.allocations.get(&assign.object).map(|(id, _)| *id);
        let pointee = document::identifier(&assign.value)
            .and_then(|name| self.allocations.get(name))
            .map(|(id, heap_name)| Pointee::heap(heap_name, *id));

        self.events.push(Event::MemberAssign {
            data: MemberAssignment {
                object: assign.object.clone(),
                member: assign.member.clone(),
                value: assign.value.clone(),
                scope: scope_of(assign.scope.as_deref(), parent),
                line: assign.line,
                target,
                pointee,
            },
        });
    }

    fn class_declaration(&mut self, class: &ClassDeclaration) {
        for member in class.member_variables() {
            let scope = scope_of(member.scope.as_deref(), &class.name);
            let kind = field_kind(member);
            self.record(
                VariableRecord::new(&member.name, member.default_value.clone(), scope, kind)
                    .with_pointee(member.points_to.clone().map(Pointee::named))
                    .with_source(member.id.clone(), member.line),
            );
        }
    }

    fn object_declaration(&mut self, object: &ObjectDeclaration, parent: &str) {
        let name = object.object_name();
        let scope = scope_of(object.scope.as_deref(), parent);

        let class_value = Value::from(object.class_type.as_str());
        self.record(
            VariableRecord::new(name, class_value, &scope, VarKind::Object)
                .with_class(Some(object.class_type.clone()))
                .with_source(object.id.clone(), object.line),
        );

        let document = self.document;
        match document.class(&object.class_type) {
            Some(class) => {
                self.seed_fields(class, name, &scope, object.line);
                self.replay_constructor(class, name, &scope, &object.arg_param_map, object.line);
            }
            None => debug!(
                object = name,
                class = %object.class_type,
                "no declaration for object class"
            ),
        }
    }

    fn function_frame(&mut self, function: &'a FunctionDeclaration) {
        let scope = scope_of(Some(&function.name), GLOBAL_SCOPE);
        self.events.push(Event::push(&scope, function.line));
        for param in &function.params {
            self.record(
                VariableRecord::new(
                    &param.name,
                    Value::from(UNRESOLVED_PARAM),
                    &scope,
                    VarKind::Parameter,
                )
                .with_source(param.id.clone(), param.line.or(function.line)),
            );
        }
        self.enter_body(&function.body, &scope);
        self.events.push(Event::pop(scope, None));
    }

    fn function_call(&mut self, call: &'a FunctionCall) {
        let scope = scope_of(Some(&call.name), GLOBAL_SCOPE);
        self.events.push(Event::push(&scope, call.line));

        let document = self.document;
        match document.function(&call.name) {
            Some(callee) => {
                self.bind_params(&callee.params, &call.arg_param_map, &scope, call.line);
                self.enter_body(&callee.body, &scope);
            }
            None => {
                debug!(function = %call.name, "no declaration for call, using embedded body");
                self.enter_body(&call.body, &scope);
            }
        }

        self.events.push(Event::pop(scope, None));
    }

    fn method_call(&mut self, call: &MethodCall) {
        let receiver = &call.object.name;
        let scope = format!("{}.{}", receiver, call.method);
        self.events.push(Event::push(&scope, call.line));

        let class_name = call
            .object
            .class_type
            .clone()
            .or_else(|| self.class_of(receiver));
        let document = self.document;
        let method = class_name
            .as_deref()
            .and_then(|name| document.class(name))
            .and_then(|class| class.method(&call.method));

        match method {
            Some(method) => {
                self.bind_params(&method.params, &call.arg_param_map, &scope, call.line);
                self.enter_body(&method.body, &scope);
            }
            None => debug!(receiver = %receiver, method = %call.method, "method body not found"),
        }

        self.events.push(Event::pop(scope, None));
    }

    fn class_pointer_declaration(&mut self, decl: &ClassPointerDeclaration, parent: &str) {
        let scope = scope_of(decl.scope.as_deref(), parent);
        let class_type = decl.allocated_class().map(str::to_string);

        if !decl.is_new() {
            self.record(
                VariableRecord::new(&decl.name, Value::Null, scope, VarKind::Pointer)
                    .with_class(class_type)
                    .with_source(decl.id.clone(), decl.line),
            );
            return;
        }

        let (id, heap_name) = self.allocate(&decl.name);
        self.record(
            VariableRecord::new(&decl.name, Value::Null, scope, VarKind::Pointer)
                .with_pointee(Some(Pointee::heap(&heap_name, id)))
                .with_class(class_type.clone())
                .with_source(decl.id.clone(), decl.line),
        );

        let entity_value = class_type.clone().map(Value::from).unwrap_or(Value::Null);
        self.record(
            VariableRecord::new(&heap_name, entity_value, HEAP_SCOPE, VarKind::Object)
                .allocated(id)
                .with_class(class_type.clone())
                .with_source(decl.id.clone(), decl.line),
        );

        let document = self.document;
        match class_type.as_deref().and_then(|name| document.class(name)) {
            Some(class) => {
                self.seed_fields(class, &heap_name, HEAP_SCOPE, decl.line);
                self.replay_constructor(
                    class,
                    &heap_name,
                    HEAP_SCOPE,
                    &decl.arg_param_map,
                    decl.line,
                );
            }
            None => debug!(pointer = %decl.name, "allocated class has no declaration"),
        }
    }

    fn if_statement(&mut self, stmt: &'a IfStatement) {
        if let Some(body) = &stmt.if_body {
            self.block("if_body", body, stmt.line);
        }
        if let Some(body) = &stmt.else_body {
            self.block("else_body", body, stmt.line);
        }
    }

    fn while_statement(&mut self, stmt: &'a WhileStatement) {
        if let Some(body) = &stmt.body {
            self.block("while_loop", body, stmt.line);
        }
    }

    fn block(&mut self, base: &'static str, body: &'a [ProgramNode], line: Option<usize>) {
        let scope = match self.options.scope_naming {
            ScopeNaming::Shared => base.to_string(),
            ScopeNaming::Unique => {
                let counter = self.block_counters.entry(base).or_insert(0);
                *counter += 1;
                format!("{}#{}", base, counter)
            }
        };
        self.events.push(Event::push(&scope, line));
        self.walk(body, &scope);
        self.events.push(Event::pop(scope, None));
    }

    /// Walk a callee body unless the call chain is already too deep
    fn enter_body(&mut self, body: &'a [ProgramNode], scope: &str) {
        if self.call_depth >= MAX_CALL_DEPTH {
            debug!(scope, depth = self.call_depth, "call depth limit reached, body skipped");
            return;
        }
        self.call_depth += 1;
        self.walk(body, scope);
        self.call_depth -= 1;
    }

    /// Emit one `parameter` record per formal, bound positionally
    fn bind_params(
        &mut self,
        params: &[Param],
        args: &[ArgBinding],
        scope: &str,
        line: Option<usize>,
    ) {
        for (index, param) in params.iter().enumerate() {
            let (value, pointee) = self.resolve_argument(args.get(index).map(|a| &a.arg_value));
            self.record(
                VariableRecord::new(&param.name, value, scope, VarKind::Parameter)
                    .with_pointee(pointee)
                    .with_source(param.id.clone(), param.line.or(line)),
            );
        }
    }

    /// Value of an argument expression at the point of the call.
    ///
    /// An identifier resolves to the most recent record with that name
    /// anywhere in the log so far, ignoring scope. Pointees carry over so a
    /// pointer argument still points after the call.
    fn resolve_argument(&self, arg: Option<&Value>) -> (Value, Option<Pointee>) {
        let unresolved = || Value::from(UNRESOLVED_PARAM);
        match arg {
            Some(arg) => match document::identifier(arg) {
                Some(name) => match self.latest(name) {
                    Some(record) => {
                        let value = if record.value.is_null() {
                            unresolved()
                        } else {
                            record.value.clone()
                        };
                        (value, record.points_to.clone())
                    }
                    None => (unresolved(), None),
                },
                None if arg.is_null() => (unresolved(), None),
                None => (arg.clone(), None),
            },
            None => (unresolved(), None),
        }
    }

    /// Field records `qualifier.field` from class defaults
    fn seed_fields(
        &mut self,
        class: &ClassDeclaration,
        qualifier: &str,
        scope: &str,
        line: Option<usize>,
    ) {
        for member in class.member_variables() {
            self.record(
                VariableRecord::new(
                    format!("{}.{}", qualifier, member.name),
                    member.default_value.clone(),
                    scope,
                    field_kind(member),
                )
                .with_pointee(member.points_to.clone().map(Pointee::named))
                .with_source(member.id.clone(), member.line.or(line)),
            );
        }
    }

    /// Replay the constructor's simple assignments as field records.
    /// Parameters of a parameterized constructor take the call's arguments.
    fn replay_constructor(
        &mut self,
        class: &ClassDeclaration,
        qualifier: &str,
        scope: &str,
        args: &[ArgBinding],
        line: Option<usize>,
    ) {
        let Some(constructor) = class.constructor(!args.is_empty()) else {
            return;
        };

        let mut bound: FxHashMap<&str, Value> = FxHashMap::default();
        for (index, param) in constructor.params.iter().enumerate() {
            let by_name = args
                .iter()
                .find(|a| a.param_name.as_deref() == Some(param.name.as_str()));
            let arg = by_name.or_else(|| args.get(index)).map(|a| &a.arg_value);
            let (value, _) = self.resolve_argument(arg);
            bound.insert(param.name.as_str(), value);
        }

        for statement in &constructor.body {
            let (field, value, stmt_line) = match statement {
                ProgramNode::Assignment(assign) => (&assign.name, &assign.value, assign.line),
                ProgramNode::MemberAssignment(assign) if assign.object == "this" => {
                    (&assign.member, &assign.value, assign.line)
                }
                _ => continue,
            };
            let value = document::identifier(value)
                .and_then(|name| bound.get(name))
                .cloned()
                .unwrap_or_else(|| value.clone());
            let kind = if class.is_pointer_member(field) {
                VarKind::Pointer
            } else {
                VarKind::Variable
            };
            self.record(
                VariableRecord::new(format!("{}.{}", qualifier, field), value, scope, kind)
                    .with_source(None, stmt_line.or(constructor.line).or(line)),
            );
        }
    }

    fn allocate(&mut self, pointer: &str) -> (HeapId, String) {
        let id = HeapId(self.next_heap);
        self.next_heap += 1;
        let heap_name = format!("{}{}", pointer, HEAP_SUFFIX);
        self.allocations
            .insert(pointer.to_string(), (id, heap_name.clone()));
        (id, heap_name)
    }

    fn record(&mut self, record: VariableRecord) {
        self.events.push(Event::var(record));
    }

    fn latest(&self, name: &str) -> Option<&VariableRecord> {
        self.events.iter().rev().find_map(|event| match event {
            Event::Var { data } if data.name == name => Some(data),
            _ => None,
        })
    }

    fn class_of(&self, receiver: &str) -> Option<String> {
        self.events.iter().rev().find_map(|event| match event {
            Event::Var { data } if data.name == receiver => data.class_type.clone(),
            _ => None,
        })
    }
}

fn field_kind(member: &ClassMember) -> VarKind {
    if member.is_pointer() {
        VarKind::Pointer
    } else {
        VarKind::Variable
    }
}

/// A node's own scope wins over the parent's. The `function:` prefix is
/// dropped so records match the scope pushed for the call.
fn scope_of(explicit: Option<&str>, parent: &str) -> String {
    match explicit {
        Some(scope) if !scope.is_empty() => scope
            .strip_prefix(FUNCTION_SCOPE_PREFIX)
            .unwrap_or(scope)
            .to_string(),
        _ => parent.to_string(),
    }
}
