// Integration tests for the timeline builder

use memscope::document::Document;
use memscope::projection::project;
use memscope::timeline::{
    build, build_with, BuildOptions, Event, EventLog, HeapId, Pointee, ScopeNaming, VarKind,
    VariableRecord, MAX_PLACEHOLDER_CELLS, UNRESOLVED_PARAM,
};
use serde_json::json;

fn load(text: &str) -> Document {
    Document::from_json_str(text).expect("document should parse")
}

fn pushed_scopes(log: &EventLog) -> Vec<&str> {
    log.iter()
        .filter_map(|e| match e {
            Event::Push { scope, .. } => Some(scope.as_str()),
            _ => None,
        })
        .collect()
}

fn find_var<'a>(log: &'a EventLog, scope: &str, name: &str) -> Vec<&'a VariableRecord> {
    log.variables()
        .filter(|r| r.scope == scope && r.name == name)
        .collect()
}

const NODE_CLASS: &str = r#"{
    "type": "class_declaration",
    "name": "Node",
    "members": [
        {"type": "member_variable", "name": "data", "default_value": 0},
        {"type": "member_variable", "name": "next", "pointer": true, "default_value": null}
    ]
}"#;

#[test]
fn test_scenario_a_simple_declaration() {
    let document = load(
        r#"[{"type": "main_function", "name": "main", "params": [], "body": [
            {"type": "declaration", "declarations": [
                {"name": "x", "value": 5, "scope": "main", "pointer": false}
            ]}
        ]}]"#,
    );
    let log = build(&document);

    let x = VariableRecord::new("x", json!(5), "main", VarKind::Variable);
    assert_eq!(
        log.events(),
        [
            Event::push("global", None),
            Event::push("main", None),
            Event::var(x.clone()),
            Event::pop("main", None),
        ]
    );

    let projection = project(&log, 3);
    assert_eq!(projection.stack, ["global", "main"]);
    assert_eq!(projection.live, [x]);
}

#[test]
fn test_scenario_b_heap_allocation() {
    let document = load(
        r#"[{"type": "main_function", "name": "main", "body": [
            {"type": "declaration", "declarations": [
                {"name": "p", "allocation": "new", "array_size": 3, "pointer": true}
            ]}
        ]}]"#,
    );
    let log = build(&document);
    assert_eq!(log.len(), 5);

    let Some(Event::Var { data: pointer }) = log.get(2) else {
        panic!("expected pointer record at index 2");
    };
    assert_eq!(pointer.name, "p");
    assert_eq!(pointer.kind, VarKind::Pointer);
    assert_eq!(pointer.scope, "main");
    assert_eq!(pointer.points_to, Some(Pointee::heap("p_heap", HeapId(0))));

    let Some(Event::Var { data: heap }) = log.get(3) else {
        panic!("expected heap record at index 3");
    };
    assert_eq!(heap.name, "p_heap");
    assert_eq!(heap.scope, "heap");
    assert_eq!(heap.kind, VarKind::Heap);
    assert_eq!(heap.heap, Some(HeapId(0)));
    assert_eq!(heap.values, Some(vec![json!("?"), json!("?"), json!("?")]));

    // main has returned: the pointer is gone, the block is not
    let end = project(&log, log.len());
    assert_eq!(end.stack, ["global"]);
    assert!(end.is_live("heap", "p_heap"));
    assert!(end.find("p").is_none());
}

#[test]
fn test_huge_heap_array_keeps_declared_size() {
    let document = load(
        r#"[{"type": "main_function", "name": "main", "body": [
            {"type": "declaration", "declarations": [
                {"name": "p", "allocation": "new", "array_size": 18446744073709551615}
            ]}
        ]}]"#,
    );
    let log = build(&document);
    assert!(log.scope_balance_ok());

    let heap = log
        .variables()
        .find(|record| record.name == "p_heap")
        .expect("heap block recorded");
    assert_eq!(heap.array_size, Some(usize::MAX));
    assert_eq!(
        heap.values.as_ref().map(Vec::len),
        Some(MAX_PLACEHOLDER_CELLS)
    );
}

#[test]
fn test_scenario_d_argument_bound_by_value() {
    let document = load(
        r#"[
            {"type": "function_declaration", "name": "f", "params": [{"name": "a"}], "body": []},
            {"type": "main_function", "name": "main", "body": [
                {"type": "declaration", "declarations": [{"name": "x", "value": 5}]},
                {"type": "function_call", "name": "f", "arg_param_map": [
                    {"param_name": "a", "arg_value": {"type": "variable", "name": "x"}}
                ]},
                {"type": "assignment", "name": "x", "value": 7}
            ]}
        ]"#,
    );
    let log = build(&document);

    let params = find_var(&log, "f", "a");
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].kind, VarKind::Parameter);
    assert_eq!(params[0].value, json!(5));

    // inside f: a=5 next to main's x=5
    let push_f = log
        .iter()
        .position(|e| matches!(e, Event::Push { scope, .. } if scope == "f"))
        .unwrap();
    let inside = project(&log, push_f + 2);
    assert_eq!(inside.stack, ["global", "main", "f"]);
    assert_eq!(inside.get("f", "a").unwrap().value, json!(5));

    // after the reassignment, before main returns
    let after = project(&log, log.len() - 1);
    assert_eq!(after.get("main", "x").unwrap().value, json!(7));
    assert!(after.get("f", "a").is_none());
    assert_eq!(params[0].value, json!(5));
}

#[test]
fn test_unresolved_arguments_bind_placeholder() {
    let document = load(
        r#"[
            {"type": "function_declaration", "name": "g", "params": [{"name": "a"}, {"name": "b"}, {"name": "c"}]},
            {"type": "main_function", "name": "main", "body": [
                {"type": "function_call", "name": "g", "arg_param_map": [
                    {"arg_value": {"name": "missing"}},
                    {"arg_value": 0}
                ]}
            ]}
        ]"#,
    );
    let log = build(&document);

    assert_eq!(find_var(&log, "g", "a")[0].value, json!(UNRESOLVED_PARAM));
    assert_eq!(find_var(&log, "g", "b")[0].value, json!(0));
    assert_eq!(find_var(&log, "g", "c")[0].value, json!(UNRESOLVED_PARAM));
}

#[test]
fn test_uncalled_function_produces_no_events() {
    let document = load(
        r#"[
            {"type": "function_declaration", "name": "unused", "params": [{"name": "a"}], "body": [
                {"type": "declaration", "declarations": [{"name": "dead", "value": 1}]}
            ]},
            {"type": "main_function", "name": "main", "body": []}
        ]"#,
    );
    let log = build(&document);
    assert_eq!(pushed_scopes(&log), ["global", "main"]);
    assert!(log.variables().all(|r| r.name != "dead"));
}

#[test]
fn test_main_parameters_are_placeholders() {
    let document = load(
        r#"[{"type": "the standard Main_Function", "name": "", "params": [{"name": "argc"}], "body": []}]"#,
    );
    let log = build(&document);
    assert_eq!(pushed_scopes(&log), ["global", "main"]);
    let argc = find_var(&log, "main", "argc");
    assert_eq!(argc[0].kind, VarKind::Parameter);
    assert_eq!(argc[0].value, json!(UNRESOLVED_PARAM));
}

#[test]
fn test_scope_balance_for_nested_calls_and_blocks() {
    let document = load(
        r#"[
            {"type": "function_declaration", "name": "inner", "body": [
                {"type": "while_statement", "body": [
                    {"type": "assignment", "name": "i", "value": 1}
                ]}
            ]},
            {"type": "function_declaration", "name": "outer", "body": [
                {"type": "if_statement",
                 "if_body": [{"type": "function_call", "name": "inner"}],
                 "else_body": []}
            ]},
            {"type": "main_function", "name": "main", "body": [
                {"type": "function_call", "name": "outer"},
                {"type": "function_call", "name": "inner"}
            ]}
        ]"#,
    );
    let log = build(&document);

    // global stays open; every other push is closed
    assert_eq!(log.push_count(), log.pop_count() + 1);
    assert!(log.scope_balance_ok());

    let mut depth: i64 = 1;
    for event in &log {
        match event {
            Event::Push { scope, .. } if scope != "global" => depth += 1,
            Event::Pop { .. } => depth -= 1,
            _ => {}
        }
        assert!(depth >= 1);
    }
}

#[test]
fn test_rebuild_is_idempotent() {
    let text = format!(
        r#"[{NODE_CLASS},
            {{"type": "main_function", "name": "main", "body": [
                {{"type": "class_pointer_declaration", "name": "n", "class_type": "Node", "allocation": "new"}},
                {{"type": "member_assignment", "object": "n", "member": "data", "value": 3}}
            ]}}]"#
    );
    let document = load(&text);
    assert_eq!(build(&document), build(&document));
}

#[test]
fn test_shared_block_scopes_collide() {
    let document = load(
        r#"[{"type": "main_function", "name": "main", "body": [
            {"type": "if_statement", "if_body": [
                {"type": "declaration", "declarations": [{"name": "y", "value": 1}]}
            ]},
            {"type": "if_statement", "if_body": []}
        ]}]"#,
    );
    let log = build(&document);
    assert_eq!(pushed_scopes(&log), ["global", "main", "if_body", "if_body"]);

    // inside the second if, y from the first is visible again
    let second_push = log
        .iter()
        .rposition(|e| matches!(e, Event::Push { scope, .. } if scope == "if_body"))
        .unwrap();
    let projection = project(&log, second_push + 1);
    assert_eq!(projection.stack, ["global", "main", "if_body"]);
    assert!(projection.is_live("if_body", "y"));
}

#[test]
fn test_unique_block_scopes() {
    let document = load(
        r#"[{"type": "main_function", "name": "main", "body": [
            {"type": "if_statement",
             "if_body": [{"type": "declaration", "declarations": [{"name": "y", "value": 1}]}],
             "else_body": []},
            {"type": "if_statement", "if_body": []},
            {"type": "while_statement", "body": [
                {"type": "while_statement", "body": []}
            ]}
        ]}]"#,
    );
    let options = BuildOptions {
        scope_naming: ScopeNaming::Unique,
    };
    let log = build_with(&document, &options);
    assert_eq!(
        pushed_scopes(&log),
        [
            "global",
            "main",
            "if_body#1",
            "else_body#1",
            "if_body#2",
            "while_loop#1",
            "while_loop#2"
        ]
    );

    let second_push = log
        .iter()
        .position(|e| matches!(e, Event::Push { scope, .. } if scope == "if_body#2"))
        .unwrap();
    let projection = project(&log, second_push + 1);
    assert!(projection.find("y").is_none());
}

#[test]
fn test_object_constructor_replay() {
    let document = load(
        r#"[
            {"type": "class_declaration", "name": "Point", "members": [
                {"type": "member_variable", "name": "x", "default_value": 0},
                {"type": "member_variable", "name": "y", "default_value": 0},
                {"type": "parameterized constructor", "name": "Point",
                 "params": [{"name": "a"}, {"name": "b"}],
                 "body": [
                    {"type": "assignment", "name": "x", "value": {"name": "a"}},
                    {"type": "member_assignment", "object": "this", "member": "y", "value": {"name": "b"}}
                 ]}
            ]},
            {"type": "main_function", "name": "main", "body": [
                {"type": "object_declaration", "object_name": "pt", "class_type": "Point",
                 "arg_param_map": [
                    {"param_name": "a", "arg_value": 3},
                    {"param_name": "b", "arg_value": 4}
                 ]}
            ]}
        ]"#,
    );
    let log = build(&document);

    // class defaults seeded under the class name
    assert_eq!(find_var(&log, "Point", "x")[0].value, json!(0));

    let object = &find_var(&log, "main", "pt")[0];
    assert_eq!(object.kind, VarKind::Object);
    assert_eq!(object.value, json!("Point"));
    assert_eq!(object.class_type.as_deref(), Some("Point"));

    // defaults first, then the constructor's writes
    let x_writes: Vec<_> = find_var(&log, "main", "pt.x")
        .iter()
        .map(|r| r.value.clone())
        .collect();
    assert_eq!(x_writes, [json!(0), json!(3)]);

    let projection = project(&log, log.len() - 1);
    assert_eq!(projection.get("main", "pt.x").unwrap().value, json!(3));
    assert_eq!(projection.get("main", "pt.y").unwrap().value, json!(4));

    let names: Vec<_> = projection
        .live
        .iter()
        .filter(|r| r.scope == "main")
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, ["pt", "pt.x", "pt.y"]);
}

#[test]
fn test_method_call_scope_and_parameters() {
    let document = load(
        r#"[
            {"type": "class_declaration", "name": "Counter", "members": [
                {"type": "member_variable", "name": "count", "default_value": 0},
                {"type": "member_function", "name": "inc", "params": [{"name": "by"}], "body": [
                    {"type": "assignment", "name": "count", "value": {"name": "by"}}
                ]}
            ]},
            {"type": "main_function", "name": "main", "body": [
                {"type": "object_declaration", "name": "c", "class_type": "Counter"},
                {"type": "method_call", "object": {"name": "c"}, "method": "inc",
                 "arg_param_map": [{"arg_value": 2}]}
            ]}
        ]"#,
    );
    let log = build(&document);

    assert!(pushed_scopes(&log).contains(&"c.inc"));
    assert!(log.scope_balance_ok());

    let by = &find_var(&log, "c.inc", "by")[0];
    assert_eq!(by.kind, VarKind::Parameter);
    assert_eq!(by.value, json!(2));
    assert_eq!(find_var(&log, "c.inc", "count")[0].kind, VarKind::Assignment);
}

#[test]
fn test_method_call_on_unknown_receiver_still_balances() {
    let document = load(
        r#"[{"type": "main_function", "name": "main", "body": [
            {"type": "method_call", "object": "ghost", "method": "run"}
        ]}]"#,
    );
    let log = build(&document);
    assert_eq!(pushed_scopes(&log), ["global", "main", "ghost.run"]);
    assert!(log.scope_balance_ok());
}

#[test]
fn test_linked_list_member_assignment() {
    let text = format!(
        r#"[{NODE_CLASS},
            {{"type": "main_function", "name": "main", "body": [
                {{"type": "class_pointer_declaration", "name": "head", "class_type": "Node", "allocation": "new"}},
                {{"type": "class_pointer_declaration", "name": "second", "class_type": "Node", "allocation": "new"}},
                {{"type": "member_assignment", "object": "head", "member": "next",
                  "value": {{"type": "variable", "name": "second"}}, "pointer_access": true}},
                {{"type": "member_assignment", "object": "head", "member": "data", "value": 1}}
            ]}}]"#
    );
    let log = build(&load(&text));

    let entity = &find_var(&log, "heap", "head_heap")[0];
    assert_eq!(entity.kind, VarKind::Object);
    assert_eq!(entity.heap, Some(HeapId(0)));
    assert_eq!(find_var(&log, "heap", "second_heap")[0].heap, Some(HeapId(1)));

    let writes: Vec<_> = log
        .iter()
        .filter_map(|e| match e {
            Event::MemberAssign { data } => Some(data),
            _ => None,
        })
        .collect();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].target, Some(HeapId(0)));
    assert_eq!(writes[0].pointee, Some(Pointee::heap("second_heap", HeapId(1))));

    let projection = project(&log, log.len() - 1);
    let head = projection.get("heap", "head_heap").unwrap();
    assert_eq!(head.members.get("data"), Some(&json!(1)));
    assert!(head.members.contains_key("next"));

    let next = projection.get("heap", "head_heap.next").unwrap();
    assert_eq!(next.kind, VarKind::Pointer);
    assert_eq!(next.pointee_name(), Some("second_heap"));
    assert_eq!(projection.get("heap", "head_heap.data").unwrap().value, json!(1));
}

#[test]
fn test_class_pointer_without_allocation() {
    let text = format!(
        r#"[{NODE_CLASS},
            {{"type": "main_function", "name": "main", "body": [
                {{"type": "class_pointer_declaration", "name": "cursor", "class_type": "Node"}}
            ]}}]"#
    );
    let log = build(&load(&text));

    let cursor = &find_var(&log, "main", "cursor")[0];
    assert_eq!(cursor.kind, VarKind::Pointer);
    assert_eq!(cursor.points_to, None);
    assert_eq!(cursor.class_type.as_deref(), Some("Node"));
    assert!(log.variables().all(|r| r.scope != "heap"));
}

#[test]
fn test_stack_object_member_assignment() {
    let document = load(
        r#"[
            {"type": "class_declaration", "name": "Pair", "members": [
                {"type": "member_variable", "name": "first", "default_value": 0}
            ]},
            {"type": "main_function", "name": "main", "body": [
                {"type": "object_declaration", "name": "pair", "class_type": "Pair"},
                {"type": "member_assignment", "object": "pair", "member": "first", "value": 9}
            ]}
        ]"#,
    );
    let log = build(&document);
    let projection = project(&log, log.len() - 1);
    assert_eq!(projection.get("main", "pair.first").unwrap().value, json!(9));
}

#[test]
fn test_unknown_node_is_walked_structurally() {
    let document = load(
        r#"[{"type": "main_function", "name": "main", "body": [
            {"type": "for_statement", "body": [
                {"type": "declaration", "declarations": [{"name": "z", "value": 2}]}
            ]},
            {"type": "namespace", "members": [
                {"type": "declaration", "declarations": [{"name": "w", "value": 3}]}
            ]}
        ]}]"#,
    );
    let log = build(&document);
    assert_eq!(find_var(&log, "main", "z")[0].value, json!(2));
    assert_eq!(find_var(&log, "main", "w")[0].value, json!(3));
}

#[test]
fn test_function_scope_prefix_is_normalized() {
    let document = load(
        r#"[
            {"type": "function declaration", "name": "f", "body": [
                {"type": "declaration", "declarations": [{"name": "v", "value": 1, "scope": "function:f"}]}
            ]},
            {"type": "main_function", "name": "main", "body": [
                {"type": "function_call", "name": "f"}
            ]}
        ]"#,
    );
    let log = build(&document);
    assert_eq!(find_var(&log, "f", "v").len(), 1);
}

#[test]
fn test_array_and_pointer_declarations() {
    let document = load(
        r#"[{"type": "main_function", "name": "main", "body": [
            {"type": "declaration", "declarations": [
                {"name": "arr", "array_size": 3, "values": [1, 2, 3]},
                {"name": "grid", "dimensions": [2, 2]},
                {"name": "ptr", "pointer": "pointer declaration", "points_to": {"name": "arr"}}
            ]}
        ]}]"#,
    );
    let log = build(&document);
    assert_eq!(find_var(&log, "main", "arr")[0].kind, VarKind::Array);
    assert_eq!(find_var(&log, "main", "grid")[0].kind, VarKind::Array);

    let ptr = &find_var(&log, "main", "ptr")[0];
    assert_eq!(ptr.kind, VarKind::Pointer);
    assert_eq!(ptr.points_to, Some(Pointee::named("arr")));
}

#[test]
fn test_demo_documents_build_balanced_logs() {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    for name in ["linked_list.json", "arrays_and_calls.json"] {
        let document = Document::from_path(dir.join(name)).expect("demo should load");
        assert!(!document.is_empty(), "{} has no nodes", name);
        let log = build(&document);
        assert!(log.scope_balance_ok(), "{} is unbalanced", name);
        assert!(log.variables().any(|r| r.scope == "heap"), "{} allocates nothing", name);
    }
}
