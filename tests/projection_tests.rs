// Integration tests for step projection and navigation

use memscope::document::Document;
use memscope::projection::{
    describe_step, project, StepOutOfRange, ViewState, EMPTY_TIMELINE_MESSAGE,
};
use memscope::timeline::{build, Event, EventLog, VarKind, VariableRecord};
use serde_json::json;

fn heap_program() -> EventLog {
    let document = Document::from_json_str(
        r#"[
            {"type": "function_declaration", "name": "make", "body": [
                {"type": "declaration", "line": 3, "declarations": [
                    {"name": "buf", "allocation": "new", "array_size": 2}
                ]}
            ]},
            {"type": "main_function", "name": "main", "line": 7, "body": [
                {"type": "declaration", "line": 8, "declarations": [{"name": "x", "value": 1}]},
                {"type": "function_call", "name": "make", "line": 9},
                {"type": "assignment", "name": "x", "value": 2, "line": 10}
            ]}
        ]"#,
    )
    .unwrap();
    build(&document)
}

#[test]
fn test_step_zero_is_empty() {
    let log = heap_program();
    let projection = project(&log, 0);
    assert_eq!(projection.step, 0);
    assert_eq!(projection.stack, ["global"]);
    assert!(projection.live.is_empty());
}

#[test]
fn test_step_is_clamped() {
    let log = heap_program();
    let projection = project(&log, log.len() + 100);
    assert_eq!(projection.step, log.len());
    assert_eq!(projection, project(&log, log.len()));
}

#[test]
fn test_heap_permanence() {
    let log = heap_program();
    let appears = log
        .iter()
        .position(|e| matches!(e, Event::Var { data } if data.scope == "heap"))
        .unwrap();

    for k in appears + 1..=log.len() {
        let projection = project(&log, k);
        assert!(
            projection.is_live("heap", "buf_heap"),
            "heap block missing at step {}",
            k
        );
    }

    // the pointer dies with its frame
    let end = project(&log, log.len());
    assert!(!end.is_live("make", "buf"));
}

#[test]
fn test_last_write_wins_and_keeps_position() {
    let log = heap_program();
    let projection = project(&log, log.len() - 1);

    let xs: Vec<&VariableRecord> = projection.live.iter().filter(|r| r.name == "x").collect();
    assert_eq!(xs.len(), 1);
    assert_eq!(xs[0].value, json!(2));
    assert_eq!(xs[0].kind, VarKind::Assignment);

    // x was first seen before the heap block, and stays first
    assert_eq!(projection.live[0].name, "x");
    assert_eq!(projection.live[1].name, "buf_heap");
}

#[test]
fn test_projection_is_deterministic() {
    let log = heap_program();
    for k in 0..=log.len() {
        assert_eq!(project(&log, k), project(&heap_program(), k));
    }
}

#[test]
fn test_mismatched_pop_is_tolerated() {
    let log = EventLog::new(vec![
        Event::push("global", None),
        Event::push("a", None),
        Event::push("b", None),
        Event::pop("a", None),
        Event::pop("global", None),
    ]);
    let projection = project(&log, log.len());
    assert_eq!(projection.stack, ["global", "b"]);
}

#[test]
fn test_global_is_always_first() {
    let log = EventLog::new(vec![Event::push("main", None)]);
    assert_eq!(project(&log, 1).stack, ["global", "main"]);
}

#[test]
fn test_view_state_navigation() {
    let log = heap_program();
    let mut view = ViewState::new();
    assert!(view.is_at_start());
    assert!(!view.previous());
    assert_eq!(view.indicator(&log), format!("Step: 0/{}", log.len()));

    assert!(view.next(&log));
    assert_eq!(view.index(), 1);
    assert!(view.previous());
    assert_eq!(view.index(), 0);

    view.to_end(&log);
    assert!(view.is_at_end(&log));
    assert!(!view.next(&log));
    assert_eq!(view.index(), log.len());

    view.rewind();
    assert_eq!(view.index(), 0);
    assert_eq!(ViewState::at_end(&log).index(), log.len());
}

#[test]
fn test_view_state_goto() {
    let log = heap_program();
    let mut view = ViewState::new();

    assert_eq!(view.goto(&log, 3), Ok(()));
    assert_eq!(view.index(), 3);
    assert_eq!(view.goto(&log, log.len()), Ok(()));

    let err = view.goto(&log, log.len() + 1).unwrap_err();
    assert_eq!(
        err,
        StepOutOfRange {
            requested: log.len() + 1,
            len: log.len()
        }
    );
    // a rejected jump leaves the index alone
    assert_eq!(view.index(), log.len());

    view.goto_clamped(&log, -5);
    assert_eq!(view.index(), 0);
    view.goto_clamped(&log, 10_000);
    assert_eq!(view.index(), log.len());
}

#[test]
fn test_describe_step() {
    let log = heap_program();
    assert_eq!(describe_step(&log, 0), "No line information available");
    assert_eq!(describe_step(&log, 1), "Entering scope: global");
    assert_eq!(describe_step(&log, 2), "Entering scope: main");
    assert_eq!(describe_step(&log, 3), "Line 8");
    assert_eq!(describe_step(&log, log.len()), "Exiting scope: main");

    let empty = EventLog::default();
    assert_eq!(describe_step(&empty, 0), EMPTY_TIMELINE_MESSAGE);

    let global_only = build(&Document::from_json_str("[]").unwrap());
    assert_eq!(global_only.len(), 1);
    assert_eq!(describe_step(&global_only, 1), EMPTY_TIMELINE_MESSAGE);
}
