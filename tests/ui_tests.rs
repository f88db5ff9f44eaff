// Integration tests for the terminal UI, rendered on ratatui's TestBackend

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use memscope::config::Config;
use memscope::document::Document;
use memscope::timeline::{build, EventLog};
use memscope::ui::app::{App, FocusedPane};
use ratatui::{backend::TestBackend, Terminal};

fn sample_log() -> EventLog {
    let document = Document::from_json_str(
        r#"[{"type": "main_function", "name": "main", "body": [
            {"type": "declaration", "line": 2, "declarations": [
                {"name": "x", "value": 5},
                {"name": "p", "allocation": "new", "array_size": 2}
            ]},
            {"type": "assignment", "name": "x", "value": 6, "line": 3}
        ]}]"#,
    )
    .unwrap();
    build(&document)
}

fn press(app: &mut App, code: KeyCode) {
    app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
}

fn screen_text(app: &mut App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
    terminal.draw(|f| app.render(f)).unwrap();
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_step_keys() {
    let log = sample_log();
    let len = log.len();
    let mut app = App::new(log, Config::default());
    assert_eq!(app.view().index(), 0);

    press(&mut app, KeyCode::Left);
    assert_eq!(app.view().index(), 0);

    press(&mut app, KeyCode::Right);
    assert_eq!(app.view().index(), 1);
    assert_eq!(app.projection().step, 1);

    press(&mut app, KeyCode::Char('3'));
    assert_eq!(app.view().index(), 4);

    press(&mut app, KeyCode::Char('9'));
    assert_eq!(app.view().index(), len);

    press(&mut app, KeyCode::Backspace);
    assert_eq!(app.view().index(), 0);

    press(&mut app, KeyCode::Enter);
    assert_eq!(app.view().index(), len);
    assert_eq!(app.projection().stack, ["global"]);
}

#[test]
fn test_projection_follows_steps() {
    let log = sample_log();
    let before_return = log.len() - 1;
    let app = App::new(log, Config::default()).with_step(before_return);

    assert_eq!(app.projection().get("main", "x").unwrap().value, 6);
    let scopes: Vec<_> = app.frames().iter().map(|f| f.scope.as_str()).collect();
    assert_eq!(scopes, ["global", "main"]);
}

#[test]
fn test_with_step_clamps() {
    let log = sample_log();
    let len = log.len();
    let app = App::new(log, Config::default()).with_step(len + 50);
    assert_eq!(app.view().index(), len);
}

#[test]
fn test_focus_and_quit() {
    let mut app = App::new(sample_log(), Config::default());
    assert_eq!(app.focused_pane, FocusedPane::Memory);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focused_pane, FocusedPane::Frames);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focused_pane, FocusedPane::Timeline);
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focused_pane, FocusedPane::Memory);

    press(&mut app, KeyCode::Down);
    assert!(app.memory_viewport.offset > 0.0);
    press(&mut app, KeyCode::Up);
    assert_eq!(app.memory_viewport.offset, 0.0);

    assert!(!app.should_quit);
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);
}

#[test]
fn test_space_toggles_autoplay_with_debounce() {
    let mut app = App::new(sample_log(), Config::default());
    press(&mut app, KeyCode::Char(' '));
    assert!(app.is_playing);

    // a repeat inside the debounce window is ignored
    press(&mut app, KeyCode::Char(' '));
    assert!(app.is_playing);

    // stepping by hand stops playback
    press(&mut app, KeyCode::Right);
    assert!(!app.is_playing);
}

#[test]
fn test_render_shows_frames_and_status() {
    let log = sample_log();
    let before_return = log.len() - 1;
    let mut app = App::new(log, Config::default()).with_step(before_return);
    let text = screen_text(&mut app);

    assert!(text.contains("Call Stack"));
    assert!(text.contains("Scope: main"));
    assert!(text.contains("variable x = 6") || text.contains("assignment x = 6"));
    assert!(text.contains("pointer p → p_heap"));
    assert!(text.contains(&format!("Step: {}/{}", before_return, before_return + 1)));
    assert!(text.contains("Line 3"));
}

#[test]
fn test_render_empty_timeline() {
    let mut app = App::new(EventLog::default(), Config::default());
    let text = screen_text(&mut app);
    assert!(text.contains("No timeline data available"));
    assert!(text.contains("Step: 0/0"));
}

#[test]
fn test_render_document_without_statements() {
    let log = build(&Document::from_json_str("[]").unwrap());
    assert_eq!(log.len(), 1);
    let mut app = App::new(log, Config::default()).with_step(1);
    let text = screen_text(&mut app);
    assert!(text.contains("No timeline data available"));
    assert!(text.contains("Step: 1/1"));
}
