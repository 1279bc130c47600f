//! Scripted sessions through the terminal app.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use comicrat::bookmark::Bookmarks;
use comicrat::comic::Comic;
use comicrat::geometry::Size;
use comicrat::input::KeyCode;
use comicrat::main_app::{App, run_app_with_event_source};
use comicrat::navigation::ViewMode;
use comicrat::test_utils::test_helpers::ScriptBuilder;
use comicrat::viewer::{Viewer, ViewerOptions};

const COMIC: &str = r#"[
    {"filename": "a.jpg", "size": [800, 1200],
     "panels": [[0, 0, 400, 1200], [400, 0, 400, 1200]]},
    {"filename": "b.jpg", "size": [800, 1200], "panels": []},
    {"filename": "c.jpg", "size": [800, 1200],
     "panels": [[0, 0, 800, 600], [0, 600, 800, 600]]}
]"#;

fn make_app(store: Box<dyn comicrat::bookmark::ProgressStore>) -> App {
    let comic = Comic::from_json("scripted.json", COMIC).unwrap();
    let container = Rc::new(Cell::new(Size::new(80.0, 23.0)));
    let viewer = Viewer::new(
        comic,
        ViewerOptions {
            images_base: "images".to_string(),
            container: {
                let container = Rc::clone(&container);
                Box::new(move || container.get())
            },
            store,
            mode: ViewMode::Panel,
        },
    )
    .unwrap();
    App::new(viewer, container).unwrap()
}

fn run_script(app: &mut App, mut events: comicrat::input::SimulatedEventSource) {
    let backend = TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend).unwrap();
    run_app_with_event_source(&mut terminal, app, &mut events).unwrap();
}

#[test]
fn reading_forward_crosses_the_empty_page() {
    let mut app = make_app(Box::new(Bookmarks::ephemeral()));
    // panel 1, panel 2, implicit panel of the empty page, first panel of
    // page 2
    run_script(&mut app, ScriptBuilder::new().forward(3).quit());

    assert_eq!(app.viewer().page(), 2);
    assert_eq!(app.viewer().panel(), 0);
}

#[test]
fn overshooting_the_end_stays_on_the_last_panel() {
    let mut app = make_app(Box::new(Bookmarks::ephemeral()));
    run_script(&mut app, ScriptBuilder::new().forward(20).quit());

    assert_eq!(app.viewer().page(), 2);
    assert_eq!(app.viewer().panel(), 1);
}

#[test]
fn going_back_from_page_two_lands_on_the_empty_page() {
    let store = Arc::new(Mutex::new(Bookmarks::ephemeral()));
    store.lock().unwrap().update("scripted.json", 2, false);

    let mut app = make_app(Box::new(Arc::clone(&store)));
    run_script(&mut app, ScriptBuilder::new().backward(1).quit());

    assert_eq!(app.viewer().page(), 1);
    assert_eq!(app.viewer().panel(), 0);

    // the backward page change was persisted
    assert_eq!(store.lock().unwrap().get("scripted.json").unwrap().page, 1);
}

#[test]
fn mode_toggle_and_resize_keep_the_session_alive() {
    let mut app = make_app(Box::new(Bookmarks::ephemeral()));
    let script = ScriptBuilder::new()
        .forward(1)
        .press_char('p')
        .resize(120, 40)
        .press_char('p')
        .quit();
    run_script(&mut app, script);

    // re-entering panel view restarts the page at its first panel
    assert_eq!(app.viewer().mode(), ViewMode::Panel);
    assert_eq!((app.viewer().page(), app.viewer().panel()), (0, 0));
}

#[test]
fn page_entry_script_jumps_to_the_requested_page() {
    let mut app = make_app(Box::new(Bookmarks::ephemeral()));
    let script = ScriptBuilder::new()
        .press_char('g')
        .press_char('3')
        .press(KeyCode::Enter)
        .quit();
    run_script(&mut app, script);

    assert_eq!(app.viewer().page(), 2);
}
