//! Terminal host: draws the page frame and panel overlays and drives the
//! viewer from key and mouse input.
//!
//! The host is a pure consumer of `ViewUpdate`s. It renders the page and
//! panel geometry into terminal cells; it never decides where the reader is.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Direction, Layout, Rect as CellRect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::geometry::{self, Rect, Size};
use crate::input::{Event, EventSource, Input, KeyCode, KeyEvent, KeyEventKind, map_key};
use crate::navigation::ViewMode;
use crate::theme::{DEFAULT_THEME, Theme};
use crate::viewer::{ViewTransform, ViewUpdate, Viewer};

pub struct App {
    viewer: Viewer,
    /// Backing store for the container-size provider the viewer holds; the
    /// draw pass keeps it current.
    container: Rc<Cell<Size>>,
    current: Option<ViewUpdate>,
    /// Digits typed so far in go-to-page entry, when active.
    page_entry: Option<String>,
    theme: &'static Theme,
    should_quit: bool,
}

impl App {
    pub fn new(viewer: Viewer, container: Rc<Cell<Size>>) -> Result<Self> {
        let mut app = Self {
            viewer,
            container,
            current: None,
            page_entry: None,
            theme: &DEFAULT_THEME,
            should_quit: false,
        };
        app.current = app.viewer.refresh()?;
        Ok(app)
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn current(&self) -> Option<&ViewUpdate> {
        self.current.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(f.area());
        let canvas = chunks[0];
        // the viewer queries this on every transition
        self.container
            .set(Size::new(f32::from(canvas.width), f32::from(canvas.height)));

        f.render_widget(
            Block::default().style(Style::default().bg(self.theme.background)),
            f.area(),
        );
        if let Some(update) = self.current.clone() {
            self.draw_page(f, canvas, &update);
        }
        self.draw_status(f, chunks[1]);
    }

    fn draw_page(&self, f: &mut Frame, canvas: CellRect, update: &ViewUpdate) {
        let Some(page) = self.viewer.comic().page(update.page) else {
            return;
        };
        let container = Size::new(f32::from(canvas.width), f32::from(canvas.height));
        let Ok(fitted) = geometry::fit_to_container(container, page.size) else {
            return;
        };

        // where the fitted page currently sits on screen
        let display = match update.transform {
            ViewTransform::Fit(rect) => rect,
            ViewTransform::Zoom(t) => t.apply(fitted),
        };
        if let Some(cells) = clip_to_cells(display, canvas) {
            let frame = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.page_frame));
            f.render_widget(frame, cells);
        }

        let k = fitted.width / page.size.width;
        for (i, panel) in page.panels.iter().enumerate() {
            let shown = Rect::new(
                panel.rect.x * k,
                panel.rect.y * k,
                panel.rect.width * k,
                panel.rect.height * k,
            );
            let shown = match update.transform {
                ViewTransform::Fit(_) => shown,
                ViewTransform::Zoom(t) => t.apply(shown),
            };
            let Some(cells) = clip_to_cells(shown, canvas) else {
                continue;
            };

            let color = if update.mode == ViewMode::Panel && i == update.panel {
                self.theme.panel_current
            } else if panel.verified {
                self.theme.panel_verified
            } else {
                self.theme.panel_border
            };
            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color));
            if self.viewer.debug() {
                // verification overlay: reading order plus pixel coordinates
                block = block.title(format!(" {} ", i + 1));
                if cells.width >= 16 {
                    block = block.title_bottom(format!(
                        " {}x{} @{},{} ",
                        panel.rect.width as u32,
                        panel.rect.height as u32,
                        panel.rect.x as u32,
                        panel.rect.y as u32,
                    ));
                }
            }
            f.render_widget(block, cells);
        }
    }

    fn draw_status(&self, f: &mut Frame, area: CellRect) {
        let Some(update) = &self.current else {
            return;
        };
        let theme = self.theme;

        let mut spans = vec![Span::styled(
            format!(" {}/{}", update.page + 1, update.page_count),
            Style::default().fg(theme.accent),
        )];
        if update.mode == ViewMode::Panel {
            spans.push(Span::styled(
                format!("  panel {}/{}", update.panel + 1, update.panel_span),
                Style::default().fg(theme.text),
            ));
            if update.verified {
                spans.push(Span::styled(
                    "  reviewed",
                    Style::default().fg(theme.panel_verified),
                ));
            }
        }
        let mode = match update.mode {
            ViewMode::Page => "page view",
            ViewMode::Panel => "panel view",
        };
        spans.push(Span::styled(
            format!("  [{mode}]"),
            Style::default().fg(theme.text_dim),
        ));
        spans.push(Span::styled(
            format!("  {}", self.viewer.image_path()),
            Style::default().fg(theme.text_dim),
        ));
        if let Some(license) = self
            .viewer
            .comic()
            .page(update.page)
            .and_then(|p| p.license.as_ref())
        {
            let attribution = license.attribution();
            if !attribution.is_empty() {
                spans.push(Span::styled(
                    format!("  {attribution}"),
                    Style::default().fg(theme.text_dim),
                ));
            }
        }
        if let Some(entry) = &self.page_entry {
            spans.push(Span::styled(
                format!("  go to page: {entry}_"),
                Style::default()
                    .fg(theme.panel_current)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        f.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.background)),
            area,
        );
    }

    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                // transforms are derived from the container at transition
                // time; a resize re-derives the current one
                self.container.set(Size::new(
                    f32::from(width),
                    f32::from(height.saturating_sub(1)),
                ));
                self.current = self.viewer.refresh()?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if self.page_entry.is_some() {
            return self.handle_page_entry_key(key);
        }
        match map_key(&key) {
            Some(Input::Forward) => self.update_with(Viewer::next),
            Some(Input::Backward) => self.update_with(Viewer::prev),
            Some(Input::NextPage) => self.update_with(Viewer::next_page),
            Some(Input::PrevPage) => self.update_with(Viewer::prev_page),
            Some(Input::ToggleViewMode) => self.update_with(Viewer::toggle_view_mode),
            Some(Input::ToggleDebug) => {
                self.viewer.toggle_debug();
                Ok(())
            }
            Some(Input::BeginPageEntry) => {
                self.page_entry = Some(String::new());
                Ok(())
            }
            Some(Input::Quit) => {
                self.should_quit = true;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn handle_page_entry_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Some(entry) = self.page_entry.as_mut() {
                    entry.push(c);
                }
                Ok(())
            }
            KeyCode::Backspace => {
                if let Some(entry) = self.page_entry.as_mut() {
                    entry.pop();
                }
                Ok(())
            }
            KeyCode::Enter => {
                let entry = self.page_entry.take();
                if let Some(n) = entry.as_deref().and_then(|t| t.parse::<usize>().ok()) {
                    // pages are entered 1-based
                    if n >= 1 {
                        self.update_with(|v| v.go_to_page(n - 1))?;
                    }
                }
                Ok(())
            }
            KeyCode::Esc => {
                self.page_entry = None;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.update_with(Viewer::next),
            MouseEventKind::Down(MouseButton::Right) => self.update_with(Viewer::prev),
            _ => Ok(()),
        }
    }

    fn update_with<F>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(&mut Viewer) -> Result<Option<ViewUpdate>>,
    {
        if let Some(update) = op(&mut self.viewer)? {
            self.current = Some(update);
        }
        Ok(())
    }
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut dyn EventSource,
) -> Result<()>
where
    <B as ratatui::backend::Backend>::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| app.draw(f))?;
        if events.poll(tick_rate)? {
            let event = events.read()?;
            app.handle_event(event)?;
        }
        if app.should_quit() {
            return Ok(());
        }
    }
}

fn clip_to_cells(r: Rect, area: CellRect) -> Option<CellRect> {
    let left = r.x.max(0.0);
    let top = r.y.max(0.0);
    let right = r.right().min(f32::from(area.width));
    let bottom = r.bottom().min(f32::from(area.height));
    if right - left < 1.0 || bottom - top < 1.0 {
        return None;
    }
    let cells = CellRect::new(
        area.x.saturating_add(left.round() as u16),
        area.y.saturating_add(top.round() as u16),
        (right - left).round() as u16,
        (bottom - top).round() as u16,
    )
    .intersection(area);
    if cells.width == 0 || cells.height == 0 {
        None
    } else {
        Some(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::Bookmarks;
    use crate::comic::Comic;
    use crate::input::SimulatedEventSource;
    use crate::viewer::ViewerOptions;

    fn test_app() -> App {
        let comic = Comic::from_json(
            "test.json",
            r#"[
                {"filename": "a.jpg", "size": [100, 200],
                 "panels": [[0, 0, 50, 200], [50, 0, 50, 200]]},
                {"filename": "b.jpg", "size": [100, 200],
                 "panels": [[0, 0, 100, 200]]}
            ]"#,
        )
        .unwrap();
        let container = Rc::new(Cell::new(Size::new(80.0, 23.0)));
        let provider = {
            let container = Rc::clone(&container);
            Box::new(move || container.get())
        };
        let viewer = Viewer::new(
            comic,
            ViewerOptions {
                images_base: "images/".to_string(),
                container: provider,
                store: Box::new(Bookmarks::ephemeral()),
                mode: ViewMode::Panel,
            },
        )
        .unwrap();
        App::new(viewer, container).unwrap()
    }

    #[test]
    fn clip_keeps_on_screen_rects_and_drops_offscreen_ones() {
        let area = CellRect::new(0, 0, 80, 24);
        let cells = clip_to_cells(Rect::new(2.0, 3.0, 10.0, 5.0), area).unwrap();
        assert_eq!((cells.x, cells.y), (2, 3));
        assert_eq!((cells.width, cells.height), (10, 5));

        // fully left of the viewport after a zoom
        assert!(clip_to_cells(Rect::new(-50.0, 0.0, 30.0, 10.0), area).is_none());
        // sliver thinner than a cell
        assert!(clip_to_cells(Rect::new(0.0, 0.0, 0.4, 10.0), area).is_none());
    }

    #[test]
    fn clip_trims_partially_visible_rects() {
        let area = CellRect::new(5, 2, 40, 20);
        let cells = clip_to_cells(Rect::new(-10.0, -4.0, 30.0, 12.0), area).unwrap();
        assert_eq!((cells.x, cells.y), (5, 2));
        assert_eq!((cells.width, cells.height), (20, 8));
    }

    #[test]
    fn forward_keys_advance_the_viewer() {
        let mut app = test_app();
        app.handle_event(SimulatedEventSource::char_key('j'))
            .unwrap();
        assert_eq!((app.viewer().page(), app.viewer().panel()), (0, 1));

        app.handle_event(SimulatedEventSource::key_event(KeyCode::Right))
            .unwrap();
        assert_eq!((app.viewer().page(), app.viewer().panel()), (1, 0));
    }

    #[test]
    fn page_entry_jumps_one_based() {
        let mut app = test_app();
        app.handle_event(SimulatedEventSource::char_key('g'))
            .unwrap();
        app.handle_event(SimulatedEventSource::char_key('2'))
            .unwrap();
        app.handle_event(SimulatedEventSource::key_event(KeyCode::Enter))
            .unwrap();
        assert_eq!(app.viewer().page(), 1);
        assert!(app.current().is_some());
    }

    #[test]
    fn quit_key_sets_the_flag() {
        let mut app = test_app();
        app.handle_event(SimulatedEventSource::char_key('q'))
            .unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn resize_rederives_the_transform() {
        let mut app = test_app();
        let before = app.current().cloned().unwrap();
        app.handle_event(SimulatedEventSource::resize(40, 12))
            .unwrap();
        let after = app.current().cloned().unwrap();
        assert_ne!(before.transform, after.transform);
        assert_eq!(before.page, after.page);
    }

    #[test]
    fn draws_without_panicking() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut app = test_app();
        terminal.draw(|f| app.draw(f)).unwrap();

        // zoomed into the second panel, then in page view
        app.handle_event(SimulatedEventSource::char_key('j'))
            .unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        app.handle_event(SimulatedEventSource::char_key('p'))
            .unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
    }
}
