//! Input handling: the event-source abstraction plus the key map that turns
//! terminal events into viewer actions.

use anyhow::Result;
pub use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Advance: next panel in panel view, next page in page view.
    Forward,
    Backward,
    NextPage,
    PrevPage,
    ToggleViewMode,
    ToggleDebug,
    BeginPageEntry,
    Quit,
}

/// Key map for normal reading mode. Page-number entry is modal and handled
/// by the app directly.
pub fn map_key(key: &KeyEvent) -> Option<Input> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Right | KeyCode::Down | KeyCode::Char(' ') | KeyCode::Char('l')
        | KeyCode::Char('j') => Some(Input::Forward),
        KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
            Some(Input::Backward)
        }
        KeyCode::PageDown => Some(Input::NextPage),
        KeyCode::PageUp => Some(Input::PrevPage),
        KeyCode::Char('p') => Some(Input::ToggleViewMode),
        KeyCode::Char('d') => Some(Input::ToggleDebug),
        KeyCode::Char('g') => Some(Input::BeginPageEntry),
        KeyCode::Char('q') | KeyCode::Esc => Some(Input::Quit),
        _ => None,
    }
}

/// Trait for abstracting event sources to enable testing
pub trait EventSource {
    /// Poll for events with a timeout
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read the next event
    fn read(&mut self) -> Result<Event>;
}

/// Real keyboard/mouse event source using crossterm
pub struct KeyboardEventSource;

impl EventSource for KeyboardEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(crossterm::event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(crossterm::event::read()?)
    }
}

/// Scripted event source for tests.
pub struct SimulatedEventSource {
    events: Vec<Event>,
    current_index: usize,
}

impl SimulatedEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            current_index: 0,
        }
    }

    pub fn key_event(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::empty(),
        })
    }

    pub fn char_key(c: char) -> Event {
        Self::key_event(KeyCode::Char(c))
    }

    pub fn resize(width: u16, height: u16) -> Event {
        Event::Resize(width, height)
    }
}

impl EventSource for SimulatedEventSource {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(self.current_index < self.events.len())
    }

    fn read(&mut self) -> Result<Event> {
        if self.current_index < self.events.len() {
            let event = self.events[self.current_index].clone();
            self.current_index += 1;
            Ok(event)
        } else {
            // exhausted scripts quit rather than hang the loop
            Ok(SimulatedEventSource::char_key('q'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::empty(),
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::empty(),
        }
    }

    #[test]
    fn arrows_and_vim_keys_map_to_movement() {
        assert_eq!(map_key(&press(KeyCode::Right)), Some(Input::Forward));
        assert_eq!(map_key(&press(KeyCode::Char(' '))), Some(Input::Forward));
        assert_eq!(map_key(&press(KeyCode::Char('j'))), Some(Input::Forward));
        assert_eq!(map_key(&press(KeyCode::Left)), Some(Input::Backward));
        assert_eq!(map_key(&press(KeyCode::Char('k'))), Some(Input::Backward));
        assert_eq!(map_key(&press(KeyCode::PageDown)), Some(Input::NextPage));
        assert_eq!(map_key(&press(KeyCode::PageUp)), Some(Input::PrevPage));
    }

    #[test]
    fn mode_and_session_keys_map() {
        assert_eq!(
            map_key(&press(KeyCode::Char('p'))),
            Some(Input::ToggleViewMode)
        );
        assert_eq!(
            map_key(&press(KeyCode::Char('d'))),
            Some(Input::ToggleDebug)
        );
        assert_eq!(
            map_key(&press(KeyCode::Char('g'))),
            Some(Input::BeginPageEntry)
        );
        assert_eq!(map_key(&press(KeyCode::Char('q'))), Some(Input::Quit));
        assert_eq!(map_key(&press(KeyCode::Esc)), Some(Input::Quit));
        assert_eq!(map_key(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut key = press(KeyCode::Right);
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(&key), None);
    }

    #[test]
    fn simulated_source_replays_in_order_then_quits() {
        let mut source = SimulatedEventSource::new(vec![
            SimulatedEventSource::char_key('j'),
            SimulatedEventSource::resize(120, 40),
        ]);

        assert!(source.poll(Duration::from_millis(0)).unwrap());
        assert!(matches!(source.read().unwrap(), Event::Key(_)));
        assert!(matches!(source.read().unwrap(), Event::Resize(120, 40)));

        assert!(!source.poll(Duration::from_millis(0)).unwrap());
        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('q'));
        }
    }
}
