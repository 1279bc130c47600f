//! Position state machine: which page and panel are on screen and how the
//! reader moves between them.
//!
//! The navigator owns the position exclusively. It never touches a rendering
//! surface and holds no reference to the comic; operations take `&Comic` and
//! run to completion synchronously. Out-of-range moves are rejected or
//! clamped, never errors.

use crate::comic::{Comic, Page};

/// Whole-page view or panel-by-panel view. Explicit state, never inferred
/// from what happens to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Page,
    Panel,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Page => ViewMode::Panel,
            ViewMode::Panel => ViewMode::Page,
        }
    }
}

/// Panel position within the current page.
///
/// `LastOfPage` exists only while a backward page crossing is in flight:
/// `goto_panel(-1)` sets it, and the page change it triggers resolves it to
/// the final panel of whatever page the reader lands on. After every
/// completed operation the panel is `Exact`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelIndex {
    Exact(usize),
    LastOfPage,
}

impl PanelIndex {
    /// Concrete index given the number of addressable panels on the page.
    pub fn resolve(self, span: usize) -> usize {
        match self {
            PanelIndex::Exact(i) => i,
            PanelIndex::LastOfPage => span.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewerState {
    pub page: usize,
    pub panel: PanelIndex,
    pub mode: ViewMode,
}

#[derive(Debug)]
pub struct Navigator {
    state: ViewerState,
}

impl Navigator {
    pub fn new(page: usize, mode: ViewMode) -> Self {
        Self {
            state: ViewerState {
                page,
                panel: PanelIndex::Exact(0),
                mode,
            },
        }
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn mode(&self) -> ViewMode {
        self.state.mode
    }

    pub fn page(&self) -> usize {
        self.state.page
    }

    /// Panel index with the sentinel resolved against the current page.
    pub fn panel(&self, comic: &Comic) -> usize {
        let span = comic.page(self.state.page).map_or(1, Page::panel_span);
        self.state.panel.resolve(span)
    }

    /// Jump to page `n`. Fails without touching the state when `n` is out of
    /// range. On success the panel resets to the first panel of the new page,
    /// unless a backward crossing is in flight, in which case it resolves to
    /// the last one.
    pub fn goto_page(&mut self, comic: &Comic, n: usize) -> bool {
        let Some(page) = comic.page(n) else {
            return false;
        };
        self.state.page = n;
        self.state.panel = match self.state.panel {
            PanelIndex::LastOfPage => PanelIndex::Exact(page.panel_span() - 1),
            PanelIndex::Exact(_) => PanelIndex::Exact(0),
        };
        true
    }

    pub fn next_page(&mut self, comic: &Comic) -> bool {
        match self.state.page.checked_add(1) {
            Some(n) => self.goto_page(comic, n),
            None => false,
        }
    }

    pub fn prev_page(&mut self, comic: &Comic) -> bool {
        match self.state.page.checked_sub(1) {
            Some(n) => self.goto_page(comic, n),
            None => false,
        }
    }

    /// Move to panel `i` of the current page, crossing a page boundary when
    /// `i` runs off either end. Returns whether the state changed.
    ///
    /// Running past the last panel of the last page, or before the first
    /// panel of the first page, leaves the position where it was.
    pub fn goto_panel(&mut self, comic: &Comic, i: i64) -> bool {
        let before = self.state;

        if i < 0 {
            self.state.panel = PanelIndex::LastOfPage;
            if !self.prev_page(comic) {
                // already on the first page: stay on its first panel
                self.state.panel = PanelIndex::Exact(0);
            }
        } else {
            let i = i as usize;
            let span = comic.page(self.state.page).map_or(1, Page::panel_span);
            if i < span {
                self.state.panel = PanelIndex::Exact(i);
            } else {
                // off the end of the page: cross forward, or stay put at the
                // end of the document
                self.next_page(comic);
            }
        }

        self.state != before
    }

    pub fn next_panel(&mut self, comic: &Comic) -> bool {
        let current = self.panel(comic) as i64;
        self.goto_panel(comic, current + 1)
    }

    pub fn prev_panel(&mut self, comic: &Comic) -> bool {
        let current = self.panel(comic) as i64;
        self.goto_panel(comic, current - 1)
    }

    /// Mode-aware advance: panels in panel view, whole pages in page view.
    pub fn next(&mut self, comic: &Comic) -> bool {
        match self.state.mode {
            ViewMode::Panel => self.next_panel(comic),
            ViewMode::Page => self.next_page(comic),
        }
    }

    pub fn prev(&mut self, comic: &Comic) -> bool {
        match self.state.mode {
            ViewMode::Panel => self.prev_panel(comic),
            ViewMode::Page => self.prev_page(comic),
        }
    }

    /// Entering panel view restarts at the first panel of the current page;
    /// leaving it keeps the position and only changes what gets presented.
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        let before = self.state;
        self.state.mode = mode;
        if mode == ViewMode::Panel {
            self.state.panel = PanelIndex::Exact(0);
        }
        self.state != before
    }
}
