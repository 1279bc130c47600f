//! Viewer facade: ties the comic, the navigator, and the bookmark store
//! together and hands the host one committed update per transition.
//!
//! The facade never touches a rendering surface. The host binds its input to
//! the operations here, applies the transform from the resulting
//! `ViewUpdate`, and owns any animation toward it. Calls faster than the
//! host can animate simply supersede each other; every call still runs
//! atomically against the current state.

use anyhow::{Context, Result, bail};
use log::{debug, info};

use crate::bookmark::{Progress, ProgressStore};
use crate::comic::Comic;
use crate::geometry::{self, Rect, Size, Transform};
use crate::navigation::{Navigator, ViewMode, ViewerState};

/// What the host applies to the page image it is showing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewTransform {
    /// Whole-page view: the fitted page rectangle, anchored at the origin.
    Fit(Rect),
    /// Panel view: scale plus offset for the current panel, relative to the
    /// fitted page rectangle.
    Zoom(Transform),
}

/// Committed transition, emitted after every position or mode change.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewUpdate {
    pub page: usize,
    pub page_count: usize,
    /// Resolved panel index; pages without detected panels report their one
    /// implicit full-page panel.
    pub panel: usize,
    pub panel_span: usize,
    pub mode: ViewMode,
    /// Whether the current panel rectangle came from a reviewed source.
    pub verified: bool,
    pub transform: ViewTransform,
}

pub type ChangeListener = Box<dyn FnMut(&ViewUpdate)>;

/// Collaborators the viewer is wired to at construction.
pub struct ViewerOptions {
    /// Where the page images live; joined with descriptor filenames.
    pub images_base: String,
    /// Queried on every transition, so viewport resizes between calls are
    /// picked up without any caching.
    pub container: Box<dyn Fn() -> Size>,
    pub store: Box<dyn ProgressStore>,
    /// View mode to start in; the persisted state only covers the page and
    /// the debug flag.
    pub mode: ViewMode,
}

pub struct Viewer {
    comic: Comic,
    images_base: String,
    container: Box<dyn Fn() -> Size>,
    store: Box<dyn ProgressStore>,
    nav: Navigator,
    debug: bool,
    on_change: Option<ChangeListener>,
}

impl Viewer {
    /// Fails on configuration errors only; a previously saved position that
    /// no longer fits the document reads as no prior state.
    pub fn new(comic: Comic, options: ViewerOptions) -> Result<Self> {
        if options.images_base.is_empty() {
            bail!("no images directory configured");
        }
        if comic.page_count() == 0 {
            bail!("comic has no pages");
        }

        let (page, debug) = match options.store.load(comic.key()) {
            Some(progress) if progress.page < comic.page_count() => {
                info!(
                    "Resuming {} at page {}",
                    comic.key(),
                    progress.page + 1
                );
                (progress.page, progress.debug)
            }
            Some(progress) => {
                info!(
                    "Saved page {} is out of range for {}, starting over",
                    progress.page + 1,
                    comic.key()
                );
                (0, progress.debug)
            }
            None => (0, false),
        };

        Ok(Self {
            nav: Navigator::new(page, options.mode),
            comic,
            images_base: options.images_base,
            container: options.container,
            store: options.store,
            debug,
            on_change: None,
        })
    }

    pub fn comic(&self) -> &Comic {
        &self.comic
    }

    pub fn state(&self) -> ViewerState {
        self.nav.state()
    }

    pub fn page(&self) -> usize {
        self.nav.page()
    }

    pub fn panel(&self) -> usize {
        self.nav.panel(&self.comic)
    }

    pub fn mode(&self) -> ViewMode {
        self.nav.mode()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_on_change(&mut self, listener: ChangeListener) {
        self.on_change = Some(listener);
    }

    /// Path of the current page image under the configured images base.
    pub fn image_path(&self) -> String {
        let image = self
            .comic
            .page(self.nav.page())
            .map(|p| p.image.as_str())
            .unwrap_or_default();
        let name = image.rsplit('/').next().unwrap_or(image);
        format!("{}/{}", self.images_base.trim_end_matches('/'), name)
    }

    /// Mode-aware advance; the single entry point for "forward" input.
    pub fn next(&mut self) -> Result<Option<ViewUpdate>> {
        let before_page = self.nav.page();
        let moved = self.nav.next(&self.comic);
        self.commit(moved, before_page)
    }

    /// Mode-aware retreat; the single entry point for "back" input.
    pub fn prev(&mut self) -> Result<Option<ViewUpdate>> {
        let before_page = self.nav.page();
        let moved = self.nav.prev(&self.comic);
        self.commit(moved, before_page)
    }

    pub fn next_page(&mut self) -> Result<Option<ViewUpdate>> {
        let before_page = self.nav.page();
        let moved = self.nav.next_page(&self.comic);
        self.commit(moved, before_page)
    }

    pub fn prev_page(&mut self) -> Result<Option<ViewUpdate>> {
        let before_page = self.nav.page();
        let moved = self.nav.prev_page(&self.comic);
        self.commit(moved, before_page)
    }

    pub fn go_to_page(&mut self, n: usize) -> Result<Option<ViewUpdate>> {
        let before = self.nav.state();
        let moved = self.nav.goto_page(&self.comic, n);
        self.commit(moved && self.nav.state() != before, before.page)
    }

    pub fn next_panel(&mut self) -> Result<Option<ViewUpdate>> {
        let before_page = self.nav.page();
        let moved = self.nav.next_panel(&self.comic);
        self.commit(moved, before_page)
    }

    pub fn prev_panel(&mut self) -> Result<Option<ViewUpdate>> {
        let before_page = self.nav.page();
        let moved = self.nav.prev_panel(&self.comic);
        self.commit(moved, before_page)
    }

    pub fn go_to_panel(&mut self, i: usize) -> Result<Option<ViewUpdate>> {
        let before_page = self.nav.page();
        let moved = self.nav.goto_panel(&self.comic, i as i64);
        self.commit(moved, before_page)
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> Result<Option<ViewUpdate>> {
        let before_page = self.nav.page();
        let moved = self.nav.set_view_mode(mode);
        self.commit(moved, before_page)
    }

    pub fn toggle_view_mode(&mut self) -> Result<Option<ViewUpdate>> {
        self.set_view_mode(self.nav.mode().toggled())
    }

    /// Flip the debug overlay flag and persist it with the current page.
    pub fn toggle_debug(&mut self) -> bool {
        self.debug = !self.debug;
        self.persist();
        self.debug
    }

    /// Re-derive the transform for the current position against a freshly
    /// queried container, e.g. after the host's viewport was resized.
    pub fn refresh(&mut self) -> Result<Option<ViewUpdate>> {
        let update = self.current_update()?;
        if let Some(listener) = self.on_change.as_mut() {
            listener(&update);
        }
        Ok(Some(update))
    }

    fn commit(&mut self, moved: bool, before_page: usize) -> Result<Option<ViewUpdate>> {
        if !moved {
            return Ok(None);
        }
        if self.nav.page() != before_page {
            self.persist();
        }
        let update = self.current_update()?;
        debug!(
            "view update: page {}/{} panel {}/{} ({:?})",
            update.page + 1,
            update.page_count,
            update.panel + 1,
            update.panel_span,
            update.mode
        );
        if let Some(listener) = self.on_change.as_mut() {
            listener(&update);
        }
        Ok(Some(update))
    }

    fn persist(&mut self) {
        let progress = Progress {
            page: self.nav.page(),
            debug: self.debug,
        };
        self.store.save(self.comic.key(), progress);
    }

    fn current_update(&self) -> Result<ViewUpdate> {
        let state = self.nav.state();
        let page = self
            .comic
            .page(state.page)
            .context("current page is out of range")?;
        let panel = self.nav.panel(&self.comic);
        let container = (self.container)();

        let transform = match state.mode {
            ViewMode::Page => ViewTransform::Fit(geometry::fit_to_container(container, page.size)?),
            ViewMode::Panel => {
                let rect = page
                    .panel_zoom_rect(panel)
                    .context("current panel is out of range")?;
                ViewTransform::Zoom(geometry::zoom_to_panel(container, page.size, rect)?)
            }
        };

        Ok(ViewUpdate {
            page: state.page,
            page_count: self.comic.page_count(),
            panel,
            panel_span: page.panel_span(),
            mode: state.mode,
            verified: page.panels.get(panel).is_some_and(|p| p.verified),
            transform,
        })
    }
}
