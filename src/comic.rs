//! Comic document model and descriptor parsing.
//!
//! A comic arrives as a JSON array of page entries produced by a panel
//! segmenter: image filename, pixel size, ordered panel rectangles, plus
//! optional license metadata. Panel order is reading order and is taken as
//! given. Documents are loaded once and never mutated afterwards.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::geometry::{Rect, Size};

/// Free-form attribution for a page image. Any subset of fields may be set.
#[derive(Debug, Clone, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl License {
    /// One-line attribution for the status bar, joining whatever is present.
    pub fn attribution(&self) -> String {
        let parts: Vec<&str> = [&self.name, &self.author, &self.source, &self.url]
            .iter()
            .filter_map(|field| field.as_deref())
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(" / ")
    }
}

/// One reading unit on a page. `verified` marks rectangles that came from a
/// reviewed source rather than the automated detector; it only affects
/// styling, never navigation.
#[derive(Debug, Clone)]
pub struct Panel {
    pub rect: Rect,
    pub verified: bool,
}

#[derive(Debug, Clone)]
pub struct Page {
    /// Image reference as it appears in the descriptor, possibly a path.
    pub image: String,
    /// Pixel size of the page image; panel rects live in this space.
    pub size: Size,
    pub panels: Vec<Panel>,
    pub license: Option<License>,
}

impl Page {
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Panels the navigator can address. A page without any detected panels
    /// still exposes one implicit panel covering the whole page, so panel
    /// navigation never dead-ends on it.
    pub fn panel_span(&self) -> usize {
        self.panels.len().max(1)
    }

    /// Rectangle to zoom on for panel `i`, in page pixel space.
    pub fn panel_zoom_rect(&self, i: usize) -> Option<Rect> {
        if let Some(panel) = self.panels.get(i) {
            Some(panel.rect)
        } else if self.panels.is_empty() && i == 0 {
            Some(Rect::new(0.0, 0.0, self.size.width, self.size.height))
        } else {
            None
        }
    }
}

/// The full ordered document. Identified by a stable key (its source path)
/// that the bookmark store uses to find resumable progress.
#[derive(Debug, Clone)]
pub struct Comic {
    key: String,
    pages: Vec<Page>,
}

/// Wire format of one page entry. Extra fields a segmenter may emit
/// (background, gutters, numbering, timings) are ignored.
#[derive(Debug, Deserialize)]
struct PageDescriptor {
    filename: String,
    size: [f32; 2],
    #[serde(default)]
    panels: Vec<[f32; 4]>,
    #[serde(default)]
    known_panels: Vec<usize>,
    #[serde(default)]
    license: Option<License>,
}

impl Comic {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read comic descriptor {}", path.display()))?;
        Self::from_json(&path.to_string_lossy(), &content)
    }

    pub fn from_json(key: &str, json: &str) -> Result<Self> {
        let descriptors: Vec<PageDescriptor> =
            serde_json::from_str(json).context("comic descriptor is not valid JSON")?;
        Self::from_descriptors(key, descriptors)
    }

    fn from_descriptors(key: &str, descriptors: Vec<PageDescriptor>) -> Result<Self> {
        if descriptors.is_empty() {
            bail!("comic descriptor has no pages");
        }

        let mut pages = Vec::with_capacity(descriptors.len());
        for (page_no, d) in descriptors.into_iter().enumerate() {
            let size = Size::new(d.size[0], d.size[1]);
            if size.width <= 0.0 || size.height <= 0.0 {
                bail!(
                    "page {page_no}: image size {}x{} has no area",
                    size.width,
                    size.height
                );
            }

            let mut panels = Vec::with_capacity(d.panels.len());
            for (i, [x, y, w, h]) in d.panels.iter().copied().enumerate() {
                if w <= 0.0 || h <= 0.0 {
                    bail!("page {page_no} panel {i}: rectangle {w}x{h} has no area");
                }
                if x < 0.0 || y < 0.0 || x + w > size.width || y + h > size.height {
                    bail!("page {page_no} panel {i}: rectangle lies outside the page image");
                }
                panels.push(Panel {
                    rect: Rect::new(x, y, w, h),
                    verified: d.known_panels.contains(&i),
                });
            }

            pages.push(Page {
                image: d.filename,
                size,
                panels,
                license: d.license,
            });
        }

        Ok(Self {
            key: key.to_string(),
            pages,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn panel_count(&self, page: usize) -> usize {
        self.pages.get(page).map_or(0, Page::panel_count)
    }

    pub fn panel(&self, page: usize, index: usize) -> Option<&Panel> {
        self.pages.get(page)?.panels.get(index)
    }
}
