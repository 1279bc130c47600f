//! Fit and zoom math for page and panel display.
//!
//! Everything here is a pure function of its inputs. Coordinates are `f32`:
//! page-image pixels on the document side, whatever client unit the host
//! renders in (terminal cells here) on the container side. The math never
//! cares which, only the ratios matter.

use thiserror::Error;

/// A zero-area input would turn the scale math into NaN/Inf, so it is
/// rejected up front instead.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("container has no area ({width}x{height})")]
    EmptyContainer { width: f32, height: f32 },
    #[error("page image has no area ({width}x{height})")]
    EmptyImage { width: f32, height: f32 },
    #[error("panel has no area ({width}x{height})")]
    EmptyPanel { width: f32, height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn has_area(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(self) -> f32 {
        self.y + self.height
    }
}

/// Scale plus offset, applied to the fitted page rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
}

impl Transform {
    /// Moves a rectangle from fitted display space into container space.
    pub fn apply(self, r: Rect) -> Rect {
        Rect::new(
            r.x * self.scale + self.translate_x,
            r.y * self.scale + self.translate_y,
            r.width * self.scale,
            r.height * self.scale,
        )
    }
}

/// The largest rectangle with `image`'s aspect ratio that fits inside
/// `container`, anchored at the origin.
pub fn fit_to_container(container: Size, image: Size) -> Result<Rect, GeometryError> {
    if !container.has_area() {
        return Err(GeometryError::EmptyContainer {
            width: container.width,
            height: container.height,
        });
    }
    if !image.has_area() {
        return Err(GeometryError::EmptyImage {
            width: image.width,
            height: image.height,
        });
    }

    let ratio = image.width / image.height;
    let mut width = container.width;
    let mut height = container.height;
    if width > height * ratio {
        // height is the binding constraint
        width = height * ratio;
    } else {
        height = width / ratio;
    }
    Ok(Rect::new(0.0, 0.0, width, height))
}

/// Transform that makes `panel` (given in page-image pixel space) fill the
/// container on its binding axis and sit centered on the other one.
///
/// The transform applies to the fitted page rectangle, i.e. the rect
/// `fit_to_container(container, page)` that the host is currently showing.
pub fn zoom_to_panel(container: Size, page: Size, panel: Rect) -> Result<Transform, GeometryError> {
    if !panel.size().has_area() {
        return Err(GeometryError::EmptyPanel {
            width: panel.width,
            height: panel.height,
        });
    }
    let fitted = fit_to_container(container, page)?;

    // panel rect as it sits within the fitted page
    let k = fitted.width / page.width;
    let shown = Rect::new(panel.x * k, panel.y * k, panel.width * k, panel.height * k);

    let scale_x = container.width / shown.width;
    let scale_y = container.height / shown.height;
    let scale = scale_x.min(scale_y);

    let mut translate_x = -shown.x * scale;
    let mut translate_y = -shown.y * scale;
    if scale_x <= scale_y {
        // width fills the container, center vertically
        translate_y += (container.height - shown.height * scale) / 2.0;
    } else {
        translate_x += (container.width - shown.width * scale) / 2.0;
    }

    Ok(Transform {
        scale,
        translate_x,
        translate_y,
    })
}
