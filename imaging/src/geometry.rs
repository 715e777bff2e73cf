//! Overlay geometry.
//!
//! The analysis service reports boxes in a resolution-independent 0..=1000
//! space. The video is drawn "cover" style (scaled until it fills the
//! container, centered, overflow cropped), so a box is mapped through the
//! same scale and centering offset to land on the right pixels.

/// Upper bound of the normalized coordinate space.
pub const NORMALIZED_EXTENT: i32 = 1000;

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Box in normalized space, order `[ymin, xmin, ymax, xmax]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub ymin: i32,
    pub xmin: i32,
    pub ymax: i32,
    pub xmax: i32,
}

impl BoundingBox {
    /// The whole frame.
    pub const FULL: Self = Self {
        ymin: 0,
        xmin: 0,
        ymax: NORMALIZED_EXTENT,
        xmax: NORMALIZED_EXTENT,
    };

    /// Values are clamped into range and each axis is ordered min..max.
    pub fn new(ymin: i32, xmin: i32, ymax: i32, xmax: i32) -> Self {
        let clamp = |v: i32| v.clamp(0, NORMALIZED_EXTENT);
        let (ymin, ymax) = (clamp(ymin), clamp(ymax));
        let (xmin, xmax) = (clamp(xmin), clamp(xmax));
        Self {
            ymin: ymin.min(ymax),
            xmin: xmin.min(xmax),
            ymax: ymin.max(ymax),
            xmax: xmin.max(xmax),
        }
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([ymin, xmin, ymax, xmax]: [i32; 4]) -> Self {
        Self::new(ymin, xmin, ymax, xmax)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.ymin, b.xmin, b.ymax, b.xmax]
    }
}

/// Axis-aligned rectangle in container pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Uniform scale plus centering offset that makes a source cover a container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl CoverFit {
    /// `None` while the source size is unknown (zero) or the container is empty.
    pub fn new(source: Size, container: Size) -> Option<Self> {
        if source.is_degenerate() || container.is_degenerate() {
            return None;
        }

        let fit = if container.aspect() > source.aspect() {
            let scale = container.width / source.width;
            Self {
                scale,
                offset_x: 0.0,
                offset_y: (container.height - source.height * scale) / 2.0,
            }
        } else {
            let scale = container.height / source.height;
            Self {
                scale,
                offset_x: (container.width - source.width * scale) / 2.0,
                offset_y: 0.0,
            }
        };
        Some(fit)
    }
}

/// Map a normalized box onto the container.
pub fn project(bbox: BoundingBox, source: Size, container: Size) -> Option<ScreenRect> {
    let fit = CoverFit::new(source, container)?;
    let extent = NORMALIZED_EXTENT as f32;

    let sx = source.width * fit.scale / extent;
    let sy = source.height * fit.scale / extent;

    Some(ScreenRect {
        left: bbox.xmin as f32 * sx + fit.offset_x,
        top: bbox.ymin as f32 * sy + fit.offset_y,
        width: (bbox.xmax - bbox.xmin) as f32 * sx,
        height: (bbox.ymax - bbox.ymin) as f32 * sy,
    })
}

/// Where the full frame lands in the container.
pub fn cover(source: Size, container: Size) -> Option<ScreenRect> {
    project(BoundingBox::FULL, source, container)
}
