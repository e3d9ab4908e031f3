//! Geometric primitives and the coordinate mapping used to keep a video
//! overlay aligned with the content surface it is embedded in.
//!
//! Two coordinate spaces appear throughout:
//! - *normalized*: both components in [0, 1], relative to a container's
//!   width/height, origin top-left, y-down. Pointer events and video
//!   rectangles arrive in this space.
//! - *spatial*: the host scene's local units (or pixels, when the container
//!   size is a pixel size). Produced by [`normalized_to_spatial`].

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Euclidean length of the vector from the origin to this point.
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
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

    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    /// The full unit square [0,0,1,1].
    pub const UNIT: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };
}

/// Origin convention of the surface a secondary rect is positioned on.
///
/// Both conventions are y-down; they differ in which horizontal edge the
/// x offset is measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceOrigin {
    TopLeft,
    TopRight,
}

/// Offset + scale pair placing the secondary (video) surface within its
/// container, in normalized container units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SecondaryLayout {
    pub offset: Point,
    pub scale: Size,
}

/// Converts a normalized point into the container's spatial units.
///
/// Elementwise product; pure, no error cases.
pub fn normalized_to_spatial(point: Point, container: Size) -> Point {
    Point {
        x: point.x * container.width,
        y: point.y * container.height,
    }
}

/// Computes the sub-rectangle of the video's own texture space that should
/// remain visible when `video_rect` (normalized, relative to its container)
/// extends outside the [0,1]x[0,1] container bounds.
///
/// Returns:
/// - `None` when no video is visible at all - a degenerate rect (zero width
///   or height) or one lying entirely outside the container.
/// - `Some(Rect::ZERO)` when the whole video is visible and no cropping is
///   needed. The all-zero rect is a sentinel, not a cropped region.
/// - `Some(region)` otherwise, with the region in the video's texture space.
pub fn compute_crop_rect(video_rect: Rect) -> Option<Rect> {
    // Zero-size input would divide by zero below; nothing to show.
    if video_rect.width == 0.0 || video_rect.height == 0.0 {
        return None;
    }

    let x_min = (-video_rect.x / video_rect.width).max(0.0);
    let y_min = (-video_rect.y / video_rect.height).max(0.0);
    let x_max = ((1.0 - video_rect.x) / video_rect.width).min(1.0);
    let y_max = ((1.0 - video_rect.y) / video_rect.height).min(1.0);

    if x_max <= x_min || y_max <= y_min {
        return None;
    }

    let crop = Rect {
        x: x_min,
        y: y_min,
        width: x_max - x_min,
        height: y_max - y_min,
    };
    if crop == Rect::UNIT {
        Some(Rect::ZERO)
    } else {
        Some(crop)
    }
}

/// Positions the secondary surface inside its container.
///
/// `video_rect` is normalized, origin top-left, y-down. The returned offset
/// is expressed for the requested origin convention: a top-right origin
/// mirrors the x offset so the same rect lands on the same spot of a surface
/// whose u axis runs right-to-left.
pub fn position_secondary_rect(video_rect: Rect, origin: SurfaceOrigin) -> SecondaryLayout {
    let x = match origin {
        SurfaceOrigin::TopLeft => video_rect.x,
        SurfaceOrigin::TopRight => 1.0 - video_rect.x - video_rect.width,
    };
    SecondaryLayout {
        offset: Point { x, y: video_rect.y },
        scale: Size {
            width: video_rect.width,
            height: video_rect.height,
        },
    }
}
