// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer block geometry and its parent-relative normalized view.

use kurbo::Rect;

/// Axis-aligned rectangle in surface pixels.
///
/// Positions are absolute surface coordinates, not offsets from the parent.
/// Equality is structural.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Area {
    /// Left edge.
    pub pos_x: u32,
    /// Bottom (or top, depending on the surface convention) edge.
    pub pos_y: u32,
    /// Extent along x.
    pub width: u32,
    /// Extent along y.
    pub height: u32,
}

impl Area {
    /// The empty area at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create an area from its origin and size.
    #[inline]
    pub const fn new(pos_x: u32, pos_y: u32, width: u32, height: u32) -> Self {
        Self {
            pos_x,
            pos_y,
            width,
            height,
        }
    }

    /// Far x edge (`pos_x + width`), widened so it cannot overflow.
    #[inline]
    pub const fn max_x(&self) -> u64 {
        self.pos_x as u64 + self.width as u64
    }

    /// Far y edge (`pos_y + height`), widened so it cannot overflow.
    #[inline]
    pub const fn max_y(&self) -> u64 {
        self.pos_y as u64 + self.height as u64
    }

    /// Whether the area covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the point lies inside the area.
    ///
    /// Both edges are inclusive: `pos_x <= x <= pos_x + width`, and likewise for y.
    /// A point on the boundary shared by two adjacent areas is contained by both.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        let (x0, y0) = (i64::from(self.pos_x), i64::from(self.pos_y));
        #[allow(
            clippy::cast_possible_wrap,
            reason = "Far edges are at most 2 * u32::MAX and fit in i64."
        )]
        let (x1, y1) = (self.max_x() as i64, self.max_y() as i64);
        x0 <= x && x <= x1 && y0 <= y && y <= y1
    }

    /// Whether `other` lies entirely inside this area (edges may touch).
    #[inline]
    pub fn contains_area(&self, other: &Self) -> bool {
        self.pos_x <= other.pos_x
            && self.pos_y <= other.pos_y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }

    /// Express this area as fractions of `parent`.
    ///
    /// Positions are measured from the parent's origin. A zero-sized parent
    /// dimension yields `0.0` for the matching components.
    pub fn normalized_in(&self, parent: &Self) -> NormalizedArea {
        fn ratio(value: u32, whole: u32) -> f32 {
            if whole == 0 {
                0.0
            } else {
                value as f32 / whole as f32
            }
        }
        NormalizedArea {
            pos_x: ratio(self.pos_x.saturating_sub(parent.pos_x), parent.width),
            pos_y: ratio(self.pos_y.saturating_sub(parent.pos_y), parent.height),
            width: ratio(self.width, parent.width),
            height: ratio(self.height, parent.height),
        }
    }

    /// The same rectangle as a Kurbo [`Rect`].
    #[inline]
    pub fn to_rect(&self) -> Rect {
        let x0 = f64::from(self.pos_x);
        let y0 = f64::from(self.pos_y);
        Rect::new(
            x0,
            y0,
            x0 + f64::from(self.width),
            y0 + f64::from(self.height),
        )
    }
}

impl From<Area> for Rect {
    fn from(area: Area) -> Self {
        area.to_rect()
    }
}

/// An [`Area`] expressed as fractions of its parent's area.
///
/// Derived on demand; blocks never store it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NormalizedArea {
    /// Offset from the parent's left edge, in parent widths.
    pub pos_x: f32,
    /// Offset from the parent's origin along y, in parent heights.
    pub pos_y: f32,
    /// Width in parent widths.
    pub width: f32,
    /// Height in parent heights.
    pub height: f32,
}

/// Scale a length by a fraction clamped to `[0, 1]`.
pub(crate) fn scale_length(length: u32, fraction: f32) -> u32 {
    let fraction = fraction.clamp(0.0, 1.0);
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "The product lies in [0, length] after clamping; NaN saturates to 0."
    )]
    let scaled = (length as f32 * fraction) as u32;
    scaled.min(length)
}
