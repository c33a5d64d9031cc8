// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::{vec, vec::Vec};
use core::fmt;
use core::ops::Range;

use crate::area::Area;
use crate::compositor::{Compositor, CompositorError};

/// A straight-alpha color with `f32` channels in `[0, 1]`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a color from all four channels.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color.
    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// `source * (1 - destination.a) + destination * destination.a`, per channel.
    fn blend(source: Self, destination: Self) -> Self {
        let s = 1.0 - destination.a;
        let d = destination.a;
        Self {
            r: source.r * s + destination.r * d,
            g: source.g * s + destination.g * d,
            b: source.b * s + destination.b * d,
            a: source.a * s + destination.a * d,
        }
    }
}

/// CPU compositor over three equally sized pixel buffers.
///
/// Handlers draw with [`fill`][Self::fill] and [`fill_rect`][Self::fill_rect]
/// while their block's viewport is bound; drawing is clipped to it.
/// Pixels are addressed row-major from the origin, matching [`Area`].
pub struct SoftwareCompositor {
    pixel_limit: u64,
    width: u32,
    height: u32,
    viewport: Option<Area>,
    transient: Vec<Rgba>,
    backing: Vec<Rgba>,
    visible: Vec<Rgba>,
}

impl fmt::Debug for SoftwareCompositor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwareCompositor")
            .field("pixel_limit", &self.pixel_limit)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

impl Default for SoftwareCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareCompositor {
    /// Largest surface accepted by [`SoftwareCompositor::new`], in pixels (8192 × 8192).
    pub const DEFAULT_PIXEL_LIMIT: u64 = 1 << 26;

    /// A compositor accepting surfaces up to [`Self::DEFAULT_PIXEL_LIMIT`].
    pub fn new() -> Self {
        Self::with_pixel_limit(Self::DEFAULT_PIXEL_LIMIT)
    }

    /// A compositor accepting surfaces of at most `limit` pixels.
    pub fn with_pixel_limit(limit: u64) -> Self {
        Self {
            pixel_limit: limit,
            width: 0,
            height: 0,
            viewport: None,
            transient: Vec::new(),
            backing: Vec::new(),
            visible: Vec::new(),
        }
    }

    /// Width of the allocated surfaces, or 0 before allocation.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the allocated surfaces, or 0 before allocation.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The viewport bound by the last `begin_block`.
    pub fn viewport(&self) -> Option<Area> {
        self.viewport
    }

    /// Fill the whole bound viewport. Does nothing if no viewport is bound.
    pub fn fill(&mut self, color: Rgba) {
        if let Some(viewport) = self.viewport {
            self.fill_area(viewport, color);
        }
    }

    /// Fill `area` intersected with the bound viewport.
    pub fn fill_rect(&mut self, area: Area, color: Rgba) {
        if let Some(viewport) = self.viewport {
            self.fill_area(intersect(area, viewport), color);
        }
    }

    /// Read a pixel of the surface blocks draw into.
    pub fn transient_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixel(&self.transient, x, y)
    }

    /// Read a pixel of the backing store.
    pub fn backing_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixel(&self.backing, x, y)
    }

    /// Read a pixel of the presented surface.
    pub fn visible_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixel(&self.visible, x, y)
    }

    fn pixel(&self, buffer: &[Rgba], x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        buffer
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    fn fill_area(&mut self, area: Area, color: Rgba) {
        for span in spans(self.width, self.height, area) {
            self.transient[span].fill(color);
        }
    }
}

impl Compositor for SoftwareCompositor {
    fn create_backing_store(&mut self, width: u32, height: u32) -> Result<(), CompositorError> {
        if width == 0 || height == 0 {
            return Err(CompositorError::EmptySurface);
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.pixel_limit {
            return Err(CompositorError::SurfaceTooLarge {
                width,
                height,
                limit: self.pixel_limit,
            });
        }
        let len = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.viewport = None;
        self.transient = vec![Rgba::TRANSPARENT; len];
        self.backing = vec![Rgba::TRANSPARENT; len];
        self.visible = vec![Rgba::TRANSPARENT; len];
        tracing::debug!(width, height, "software backing store allocated");
        Ok(())
    }

    fn destroy_backing_store(&mut self) {
        self.width = 0;
        self.height = 0;
        self.viewport = None;
        self.transient = Vec::new();
        self.backing = Vec::new();
        self.visible = Vec::new();
    }

    fn begin_block(&mut self, area: Area) {
        self.viewport = Some(area);
        self.fill_area(area, Rgba::TRANSPARENT);
    }

    fn blend_region(&mut self, area: Area) {
        for span in spans(self.width, self.height, area) {
            for (dst, src) in self.transient[span.clone()]
                .iter_mut()
                .zip(&self.backing[span])
            {
                *dst = Rgba::blend(*src, *dst);
            }
        }
    }

    fn copy_region(&mut self, area: Area) {
        for span in spans(self.width, self.height, area) {
            self.backing[span.clone()].copy_from_slice(&self.transient[span]);
        }
    }

    fn present(&mut self, area: Area) {
        for span in spans(self.width, self.height, area) {
            self.visible[span.clone()].copy_from_slice(&self.backing[span]);
        }
    }

    fn clear_backing_alpha(&mut self, area: Area) {
        for span in spans(self.width, self.height, area) {
            for px in &mut self.backing[span] {
                px.a = 0.0;
            }
        }
    }
}

/// Clip `[pos, pos + len)` to `[0, limit)`.
fn clip(pos: u32, len: u32, limit: u32) -> Range<u32> {
    pos.min(limit)..pos.saturating_add(len).min(limit)
}

/// Row-major index ranges covered by `area` on a `width` × `height` buffer.
fn spans(width: u32, height: u32, area: Area) -> impl Iterator<Item = Range<usize>> {
    let xs = clip(area.pos_x, area.width, width);
    let rows = clip(area.pos_y, area.height, height);
    let stride = width as usize;
    rows.map(move |y| {
        let row = y as usize * stride;
        row + xs.start as usize..row + xs.end as usize
    })
}

fn intersect(a: Area, b: Area) -> Area {
    let x0 = a.pos_x.max(b.pos_x);
    let y0 = a.pos_y.max(b.pos_y);
    let x1 = a.max_x().min(b.max_x());
    let y1 = a.max_y().min(b.max_y());
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Extents are bounded by one of the input extents."
    )]
    let (width, height) = (
        x1.saturating_sub(u64::from(x0)) as u32,
        y1.saturating_sub(u64::from(y0)) as u32,
    );
    Area::new(x0, y0, width, height)
}
