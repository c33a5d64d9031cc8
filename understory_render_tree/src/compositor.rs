// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor backend abstraction used by [`Tree`][crate::Tree].

use core::fmt;

use crate::area::Area;

/// Graphics backend driven by the render walk.
///
/// A compositor owns three surfaces, all sized to the tree's maximum
/// dimensions:
///
/// - a *transient* surface that blocks draw into (for a GPU backend, usually
///   the window's back buffer),
/// - a *backing store* that accumulates the composited frame, and
/// - the *visible* surface that [`present`][Compositor::present] writes to.
///
/// For every block that draws, the tree calls [`begin_block`][Compositor::begin_block],
/// lets the block's handler draw, then [`blend_region`][Compositor::blend_region]
/// followed by [`copy_region`][Compositor::copy_region] over the block's area.
/// Once all blocks are visited it calls [`present`][Compositor::present] and
/// [`clear_backing_alpha`][Compositor::clear_backing_alpha] over the root area.
///
/// The backing store is never cleared as a whole; only its alpha is reset.
/// Pixels a block drew stay in the backing store, and are presented again,
/// until some block draws over them. When a block moves or shrinks, its old
/// pixels therefore persist unless something underneath redraws. Trees that
/// rearrange blocks usually give the root a handler that paints the background
/// each frame.
pub trait Compositor {
    /// Allocate the backing store (and any helper surfaces) at the given size.
    ///
    /// Called once from [`Tree::new`][crate::Tree::new]; an error aborts tree
    /// construction.
    fn create_backing_store(&mut self, width: u32, height: u32) -> Result<(), CompositorError>;

    /// Release everything allocated by [`create_backing_store`][Compositor::create_backing_store].
    fn destroy_backing_store(&mut self);

    /// Bind `area` of the transient surface as the drawing viewport and clear it
    /// to fully transparent.
    fn begin_block(&mut self, area: Area);

    /// Blend the backing store into the transient surface over `area`.
    ///
    /// The backing store is the source and the freshly drawn block content is
    /// the destination, combined additively with source factor
    /// `ONE_MINUS_DST_ALPHA` and destination factor `DST_ALPHA`. Opaque block
    /// pixels win; transparent ones let the previously composited content
    /// through.
    fn blend_region(&mut self, area: Area);

    /// Copy `area` of the transient surface into the backing store at the same
    /// coordinates.
    fn copy_region(&mut self, area: Area);

    /// Copy `area` of the backing store onto the visible surface.
    fn present(&mut self, area: Area);

    /// Reset the alpha channel of the backing store over `area` to zero.
    ///
    /// Color channels are kept, so the next frame's blend still sees the
    /// previous content wherever a block leaves pixels transparent.
    fn clear_backing_alpha(&mut self, area: Area);
}

/// Failure to acquire compositor resources.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompositorError {
    /// A requested surface has zero width or height.
    EmptySurface,
    /// A requested surface exceeds what the backend supports.
    SurfaceTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Maximum pixel count the backend accepts.
        limit: u64,
    },
    /// The backend could not complete the surface setup.
    Incomplete(&'static str),
}

impl fmt::Display for CompositorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySurface => f.write_str("backing store has an empty extent"),
            Self::SurfaceTooLarge {
                width,
                height,
                limit,
            } => write!(
                f,
                "backing store of {width}x{height} exceeds the limit of {limit} pixels"
            ),
            Self::Incomplete(reason) => write!(f, "backing store is incomplete: {reason}"),
        }
    }
}

impl core::error::Error for CompositorError {}
