// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Block descriptions, per-block storage, and the clamping rules that keep a
//! child inside its parent.

use alloc::boxed::Box;
use core::fmt;

use smallvec::SmallVec;

use crate::area::Area;
use crate::compositor::Compositor;
use crate::handler::BlockHandler;
use crate::types::BlockId;

/// A block to be inserted into a [`Tree`][crate::Tree].
///
/// The requested area is clamped into the parent on insertion.
///
/// ```rust
/// use understory_render_tree::backends::SoftwareCompositor;
/// use understory_render_tree::{Area, Block};
///
/// let block: Block<SoftwareCompositor> =
///     Block::new(Area::new(10, 10, 50, 20)).with_hover_render(true);
/// assert!(block.hover_triggers_render);
/// assert!(block.handler.is_none());
/// ```
pub struct Block<C: Compositor> {
    /// Requested area in absolute surface coordinates.
    pub area: Area,
    /// Behavior; `None` makes the block a pure layout container.
    pub handler: Option<Box<dyn BlockHandler<C>>>,
    /// Whether hover changes of this block request a render.
    pub hover_triggers_render: bool,
}

impl<C: Compositor> Block<C> {
    /// A handler-less block with the given requested area.
    pub fn new(area: Area) -> Self {
        Self {
            area,
            handler: None,
            hover_triggers_render: false,
        }
    }

    /// Attach a handler.
    pub fn with_handler(mut self, handler: impl BlockHandler<C> + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Attach an already boxed handler.
    pub fn with_boxed_handler(mut self, handler: Box<dyn BlockHandler<C>>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Set whether hover changes of this block request a render.
    pub fn with_hover_render(mut self, enabled: bool) -> Self {
        self.hover_triggers_render = enabled;
        self
    }
}

impl<C: Compositor> fmt::Debug for Block<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("area", &self.area)
            .field("has_handler", &self.handler.is_some())
            .field("hover_triggers_render", &self.hover_triggers_render)
            .finish()
    }
}

pub(crate) struct Node<C: Compositor> {
    pub(crate) generation: u32,
    pub(crate) parent: Option<BlockId>,
    pub(crate) children: SmallVec<[BlockId; 4]>,
    pub(crate) area: Area,
    pub(crate) handler: Option<Box<dyn BlockHandler<C>>>,
    pub(crate) hovered: bool,
    pub(crate) hover_triggers_render: bool,
}

impl<C: Compositor> Node<C> {
    pub(crate) fn new(block: Block<C>) -> Self {
        Self {
            generation: 0,
            parent: None,
            children: SmallVec::new(),
            area: block.area,
            handler: block.handler,
            hovered: false,
            hover_triggers_render: block.hover_triggers_render,
        }
    }
}

impl<C: Compositor> fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("generation", &self.generation)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("area", &self.area)
            .field("hovered", &self.hovered)
            .finish_non_exhaustive()
    }
}

/// Clamp a position along one axis so `[pos, pos + size]` stays inside
/// `[parent_pos, parent_pos + parent_size]`.
///
/// Positions before the parent snap to the parent's near edge; positions that
/// would overflow the far edge snap so both far edges align.
pub(crate) fn clamp_pos(pos: u32, size: u32, parent_pos: u32, parent_size: u32) -> u32 {
    let size = size.min(parent_size);
    if pos < parent_pos {
        parent_pos
    } else if u64::from(pos) + u64::from(size) <= u64::from(parent_pos) + u64::from(parent_size) {
        pos
    } else {
        parent_pos.saturating_add(parent_size - size)
    }
}

/// Clamp a whole area into `parent`: sizes first, then positions.
pub(crate) fn clamp_area(area: Area, parent: Area) -> Area {
    let width = area.width.min(parent.width);
    let height = area.height.min(parent.height);
    Area {
        pos_x: clamp_pos(area.pos_x, width, parent.pos_x, parent.width),
        pos_y: clamp_pos(area.pos_y, height, parent.pos_y, parent.height),
        width,
        height,
    }
}
