// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable block behavior and the contexts handed to it.
//!
//! A block without a handler is a pure layout container: it never draws and
//! ignores input. Everything a handler may touch is reached through the
//! context argument, which is bound to the handler's own block.

use core::fmt;

use smallvec::SmallVec;

use crate::area::{Area, NormalizedArea};
use crate::compositor::Compositor;
use crate::tree::Tree;
use crate::types::{BlockId, KeyEvent, MouseInfo, TreeInfo};

/// Callbacks a block can react to. Every method defaults to a no-op.
///
/// The tree calls these during its walks:
///
/// - [`render`][Self::render] from [`Tree::render`] while the block's
///   viewport is bound and cleared.
/// - [`area_changed`][Self::area_changed] when an ancestor's geometry changed,
///   before the block is re-clamped against its parent.
/// - [`hover_changed`][Self::hover_changed] after the block's hover flag flipped.
/// - the input callbacks for every block, depth-first, on each input event.
pub trait BlockHandler<C: Compositor> {
    /// Draw into the bound viewport. Return `true` if anything was drawn.
    fn render(&mut self, cx: &mut RenderCx<'_, C>) -> bool {
        let _ = cx;
        false
    }

    /// React to a change of the parent's (or an ancestor's) area.
    fn area_changed(&mut self, cx: &mut BlockCx<'_, C>) {
        let _ = cx;
    }

    /// React to the hover flag flipping; read the new state with [`BlockCx::is_hovered`].
    fn hover_changed(&mut self, cx: &mut BlockCx<'_, C>) {
        let _ = cx;
    }

    /// React to cursor movement; position and delta are in [`BlockCx::mouse`].
    fn pointer_moved(&mut self, cx: &mut BlockCx<'_, C>) {
        let _ = cx;
    }

    /// React to a pointer button; the event is [`MouseInfo::last_button`].
    fn pointer_button(&mut self, cx: &mut BlockCx<'_, C>) {
        let _ = cx;
    }

    /// React to scrolling; offsets are in [`BlockCx::mouse`].
    fn scrolled(&mut self, cx: &mut BlockCx<'_, C>) {
        let _ = cx;
    }

    /// React to a key event; see [`BlockCx::last_key`].
    fn key(&mut self, cx: &mut BlockCx<'_, C>) {
        let _ = cx;
    }
}

/// Context for [`BlockHandler::render`].
pub struct RenderCx<'a, C> {
    pub(crate) id: BlockId,
    pub(crate) area: Area,
    pub(crate) hovered: bool,
    pub(crate) info: &'a TreeInfo,
    pub(crate) compositor: &'a mut C,
}

impl<C> RenderCx<'_, C> {
    /// The block being drawn.
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// The block's area, which is also the bound viewport.
    pub fn area(&self) -> Area {
        self.area
    }

    /// Whether the block is currently hovered.
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Shared pointer state.
    pub fn mouse(&self) -> &MouseInfo {
        &self.info.mouse
    }

    /// The compositor, for issuing draw commands.
    pub fn compositor(&mut self) -> &mut C {
        self.compositor
    }
}

impl<C> fmt::Debug for RenderCx<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCx")
            .field("id", &self.id)
            .field("area", &self.area)
            .field("hovered", &self.hovered)
            .finish_non_exhaustive()
    }
}

/// Context for the non-render callbacks of [`BlockHandler`].
///
/// Geometry setters behave exactly like the matching [`Tree`] methods on the
/// bound block: values are clamped into the parent, and any change marks the
/// tree render-required and re-evaluates hover. Hover notifications raised
/// here are delivered after the current callback returns.
pub struct BlockCx<'a, C: Compositor> {
    pub(crate) tree: &'a mut Tree<C>,
    pub(crate) id: BlockId,
}

impl<C: Compositor> BlockCx<'_, C> {
    /// The block this context is bound to.
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Whether the bound block is the root.
    pub fn is_root(&self) -> bool {
        self.id == self.tree.root()
    }

    /// The bound block's area.
    pub fn area(&self) -> Area {
        self.tree.node(self.id).area
    }

    /// The parent's area, or `None` for the root.
    pub fn parent_area(&self) -> Option<Area> {
        let parent = self.tree.node(self.id).parent?;
        Some(self.tree.node(parent).area)
    }

    /// The bound block's area relative to its parent, or `None` for the root.
    pub fn normalized_area(&self) -> Option<NormalizedArea> {
        self.tree.normalized_area(self.id)
    }

    /// The bound block's children in paint order.
    pub fn children(&self) -> SmallVec<[BlockId; 4]> {
        self.tree.node(self.id).children.clone()
    }

    /// Whether the bound block is hovered.
    pub fn is_hovered(&self) -> bool {
        self.tree.node(self.id).hovered
    }

    /// Shared pointer state.
    pub fn mouse(&self) -> &MouseInfo {
        &self.tree.info().mouse
    }

    /// The last key event seen by the tree.
    pub fn last_key(&self) -> Option<KeyEvent> {
        self.tree.info().last_key
    }

    /// Surface limits and shared input state.
    pub fn info(&self) -> &TreeInfo {
        self.tree.info()
    }

    /// Set the width, clamped to the parent's width.
    pub fn set_width(&mut self, width: u32) {
        self.tree.update_width(self.id, width);
    }

    /// Set the height, clamped to the parent's height.
    pub fn set_height(&mut self, height: u32) {
        self.tree.update_height(self.id, height);
    }

    /// Set the absolute x position, clamped into the parent.
    pub fn set_pos_x(&mut self, pos_x: u32) {
        self.tree.update_pos_x(self.id, pos_x);
    }

    /// Set the absolute y position, clamped into the parent.
    pub fn set_pos_y(&mut self, pos_y: u32) {
        self.tree.update_pos_y(self.id, pos_y);
    }

    /// Set the x position as an offset from the parent's origin.
    pub fn set_relative_pos_x(&mut self, offset: u32) {
        self.tree.update_relative_pos_x(self.id, offset);
    }

    /// Set the y position as an offset from the parent's origin.
    pub fn set_relative_pos_y(&mut self, offset: u32) {
        self.tree.update_relative_pos_y(self.id, offset);
    }

    /// Set the width as a fraction of the parent's width.
    pub fn set_relative_normalized_width(&mut self, fraction: f32) {
        self.tree.update_relative_normalized_width(self.id, fraction);
    }

    /// Set the height as a fraction of the parent's height.
    pub fn set_relative_normalized_height(&mut self, fraction: f32) {
        self.tree.update_relative_normalized_height(self.id, fraction);
    }

    /// Set the x offset as a fraction of the parent's width.
    pub fn set_relative_normalized_pos_x(&mut self, fraction: f32) {
        self.tree.update_relative_normalized_pos_x(self.id, fraction);
    }

    /// Set the y offset as a fraction of the parent's height.
    pub fn set_relative_normalized_pos_y(&mut self, fraction: f32) {
        self.tree.update_relative_normalized_pos_y(self.id, fraction);
    }

    /// Choose whether hover changes of this block request a render.
    pub fn set_hover_triggers_render(&mut self, enabled: bool) {
        self.tree.node_mut(self.id).hover_triggers_render = enabled;
    }

    /// Mark the tree render-required.
    pub fn request_render(&mut self) {
        self.tree.request_render();
    }

    /// Suspend hover hit testing, for example during a batch of geometry updates.
    pub fn disable_checking_hover(&mut self) {
        self.tree.disable_checking_hover();
    }

    /// Resume hover hit testing and re-run it immediately.
    pub fn enable_checking_hover(&mut self) {
        self.tree.resume_checking_hover();
    }
}

impl<C: Compositor> fmt::Debug for BlockCx<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCx")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
