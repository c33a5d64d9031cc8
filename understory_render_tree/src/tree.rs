// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, layout, hover, dispatch, and rendering.

use alloc::collections::VecDeque;
use alloc::{boxed::Box, vec, vec::Vec};
use core::fmt;

use crate::area::{Area, NormalizedArea, scale_length};
use crate::block::{Block, Node, clamp_area, clamp_pos};
use crate::compositor::{Compositor, CompositorError};
use crate::config::{TreeConfig, clamp_to_max};
use crate::damage::Damage;
use crate::handler::{BlockCx, BlockHandler, RenderCx};
use crate::types::{BlockId, KeyEvent, MouseButtonEvent, MouseInfo, TreeInfo};

type Callback<C> = fn(&mut dyn BlockHandler<C>, &mut BlockCx<'_, C>);

/// Retained block tree for one drawable surface.
///
/// The tree owns every block (addressed by [`BlockId`]), the shared input
/// state, the hovered-block pointer, the render-required flag, and the
/// [`Compositor`] holding the backing store.
///
/// Geometry changes take effect immediately. Every non-root block is kept
/// inside its parent: setters clamp instead of rejecting, and a change to a
/// block's area re-clamps its descendants. Any actual change marks the tree
/// render-required and re-evaluates hover.
///
/// Cursor coordinates and areas share one coordinate system; converting from
/// the windowing layer's convention (for example flipping y for a
/// bottom-left origin) is the caller's job.
///
/// ## Example
///
/// ```rust
/// use understory_render_tree::backends::SoftwareCompositor;
/// use understory_render_tree::{Area, Block, Tree, TreeConfig};
///
/// let config = TreeConfig::new(Area::new(0, 0, 800, 600), 800, 600);
/// let mut tree = Tree::new(config, SoftwareCompositor::new()).unwrap();
///
/// // The requested area is snapped to stay inside the root.
/// let a = tree.insert_at_root(Block::new(Area::new(700, 500, 200, 200)));
/// assert_eq!(tree.area(a), Some(Area::new(600, 400, 200, 200)));
///
/// tree.process_mouse_movement(650, 450);
/// assert_eq!(tree.hovered_block(), Some(a));
///
/// tree.change_area(Area::new(0, 0, 400, 300));
/// assert_eq!(tree.area(a), Some(Area::new(200, 100, 200, 200)));
/// assert!(tree.is_render_required());
/// ```
pub struct Tree<C: Compositor> {
    /// slots
    nodes: Vec<Option<Node<C>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: BlockId,
    hovered: Option<BlockId>,
    info: TreeInfo,
    render_required: bool,
    check_hover: bool,
    /// set while the area-change walk runs; setters then leave descendants to the walk
    propagating: bool,
    hover_events: VecDeque<BlockId>,
    compositor: C,
}

impl<C: Compositor + fmt::Debug> fmt::Debug for Tree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("Tree")
            .field("blocks_total", &total)
            .field("blocks_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("root_area", &self.node(self.root).area)
            .field("hovered", &self.hovered)
            .field("render_required", &self.render_required)
            .field("check_hover", &self.check_hover)
            .field("compositor", &self.compositor)
            .finish_non_exhaustive()
    }
}

impl<C: Compositor> Drop for Tree<C> {
    fn drop(&mut self) {
        self.compositor.destroy_backing_store();
    }
}

impl<C: Compositor> Tree<C> {
    /// Create a tree whose root covers `config.area`.
    ///
    /// The compositor allocates its backing store at the configured maximum
    /// size first; if that fails the error is returned and no tree exists.
    /// The root starts without a handler; attach one with [`Tree::set_handler`].
    pub fn new(config: TreeConfig, mut compositor: C) -> Result<Self, CompositorError> {
        compositor.create_backing_store(config.max_width, config.max_height)?;

        let area = config.clamped_area();
        if area != config.area {
            tracing::warn!(
                requested = ?config.area,
                clamped = ?area,
                "root area exceeds the maximum surface"
            );
        }

        let mut root = Node::new(Block {
            area,
            handler: None,
            hover_triggers_render: config.root_hover_render,
        });
        root.generation = 1;

        Ok(Self {
            nodes: vec![Some(root)],
            generations: vec![1],
            free_list: Vec::new(),
            root: BlockId::new(0, 1),
            hovered: None,
            info: TreeInfo::new(config.max_width, config.max_height),
            render_required: true,
            check_hover: config.check_hover,
            propagating: false,
            hover_events: VecDeque::new(),
            compositor,
        })
    }

    // --- structure ---

    /// The root block; it spans the whole surface.
    pub fn root(&self) -> BlockId {
        self.root
    }

    /// Insert a block as the topmost child of the root.
    pub fn insert_at_root(&mut self, block: Block<C>) -> BlockId {
        self.insert(self.root, block)
    }

    /// Insert a block as the last (topmost) child of `parent`.
    ///
    /// The requested area is clamped into the parent, hover is re-evaluated
    /// since the new block may now lie under the cursor, and the tree is
    /// marked render-required.
    ///
    /// # Panics
    ///
    /// Panics if `parent` is stale.
    pub fn insert(&mut self, parent: BlockId, block: Block<C>) -> BlockId {
        assert!(self.is_alive(parent), "cannot insert under a stale BlockId");
        let parent_area = self.node(parent).area;
        let mut node = Node::new(block);
        node.area = clamp_area(node.area, parent_area);
        node.parent = Some(parent);
        let id = self.alloc(node);
        self.node_mut(parent).children.push(id);

        self.render_required = true;
        self.check_hover();
        self.flush_hover_events();
        id
    }

    /// Remove a block and its whole subtree.
    ///
    /// Handlers of removed blocks are dropped without further notification.
    /// If the hovered block was removed, hover is re-evaluated.
    /// Stale identifiers are ignored.
    ///
    /// # Panics
    ///
    /// Panics if `id` is the root.
    pub fn remove(&mut self, id: BlockId) {
        assert_ne!(id, self.root, "the root block cannot be removed");
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|c| *c != id);
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes[current.idx()].take() else {
                continue;
            };
            if self.hovered == Some(current) {
                self.hovered = None;
            }
            stack.extend(node.children.iter().copied());
            self.free_list.push(current.idx());
        }

        self.render_required = true;
        self.check_hover();
        self.flush_hover_events();
    }

    /// Replace a block's handler, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn set_handler(
        &mut self,
        id: BlockId,
        handler: Option<Box<dyn BlockHandler<C>>>,
    ) -> Option<Box<dyn BlockHandler<C>>> {
        self.render_required = true;
        core::mem::replace(&mut self.node_mut(id).handler, handler)
    }

    /// Choose whether hover changes of `id` request a render.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn set_hover_triggers_render(&mut self, id: BlockId, enabled: bool) {
        self.node_mut(id).hover_triggers_render = enabled;
    }

    // --- queries ---

    /// Returns true if `id` refers to a live block.
    pub fn is_alive(&self, id: BlockId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Number of live blocks, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Always false: the root block exists for the tree's whole lifetime.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The area of a live block.
    pub fn area(&self, id: BlockId) -> Option<Area> {
        self.node_opt(id).map(|n| n.area)
    }

    /// A live block's area as fractions of its parent; `None` for the root or stale ids.
    pub fn normalized_area(&self, id: BlockId) -> Option<NormalizedArea> {
        let node = self.node_opt(id)?;
        let parent = self.node_opt(node.parent?)?;
        Some(node.area.normalized_in(&parent.area))
    }

    /// Returns the parent of a block if live, or `None` for the root or stale ids.
    pub fn parent_of(&self, id: BlockId) -> Option<BlockId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a block in paint order, or an empty slice if stale.
    pub fn children_of(&self, id: BlockId) -> &[BlockId] {
        self.node_opt(id).map(|n| &n.children[..]).unwrap_or(&[])
    }

    /// Whether a live block is flagged hovered.
    ///
    /// For the root this means the cursor is over the surface. Among the other
    /// blocks at most one is hovered at any time.
    pub fn is_hovered(&self, id: BlockId) -> bool {
        self.node_opt(id).is_some_and(|n| n.hovered)
    }

    /// The deepest topmost block under the cursor, as of the last hover check.
    pub fn hovered_block(&self) -> Option<BlockId> {
        self.hovered
    }

    /// Whether the next [`Tree::render`] call will composite a frame.
    pub fn is_render_required(&self) -> bool {
        self.render_required
    }

    /// Whether hover hit testing is active.
    pub fn is_checking_hover(&self) -> bool {
        self.check_hover
    }

    /// Surface limits and shared input state.
    pub fn info(&self) -> &TreeInfo {
        &self.info
    }

    /// Shared pointer state.
    pub fn mouse(&self) -> &MouseInfo {
        &self.info.mouse
    }

    /// The compositor backend.
    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// The compositor backend, mutably.
    pub fn compositor_mut(&mut self) -> &mut C {
        &mut self.compositor
    }

    /// Get the next block in depth-first (paint) order.
    ///
    /// Returns `None` after the last block or if `current` is stale.
    pub fn next_depth_first(&self, current: BlockId) -> Option<BlockId> {
        let node = self.node_opt(current)?;
        if let Some(&first) = node.children.first() {
            return Some(first);
        }
        let mut block = current;
        while let Some(parent) = self.parent_of(block) {
            let siblings = &self.node(parent).children;
            let pos = siblings.iter().position(|&id| id == block)?;
            if let Some(&next) = siblings.get(pos + 1) {
                return Some(next);
            }
            block = parent;
        }
        None
    }

    /// Iterate all live blocks in paint order, starting at the root.
    pub fn depth_first(&self) -> impl Iterator<Item = BlockId> + '_ {
        core::iter::successors(Some(self.root), |&id| self.next_depth_first(id))
    }

    // --- layout ---

    /// Set a block's width.
    ///
    /// Non-root blocks are limited to the parent's width; if the width changed,
    /// the x position is re-clamped. The root takes any width up to the
    /// maximum surface width.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale. The same holds for every setter below.
    pub fn set_width(&mut self, id: BlockId, width: u32) {
        self.update_width(id, width);
        self.flush_hover_events();
    }

    /// Set a block's height; see [`Tree::set_width`].
    pub fn set_height(&mut self, id: BlockId, height: u32) {
        self.update_height(id, height);
        self.flush_hover_events();
    }

    /// Set a block's absolute x position, clamped so the block stays inside its parent.
    pub fn set_pos_x(&mut self, id: BlockId, pos_x: u32) {
        self.update_pos_x(id, pos_x);
        self.flush_hover_events();
    }

    /// Set a block's absolute y position, clamped so the block stays inside its parent.
    pub fn set_pos_y(&mut self, id: BlockId, pos_y: u32) {
        self.update_pos_y(id, pos_y);
        self.flush_hover_events();
    }

    /// Set all four components: sizes first, then positions.
    pub fn set_area(&mut self, id: BlockId, area: Area) {
        self.update_width(id, area.width);
        self.update_height(id, area.height);
        self.update_pos_x(id, area.pos_x);
        self.update_pos_y(id, area.pos_y);
        self.flush_hover_events();
    }

    /// Set the x position as an offset from the parent's origin. No-op for the root.
    pub fn set_relative_pos_x(&mut self, id: BlockId, offset: u32) {
        self.update_relative_pos_x(id, offset);
        self.flush_hover_events();
    }

    /// Set the y position as an offset from the parent's origin. No-op for the root.
    pub fn set_relative_pos_y(&mut self, id: BlockId, offset: u32) {
        self.update_relative_pos_y(id, offset);
        self.flush_hover_events();
    }

    /// Set the width as a fraction (clamped to `[0, 1]`) of the parent's width.
    /// No-op for the root.
    pub fn set_relative_normalized_width(&mut self, id: BlockId, fraction: f32) {
        self.update_relative_normalized_width(id, fraction);
        self.flush_hover_events();
    }

    /// Set the height as a fraction (clamped to `[0, 1]`) of the parent's height.
    /// No-op for the root.
    pub fn set_relative_normalized_height(&mut self, id: BlockId, fraction: f32) {
        self.update_relative_normalized_height(id, fraction);
        self.flush_hover_events();
    }

    /// Set the x offset as a fraction (clamped to `[0, 1]`) of the parent's width.
    /// No-op for the root.
    pub fn set_relative_normalized_pos_x(&mut self, id: BlockId, fraction: f32) {
        self.update_relative_normalized_pos_x(id, fraction);
        self.flush_hover_events();
    }

    /// Set the y offset as a fraction (clamped to `[0, 1]`) of the parent's height.
    /// No-op for the root.
    pub fn set_relative_normalized_pos_y(&mut self, id: BlockId, fraction: f32) {
        self.update_relative_normalized_pos_y(id, fraction);
        self.flush_hover_events();
    }

    /// React to a resize of the tracked surface.
    ///
    /// If `area` differs from the root's area it is assigned and every
    /// descendant is offered the change, depth-first. A block whose area ends up
    /// unchanged is not descended into.
    pub fn change_area(&mut self, area: Area) {
        self.update_root_area(area);
        self.flush_hover_events();
    }

    // --- render ---

    /// Mark the tree render-required.
    pub fn request_render(&mut self) {
        self.render_required = true;
    }

    /// Composite a frame if one is required.
    ///
    /// Walks every block in paint order. Each block with a handler gets its
    /// viewport bound and cleared; if the handler reports drawing, its area is
    /// blended onto the backing store and copied into it. The backing store is
    /// then presented over the root area and its alpha cleared.
    ///
    /// Returns `None` without touching the compositor when nothing changed
    /// since the last frame.
    pub fn render(&mut self) -> Option<Damage> {
        if !self.render_required {
            return None;
        }
        let span = tracing::debug_span!("render_tree_render");
        let _guard = span.enter();

        let root_area = self.node(self.root).area;
        let mut damage = Damage {
            composited: Vec::new(),
            presented: root_area,
        };

        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes[id.idx()].as_mut() else {
                continue;
            };
            let area = node.area;
            let hovered = node.hovered;
            if let Some(mut handler) = node.handler.take() {
                self.compositor.begin_block(area);
                let drew = {
                    let mut cx = RenderCx {
                        id,
                        area,
                        hovered,
                        info: &self.info,
                        compositor: &mut self.compositor,
                    };
                    handler.render(&mut cx)
                };
                self.node_mut(id).handler = Some(handler);
                if drew {
                    self.compositor.blend_region(area);
                    self.compositor.copy_region(area);
                    damage.composited.push((id, area));
                    tracing::trace!(block = ?id, ?area, "block composited");
                }
            }
            // Reverse so children are visited in insertion order.
            stack.extend(self.node(id).children.iter().rev().copied());
        }

        self.compositor.present(root_area);
        self.compositor.clear_backing_alpha(root_area);
        self.render_required = false;
        tracing::debug!(blocks = damage.len(), "frame composited");
        Some(damage)
    }

    // --- input ---

    /// Feed an absolute cursor position.
    ///
    /// Updates position and delta (zero when the cursor just entered the
    /// surface), flags the root hovered on entry, re-evaluates hover, then
    /// notifies every block depth-first.
    pub fn process_mouse_movement(&mut self, pos_x: i64, pos_y: i64) {
        let mouse = &mut self.info.mouse;
        let entered = mouse.is_outside();
        if entered {
            mouse.cursor_delta_x = 0;
            mouse.cursor_delta_y = 0;
        } else {
            mouse.cursor_delta_x = pos_x.saturating_sub(mouse.cursor_pos_x);
            mouse.cursor_delta_y = pos_y.saturating_sub(mouse.cursor_pos_y);
        }
        mouse.cursor_pos_x = pos_x;
        mouse.cursor_pos_y = pos_y;

        if entered {
            self.set_root_hover(true);
        }
        self.check_hover();
        self.flush_hover_events();

        self.dispatch(|h, cx| h.pointer_moved(cx));
    }

    /// Feed a pointer button event; every block is notified.
    pub fn process_mouse_button(&mut self, event: MouseButtonEvent) {
        self.info.mouse.last_button = Some(event);
        self.dispatch(|h, cx| h.pointer_button(cx));
    }

    /// Feed scroll offsets; every block is notified.
    pub fn process_mouse_scroll(&mut self, offset_x: f64, offset_y: f64) {
        self.info.mouse.scroll_offset_x = offset_x;
        self.info.mouse.scroll_offset_y = offset_y;
        self.dispatch(|h, cx| h.scrolled(cx));
    }

    /// Feed a key event; every block is notified.
    pub fn process_key(&mut self, event: KeyEvent) {
        self.info.last_key = Some(event);
        self.dispatch(|h, cx| h.key(cx));
    }

    /// The cursor left the surface.
    ///
    /// Resets the cursor to [`MouseInfo::OUTSIDE`] with zero deltas, unhovers
    /// the hovered block (when hover checking is on), and clears the root's
    /// hover flag.
    pub fn process_cursor_leave(&mut self) {
        self.info.mouse.leave();
        if self.check_hover
            && let Some(hovered) = self.hovered.take()
        {
            self.toggle_hover(hovered);
            tracing::trace!(from = ?hovered, "hover cleared on leave");
        }
        self.set_root_hover(false);
        self.flush_hover_events();
    }

    /// Suspend hover hit testing.
    pub fn disable_checking_hover(&mut self) {
        self.check_hover = false;
    }

    /// Resume hover hit testing and re-run it immediately.
    pub fn enable_checking_hover(&mut self) {
        self.resume_checking_hover();
        self.flush_hover_events();
    }

    /// Find the deepest topmost descendant of `from` under the cursor.
    ///
    /// Children are scanned from last inserted to first; the first whose area
    /// contains the cursor wins and is searched in turn. Returns `None` if no
    /// child of `from` contains the cursor; `from` itself is never returned.
    pub fn find_hovered_block(&self, from: BlockId) -> Option<BlockId> {
        let mouse = &self.info.mouse;
        self.hit_below(from, mouse.cursor_pos_x, mouse.cursor_pos_y)
    }

    /// Like [`Tree::find_hovered_block`] from the root, for an arbitrary point.
    pub fn hit_test_point(&self, x: i64, y: i64) -> Option<BlockId> {
        self.hit_below(self.root, x, y)
    }
}

impl<C: Compositor> Tree<C> {
    // --- internals ---

    /// Access a block; panics if `id` is stale.
    pub(crate) fn node(&self, id: BlockId) -> &Node<C> {
        self.node_opt(id).expect("dangling BlockId")
    }

    /// Access a block mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: BlockId) -> &mut Node<C> {
        self.node_opt_mut(id).expect("dangling BlockId")
    }

    fn node_opt(&self, id: BlockId) -> Option<&Node<C>> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: BlockId) -> Option<&mut Node<C>> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn alloc(&mut self, mut node: Node<C>) -> BlockId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.nodes.push(None);
            self.generations.push(1);
            (self.nodes.len() - 1, 1)
        };
        node.generation = generation;
        self.nodes[idx] = Some(node);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "BlockId uses 32-bit indices by design."
        )]
        BlockId::new(idx as u32, generation)
    }

    fn parent_area(&self, id: BlockId) -> Option<Area> {
        let parent = self.node(id).parent?;
        Some(self.node(parent).area)
    }

    pub(crate) fn update_width(&mut self, id: BlockId, width: u32) {
        let old = self.node(id).area;
        let Some(parent) = self.parent_area(id) else {
            self.update_root_area(Area { width, ..old });
            return;
        };
        let mut area = old;
        area.width = width.min(parent.width);
        if area.width != old.width {
            area.pos_x = clamp_pos(area.pos_x, area.width, parent.pos_x, parent.width);
        }
        self.commit_area(id, old, area);
    }

    pub(crate) fn update_height(&mut self, id: BlockId, height: u32) {
        let old = self.node(id).area;
        let Some(parent) = self.parent_area(id) else {
            self.update_root_area(Area { height, ..old });
            return;
        };
        let mut area = old;
        area.height = height.min(parent.height);
        if area.height != old.height {
            area.pos_y = clamp_pos(area.pos_y, area.height, parent.pos_y, parent.height);
        }
        self.commit_area(id, old, area);
    }

    pub(crate) fn update_pos_x(&mut self, id: BlockId, pos_x: u32) {
        let old = self.node(id).area;
        let Some(parent) = self.parent_area(id) else {
            self.update_root_area(Area { pos_x, ..old });
            return;
        };
        let area = Area {
            pos_x: clamp_pos(pos_x, old.width, parent.pos_x, parent.width),
            ..old
        };
        self.commit_area(id, old, area);
    }

    pub(crate) fn update_pos_y(&mut self, id: BlockId, pos_y: u32) {
        let old = self.node(id).area;
        let Some(parent) = self.parent_area(id) else {
            self.update_root_area(Area { pos_y, ..old });
            return;
        };
        let area = Area {
            pos_y: clamp_pos(pos_y, old.height, parent.pos_y, parent.height),
            ..old
        };
        self.commit_area(id, old, area);
    }

    pub(crate) fn update_relative_pos_x(&mut self, id: BlockId, offset: u32) {
        if let Some(parent) = self.parent_area(id) {
            self.update_pos_x(id, parent.pos_x.saturating_add(offset));
        }
    }

    pub(crate) fn update_relative_pos_y(&mut self, id: BlockId, offset: u32) {
        if let Some(parent) = self.parent_area(id) {
            self.update_pos_y(id, parent.pos_y.saturating_add(offset));
        }
    }

    pub(crate) fn update_relative_normalized_width(&mut self, id: BlockId, fraction: f32) {
        if let Some(parent) = self.parent_area(id) {
            self.update_width(id, scale_length(parent.width, fraction));
        }
    }

    pub(crate) fn update_relative_normalized_height(&mut self, id: BlockId, fraction: f32) {
        if let Some(parent) = self.parent_area(id) {
            self.update_height(id, scale_length(parent.height, fraction));
        }
    }

    pub(crate) fn update_relative_normalized_pos_x(&mut self, id: BlockId, fraction: f32) {
        if let Some(parent) = self.parent_area(id) {
            self.update_relative_pos_x(id, scale_length(parent.width, fraction));
        }
    }

    pub(crate) fn update_relative_normalized_pos_y(&mut self, id: BlockId, fraction: f32) {
        if let Some(parent) = self.parent_area(id) {
            self.update_relative_pos_y(id, scale_length(parent.height, fraction));
        }
    }

    /// Store a clamped area; on change, invalidate and re-clamp descendants.
    ///
    /// Inside a running area-change walk the walk's initiator re-checks hover
    /// once the whole tree is settled.
    fn commit_area(&mut self, id: BlockId, old: Area, area: Area) {
        if old == area {
            return;
        }
        self.node_mut(id).area = area;
        self.render_required = true;
        if !self.propagating {
            self.propagate_area_change(id);
            self.check_hover();
        }
    }

    fn update_root_area(&mut self, area: Area) {
        let area = clamp_to_max(area, self.info.max_width(), self.info.max_height());
        let root = self.root;
        let old = self.node(root).area;
        if old == area {
            return;
        }
        tracing::debug!(?old, new = ?area, "root area changed");
        self.node_mut(root).area = area;
        self.propagate_area_change(root);
        self.render_required = true;
        self.check_hover();
    }

    /// Offer an area change to the descendants of `id`, depth-first.
    ///
    /// A block whose area is unchanged after re-clamping is not descended into.
    fn propagate_area_change(&mut self, id: BlockId) {
        let was_propagating = core::mem::replace(&mut self.propagating, true);
        let mut stack: Vec<BlockId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(child) = stack.pop() {
            if !self.is_alive(child) {
                continue;
            }
            if self.process_changed_area(child) {
                stack.extend(self.node(child).children.iter().rev().copied());
            }
        }
        self.propagating = was_propagating;
    }

    /// Let the handler react to a new parent area, then re-clamp. Returns whether the area changed.
    fn process_changed_area(&mut self, id: BlockId) -> bool {
        let old = self.node(id).area;
        self.with_handler(id, |h, cx| h.area_changed(cx));

        let area = self.node(id).area;
        self.update_width(id, area.width);
        self.update_height(id, area.height);
        let area = self.node(id).area;
        self.update_pos_x(id, area.pos_x);
        self.update_pos_y(id, area.pos_y);
        self.node(id).area != old
    }

    pub(crate) fn resume_checking_hover(&mut self) {
        self.check_hover = true;
        self.check_hover();
    }

    fn hit_below(&self, from: BlockId, x: i64, y: i64) -> Option<BlockId> {
        let mut found = None;
        let mut current = from;
        'descend: loop {
            for &child in self.node_opt(current)?.children.iter().rev() {
                if self.node(child).area.contains(x, y) {
                    found = Some(child);
                    current = child;
                    continue 'descend;
                }
            }
            return found;
        }
    }

    /// Re-evaluate which block is under the cursor and flip hover flags on transition.
    fn check_hover(&mut self) {
        if !self.check_hover {
            return;
        }
        let old = self.hovered.filter(|&id| self.is_alive(id));
        let new = self.find_hovered_block(self.root);
        if old == new {
            self.hovered = new;
            return;
        }
        // Unhover first so handlers never see two hovered blocks.
        if let Some(old) = old {
            self.toggle_hover(old);
        }
        self.hovered = new;
        if let Some(new) = new {
            self.toggle_hover(new);
        }
        tracing::trace!(from = ?old, to = ?new, "hover moved");
    }

    fn set_root_hover(&mut self, hovered: bool) {
        if self.node(self.root).hovered != hovered {
            self.toggle_hover(self.root);
        }
    }

    /// Flip a block's hover flag and queue its handler notification.
    fn toggle_hover(&mut self, id: BlockId) {
        let node = self.node_mut(id);
        node.hovered = !node.hovered;
        let triggers_render = node.hover_triggers_render;
        self.hover_events.push_back(id);
        if triggers_render {
            self.render_required = true;
        }
    }

    /// Deliver queued hover notifications in the order they were raised.
    fn flush_hover_events(&mut self) {
        while let Some(id) = self.hover_events.pop_front() {
            if self.is_alive(id) {
                self.with_handler(id, |h, cx| h.hover_changed(cx));
            }
        }
    }

    /// Run `f` with the block's handler detached, if it has one.
    fn with_handler<F>(&mut self, id: BlockId, f: F)
    where
        F: FnOnce(&mut dyn BlockHandler<C>, &mut BlockCx<'_, C>),
    {
        let Some(mut handler) = self.node_mut(id).handler.take() else {
            return;
        };
        f(handler.as_mut(), &mut BlockCx { tree: self, id });
        if let Some(node) = self.node_opt_mut(id)
            && node.handler.is_none()
        {
            node.handler = Some(handler);
        }
    }

    /// Notify every block, parent before children.
    ///
    /// Hover notifications raised by a callback are delivered before the next block is visited.
    fn dispatch(&mut self, callback: Callback<C>) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if !self.is_alive(id) {
                continue;
            }
            self.with_handler(id, callback);
            self.flush_hover_events();
            if let Some(node) = self.node_opt(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Action, Modifiers, MouseButton};
    use alloc::rc::Rc;
    use alloc::string::String;
    use core::cell::RefCell;

    /// Compositor that records every call.
    #[derive(Debug, Default)]
    struct Recorder {
        ops: Vec<Op>,
        fail: bool,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Op {
        Create(u32, u32),
        Destroy,
        Begin(Area),
        Blend(Area),
        Copy(Area),
        Present(Area),
        ClearAlpha(Area),
    }

    impl Compositor for Recorder {
        fn create_backing_store(&mut self, w: u32, h: u32) -> Result<(), CompositorError> {
            if self.fail {
                return Err(CompositorError::Incomplete("test"));
            }
            self.ops.push(Op::Create(w, h));
            Ok(())
        }
        fn destroy_backing_store(&mut self) {
            self.ops.push(Op::Destroy);
        }
        fn begin_block(&mut self, area: Area) {
            self.ops.push(Op::Begin(area));
        }
        fn blend_region(&mut self, area: Area) {
            self.ops.push(Op::Blend(area));
        }
        fn copy_region(&mut self, area: Area) {
            self.ops.push(Op::Copy(area));
        }
        fn present(&mut self, area: Area) {
            self.ops.push(Op::Present(area));
        }
        fn clear_backing_alpha(&mut self, area: Area) {
            self.ops.push(Op::ClearAlpha(area));
        }
    }

    type Log = Rc<RefCell<Vec<String>>>;

    /// Handler that logs callbacks under a name and optionally draws.
    struct Probe {
        name: &'static str,
        draws: bool,
        log: Log,
    }

    impl Probe {
        fn new(name: &'static str, draws: bool, log: &Log) -> Self {
            Self {
                name,
                draws,
                log: log.clone(),
            }
        }

        fn push(&self, what: &str) {
            self.log
                .borrow_mut()
                .push(alloc::format!("{}:{}", self.name, what));
        }
    }

    impl BlockHandler<Recorder> for Probe {
        fn render(&mut self, _cx: &mut RenderCx<'_, Recorder>) -> bool {
            self.push("render");
            self.draws
        }
        fn area_changed(&mut self, _cx: &mut BlockCx<'_, Recorder>) {
            self.push("area");
        }
        fn hover_changed(&mut self, cx: &mut BlockCx<'_, Recorder>) {
            self.push(if cx.is_hovered() { "enter" } else { "leave" });
        }
        fn pointer_moved(&mut self, _cx: &mut BlockCx<'_, Recorder>) {
            self.push("move");
        }
        fn pointer_button(&mut self, _cx: &mut BlockCx<'_, Recorder>) {
            self.push("button");
        }
        fn scrolled(&mut self, _cx: &mut BlockCx<'_, Recorder>) {
            self.push("scroll");
        }
        fn key(&mut self, _cx: &mut BlockCx<'_, Recorder>) {
            self.push("key");
        }
    }

    fn tree(w: u32, h: u32) -> Tree<Recorder> {
        Tree::new(
            TreeConfig::new(Area::new(0, 0, w, h), w, h),
            Recorder::default(),
        )
        .unwrap()
    }

    fn probe(area: Area, name: &'static str, draws: bool, log: &Log) -> Block<Recorder> {
        Block::new(area).with_handler(Probe::new(name, draws, log))
    }

    fn hovered_count(tree: &Tree<Recorder>) -> usize {
        tree.depth_first()
            .filter(|&id| id != tree.root() && tree.is_hovered(id))
            .count()
    }

    #[test]
    fn construction_allocates_backing_store() {
        let t = tree(800, 600);
        assert_eq!(t.compositor().ops, vec![Op::Create(800, 600)]);
        assert!(t.is_render_required());
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn construction_failure_is_reported() {
        let err = Tree::new(
            TreeConfig::new(Area::new(0, 0, 10, 10), 10, 10),
            Recorder {
                fail: true,
                ..Recorder::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, CompositorError::Incomplete("test"));
    }

    #[test]
    fn concrete_scenario() {
        let mut t = tree(800, 600);
        let a = t.insert_at_root(Block::new(Area::new(700, 500, 200, 200)));
        assert_eq!(t.area(a), Some(Area::new(600, 400, 200, 200)));

        t.process_mouse_movement(650, 450);
        assert!(t.is_hovered(a));
        assert_eq!(t.hovered_block(), Some(a));

        t.process_mouse_movement(10, 10);
        assert!(!t.is_hovered(a));
        assert_eq!(t.hovered_block(), None);

        let _ = t.render();
        assert!(!t.is_render_required());
        t.change_area(Area::new(0, 0, 400, 300));
        let area = t.area(a).unwrap();
        assert!(Area::new(0, 0, 400, 300).contains_area(&area));
        assert_eq!(area, Area::new(200, 100, 200, 200));
        assert!(t.is_render_required());
    }

    #[test]
    fn width_clamps_to_parent_and_repositions() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(50, 0, 40, 40)));
        t.set_width(a, 500);
        assert_eq!(t.area(a), Some(Area::new(0, 0, 100, 40)));
        t.set_width(a, 30);
        assert_eq!(t.area(a).unwrap().width, 30);
    }

    #[test]
    fn positions_snap_into_parent() {
        let mut t = tree(100, 100);
        let outer = t.insert_at_root(Block::new(Area::new(20, 20, 60, 60)));
        let inner = t.insert(outer, Block::new(Area::new(0, 0, 10, 10)));
        assert_eq!(t.area(inner), Some(Area::new(20, 20, 10, 10)));
        t.set_pos_x(inner, 95);
        t.set_pos_y(inner, 5);
        assert_eq!(t.area(inner), Some(Area::new(70, 20, 10, 10)));
    }

    #[test]
    fn relative_setters_use_parent_origin() {
        let mut t = tree(200, 200);
        let outer = t.insert_at_root(Block::new(Area::new(100, 50, 100, 100)));
        let inner = t.insert(outer, Block::new(Area::new(0, 0, 10, 10)));
        t.set_relative_pos_x(inner, 10);
        t.set_relative_pos_y(inner, 20);
        assert_eq!(t.area(inner), Some(Area::new(110, 70, 10, 10)));

        t.set_relative_normalized_width(inner, 0.5);
        t.set_relative_normalized_height(inner, 2.0);
        assert_eq!(t.area(inner), Some(Area::new(110, 50, 50, 100)));

        t.set_relative_normalized_pos_x(inner, 0.25);
        t.set_relative_normalized_pos_y(inner, -3.0);
        assert_eq!(t.area(inner), Some(Area::new(125, 50, 50, 100)));

        let n = t.normalized_area(inner).unwrap();
        assert_eq!((n.pos_x, n.width, n.height), (0.25, 0.5, 1.0));
        assert!(t.normalized_area(t.root()).is_none());
    }

    #[test]
    fn moving_a_parent_reclamps_children() {
        let mut t = tree(200, 200);
        let outer = t.insert_at_root(Block::new(Area::new(0, 0, 100, 100)));
        let inner = t.insert(outer, Block::new(Area::new(80, 80, 20, 20)));
        t.set_width(outer, 50);
        assert_eq!(t.area(inner), Some(Area::new(30, 80, 20, 20)));
        t.set_pos_y(outer, 150);
        assert_eq!(t.area(outer), Some(Area::new(0, 100, 50, 100)));
        assert_eq!(t.area(inner), Some(Area::new(30, 100, 20, 20)));
    }

    #[test]
    fn root_setters_are_unconstrained_up_to_maximum() {
        let mut t = tree(100, 100);
        let root = t.root();
        t.set_width(root, 60);
        assert_eq!(t.area(root), Some(Area::new(0, 0, 60, 100)));
        t.set_width(root, 1000);
        assert_eq!(t.area(root), Some(Area::new(0, 0, 100, 100)));
        t.set_relative_pos_x(root, 10);
        assert_eq!(t.area(root).unwrap().pos_x, 0);
    }

    #[test]
    fn hit_test_prefers_later_siblings() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 60, 60)));
        let b = t.insert_at_root(Block::new(Area::new(40, 40, 60, 60)));
        assert_eq!(t.hit_test_point(50, 50), Some(b));
        assert_eq!(t.hit_test_point(10, 10), Some(a));
        assert_eq!(t.hit_test_point(-5, 10), None);
    }

    #[test]
    fn hit_test_descends_to_deepest_block() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 50, 50)));
        let inner = t.insert(a, Block::new(Area::new(10, 10, 10, 10)));
        assert_eq!(t.hit_test_point(15, 15), Some(inner));
        assert_eq!(t.hit_test_point(40, 40), Some(a));
        assert_eq!(t.hit_test_point(80, 80), None);
    }

    #[test]
    fn shared_edge_goes_to_later_sibling() {
        let mut t = tree(100, 100);
        let _a = t.insert_at_root(Block::new(Area::new(0, 0, 50, 100)));
        let b = t.insert_at_root(Block::new(Area::new(50, 0, 50, 100)));
        assert_eq!(t.hit_test_point(50, 10), Some(b));
    }

    #[test]
    fn hover_transitions_unhover_before_hover() {
        let log = Log::default();
        let mut t = tree(100, 100);
        let _a = t.insert_at_root(probe(Area::new(0, 0, 50, 50), "a", false, &log));
        let _b = t.insert_at_root(probe(Area::new(50, 50, 50, 50), "b", false, &log));
        t.process_mouse_movement(10, 10);
        log.borrow_mut().clear();
        t.process_mouse_movement(70, 70);
        let log = log.borrow();
        assert_eq!(&log[..2], &["a:leave", "b:enter"]);
        assert_eq!(&log[2..], &["a:move", "b:move"]);
    }

    #[test]
    fn root_hover_tracks_cursor_presence() {
        let mut t = tree(100, 100);
        let root = t.root();
        assert!(!t.is_hovered(root));
        t.process_mouse_movement(5, 5);
        assert!(t.is_hovered(root));
        assert_eq!(t.hovered_block(), None);
        t.process_cursor_leave();
        assert!(!t.is_hovered(root));
        assert!(t.mouse().is_outside());
    }

    #[test]
    fn movement_tracks_deltas() {
        let mut t = tree(100, 100);
        t.process_mouse_movement(10, 20);
        assert_eq!((t.mouse().cursor_delta_x, t.mouse().cursor_delta_y), (0, 0));
        t.process_mouse_movement(15, 12);
        assert_eq!((t.mouse().cursor_delta_x, t.mouse().cursor_delta_y), (5, -8));
        t.process_cursor_leave();
        assert_eq!((t.mouse().cursor_delta_x, t.mouse().cursor_delta_y), (0, 0));
        t.process_mouse_movement(1, 1);
        assert_eq!((t.mouse().cursor_delta_x, t.mouse().cursor_delta_y), (0, 0));
    }

    #[test]
    fn cursor_leave_unhovers() {
        let log = Log::default();
        let mut t = tree(100, 100);
        let a = t.insert_at_root(probe(Area::new(0, 0, 50, 50), "a", false, &log));
        t.process_mouse_movement(10, 10);
        assert!(t.is_hovered(a));
        t.process_cursor_leave();
        assert!(!t.is_hovered(a));
        assert_eq!(t.hovered_block(), None);
        assert_eq!(log.borrow().last().map(String::as_str), Some("a:leave"));
    }

    #[test]
    fn insertion_under_cursor_takes_hover() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 50, 50)));
        t.process_mouse_movement(10, 10);
        assert_eq!(t.hovered_block(), Some(a));
        let b = t.insert_at_root(Block::new(Area::new(0, 0, 20, 20)));
        assert_eq!(t.hovered_block(), Some(b));
        assert!(!t.is_hovered(a));
        assert_eq!(hovered_count(&t), 1);
    }

    #[test]
    fn geometry_change_moves_hover() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 20, 20)));
        t.process_mouse_movement(10, 10);
        assert!(t.is_hovered(a));
        t.set_pos_x(a, 60);
        assert!(!t.is_hovered(a));
        assert_eq!(t.hovered_block(), None);
    }

    #[test]
    fn disabled_hover_checking_freezes_hover() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 20, 20)));
        let b = t.insert_at_root(Block::new(Area::new(50, 50, 20, 20)));
        t.process_mouse_movement(10, 10);
        t.disable_checking_hover();
        assert!(!t.is_checking_hover());
        t.process_mouse_movement(60, 60);
        assert_eq!(t.hovered_block(), Some(a));
        t.enable_checking_hover();
        assert_eq!(t.hovered_block(), Some(b));
        assert!(!t.is_hovered(a));
    }

    #[test]
    fn cursor_leave_keeps_hover_while_checking_is_off() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 20, 20)));
        t.process_mouse_movement(10, 10);
        t.disable_checking_hover();
        t.process_cursor_leave();
        assert_eq!(t.hovered_block(), Some(a));
        assert!(t.is_hovered(a));
        assert!(!t.is_hovered(t.root()));
        assert!(t.mouse().is_outside());

        t.enable_checking_hover();
        assert_eq!(t.hovered_block(), None);
        assert!(!t.is_hovered(a));
    }

    #[test]
    fn config_can_start_with_hover_checking_off() {
        let config =
            TreeConfig::new(Area::new(0, 0, 100, 100), 100, 100).with_hover_checking(false);
        let mut t = Tree::new(config, Recorder::default()).unwrap();
        assert!(!t.is_checking_hover());
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 20, 20)));
        t.process_mouse_movement(10, 10);
        assert_eq!(t.hovered_block(), None);
        assert!(!t.is_hovered(a));

        t.enable_checking_hover();
        assert_eq!(t.hovered_block(), Some(a));
        assert!(t.is_hovered(a));
    }

    #[test]
    fn root_hover_render_is_configurable() {
        let mut quiet = tree(100, 100);
        let _ = quiet.render();
        quiet.process_mouse_movement(10, 10);
        assert!(!quiet.is_render_required());

        let config =
            TreeConfig::new(Area::new(0, 0, 100, 100), 100, 100).with_root_hover_render(true);
        let mut t = Tree::new(config, Recorder::default()).unwrap();
        let _ = t.render();
        t.process_mouse_movement(10, 10);
        assert!(t.is_hovered(t.root()));
        assert!(t.is_render_required());
        let _ = t.render();
        t.process_cursor_leave();
        assert!(t.is_render_required());
    }

    /// Suspends hover tracking on a button event and resumes it on a key event.
    struct Freeze;

    impl BlockHandler<Recorder> for Freeze {
        fn pointer_button(&mut self, cx: &mut BlockCx<'_, Recorder>) {
            cx.disable_checking_hover();
        }
        fn key(&mut self, cx: &mut BlockCx<'_, Recorder>) {
            cx.enable_checking_hover();
        }
    }

    #[test]
    fn handlers_can_suspend_hover_checking() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 20, 20)).with_handler(Freeze));
        let b = t.insert_at_root(Block::new(Area::new(50, 50, 20, 20)));
        t.process_mouse_movement(10, 10);
        assert_eq!(t.hovered_block(), Some(a));

        t.process_mouse_button(MouseButtonEvent {
            button: MouseButton::Left,
            modifiers: Modifiers::empty(),
            action: Action::Press,
        });
        assert!(!t.is_checking_hover());
        t.process_mouse_movement(60, 60);
        assert_eq!(t.hovered_block(), Some(a));

        t.process_key(KeyEvent {
            key: 32,
            modifiers: Modifiers::empty(),
            action: Action::Press,
        });
        assert!(t.is_checking_hover());
        assert_eq!(t.hovered_block(), Some(b));
        assert!(!t.is_hovered(a));
        assert!(t.is_hovered(b));
    }

    #[test]
    fn hover_render_flag_is_opt_in() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 20, 20)));
        let b = t.insert_at_root(Block::new(Area::new(50, 50, 20, 20)).with_hover_render(true));
        let _ = t.render();
        t.process_mouse_movement(10, 10);
        assert!(t.is_hovered(a));
        assert!(!t.is_render_required());
        t.process_mouse_movement(60, 60);
        assert!(t.is_hovered(b));
        assert!(t.is_render_required());
    }

    #[test]
    fn render_walk_paints_in_insertion_order() {
        let log = Log::default();
        let mut t = tree(100, 100);
        let a = t.insert_at_root(probe(Area::new(0, 0, 50, 50), "a", true, &log));
        let _a1 = t.insert(a, probe(Area::new(0, 0, 10, 10), "a1", false, &log));
        let b = t.insert_at_root(probe(Area::new(50, 50, 50, 50), "b", true, &log));
        t.compositor_mut().ops.clear();

        let damage = t.render().unwrap();
        assert_eq!(
            *log.borrow(),
            ["a:render", "a1:render", "b:render"].map(String::from)
        );
        assert_eq!(
            damage.composited,
            vec![(a, Area::new(0, 0, 50, 50)), (b, Area::new(50, 50, 50, 50))]
        );
        let full = Area::new(0, 0, 100, 100);
        assert_eq!(
            t.compositor().ops,
            vec![
                Op::Begin(Area::new(0, 0, 50, 50)),
                Op::Blend(Area::new(0, 0, 50, 50)),
                Op::Copy(Area::new(0, 0, 50, 50)),
                Op::Begin(Area::new(0, 0, 10, 10)),
                Op::Begin(Area::new(50, 50, 50, 50)),
                Op::Blend(Area::new(50, 50, 50, 50)),
                Op::Copy(Area::new(50, 50, 50, 50)),
                Op::Present(full),
                Op::ClearAlpha(full),
            ]
        );
    }

    #[test]
    fn render_is_consumed_once() {
        let log = Log::default();
        let mut t = tree(100, 100);
        t.insert_at_root(probe(Area::new(0, 0, 50, 50), "a", true, &log));
        assert!(t.render().is_some());
        let ops = t.compositor().ops.len();
        assert!(t.render().is_none());
        assert_eq!(t.compositor().ops.len(), ops);
        t.request_render();
        assert!(t.render().is_some());
    }

    #[test]
    fn containers_never_draw() {
        let mut t = tree(100, 100);
        t.insert_at_root(Block::new(Area::new(0, 0, 50, 50)));
        t.compositor_mut().ops.clear();
        let damage = t.render().unwrap();
        assert!(damage.is_empty());
        assert_eq!(t.compositor().ops.len(), 2);
    }

    #[test]
    fn area_propagation_is_pruned() {
        let log = Log::default();
        let mut t = tree(800, 600);
        let small = t.insert_at_root(probe(Area::new(0, 0, 100, 100), "small", false, &log));
        t.insert(small, probe(Area::new(0, 0, 10, 10), "small_child", false, &log));
        let big = t.insert_at_root(probe(Area::new(0, 0, 800, 600), "big", false, &log));
        t.insert(big, probe(Area::new(0, 0, 10, 10), "big_child", false, &log));
        log.borrow_mut().clear();

        t.change_area(Area::new(0, 0, 400, 300));
        assert_eq!(
            *log.borrow(),
            ["small:area", "big:area", "big_child:area"].map(String::from)
        );
        assert_eq!(t.area(big), Some(Area::new(0, 0, 400, 300)));
    }

    #[test]
    fn unchanged_root_area_is_ignored() {
        let mut t = tree(100, 100);
        let _ = t.render();
        t.change_area(Area::new(0, 0, 100, 100));
        assert!(!t.is_render_required());
    }

    #[test]
    fn root_area_is_limited_to_maximum() {
        let mut t = tree(100, 100);
        t.change_area(Area::new(0, 0, 400, 50));
        assert_eq!(t.area(t.root()), Some(Area::new(0, 0, 100, 50)));
    }

    struct Follower;

    impl BlockHandler<Recorder> for Follower {
        fn area_changed(&mut self, cx: &mut BlockCx<'_, Recorder>) {
            cx.set_relative_normalized_width(0.5);
            cx.set_relative_normalized_height(0.5);
        }
    }

    #[test]
    fn handlers_can_resize_on_area_change() {
        let mut t = tree(800, 600);
        let half = t.insert_at_root(Block::new(Area::new(0, 0, 400, 300)).with_handler(Follower));
        let child = t.insert(half, Block::new(Area::new(300, 200, 100, 100)));
        t.change_area(Area::new(0, 0, 400, 200));
        assert_eq!(t.area(half), Some(Area::new(0, 0, 200, 100)));
        assert_eq!(t.area(child), Some(Area::new(100, 0, 100, 100)));
    }

    struct Grow;

    impl BlockHandler<Recorder> for Grow {
        fn hover_changed(&mut self, cx: &mut BlockCx<'_, Recorder>) {
            if cx.is_hovered() {
                cx.set_width(80);
            }
        }
    }

    #[test]
    fn hover_handlers_may_change_geometry() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 20, 20)).with_handler(Grow));
        t.process_mouse_movement(5, 5);
        assert_eq!(t.area(a), Some(Area::new(0, 0, 80, 20)));
        assert!(t.is_hovered(a));
    }

    #[test]
    fn input_reaches_every_block() {
        let log = Log::default();
        let mut t = tree(100, 100);
        t.set_handler(t.root(), Some(Box::new(Probe::new("root", false, &log))));
        let a = t.insert_at_root(probe(Area::new(0, 0, 10, 10), "a", false, &log));
        t.insert(a, probe(Area::new(0, 0, 5, 5), "a1", false, &log));
        t.insert_at_root(probe(Area::new(90, 90, 10, 10), "b", false, &log));
        log.borrow_mut().clear();

        let button = MouseButtonEvent {
            button: MouseButton::Left,
            modifiers: Modifiers::SHIFT,
            action: Action::Press,
        };
        t.process_mouse_button(button);
        assert_eq!(t.mouse().last_button, Some(button));
        t.process_mouse_scroll(0.0, -1.0);
        assert_eq!(t.mouse().scroll_offset_y, -1.0);
        t.process_key(KeyEvent {
            key: 65,
            modifiers: Modifiers::empty(),
            action: Action::Release,
        });
        assert_eq!(t.info().last_key.map(|k| k.key), Some(65));

        let expected: Vec<String> = ["button", "scroll", "key"]
            .iter()
            .flat_map(|what| {
                ["root", "a", "a1", "b"]
                    .iter()
                    .map(move |who| alloc::format!("{who}:{what}"))
            })
            .collect();
        assert_eq!(*log.borrow(), expected);
    }

    #[test]
    fn remove_frees_subtree_and_hover() {
        let mut t = tree(100, 100);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 50, 50)));
        let a1 = t.insert(a, Block::new(Area::new(0, 0, 10, 10)));
        let b = t.insert_at_root(Block::new(Area::new(0, 0, 100, 100)));
        t.remove(b);
        t.process_mouse_movement(5, 5);
        assert_eq!(t.hovered_block(), Some(a1));

        t.remove(a);
        assert!(!t.is_alive(a));
        assert!(!t.is_alive(a1));
        assert_eq!(t.hovered_block(), None);
        assert_eq!(t.len(), 1);
        assert!(t.children_of(t.root()).is_empty());

        let c = t.insert_at_root(Block::new(Area::new(0, 0, 10, 10)));
        assert!(t.is_alive(c));
        assert!(!t.is_alive(a));
        assert!(!t.is_alive(a1));
        assert_eq!(t.hovered_block(), Some(c));
    }

    #[test]
    #[should_panic(expected = "the root block cannot be removed")]
    fn removing_root_panics() {
        let mut t = tree(10, 10);
        let root = t.root();
        t.remove(root);
    }

    #[test]
    #[should_panic(expected = "dangling BlockId")]
    fn stale_ids_fail_loudly() {
        let mut t = tree(10, 10);
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 5, 5)));
        t.remove(a);
        t.set_width(a, 3);
    }

    #[test]
    fn depth_first_follows_paint_order() {
        let mut t = tree(100, 100);
        let root = t.root();
        let a = t.insert_at_root(Block::new(Area::new(0, 0, 10, 10)));
        let a1 = t.insert(a, Block::new(Area::new(0, 0, 5, 5)));
        let a2 = t.insert(a, Block::new(Area::new(0, 0, 5, 5)));
        let b = t.insert_at_root(Block::new(Area::new(0, 0, 10, 10)));
        let order: Vec<_> = t.depth_first().collect();
        assert_eq!(order, vec![root, a, a1, a2, b]);
        assert_eq!(t.parent_of(a2), Some(a));
        assert_eq!(t.children_of(a), &[a1, a2]);
    }

    /// Counts backing-store releases through a shared cell.
    #[derive(Debug)]
    struct Releases(Rc<core::cell::Cell<u32>>);

    impl Compositor for Releases {
        fn create_backing_store(&mut self, _: u32, _: u32) -> Result<(), CompositorError> {
            Ok(())
        }
        fn destroy_backing_store(&mut self) {
            self.0.set(self.0.get() + 1);
        }
        fn begin_block(&mut self, _: Area) {}
        fn blend_region(&mut self, _: Area) {}
        fn copy_region(&mut self, _: Area) {}
        fn present(&mut self, _: Area) {}
        fn clear_backing_alpha(&mut self, _: Area) {}
    }

    #[test]
    fn drop_releases_backing_store() {
        let released = Rc::new(core::cell::Cell::new(0));
        let t = Tree::new(
            TreeConfig::new(Area::new(0, 0, 10, 10), 10, 10),
            Releases(released.clone()),
        )
        .unwrap();
        assert_eq!(released.get(), 0);
        drop(t);
        assert_eq!(released.get(), 1);
    }
}
