// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_render_tree --heading-base-level=0

//! Understory Render Tree: a retained-mode block tree with clamped layout, hover tracking, and incremental compositing.
//!
//! The tree models one drawable surface as a hierarchy of rectangular blocks.
//! A block draws itself and reacts to input through an optional [`BlockHandler`];
//! a block without one is a pure layout container.
//!
//! - Every block stays inside its parent. Setters clamp instead of failing, and
//!   resizing the surface re-clamps the whole tree, skipping subtrees whose
//!   areas did not change.
//! - Hover is tracked by hit testing the cursor against the tree. The deepest,
//!   topmost block under the cursor is the single hovered block, and handlers
//!   are told when their hover state flips.
//! - Rendering is incremental: geometry, structure, and opted-in hover changes
//!   mark the tree render-required, and [`Tree::render`] is a no-op otherwise.
//!   Each frame composites the drawn blocks through a [`Compositor`] into a
//!   persistent backing store, then presents it.
//!
//! ## Coordinates
//!
//! Areas are integer pixel rectangles in absolute surface coordinates, not
//! offsets from the parent. Moving a parent does not move its children; they
//! are only clamped back inside. Relative setters such as
//! [`Tree::set_relative_pos_x`] and [`Tree::set_relative_normalized_width`]
//! are provided for parent-relative placement. Cursor positions share the
//! surface coordinate system; the caller converts from the windowing layer.
//!
//! ## Compositing model
//!
//! The [`Compositor`] owns three surfaces: a transient one blocks draw into, a
//! backing store that accumulates the frame, and the visible one. For each
//! block whose handler reports drawing, the backing store is blended under the
//! fresh content (`ONE_MINUS_DST_ALPHA` / `DST_ALPHA`) and the result copied
//! back. Opaque pixels overwrite, transparent ones keep what earlier blocks
//! composited. [`backends::SoftwareCompositor`] implements this on CPU buffers.
//!
//! ## API overview
//!
//! - [`Tree`]: owns the blocks, input state, hover pointer, and compositor.
//! - [`TreeConfig`]: initial surface area, maximum size, hover options.
//! - [`Block`]: a block to insert (area, handler, hover-render opt-in).
//! - [`BlockId`]: generational handle of a block.
//! - [`BlockHandler`]: render and input callbacks, reached through [`RenderCx`] and [`BlockCx`].
//! - [`Area`] and [`NormalizedArea`]: absolute and parent-relative geometry.
//! - [`MouseInfo`] and [`TreeInfo`]: shared input state.
//!
//! Key operations:
//! - [`Tree::insert`] → [`BlockId`], [`Tree::remove`]
//! - [`Tree::set_width`] / [`Tree::set_pos_x`] / [`Tree::set_area`] and the relative variants
//! - [`Tree::change_area`] when the surface resizes
//! - [`Tree::process_mouse_movement`] / [`Tree::process_mouse_button`] /
//!   [`Tree::process_mouse_scroll`] / [`Tree::process_key`] / [`Tree::process_cursor_leave`]
//! - [`Tree::render`] → [`Damage`] when a frame was composited
//! - [`Tree::hovered_block`], [`Tree::hit_test_point`], [`Tree::next_depth_first`]
//!
//! ## Example
//!
//! ```rust
//! use understory_render_tree::backends::{Rgba, SoftwareCompositor};
//! use understory_render_tree::{Area, Block, BlockHandler, RenderCx, Tree, TreeConfig};
//!
//! struct Fill(Rgba);
//!
//! impl BlockHandler<SoftwareCompositor> for Fill {
//!     fn render(&mut self, cx: &mut RenderCx<'_, SoftwareCompositor>) -> bool {
//!         cx.compositor().fill(self.0);
//!         true
//!     }
//! }
//!
//! let config = TreeConfig::new(Area::new(0, 0, 64, 64), 64, 64);
//! let mut tree = Tree::new(config, SoftwareCompositor::new()).unwrap();
//! let red = Rgba::opaque(1.0, 0.0, 0.0);
//! tree.insert_at_root(Block::new(Area::new(8, 8, 16, 16)).with_handler(Fill(red)));
//!
//! let damage = tree.render().expect("first frame");
//! assert_eq!(damage.len(), 1);
//! assert_eq!(tree.compositor().visible_pixel(10, 10), Some(red));
//! assert!(tree.render().is_none());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod area;
mod block;
mod compositor;
mod config;
mod damage;
mod handler;
mod tree;
mod types;

pub mod backends;

pub use area::{Area, NormalizedArea};
pub use block::Block;
pub use compositor::{Compositor, CompositorError};
pub use config::TreeConfig;
pub use damage::Damage;
pub use handler::{BlockCx, BlockHandler, RenderCx};
pub use tree::Tree;
pub use types::{
    Action, BlockId, KeyEvent, Modifiers, MouseButton, MouseButtonEvent, MouseInfo, TreeInfo,
};
