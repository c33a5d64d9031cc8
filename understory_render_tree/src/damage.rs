// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage summary types returned from a render walk.

use alloc::vec::Vec;
use kurbo::Rect;

use crate::area::Area;
use crate::types::BlockId;

/// What a single [`crate::Tree::render`] call composited.
///
/// Regions are listed in paint order and may overlap.
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// Blocks that drew this frame, with the area blended into the backing store.
    pub composited: Vec<(BlockId, Area)>,
    /// The root area copied to the visible surface.
    pub presented: Area,
}

impl Damage {
    /// Number of blocks that drew this frame.
    pub fn len(&self) -> usize {
        self.composited.len()
    }

    /// Whether no block drew this frame.
    pub fn is_empty(&self) -> bool {
        self.composited.is_empty()
    }

    /// Returns the union of all composited areas.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.composited.iter().map(|(_, area)| area.to_rect());
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }
}
