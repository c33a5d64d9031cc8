// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction options for [`Tree`][crate::Tree].

use crate::area::Area;

/// Options used by [`Tree::new`][crate::Tree::new].
///
/// ```rust
/// use understory_render_tree::{Area, TreeConfig};
///
/// let config = TreeConfig::new(Area::new(0, 0, 800, 600), 1920, 1080)
///     .with_hover_checking(false);
/// assert_eq!(config.max_width, 1920);
/// assert!(!config.check_hover);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Initial root area (the drawable surface).
    pub area: Area,
    /// Largest surface width the tree will ever track; sizes the backing store.
    pub max_width: u32,
    /// Largest surface height the tree will ever track; sizes the backing store.
    pub max_height: u32,
    /// Whether hover hit testing starts enabled.
    pub check_hover: bool,
    /// Whether toggling the root's hover state marks the tree render-required.
    pub root_hover_render: bool,
}

impl TreeConfig {
    /// Options for a surface with the given initial area and limits.
    pub fn new(area: Area, max_width: u32, max_height: u32) -> Self {
        Self {
            area,
            max_width,
            max_height,
            check_hover: true,
            root_hover_render: false,
        }
    }

    /// Set whether hover hit testing starts enabled.
    pub fn with_hover_checking(mut self, enabled: bool) -> Self {
        self.check_hover = enabled;
        self
    }

    /// Set whether root hover changes (cursor entering or leaving the surface)
    /// request a render.
    pub fn with_root_hover_render(mut self, enabled: bool) -> Self {
        self.root_hover_render = enabled;
        self
    }

    /// The initial root area limited to the maximum dimensions.
    pub(crate) fn clamped_area(&self) -> Area {
        clamp_to_max(self.area, self.max_width, self.max_height)
    }
}

pub(crate) fn clamp_to_max(area: Area, max_width: u32, max_height: u32) -> Area {
    Area {
        width: area.width.min(max_width),
        height: area.height.min(max_height),
        ..area
    }
}
