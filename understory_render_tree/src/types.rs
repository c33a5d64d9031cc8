// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the render tree: block identifiers and shared input state.

/// Identifier for a block in the tree (generational).
///
/// Handles stay cheap to copy and never keep a block alive. After a block is
/// removed its slot may be reused, but the generation changes, so old handles
/// are reported as stale rather than aliasing the new block.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BlockId(pub(crate) u32, pub(crate) u32);

impl BlockId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Pointer button identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Any other button, by platform index.
    Other(u8),
}

/// Press/release state carried by button and key events.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// The button or key went down.
    Press,
    /// The button or key went up.
    Release,
    /// The key is held and the platform generated a repeat.
    Repeat,
}

bitflags::bitflags! {
    /// Keyboard modifiers active when an event was generated.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Either shift key.
        const SHIFT     = 0b0000_0001;
        /// Either control key.
        const CONTROL   = 0b0000_0010;
        /// Either alt/option key.
        const ALT       = 0b0000_0100;
        /// Either super/command key.
        const SUPER     = 0b0000_1000;
        /// Caps lock is engaged.
        const CAPS_LOCK = 0b0001_0000;
        /// Num lock is engaged.
        const NUM_LOCK  = 0b0010_0000;
    }
}

/// A pointer button transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MouseButtonEvent {
    /// Which button changed.
    pub button: MouseButton,
    /// Modifiers held at the time.
    pub modifiers: Modifiers,
    /// Press or release.
    pub action: Action,
}

/// A keyboard transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// Platform key code.
    pub key: u32,
    /// Modifiers held at the time.
    pub modifiers: Modifiers,
    /// Press, release, or repeat.
    pub action: Action,
}

/// Pointer state shared by every dispatch walk of one tree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MouseInfo {
    /// Cursor x, or [`MouseInfo::OUTSIDE`] while the cursor is off the surface.
    pub cursor_pos_x: i64,
    /// Cursor y, or [`MouseInfo::OUTSIDE`] while the cursor is off the surface.
    pub cursor_pos_y: i64,
    /// Cursor movement along x since the previous movement event.
    pub cursor_delta_x: i64,
    /// Cursor movement along y since the previous movement event.
    pub cursor_delta_y: i64,
    /// Horizontal offset of the last scroll event.
    pub scroll_offset_x: f64,
    /// Vertical offset of the last scroll event.
    pub scroll_offset_y: f64,
    /// The last button event, if any has been seen.
    pub last_button: Option<MouseButtonEvent>,
}

impl MouseInfo {
    /// Sentinel cursor coordinate meaning "outside the tracked surface".
    pub const OUTSIDE: i64 = i64::MAX;

    /// Whether the cursor is currently outside the tracked surface.
    #[inline]
    pub fn is_outside(&self) -> bool {
        self.cursor_pos_x == Self::OUTSIDE
    }

    pub(crate) fn leave(&mut self) {
        self.cursor_pos_x = Self::OUTSIDE;
        self.cursor_pos_y = Self::OUTSIDE;
        self.cursor_delta_x = 0;
        self.cursor_delta_y = 0;
    }
}

impl Default for MouseInfo {
    fn default() -> Self {
        Self {
            cursor_pos_x: Self::OUTSIDE,
            cursor_pos_y: Self::OUTSIDE,
            cursor_delta_x: 0,
            cursor_delta_y: 0,
            scroll_offset_x: 0.0,
            scroll_offset_y: 0.0,
            last_button: None,
        }
    }
}

/// Per-tree information: fixed surface limits plus mutable input state.
#[derive(Clone, Debug)]
pub struct TreeInfo {
    max_width: u32,
    max_height: u32,
    /// Shared pointer state.
    pub mouse: MouseInfo,
    /// The last key event, if any has been seen.
    pub last_key: Option<KeyEvent>,
}

impl TreeInfo {
    pub(crate) fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
            mouse: MouseInfo::default(),
            last_key: None,
        }
    }

    /// Maximum surface width; also the width of the backing store.
    #[inline]
    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    /// Maximum surface height; also the height of the backing store.
    #[inline]
    pub fn max_height(&self) -> u32 {
        self.max_height
    }
}
