// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor implementations.
//!
//! - `software`: CPU surfaces of straight-alpha `f32` RGBA pixels. Useful for
//!   headless rendering, tests, and as a reference for the blend equation a
//!   GPU backend must reproduce.

pub(crate) mod software;

pub use software::{Rgba, SoftwareCompositor};
