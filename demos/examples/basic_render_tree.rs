// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic render tree example.
//!
//! Run:
//! - `cargo run -p understory_demos --example basic_render_tree`

use understory_render_tree::backends::{Rgba, SoftwareCompositor};
use understory_render_tree::{
    Area, Block, BlockCx, BlockHandler, RenderCx, Tree, TreeConfig,
};

struct Panel {
    name: &'static str,
    color: Rgba,
}

impl BlockHandler<SoftwareCompositor> for Panel {
    fn render(&mut self, cx: &mut RenderCx<'_, SoftwareCompositor>) -> bool {
        let mut color = self.color;
        if cx.is_hovered() {
            color.a = 0.5;
        }
        cx.compositor().fill(color);
        true
    }

    fn hover_changed(&mut self, cx: &mut BlockCx<'_, SoftwareCompositor>) {
        println!("{} hovered: {}", self.name, cx.is_hovered());
    }

    fn area_changed(&mut self, cx: &mut BlockCx<'_, SoftwareCompositor>) {
        cx.set_relative_normalized_width(0.5);
        println!("{} area: {:?}", self.name, cx.area());
    }
}

fn main() {
    let config = TreeConfig::new(Area::new(0, 0, 320, 240), 640, 480);
    let mut tree = Tree::new(config, SoftwareCompositor::new()).expect("backing store");

    let left = tree.insert_at_root(
        Block::new(Area::new(0, 0, 160, 240))
            .with_handler(Panel {
                name: "left",
                color: Rgba::opaque(0.8, 0.2, 0.2),
            })
            .with_hover_render(true),
    );
    let badge = tree.insert(
        left,
        Block::new(Area::new(150, 10, 40, 20)).with_handler(Panel {
            name: "badge",
            color: Rgba::opaque(0.2, 0.2, 0.8),
        }),
    );
    println!("badge clamped to {:?}", tree.area(badge));

    let damage = tree.render().expect("first frame");
    println!("frame 1 composited {} blocks", damage.len());

    tree.process_mouse_movement(20, 100);
    println!("hovered: {:?}", tree.hovered_block());
    if let Some(damage) = tree.render() {
        println!("frame 2 composited {:?}", damage.union_rect());
    }

    tree.change_area(Area::new(0, 0, 640, 480));
    println!("left after resize: {:?}", tree.area(left));
    let _ = tree.render();
    println!(
        "pixel under cursor: {:?}",
        tree.compositor().visible_pixel(20, 100)
    );
}
