// src/model/mod.rs

//! Runtime entities: the blocks shown on the bar, the sparks feeding them,
//! and the renderer itself.

pub mod bar;
pub mod block;
pub mod spark;

pub use bar::{renderer_args, Bar};
pub use block::{Block, BlockState};
pub use spark::{Spark, SparkFeed};

use crate::config::{ConfigFile, LayoutSlot};

/// One block per layout slot, in display order.
pub fn build_blocks(cfg: &ConfigFile, layout: &[LayoutSlot]) -> Vec<Block> {
    layout
        .iter()
        .map(|slot| Block::new(slot, cfg.block_or_default(&slot.sid)))
        .collect()
}

/// One spark per sparked or live block.
pub fn build_sparks(blocks: &[Block]) -> Vec<Spark> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(idx, block)| Spark::for_block(idx, block))
        .collect()
}
