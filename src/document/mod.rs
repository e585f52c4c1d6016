//! Whole-document rendering: find diagram blocks in markdown and replace
//! them with Kroki markup.

mod fence;
mod render;

pub use fence::{FencedBlock, Segment, split_fenced_blocks};
pub use render::{BLOCK_GRACE, BlockOutcome, BlockStatus, DocumentRenderer, RenderedDocument};
