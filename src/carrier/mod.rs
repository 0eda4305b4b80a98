//! Carrier images: pixel grids, capacity planning and bit ordering.

pub mod io;
mod ordering;
mod pixels;
mod plan;

pub use ordering::{BitOrdering, BitSlot};
pub use pixels::PixelGrid;
pub use plan::{texture_mask, DepthBands, EmbeddingPlan, HEADER_CHANNELS};
