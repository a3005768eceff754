pub mod ordering;
pub mod pagination;
pub mod slug;

pub use ordering::{Identified, PositionBase, PositionUpdate, ReorderError};
pub use pagination::PageItem;
