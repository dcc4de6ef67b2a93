pub mod halstead;
pub mod loc;

pub use halstead::{halstead_volume, maintainability_index, CommentStyle};
pub use loc::count_loc;
