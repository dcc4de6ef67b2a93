pub mod walker;

pub use walker::ProjectWalker;
