pub mod cache;
pub mod directory;
pub mod store;
pub mod tree;
