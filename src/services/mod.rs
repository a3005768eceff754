pub mod canonical;
pub mod catalog;
pub mod collections;

pub use catalog::{CatalogProvider, TmdbProvider};
