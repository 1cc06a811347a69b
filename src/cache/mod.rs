pub mod existence_filter;
pub mod factory;
pub mod object_cache;
pub mod traits;

pub use traits::{BitArray, ExistenceFilter, ObjectCache};
