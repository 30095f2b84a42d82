pub mod audit;
pub mod backup;
pub mod summary;
pub mod sync;
