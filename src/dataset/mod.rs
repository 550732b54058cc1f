//! Record datasets on disk
//!
//! Loading and saving ordered outcome records, plus synthetic data
//! generation. Nothing in here is needed by the estimators themselves.

pub mod generator;
pub mod loader;

// Re-export commonly used types
pub use generator::{generate_dataset, generate_records};
pub use loader::{load_records, save_records, DatasetFormat};
